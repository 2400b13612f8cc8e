use crate::error::NetxrayError;
use crate::netxray::{
    NetxrayHeader, RecordHeader, CAPTUREFILE_HEADER_SIZE, NETXRAY_MAGIC, OLD_NETXRAY_MAGIC,
};
use cookie_factory::bytes::{le_i16, le_u16, le_u32, le_u64, le_u8};
use cookie_factory::combinator::slice;
use cookie_factory::sequence::tuple;
use cookie_factory::{gen, GenError, SerializeFn};
use std::io::Write;

/// Common trait for all serialization functions
pub trait ToVec {
    /// Serialize to bytes representation (little-endian).
    /// Check values and fix all fields before serializing.
    fn to_vec(&mut self) -> Result<Vec<u8>, GenError> {
        self.fix();
        self.to_vec_raw()
    }

    /// Check and correct all fields: fix offsets and other values if possible.
    fn fix(&mut self) {}

    /// Serialize to bytes representation (little-endian). Do not check values
    fn to_vec_raw(&self) -> Result<Vec<u8>, GenError>;
}

impl From<GenError> for NetxrayError {
    fn from(e: GenError) -> Self {
        match e {
            GenError::IoError(e) => NetxrayError::WriteError(e.kind()),
            _ => NetxrayError::SerializeError,
        }
    }
}

static ZEROES: [u8; 33] = [0; 33];

fn reserved<'a, W: Write + 'a>(len: usize) -> impl SerializeFn<W> + 'a {
    slice(&ZEROES[..len])
}

impl ToVec for NetxrayHeader {
    /// Check and correct all fields: the first packet must follow the file header
    fn fix(&mut self) {
        if (self.start_offset as usize) < CAPTUREFILE_HEADER_SIZE {
            self.start_offset = CAPTUREFILE_HEADER_SIZE as u32;
        }
        if self.end_offset < self.start_offset && !self.is_old {
            self.end_offset = self.start_offset;
        }
    }

    fn to_vec_raw(&self) -> Result<Vec<u8>, GenError> {
        let mut v = Vec::with_capacity(CAPTUREFILE_HEADER_SIZE);
        let magic = if self.is_old {
            OLD_NETXRAY_MAGIC
        } else {
            NETXRAY_MAGIC
        };
        gen(
            tuple((
                tuple((
                    slice(magic),
                    slice(self.version),
                    le_u32(self.start_time),
                    le_u32(self.nframes),
                    reserved(4),
                    le_u32(self.start_offset),
                    le_u32(self.end_offset),
                    reserved(12),
                    le_u8(self.network),
                    le_u8(self.network_plus),
                    reserved(2),
                    le_u8(self.timeunit),
                )),
                tuple((
                    reserved(3),
                    le_u32(self.timelo),
                    le_u32(self.timehi),
                    le_u32(self.linespeed),
                    reserved(12),
                    slice(self.realtick),
                    reserved(4),
                    le_u8(self.captype),
                    reserved(7),
                    le_u8(self.wan_hdlc_subsub_captype),
                    reserved(33),
                    le_i16(self.timezone_hrs),
                )),
            )),
            &mut v,
        )
        .map(|res| res.0.to_vec())
    }
}

impl ToVec for RecordHeader {
    fn to_vec_raw(&self) -> Result<Vec<u8>, GenError> {
        let mut v = Vec::with_capacity(self.size());
        match self {
            RecordHeader::Old { timestamp, len, xxx } => gen(
                tuple((le_u64(*timestamp), le_u16(*len), slice(xxx))),
                &mut v,
            ),
            RecordHeader::V1 {
                timestamp,
                orig_len,
                incl_len,
                xxx,
            } => gen(
                tuple((
                    le_u64(*timestamp),
                    le_u16(*orig_len),
                    le_u16(*incl_len),
                    slice(xxx),
                )),
                &mut v,
            ),
            RecordHeader::V2 {
                timestamp,
                orig_len,
                incl_len,
                xxx,
            } => gen(
                tuple((
                    le_u64(*timestamp),
                    le_u16(*orig_len),
                    le_u16(*incl_len),
                    slice(xxx),
                )),
                &mut v,
            ),
        }
        .map(|res| res.0.to_vec())
    }
}

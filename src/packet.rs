use crate::pseudo_header::PseudoHeader;
use crate::utils::Data;

/// Type of a capture record
///
/// Readers only ever produce packets; the other types exist so that writers can
/// refuse them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordType {
    Packet,
    /// Record specific to another capture format
    FileTypeSpecific,
    SystemCall,
    SystemdJournal,
    Custom,
}

/// A packet read from (or to be written to) a NetXRay file
#[derive(Clone, Debug, PartialEq)]
pub struct NetxrayPacket<'a> {
    pub rec_type: RecordType,
    /// Absolute timestamp, seconds since epoch
    pub ts_sec: i64,
    /// Absolute timestamp, nanoseconds part
    pub ts_nsec: u32,
    /// Number of bytes of packet data (trailing padding excluded)
    pub caplen: u32,
    /// Length of the packet on the wire (trailing padding excluded)
    pub origlen: u32,
    pub pseudo_header: PseudoHeader,
    pub data: Data<'a>,
}

impl<'a> NetxrayPacket<'a> {
    /// Build a complete (untruncated) packet from its data
    pub fn new(ts_sec: i64, ts_nsec: u32, data: &'a [u8], pseudo_header: PseudoHeader) -> Self {
        NetxrayPacket {
            rec_type: RecordType::Packet,
            ts_sec,
            ts_nsec,
            caplen: data.len() as u32,
            origlen: data.len() as u32,
            pseudo_header,
            data: Data::Borrowed(data),
        }
    }

    /// Packet data, limited to the captured length
    #[inline]
    pub fn packet_data(&self) -> &[u8] {
        let len = (self.caplen as usize).min(self.data.len());
        &self.data[..len]
    }

    /// Timestamp as a `f64` number of seconds
    pub fn ts_f64(&self) -> f64 {
        self.ts_sec as f64 + (self.ts_nsec as f64) / 1e9
    }

    /// Copy packet data, so the packet outlives the reader buffer
    pub fn into_owned(self) -> NetxrayPacket<'static> {
        NetxrayPacket {
            rec_type: self.rec_type,
            ts_sec: self.ts_sec,
            ts_nsec: self.ts_nsec,
            caplen: self.caplen,
            origlen: self.origlen,
            pseudo_header: self.pseudo_header,
            data: self.data.into_owned(),
        }
    }
}

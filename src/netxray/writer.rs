use crate::encap::{Encapsulation, WanCaptype};
use crate::error::NetxrayError;
use crate::netxray::header::{NetxrayHeader, NetxrayVersion, CAPTUREFILE_HEADER_SIZE};
use crate::netxray::record::RecordHeader;
use crate::packet::{NetxrayPacket, RecordType};
use crate::pseudo_header::PseudoHeader;
use crate::serialize::ToVec;
use log::{debug, warn};
use std::convert::TryFrom;
use std::io::{self, Seek, SeekFrom, Write};

/// Ticks per second of written files
const WRITE_TICKS_PER_SEC: u64 = 1_000_000;

/// Flavour of the files produced by [`NetxrayWriter`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteFormat {
    /// Version 1.1, as written by Windows Sniffer Pro 2.0.01
    V1_1,
    /// Version 2.001 (2.x record headers, with pseudo-header information)
    V2_0,
}

impl WriteFormat {
    pub fn version(self) -> NetxrayVersion {
        match self {
            WriteFormat::V1_1 => NetxrayVersion::V1_1,
            WriteFormat::V2_0 => NetxrayVersion::V2_001,
        }
    }

    /// Largest captured length accepted by the format
    pub fn max_caplen(self) -> u32 {
        match self {
            WriteFormat::V1_1 => 65_535,
            WriteFormat::V2_0 => 262_144,
        }
    }

    /// Raw network code (NDIS value minus one) of an encapsulation, if it can be written
    pub fn network_code(self, encap: Encapsulation) -> Option<u8> {
        let code = match (self, encap) {
            (_, Encapsulation::Ethernet) => 0,
            (_, Encapsulation::TokenRing) => 1,
            (_, Encapsulation::Fddi) | (_, Encapsulation::FddiBitswapped) => 2,
            (WriteFormat::V2_0, Encapsulation::PppWithPhdr)
            | (WriteFormat::V2_0, Encapsulation::FrelayWithPhdr)
            | (WriteFormat::V2_0, Encapsulation::Lapb)
            | (WriteFormat::V2_0, Encapsulation::Sdlc) => 3,
            (WriteFormat::V2_0, Encapsulation::Ieee80211WithRadio) => 9,
            _ => return None,
        };
        Some(code)
    }
}

/// Writer of NetXRay files
///
/// Records are written as they come. The file header is written by
/// [`finish`](NetxrayWriter::finish), since it holds the number of packets and the end
/// offset, so the writer must be seekable.
///
/// ## Example
///
/// ```rust
/// use netxray_parser::*;
/// use std::io::Cursor;
///
/// let mut writer = NetxrayWriter::new(Cursor::new(Vec::new()), WriteFormat::V2_0, Encapsulation::Ethernet)
///     .expect("NetxrayWriter");
/// let data = [0u8; 60];
/// let packet = NetxrayPacket::new(1_600_000_000, 0, &data, PseudoHeader::default_for(Encapsulation::Ethernet));
/// writer.write_packet(&packet).expect("write_packet");
/// let file = writer.finish().expect("finish").into_inner();
/// assert_eq!(file.len(), 128 + 40 + 60);
/// ```
pub struct NetxrayWriter<W>
where
    W: Write + Seek,
{
    writer: W,
    format: WriteFormat,
    encapsulation: Encapsulation,
    network: u8,
    /// Seconds of the first packet, origin of all time stamps
    start_secs: Option<u32>,
    nframes: u32,
    /// Some frames were written with their FCS
    fcs_present: bool,
}

fn write_err(e: io::Error) -> NetxrayError {
    NetxrayError::WriteError(e.kind())
}

impl<W> NetxrayWriter<W>
where
    W: Write + Seek,
{
    /// Creates a new writer, for packets of the given encapsulation
    pub fn new(
        mut writer: W,
        format: WriteFormat,
        encapsulation: Encapsulation,
    ) -> Result<NetxrayWriter<W>, NetxrayError> {
        let network = format
            .network_code(encapsulation)
            .ok_or(NetxrayError::UnwritableEncapsulation(encapsulation))?;
        // room for the file header
        writer
            .seek(SeekFrom::Start(CAPTUREFILE_HEADER_SIZE as u64))
            .map_err(write_err)?;
        Ok(NetxrayWriter {
            writer,
            format,
            encapsulation,
            network,
            start_secs: None,
            nframes: 0,
            fcs_present: false,
        })
    }

    pub fn format(&self) -> WriteFormat {
        self.format
    }

    /// Number of packets written so far
    pub fn nframes(&self) -> u32 {
        self.nframes
    }

    /// Write one packet
    ///
    /// Nothing is written if the packet is refused.
    ///
    /// In the 2.001 format, Ethernet and 802.11 frames with a 4-byte FCS are flagged
    /// in their record header, so the FCS is kept when reading the file. The 1.1 format
    /// has no such flag: the FCS stays in the data, but readers will not know it is
    /// there.
    pub fn write_packet(&mut self, packet: &NetxrayPacket) -> Result<(), NetxrayError> {
        if packet.rec_type != RecordType::Packet {
            return Err(NetxrayError::UnwritableRecordType(packet.rec_type));
        }
        let max = self.format.max_caplen();
        if packet.caplen > max {
            return Err(NetxrayError::PacketTooLarge {
                caplen: packet.caplen,
                max,
            });
        }
        let incl_len = u16::try_from(packet.caplen).or(Err(NetxrayError::PacketTooLarge {
            caplen: packet.caplen,
            max: u32::from(u16::MAX),
        }))?;
        if packet.caplen as usize > packet.data.len() {
            return Err(NetxrayError::InvalidRecord("captured length larger than data"));
        }
        let orig_len = u16::try_from(packet.origlen).unwrap_or(u16::MAX);
        let start_secs = match self.start_secs {
            Some(s) => s,
            None => {
                let s = u32::try_from(packet.ts_sec).or(Err(NetxrayError::InvalidRecord(
                    "time stamp cannot be stored in the file header",
                )))?;
                self.start_secs = Some(s);
                s
            }
        };
        let timestamp = self.ticks_since_start(start_secs, packet);
        let with_fcs = self.format == WriteFormat::V2_0
            && matches!(
                self.encapsulation,
                Encapsulation::Ethernet | Encapsulation::Ieee80211WithRadio
            )
            && packet.pseudo_header.fcs_len() == Some(4);
        let hdr = match self.format {
            WriteFormat::V1_1 => RecordHeader::V1 {
                timestamp,
                orig_len,
                incl_len,
                xxx: [0; 16],
            },
            WriteFormat::V2_0 => RecordHeader::V2 {
                timestamp,
                orig_len,
                incl_len,
                xxx: self.v2_pseudo_header(&packet.pseudo_header, with_fcs),
            },
        };
        let hdr = hdr.to_vec_raw()?;
        self.writer.write_all(&hdr).map_err(write_err)?;
        self.writer
            .write_all(packet.packet_data())
            .map_err(write_err)?;
        self.nframes += 1;
        self.fcs_present |= with_fcs;
        Ok(())
    }

    fn ticks_since_start(&self, start_secs: u32, packet: &NetxrayPacket) -> u64 {
        let delta = packet.ts_sec - i64::from(start_secs);
        if delta < 0 {
            warn!(
                "netxray: packet time stamp {} before first packet ({}), writing 0",
                packet.ts_sec, start_secs
            );
            return 0;
        }
        (delta as u64)
            .saturating_mul(WRITE_TICKS_PER_SEC)
            .saturating_add(u64::from(packet.ts_nsec) / 1000)
    }

    /// Encode the pseudo-header in the `xxx` bytes of a 2.x record header
    fn v2_pseudo_header(&self, pseudo_header: &PseudoHeader, with_fcs: bool) -> [u8; 28] {
        let mut xxx = [0; 28];
        if with_fcs {
            // 4-byte trailer marker
            xxx[2] = 0xff;
            xxx[3] = 0xff;
        }
        match (self.encapsulation, pseudo_header) {
            (Encapsulation::Ieee80211WithRadio, PseudoHeader::Ieee80211(wlan)) => {
                xxx[12] = wlan.channel.unwrap_or(0);
                xxx[13] = wlan.data_rate.unwrap_or(0);
                xxx[14] = wlan.signal_percent.unwrap_or(0);
                xxx[15] = match wlan.noise_percent {
                    Some(noise) => (u32::from(noise) * 127 / 100) as u8,
                    None => 0xff,
                };
            }
            (Encapsulation::PppWithPhdr, PseudoHeader::P2p(p2p))
            | (Encapsulation::Sdlc, PseudoHeader::P2p(p2p)) => {
                if p2p.sent {
                    xxx[12] |= 0x01;
                }
            }
            (Encapsulation::FrelayWithPhdr, PseudoHeader::DteDce(dte))
            | (Encapsulation::Lapb, PseudoHeader::DteDce(dte)) => {
                if !dte.from_dce() {
                    xxx[12] |= 0x01;
                }
            }
            _ => (),
        }
        xxx
    }

    /// Write the file header and return the inner writer
    pub fn finish(mut self) -> Result<W, NetxrayError> {
        let filelen = self.writer.stream_position().map_err(write_err)?;
        let end_offset = u32::try_from(filelen)
            .or(Err(NetxrayError::WriteError(io::ErrorKind::InvalidData)))?;
        let mut hdr = NetxrayHeader::new(self.format.version());
        hdr.start_time = self.start_secs.unwrap_or(0);
        hdr.nframes = self.nframes;
        hdr.start_offset = CAPTUREFILE_HEADER_SIZE as u32;
        hdr.end_offset = end_offset;
        hdr.network = self.network;
        hdr.network_plus = 0;
        // the start time is in start_time, so the time stamps start at 0 ticks
        hdr.timelo = 0;
        hdr.timehi = 0;
        if self.fcs_present {
            // tells readers the flagged trailers are a FCS, not junk. The tick rate
            // does not depend on it, since timeunit is 0.
            hdr.realtick = [0x00, 0x34, 0x12, 0x00];
        }
        if self.format == WriteFormat::V2_0 {
            hdr.captype = match self.encapsulation {
                Encapsulation::PppWithPhdr => WanCaptype::PPP.0,
                Encapsulation::FrelayWithPhdr => WanCaptype::FRELAY.0,
                Encapsulation::Lapb => {
                    hdr.wan_hdlc_subsub_captype = 0;
                    WanCaptype::HDLC.0
                }
                Encapsulation::Sdlc => WanCaptype::SDLC.0,
                _ => 0,
            };
        }
        debug!(
            "netxray: writing header, {} packets, end offset 0x{:x}",
            self.nframes, end_offset
        );
        let buf = hdr.to_vec()?;
        self.writer.seek(SeekFrom::Start(0)).map_err(write_err)?;
        self.writer.write_all(&buf).map_err(write_err)?;
        self.writer.flush().map_err(write_err)?;
        Ok(self.writer)
    }
}

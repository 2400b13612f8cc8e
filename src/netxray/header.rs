use log::{debug, warn};
use nom::bytes::streaming::take;
use nom::number::streaming::{le_i16, le_u32, le_u8};
use nom::IResult;
use std::convert::TryFrom;

use crate::encap::{Encapsulation, IsdnType, NetworkType, WanCaptype};
use crate::error::NetxrayError;
use crate::netxray::timeunit::tick_rate;

/// Magic of NetXRay and Windows Sniffer files
pub const NETXRAY_MAGIC: &[u8; 4] = b"XCP\0";
/// Magic of old NetXRay files
pub const OLD_NETXRAY_MAGIC: &[u8; 4] = b"VL\0\0";

/// Size of the magic and file header. Packet data starts at or after this offset.
pub const CAPTUREFILE_HEADER_SIZE: usize = 128;

/// Version of the file format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetxrayVersion {
    /// Old NetXRay (`VL` magic, no version string)
    Old,
    V1_0,
    /// Windows Sniffer Pro 2.0.01
    V1_1,
    V2_000,
    V2_001,
    V2_002,
    V2_003,
}

impl NetxrayVersion {
    /// Match the 8-byte version string from the file header
    pub fn from_bytes(version: &[u8; 8]) -> Option<NetxrayVersion> {
        let v = match version {
            b"001.000\0" => NetxrayVersion::V1_0,
            b"001.100\0" => NetxrayVersion::V1_1,
            b"002.000\0" => NetxrayVersion::V2_000,
            b"002.001\0" => NetxrayVersion::V2_001,
            b"002.002\0" => NetxrayVersion::V2_002,
            b"002.003\0" => NetxrayVersion::V2_003,
            _ => return None,
        };
        Some(v)
    }

    /// The version string, as stored in files (`Old` has none and is stored as zeroes)
    pub fn as_bytes(self) -> &'static [u8; 8] {
        match self {
            NetxrayVersion::Old => b"\0\0\0\0\0\0\0\0",
            NetxrayVersion::V1_0 => b"001.000\0",
            NetxrayVersion::V1_1 => b"001.100\0",
            NetxrayVersion::V2_000 => b"002.000\0",
            NetxrayVersion::V2_001 => b"002.001\0",
            NetxrayVersion::V2_002 => b"002.002\0",
            NetxrayVersion::V2_003 => b"002.003\0",
        }
    }

    pub fn major(self) -> u8 {
        match self {
            NetxrayVersion::Old => 0,
            NetxrayVersion::V1_0 | NetxrayVersion::V1_1 => 1,
            _ => 2,
        }
    }

    pub fn minor(self) -> u8 {
        match self {
            NetxrayVersion::Old | NetxrayVersion::V1_0 | NetxrayVersion::V2_000 => 0,
            NetxrayVersion::V1_1 | NetxrayVersion::V2_001 => 1,
            NetxrayVersion::V2_002 => 2,
            NetxrayVersion::V2_003 => 3,
        }
    }
}

/// Precision of the packet time stamps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TsPrecision {
    Millisecond,
    Microsecond,
    Nanosecond,
}

/// NetXRay file header, as stored in the file
///
/// Reserved and unknown fields are not kept. Use [`NetxrayHeader::file_info`] to
/// check the header and derive the values needed to read packets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetxrayHeader {
    /// File uses the old `VL` magic
    pub is_old: bool,
    /// Version string, `NNN.NNN\0`
    pub version: [u8; 8],
    /// UNIX time (UTC) when capture started
    pub start_time: u32,
    /// Number of packets
    pub nframes: u32,
    /// Offset of the first packet in the file
    pub start_offset: u32,
    /// Offset after the last packet in the file
    pub end_offset: u32,
    /// Datalink type, see [`NetworkType::from_raw`]
    pub network: u8,
    pub network_plus: u8,
    /// Encodes the length of a tick
    pub timeunit: u8,
    /// Capture start time stamp (low 32 bits), in ticks
    pub timelo: u32,
    /// Capture start time stamp (high 32 bits), in ticks
    pub timehi: u32,
    /// Speed of the network, in bits/second
    pub linespeed: u32,
    /// Ticks per second for Ethernet NDIS captures with timeunit 2. Bytes 1 and 2
    /// are also used as a FCS presence flag.
    pub realtick: [u8; 4],
    /// Capture type (software or pod)
    pub captype: u8,
    pub wan_hdlc_subsub_captype: u8,
    /// Timezone hours (at least for version 2.2)
    pub timezone_hrs: i16,
}

impl NetxrayHeader {
    /// Header of a new file. Counters and offsets are set when the file is complete.
    pub fn new(version: NetxrayVersion) -> NetxrayHeader {
        NetxrayHeader {
            is_old: version == NetxrayVersion::Old,
            version: *version.as_bytes(),
            start_time: 0,
            nframes: 0,
            start_offset: CAPTUREFILE_HEADER_SIZE as u32,
            end_offset: CAPTUREFILE_HEADER_SIZE as u32,
            network: 0,
            network_plus: 0,
            timeunit: 0,
            timelo: 0,
            timehi: 0,
            linespeed: 0,
            realtick: [0; 4],
            captype: 0,
            wan_hdlc_subsub_captype: 0,
            timezone_hrs: 0,
        }
    }

    pub const fn size(&self) -> usize {
        CAPTUREFILE_HEADER_SIZE
    }

    /// Capture start time stamp, in ticks
    pub fn start_timestamp_raw(&self) -> u64 {
        (u64::from(self.timehi) << 32) | u64::from(self.timelo)
    }

    /// Decode the version string
    pub fn version(&self) -> Result<NetxrayVersion, NetxrayError> {
        if self.is_old {
            return Ok(NetxrayVersion::Old);
        }
        NetxrayVersion::from_bytes(&self.version)
            .ok_or(NetxrayError::UnsupportedVersion(self.version))
    }

    /// Check the header and derive the values needed to read packets
    pub fn file_info(&self) -> Result<NetxrayInfo, NetxrayError> {
        let version = self.version()?;
        let network = NetworkType::from_raw(self.network, self.network_plus)
            .ok_or(NetxrayError::UnsupportedNetworkPlus(self.network_plus))?;
        if network.encapsulation() == Encapsulation::Unknown {
            return Err(NetxrayError::UnsupportedEncapsulation {
                network,
                network_plus: self.network_plus,
            });
        }
        debug!(
            "netxray: version {:?}, network {} (plus {}), captype {}, timeunit {}",
            version, network, self.network_plus, self.captype, self.timeunit
        );

        let mut start_timestamp = self.start_timestamp_raw() as f64;
        let (ticks_per_sec, ts_precision) = match version {
            NetxrayVersion::Old | NetxrayVersion::V1_0 => (1000.0, TsPrecision::Millisecond),
            // Windows Sniffer Pro 2.0.01 writes microseconds
            NetxrayVersion::V1_1 => (1e6, TsPrecision::Microsecond),
            _ => {
                let rate = tick_rate(
                    network,
                    self.captype,
                    self.timeunit,
                    u32::from_le_bytes(self.realtick),
                    version.minor(),
                )?;
                if rate.ignore_start_timestamp {
                    debug!("netxray: pod capture, ignoring start time stamp");
                    start_timestamp = 0.0;
                }
                let precision = if rate.ticks_per_sec >= 1e7 {
                    TsPrecision::Nanosecond
                } else {
                    TsPrecision::Microsecond
                };
                (rate.ticks_per_sec, precision)
            }
        };
        debug!("netxray: {} ticks per second", ticks_per_sec);

        let mut isdn_type = None;
        let encapsulation = if network == NetworkType::WAN {
            if version.major() == 2 {
                self.wan_encapsulation(&mut isdn_type)?
            } else {
                // assume frames went through NDISWAN and look like Ethernet
                Encapsulation::Ethernet
            }
        } else {
            network.encapsulation()
        };

        let fcs_valid = match encapsulation {
            Encapsulation::Ethernet
            | Encapsulation::Ieee80211WithRadio
            | Encapsulation::Isdn
            | Encapsulation::Lapb => version.major() == 2 && looks_like_fcs_present(self),
            _ => false,
        };

        if !self.is_old && self.start_offset > self.end_offset {
            debug!(
                "netxray: circular capture (start 0x{:x}, end 0x{:x})",
                self.start_offset, self.end_offset
            );
        }
        if (self.start_offset as usize) < CAPTUREFILE_HEADER_SIZE {
            warn!(
                "netxray: start offset 0x{:x} points inside the file header",
                self.start_offset
            );
        }

        Ok(NetxrayInfo {
            version,
            network,
            captype: self.captype,
            encapsulation,
            ticks_per_sec,
            start_timestamp: start_timestamp / ticks_per_sec,
            start_time: self.start_time,
            ts_precision,
            fcs_valid,
            isdn_type,
            nframes: self.nframes,
            start_offset: self.start_offset,
            end_offset: self.end_offset,
            linespeed: self.linespeed,
            timezone_hrs: self.timezone_hrs,
        })
    }

    /// Encapsulation of a version 2 WAN capture, from the capture subtype
    fn wan_encapsulation(
        &self,
        isdn_type: &mut Option<IsdnType>,
    ) -> Result<Encapsulation, NetxrayError> {
        let encap = match WanCaptype(self.captype) {
            WanCaptype::PPP => Encapsulation::PppWithPhdr,
            // some captures of this type are Cisco HDLC, but most are Frame Relay
            WanCaptype::FRELAY => Encapsulation::FrelayWithPhdr,
            WanCaptype::HDLC | WanCaptype::HDLC2 => match self.wan_hdlc_subsub_captype {
                // LAPB/X.25
                0 => Encapsulation::Lapb,
                subsub => match IsdnType::from_subsub_captype(subsub) {
                    Some(t) => {
                        *isdn_type = Some(t);
                        Encapsulation::Isdn
                    }
                    None => return Err(NetxrayError::UnsupportedWanSubCaptype(subsub)),
                },
            },
            WanCaptype::SDLC => Encapsulation::Sdlc,
            WanCaptype::CHDLC => Encapsulation::ChdlcWithPhdr,
            _ => return Err(NetxrayError::UnsupportedWanCaptype(self.captype)),
        };
        Ok(encap)
    }
}

/// Guess if frames flagged with a 4-byte trailer carry a real FCS
///
/// In some version 2 captures, frames with `0xff 0xff` at offsets 2 and 3 of the
/// record header have 4 extra bytes at the end. They are a FCS if the *middle*
/// bytes of `realtick` in the file header are `0x34 0x12`, and junk otherwise.
///
/// This was derived empirically from a handful of captures and is suspect: the
/// correlation may be accidental, and the real answer may depend on the capture
/// hardware. No documented header field is known to carry this information.
pub fn looks_like_fcs_present(header: &NetxrayHeader) -> bool {
    header.realtick[1] == 0x34 && header.realtick[2] == 0x12
}

/// Values derived from the file header, needed to read packets
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetxrayInfo {
    pub version: NetxrayVersion,
    pub network: NetworkType,
    pub captype: u8,
    pub encapsulation: Encapsulation,
    pub ticks_per_sec: f64,
    /// Capture start time stamp, in seconds, subtracted from packet time stamps
    pub start_timestamp: f64,
    /// UNIX time when capture started, integer part of all packet time stamps
    pub start_time: u32,
    pub ts_precision: TsPrecision,
    /// Trailing 4 bytes flagged in record headers are a FCS (not junk)
    pub fcs_valid: bool,
    /// For ISDN captures, the line type
    pub isdn_type: Option<IsdnType>,
    pub nframes: u32,
    pub start_offset: u32,
    pub end_offset: u32,
    /// Speed of the network, in bits/second (informational)
    pub linespeed: u32,
    /// Timezone hours (informational, not applied to time stamps)
    pub timezone_hrs: i16,
}

impl NetxrayInfo {
    /// Capture file wraps around: packets continue after the file header once
    /// the end of the file is reached
    pub fn is_circular(&self) -> bool {
        self.start_offset > self.end_offset
    }
}

/// Read the NetXRay file header (magic included)
///
/// Returns an `Error` (not a `Failure`) with [`NetxrayError::HeaderNotRecognized`]
/// if the magic does not match, so callers can try another format. The header is
/// not checked: see [`NetxrayHeader::file_info`].
pub fn parse_netxray_header(i: &[u8]) -> IResult<&[u8], NetxrayHeader, NetxrayError> {
    let (i, magic) = take(4usize)(i)?;
    let is_old = if magic == NETXRAY_MAGIC {
        false
    } else if magic == OLD_NETXRAY_MAGIC {
        true
    } else {
        return Err(nom::Err::Error(NetxrayError::HeaderNotRecognized));
    };
    let (i, version) = take(8usize)(i)?;
    let (i, start_time) = le_u32(i)?;
    let (i, nframes) = le_u32(i)?;
    let (i, _xxx) = le_u32(i)?;
    let (i, start_offset) = le_u32(i)?;
    let (i, end_offset) = le_u32(i)?;
    let (i, _xxy) = take(12usize)(i)?;
    let (i, network) = le_u8(i)?;
    let (i, network_plus) = le_u8(i)?;
    let (i, _xxz) = take(2usize)(i)?;
    let (i, timeunit) = le_u8(i)?;
    let (i, _xxa) = take(3usize)(i)?;
    let (i, timelo) = le_u32(i)?;
    let (i, timehi) = le_u32(i)?;
    let (i, linespeed) = le_u32(i)?;
    let (i, _xxb) = take(12usize)(i)?;
    let (i, realtick) = take(4usize)(i)?;
    let (i, _xxc) = take(4usize)(i)?;
    let (i, captype) = le_u8(i)?;
    let (i, _xxd) = take(7usize)(i)?;
    let (i, wan_hdlc_subsub_captype) = le_u8(i)?;
    let (i, _xxf) = take(33usize)(i)?;
    let (i, timezone_hrs) = le_i16(i)?;
    let header = NetxrayHeader {
        is_old,
        version: <[u8; 8]>::try_from(version).or(Err(nom::Err::Error(
            NetxrayError::NomError(nom::error::ErrorKind::LengthValue),
        )))?,
        start_time,
        nframes,
        start_offset,
        end_offset,
        network,
        network_plus,
        timeunit,
        timelo,
        timehi,
        linespeed,
        realtick: <[u8; 4]>::try_from(realtick).or(Err(nom::Err::Error(
            NetxrayError::NomError(nom::error::ErrorKind::LengthValue),
        )))?,
        captype,
        wan_hdlc_subsub_captype,
        timezone_hrs,
    };
    Ok((i, header))
}

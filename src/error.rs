use nom::error::{ErrorKind, ParseError};
use std::fmt;
use std::io;

use crate::encap::{Encapsulation, NetworkType};
use crate::packet::RecordType;

/// The error type which is returned when reading or writing a NetXRay file
#[derive(Debug, PartialEq)]
pub enum NetxrayError {
    /// No more data available
    Eof,
    /// Expected more data but got EOF (truncated file)
    UnexpectedEof,
    /// An error happened during a `read()` operation
    ReadError(io::ErrorKind),

    /// File could not be recognized as NetXRay
    HeaderNotRecognized,
    /// Known magic, but the version string is not one we understand
    UnsupportedVersion([u8; 8]),
    /// The byte following the network type has an unknown value
    UnsupportedNetworkPlus(u8),
    /// Network type does not map to any supported encapsulation
    UnsupportedEncapsulation {
        network: NetworkType,
        network_plus: u8,
    },
    /// No known tick rate for this timeunit
    UnsupportedTimeunit {
        timeunit: u8,
        network: NetworkType,
        captype: u8,
    },
    /// Unknown capture type for an Ethernet capture
    UnsupportedCaptype { network: NetworkType, captype: u8 },
    /// Unknown WAN capture subtype
    UnsupportedWanCaptype(u8),
    /// Unknown WAN HDLC capture sub-subtype
    UnsupportedWanSubCaptype(u8),
    /// A record header holds values that cannot describe a packet
    InvalidRecord(&'static str),

    /// Only packet records can be written
    UnwritableRecordType(RecordType),
    /// The output format cannot express this encapsulation
    UnwritableEncapsulation(Encapsulation),
    /// Captured length exceeds what the output format can store
    PacketTooLarge { caplen: u32, max: u32 },
    /// An error happened during a `write()` or `seek()` operation
    WriteError(io::ErrorKind),
    /// The serializer refused to encode a header
    SerializeError,

    /// Nom parsing error
    NomError(ErrorKind),
}

impl NetxrayError {
    /// Returns true if the input is not a NetXRay file at all
    ///
    /// This is the only error that should lead a caller to try another
    /// capture format: every other error means the file was recognized but
    /// cannot be processed.
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, NetxrayError::HeaderNotRecognized)
    }
}

impl<I> ParseError<I> for NetxrayError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        NetxrayError::NomError(kind)
    }
    fn append(_input: I, kind: ErrorKind, _other: Self) -> Self {
        NetxrayError::NomError(kind)
    }
}

impl From<io::Error> for NetxrayError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => NetxrayError::UnexpectedEof,
            kind => NetxrayError::ReadError(kind),
        }
    }
}

/// Convert a nom result error into a `NetxrayError`
///
/// An incomplete parse means the data was cut short.
pub(crate) fn from_nom_err(e: nom::Err<NetxrayError>) -> NetxrayError {
    match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => NetxrayError::UnexpectedEof,
    }
}

impl fmt::Display for NetxrayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NetxrayError::Eof => write!(f, "End of file"),
            NetxrayError::UnexpectedEof => write!(f, "Short read: file ends in the middle of a record"),
            NetxrayError::ReadError(kind) => write!(f, "Read error: {:?}", kind),
            NetxrayError::HeaderNotRecognized => write!(f, "Header not recognized as NetXRay"),
            NetxrayError::UnsupportedVersion(v) => write!(
                f,
                "netxray: version \"{}\" unsupported",
                String::from_utf8_lossy(trim_nul(v))
            ),
            NetxrayError::UnsupportedNetworkPlus(p) => write!(
                f,
                "netxray: the byte after the network type has the value {}, which is not understood",
                p
            ),
            NetxrayError::UnsupportedEncapsulation {
                network,
                network_plus,
            } => write!(
                f,
                "netxray: network type {} ({}) unknown or unsupported",
                network.0, network_plus
            ),
            NetxrayError::UnsupportedTimeunit {
                timeunit,
                network,
                captype,
            } => write!(
                f,
                "netxray: unknown timeunit {} for network type {}, capture type {}",
                timeunit, network, captype
            ),
            NetxrayError::UnsupportedCaptype { network, captype } => write!(
                f,
                "netxray: unknown capture type {} for {} capture",
                captype, network
            ),
            NetxrayError::UnsupportedWanCaptype(c) => write!(
                f,
                "netxray: WAN capture subtype 0x{:02x} unknown or unsupported",
                c
            ),
            NetxrayError::UnsupportedWanSubCaptype(c) => write!(
                f,
                "netxray: WAN HDLC capture subsubtype 0x{:02x} unknown or unsupported",
                c
            ),
            NetxrayError::InvalidRecord(reason) => write!(f, "netxray: invalid record: {}", reason),
            NetxrayError::UnwritableRecordType(t) => {
                write!(f, "Records of type {:?} cannot be written", t)
            }
            NetxrayError::UnwritableEncapsulation(e) => {
                write!(f, "Encapsulation {:?} cannot be written in this format", e)
            }
            NetxrayError::PacketTooLarge { caplen, max } => write!(
                f,
                "Packet of {} bytes is too large (maximum is {})",
                caplen, max
            ),
            NetxrayError::WriteError(kind) => write!(f, "Write error: {:?}", kind),
            NetxrayError::SerializeError => write!(f, "Serialization error"),
            NetxrayError::NomError(e) => write!(f, "Internal parser error {:?}", e),
        }
    }
}

impl std::error::Error for NetxrayError {}

fn trim_nul(v: &[u8]) -> &[u8] {
    match v.iter().position(|&b| b == 0) {
        Some(pos) => &v[..pos],
        None => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mismatch_is_soft() {
        assert!(NetxrayError::HeaderNotRecognized.is_format_mismatch());
        assert!(!NetxrayError::UnsupportedVersion(*b"003.000\0").is_format_mismatch());
        assert!(!NetxrayError::UnexpectedEof.is_format_mismatch());
    }

    #[test]
    fn test_messages_name_the_value() {
        let msg = NetxrayError::UnsupportedVersion(*b"003.000\0").to_string();
        assert_eq!(msg, "netxray: version \"003.000\" unsupported");
        let msg = NetxrayError::UnsupportedTimeunit {
            timeunit: 3,
            network: NetworkType::ETHERNET,
            captype: 0,
        }
        .to_string();
        assert!(msg.contains("timeunit 3"));
        assert!(msg.contains("capture type 0"));
    }

    #[test]
    fn test_io_error_mapping() {
        let e = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert_eq!(NetxrayError::from(e), NetxrayError::UnexpectedEof);
        let e = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(
            NetxrayError::from(e),
            NetxrayError::ReadError(io::ErrorKind::PermissionDenied)
        );
    }
}

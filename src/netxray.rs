//! NetXRay file format
//!
//! Capture files written by Network General / Network Associates tools: NetXRay,
//! Sniffer Pro, Distributed Sniffer System and Windows Sniffer.
//!
//! A file starts with a 4-byte magic and a 124-byte header, followed by records. Each
//! record is a header (16, 28 or 40 bytes, depending on the file version) and the packet
//! data. All values are little-endian.
//!
//! There are 2 main ways of reading a file. The first method is to use
//! [`NetxrayReader`](../struct.NetxrayReader.html), a streaming reader over any seekable
//! input.
//!
//! The second method is to parse the header using [`parse_netxray_header`], derive the
//! file information with [`NetxrayHeader::file_info`], then loop over
//! [`parse_record_header`] and [`NetxrayInfo::decode_record`]. This does not handle
//! circular captures.

pub(crate) mod header;
mod reader;
mod record;
mod timeunit;
#[cfg(feature = "serialize")]
mod writer;

pub use header::*;
pub use reader::*;
pub use record::*;
pub use timeunit::*;
#[cfg(feature = "serialize")]
pub use writer::*;

//! # NetXRay / Windows Sniffer capture file parser
//!
//! This crate reads and writes capture files in the NetXRay format (`.cap`), used by
//! NetXRay, Sniffer Pro and Windows Sniffer. Old files (`VL` magic) and versions 1.0,
//! 1.1 and 2.000 to 2.003 are supported for reading; versions 1.1 and 2.001 can be
//! written.
//!
//! Packets are returned with an absolute time stamp, their captured and original
//! lengths, and a pseudo-header holding what the record header tells about the packet
//! (FCS, radio information, direction, ATM circuit, ...). Trailing junk is removed from
//! packet data.
//!
//! # Example: streaming parser
//!
//! The following code shows how to read a file using a
//! [NetxrayReader](struct.NetxrayReader.html) streaming parser.
//!
//! ```rust,no_run
//! use netxray_parser::*;
//! use std::fs::File;
//!
//! # let path = "capture.cap";
//! let file = File::open(path).unwrap();
//! let mut reader = NetxrayReader::new(65536, file).expect("NetxrayReader");
//! let encap = reader.info().encapsulation;
//! let mut offsets = Vec::new();
//! loop {
//!     match reader.next_packet() {
//!         Ok((offset, packet)) => {
//!             println!("{:?} packet, {} bytes", encap, packet.caplen);
//!             offsets.push(offset);
//!         },
//!         Err(NetxrayError::Eof) => break,
//!         Err(e) => panic!("error while reading: {:?}", e),
//!     }
//! }
//! // read the last packet again, using another file handle
//! let mut random = reader.random_access(File::open(path).unwrap());
//! if let Some(offset) = offsets.last() {
//!     let packet = random.read_at(*offset).expect("read_at");
//!     println!("last packet: {:?}", packet.pseudo_header);
//! }
//! ```
//!
//! If the input is not a NetXRay file, [`NetxrayError::HeaderNotRecognized`] is
//! returned (see [`NetxrayError::is_format_mismatch`]), so callers can try other
//! formats.
//!
//! # Writing files
//!
//! With the `serialize` feature (enabled by default), [NetxrayWriter](struct.NetxrayWriter.html)
//! writes packets in the version 1.1 or 2.001 format.

mod utils;
pub use utils::Data;

mod encap;
mod error;
mod packet;
mod pseudo_header;
pub use encap::*;
pub use error::*;
pub use packet::*;
pub use pseudo_header::*;

pub mod atm;
pub use atm::{AtmTrafficGuesser, StandardAtmGuesser};

pub mod netxray;
pub use netxray::*;

#[cfg(feature = "serialize")]
mod serialize;
#[cfg(feature = "serialize")]
pub use serialize::ToVec;

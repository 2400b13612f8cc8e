//! Time stamp units of version 2 files
//!
//! The length of a tick is given by an index (`timeunit`) into a table that
//! depends on the network type and, for Ethernet, on the capture type (software
//! or hardware pod). Table entries set to `None` have never been seen in a
//! capture.

use crate::encap::{EthCaptype, NetworkType};
use crate::error::NetxrayError;

/// Ticks per second, for non-Ethernet captures and Ethernet NDIS captures
pub const TPS: [Option<f64>; 3] = [Some(1e6), Some(1_193_000.0), Some(1_193_182.0)];

/// Ticks per second, Ethernet captures with a gigabit pod
pub const TPS_GIGPOD: [Option<f64>; 3] = [Some(1e9), None, Some(31_250_000.0)];

/// Ticks per second, Ethernet captures with other pods
pub const TPS_OTHERPOD: [Option<f64>; 3] = [Some(1e6), None, Some(1_250_000.0)];

pub const TPS_OTHERPOD2: [Option<f64>; 3] = [Some(1e6), None, None];

pub const TPS_GIGPOD2: [Option<f64>; 3] = [Some(1e9), None, Some(20_000_000.0)];

/// Resolved time base of a version 2 capture
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickRate {
    pub ticks_per_sec: f64,
    /// The start time stamp in the file header is not meaningful, use 0 instead
    pub ignore_start_timestamp: bool,
}

/// Compute the number of ticks per second of a version 2 capture
///
/// `realtick` is the little-endian value from the file header, used instead of
/// the table for Ethernet NDIS captures with a timeunit of 2.
pub fn ticks_per_second(
    network: NetworkType,
    captype: u8,
    timeunit: u8,
    realtick: u32,
) -> Result<f64, NetxrayError> {
    tick_rate(network, captype, timeunit, realtick, 0).map(|r| r.ticks_per_sec)
}

/// Compute the time base of a version 2 capture
///
/// `version_minor` selects whether pod captures carry a usable start time stamp:
/// in 2.002 and 2.003 files, it must be ignored.
pub fn tick_rate(
    network: NetworkType,
    captype: u8,
    timeunit: u8,
    realtick: u32,
    version_minor: u8,
) -> Result<TickRate, NetxrayError> {
    let unsupported = || NetxrayError::UnsupportedTimeunit {
        timeunit,
        network,
        captype,
    };
    let lookup = |table: &[Option<f64>; 3]| {
        table
            .get(timeunit as usize)
            .copied()
            .flatten()
            .ok_or_else(unsupported)
    };
    let pod_rate = |table: &[Option<f64>; 3]| {
        lookup(table).map(|ticks_per_sec| TickRate {
            ticks_per_sec,
            ignore_start_timestamp: version_minor == 2 || version_minor == 3,
        })
    };
    let rate = if network == NetworkType::ETHERNET {
        match EthCaptype(captype) {
            EthCaptype::NDIS => {
                // timeunit 2 is not reliable from the table, the header carries the real value
                let ticks_per_sec = match timeunit {
                    2 => f64::from(realtick),
                    _ => lookup(&TPS)?,
                };
                TickRate {
                    ticks_per_sec,
                    ignore_start_timestamp: false,
                }
            }
            EthCaptype::GIGPOD => pod_rate(&TPS_GIGPOD)?,
            EthCaptype::OTHERPOD => pod_rate(&TPS_OTHERPOD)?,
            EthCaptype::OTHERPOD2 => pod_rate(&TPS_OTHERPOD2)?,
            EthCaptype::GIGPOD2 => pod_rate(&TPS_GIGPOD2)?,
            _ => return Err(NetxrayError::UnsupportedCaptype { network, captype }),
        }
    } else {
        TickRate {
            ticks_per_sec: lookup(&TPS)?,
            ignore_start_timestamp: false,
        }
    };
    // a zero rate can only come from realtick, and time stamps could not be computed
    if rate.ticks_per_sec <= 0.0 {
        return Err(unsupported());
    }
    Ok(rate)
}

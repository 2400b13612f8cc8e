//! Per-packet pseudo-headers
//!
//! Some encapsulations carry information that is not part of the packet data
//! (direction, radio information, ATM circuit, ...). NetXRay files store it in
//! the record header; it is exposed here as one variant per encapsulation.

use crate::encap::Encapsulation;

/// Direction flag for X.25 / Frame Relay: the frame was sent by the DCE
pub const FROM_DCE: u8 = 0x80;

/// ATM flag: the packet is a raw cell
pub const ATM_RAW_CELL: u32 = 0x01;
/// ATM flag: the PDU could not be reassembled correctly
pub const ATM_REASSEMBLY_ERROR: u32 = 0x08;

/// Pseudo-header attached to a packet
///
/// Exactly one variant is used for all packets of a file, selected by the
/// file encapsulation.
#[derive(Clone, Debug, PartialEq)]
pub enum PseudoHeader {
    /// No pseudo-header for this encapsulation
    None,
    Ethernet(EthernetPseudoHeader),
    Ieee80211(Ieee80211PseudoHeader),
    Isdn(IsdnPseudoHeader),
    /// X.25 / LAPB and Frame Relay
    DteDce(DteDcePseudoHeader),
    /// PPP, SDLC and Cisco HDLC
    P2p(P2pPseudoHeader),
    Atm(AtmPseudoHeader),
}

impl PseudoHeader {
    /// Default pseudo-header for an encapsulation, before any record information is known
    pub fn default_for(encap: Encapsulation) -> PseudoHeader {
        match encap {
            Encapsulation::Ethernet => PseudoHeader::Ethernet(EthernetPseudoHeader::default()),
            Encapsulation::Ieee80211WithRadio => {
                PseudoHeader::Ieee80211(Ieee80211PseudoHeader::default())
            }
            Encapsulation::Isdn => PseudoHeader::Isdn(IsdnPseudoHeader::default()),
            Encapsulation::Lapb | Encapsulation::FrelayWithPhdr => {
                PseudoHeader::DteDce(DteDcePseudoHeader::default())
            }
            Encapsulation::PppWithPhdr | Encapsulation::Sdlc | Encapsulation::ChdlcWithPhdr => {
                PseudoHeader::P2p(P2pPseudoHeader::default())
            }
            Encapsulation::AtmPdusUntruncated => PseudoHeader::Atm(AtmPseudoHeader::default()),
            Encapsulation::TokenRing
            | Encapsulation::Fddi
            | Encapsulation::FddiBitswapped
            | Encapsulation::Unknown => PseudoHeader::None,
        }
    }

    /// Number of FCS bytes at the end of the packet data, if known
    pub fn fcs_len(&self) -> Option<u8> {
        match self {
            PseudoHeader::Ethernet(eth) => Some(eth.fcs_len),
            PseudoHeader::Ieee80211(wlan) => Some(wlan.fcs_len),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EthernetPseudoHeader {
    /// Number of FCS bytes at the end of the frame (0 or 4)
    pub fcs_len: u8,
}

/// 802.11 radio information
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ieee80211PseudoHeader {
    pub fcs_len: u8,
    /// Frame was decrypted by the capture device
    pub decrypted: bool,
    pub channel: Option<u8>,
    /// Data rate, in units of 500 kb/s
    pub data_rate: Option<u8>,
    pub signal_percent: Option<u8>,
    pub noise_percent: Option<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IsdnPseudoHeader {
    /// User to network
    pub uton: bool,
    /// Logical channel: 0 is the D channel, 1.. are B channels
    pub channel: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DteDcePseudoHeader {
    /// See [`FROM_DCE`]
    pub flags: u8,
}

impl DteDcePseudoHeader {
    pub fn from_dce(&self) -> bool {
        self.flags & FROM_DCE != 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct P2pPseudoHeader {
    pub sent: bool,
}

/// ATM adaptation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtmAal {
    Unknown,
    Aal5,
    Signalling,
}

/// Type of traffic carried over an ATM circuit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtmTrafficType {
    Unknown,
    /// LLC multiplexed (RFC 1483)
    LlcMultiplexed,
    /// LAN Emulation
    Lane,
    Ilmi,
}

/// Subtype of ATM traffic, meaningful for LANE
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtmTrafficSubtype {
    Unknown,
    LaneLeControl,
    Lane8023,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtmPseudoHeader {
    /// See [`ATM_RAW_CELL`] and [`ATM_REASSEMBLY_ERROR`]
    pub flags: u32,
    pub aal: AtmAal,
    pub traffic_type: AtmTrafficType,
    pub subtype: AtmTrafficSubtype,
    pub vpi: u16,
    pub vci: u16,
    /// Link: 0 for DTE->DCE, 1 for DCE->DTE
    pub channel: u8,
    /// Number of cells, filled by reassembly (always 0 here)
    pub cells: u16,
    /// Length from the AAL5 trailer, 0 if unknown
    pub aal5t_len: u16,
}

impl Default for AtmPseudoHeader {
    fn default() -> Self {
        AtmPseudoHeader {
            flags: 0,
            aal: AtmAal::Unknown,
            traffic_type: AtmTrafficType::Unknown,
            subtype: AtmTrafficSubtype::Unknown,
            vpi: 0,
            vci: 0,
            channel: 0,
            cells: 0,
            aal5t_len: 0,
        }
    }
}

impl AtmPseudoHeader {
    pub fn has_reassembly_error(&self) -> bool {
        self.flags & ATM_REASSEMBLY_ERROR != 0
    }
}

use rusticata_macros::newtype_enum;

/// Link-layer encapsulation of the packets in a capture
///
/// This is the encapsulation as seen by the host application, resolved from
/// the NDIS network type and (for WAN captures) the capture subtype.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Encapsulation {
    Unknown,
    Ethernet,
    TokenRing,
    Fddi,
    FddiBitswapped,
    /// PPP, with a direction pseudo-header
    PppWithPhdr,
    /// LAPB / X.25
    Lapb,
    Sdlc,
    /// Cisco HDLC, with a direction pseudo-header
    ChdlcWithPhdr,
    /// Frame Relay, with a direction pseudo-header
    FrelayWithPhdr,
    Isdn,
    /// ATM, with reassembled (untruncated) PDUs
    AtmPdusUntruncated,
    /// 802.11, with radio information
    Ieee80211WithRadio,
}

/// NDIS-style network type
///
/// This is the value stored in the file header, after adjustment by the
/// `network_plus` byte.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NetworkType(pub u8);

newtype_enum! {
impl display NetworkType {
    ETHERNET = 1,
    TOKEN_RING = 2,
    FDDI = 3,
    // Frames may look like Ethernet (NDISWAN), see `wan_encapsulation`
    WAN = 4,
    LOCALTALK = 5,
    // "DIX", should not occur
    DIX = 6,
    ARCNET_RAW = 7,
    ARCNET_878_2 = 8,
    ATM = 9,
    // Wireless WAN, with radio information
    WIRELESS_WAN = 10,
    IRDA = 11,
}
}

impl NetworkType {
    /// Decode the network type from the raw `network` byte and the byte following it
    ///
    /// Version 0.x and 1.x files (and some 2.00x files) store the NDIS value minus one,
    /// and set the following byte to 0. Some 2.00x files store the NDIS value as-is,
    /// and set the following byte to 2. Other values are unknown.
    pub fn from_raw(network: u8, network_plus: u8) -> Option<NetworkType> {
        match network_plus {
            0 => Some(NetworkType(network.wrapping_add(1))),
            2 => Some(NetworkType(network)),
            _ => None,
        }
    }

    /// Default encapsulation for this network type
    ///
    /// WAN captures are further refined from the capture subtype in version 2 files.
    pub fn encapsulation(self) -> Encapsulation {
        match self {
            NetworkType::ETHERNET => Encapsulation::Ethernet,
            NetworkType::TOKEN_RING => Encapsulation::TokenRing,
            NetworkType::FDDI => Encapsulation::FddiBitswapped,
            NetworkType::WAN => Encapsulation::Ethernet,
            NetworkType::ATM => Encapsulation::AtmPdusUntruncated,
            NetworkType::WIRELESS_WAN => Encapsulation::Ieee80211WithRadio,
            _ => Encapsulation::Unknown,
        }
    }
}

/// Capture type of an Ethernet capture (software or hardware pod)
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EthCaptype(pub u8);

newtype_enum! {
impl display EthCaptype {
    NDIS = 0,
    GIGPOD = 2,
    OTHERPOD = 3,
    OTHERPOD2 = 5,
    GIGPOD2 = 6,
}
}

/// Capture type of a WAN capture
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WanCaptype(pub u8);

newtype_enum! {
impl display WanCaptype {
    BROUTER = 1,
    PPP = 3,
    FRELAY = 4,
    BROUTER2 = 5,
    // HDLC, the sub-subtype tells X.25 from ISDN
    HDLC = 6,
    SDLC = 7,
    HDLC2 = 8,
    BROUTER3 = 9,
    SMDS = 10,
    BROUTER4 = 11,
    BROUTER5 = 12,
    CHDLC = 19,
}
}

/// Capture type of an ATM capture made with a pod
pub const CAPTYPE_ATM: u8 = 15;

/// Variant of ISDN line, from the WAN HDLC sub-subtype
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IsdnType {
    /// E1 primary rate (D channel in slot 16)
    E1Pri,
    /// T1 primary rate (D channel in slot 24)
    T1Pri,
    /// Basic rate
    Bri,
}

impl IsdnType {
    /// Map a WAN HDLC sub-subtype to an ISDN line type
    pub fn from_subsub_captype(subsub: u8) -> Option<IsdnType> {
        match subsub {
            1 => Some(IsdnType::E1Pri),
            2 => Some(IsdnType::T1Pri),
            9 => Some(IsdnType::Bri),
            _ => None,
        }
    }

    /// Map a raw channel number to the logical channel
    ///
    /// Logical channel 0 is the D channel, and B channels are numbered
    /// without a gap for the D channel slot.
    pub fn logical_channel(self, raw: u8) -> u8 {
        let d_slot = match self {
            IsdnType::E1Pri => 16,
            IsdnType::T1Pri => 24,
            IsdnType::Bri => return raw,
        };
        if raw == d_slot {
            0
        } else if raw > d_slot {
            raw - 1
        } else {
            raw
        }
    }
}

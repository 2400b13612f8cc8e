//! ATM traffic type guessing
//!
//! Record headers do not always tell which AAL or which kind of traffic an ATM
//! PDU carries. In that case, it is guessed from the circuit and the first
//! bytes of the packet.

use crate::encap::Encapsulation;
use crate::pseudo_header::{
    AtmAal, AtmPseudoHeader, AtmTrafficSubtype, AtmTrafficType, PseudoHeader,
};

/// Heuristics used to classify ATM traffic
///
/// Implementations update the pseudo-header in place. `data` holds the first
/// `caplen` bytes of the PDU.
pub trait AtmTrafficGuesser {
    /// Guess the AAL and traffic type, when the AAL is unknown
    fn guess_traffic_type(&self, atm: &mut AtmPseudoHeader, caplen: u32, data: &[u8]);

    /// Guess the LAN Emulation subtype of an AAL5 LANE PDU
    fn guess_lane_type(&self, atm: &mut AtmPseudoHeader, caplen: u32, data: &[u8]);
}

/// The usual rules: well-known circuits, LLC/SNAP header, signalling message
/// size and protocol discriminator, else LANE
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardAtmGuesser;

impl AtmTrafficGuesser for StandardAtmGuesser {
    fn guess_traffic_type(&self, atm: &mut AtmPseudoHeader, caplen: u32, data: &[u8]) {
        // assume AAL5, unless it's signalling on VPI 0/VCI 5 or ILMI on VPI 0/VCI 16
        atm.aal = AtmAal::Aal5;
        atm.traffic_type = AtmTrafficType::Unknown;
        atm.subtype = AtmTrafficSubtype::Unknown;
        if atm.vpi == 0 {
            match atm.vci {
                5 => {
                    atm.aal = AtmAal::Signalling;
                    return;
                }
                16 => {
                    atm.traffic_type = AtmTrafficType::Ilmi;
                    return;
                }
                _ => (),
            }
        }
        if caplen >= 3 && data.len() >= 3 {
            if data[..3] == [0xaa, 0xaa, 0x03] {
                // LLC/SNAP header: RFC 1483 LLC multiplexed traffic
                atm.traffic_type = AtmTrafficType::LlcMultiplexed;
            } else if (atm.aal5t_len != 0 && atm.aal5t_len < 16) || caplen < 16 {
                // too short for a LANE frame
                atm.aal = AtmAal::Signalling;
            } else if data[0] == 0x83 || data[0] == 0x81 {
                // Q.2931 or Q.2931 PNNI protocol discriminator
                atm.aal = AtmAal::Signalling;
            } else {
                atm.traffic_type = AtmTrafficType::Lane;
                self.guess_lane_type(atm, caplen, data);
            }
        } else {
            atm.aal = AtmAal::Signalling;
        }
    }

    fn guess_lane_type(&self, atm: &mut AtmPseudoHeader, caplen: u32, data: &[u8]) {
        if caplen >= 2 && data.len() >= 2 {
            atm.subtype = if data[..2] == [0xff, 0x00] {
                // LE Control marker
                AtmTrafficSubtype::LaneLeControl
            } else {
                // assume Ethernet, Token Ring is rare
                AtmTrafficSubtype::Lane8023
            };
        }
    }
}

/// Guess the ATM traffic type of a packet, if its record did not tell
///
/// Does nothing for other encapsulations, or if the PDU was not reassembled
/// correctly.
pub fn guess_atm_type(
    encap: Encapsulation,
    pseudo_header: &mut PseudoHeader,
    caplen: u32,
    data: &[u8],
    guesser: &dyn AtmTrafficGuesser,
) {
    if encap != Encapsulation::AtmPdusUntruncated {
        return;
    }
    let atm = match pseudo_header {
        PseudoHeader::Atm(atm) => atm,
        _ => return,
    };
    if atm.has_reassembly_error() {
        return;
    }
    if atm.aal == AtmAal::Unknown {
        guesser.guess_traffic_type(atm, caplen, data);
    } else if atm.aal == AtmAal::Aal5 && atm.traffic_type == AtmTrafficType::Lane {
        guesser.guess_lane_type(atm, caplen, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pseudo_header::ATM_REASSEMBLY_ERROR;
    use std::cell::Cell;

    fn guess(atm: AtmPseudoHeader, data: &[u8]) -> AtmPseudoHeader {
        let mut ph = PseudoHeader::Atm(atm);
        guess_atm_type(
            Encapsulation::AtmPdusUntruncated,
            &mut ph,
            data.len() as u32,
            data,
            &StandardAtmGuesser,
        );
        match ph {
            PseudoHeader::Atm(atm) => atm,
            _ => unreachable!(),
        }
    }

    fn circuit(vpi: u16, vci: u16) -> AtmPseudoHeader {
        AtmPseudoHeader {
            vpi,
            vci,
            ..Default::default()
        }
    }

    #[test]
    fn test_well_known_circuits() {
        let atm = guess(circuit(0, 5), &[0; 32]);
        assert_eq!(atm.aal, AtmAal::Signalling);
        let atm = guess(circuit(0, 16), &[0; 32]);
        assert_eq!(atm.aal, AtmAal::Aal5);
        assert_eq!(atm.traffic_type, AtmTrafficType::Ilmi);
    }

    #[test]
    fn test_llc_snap() {
        let data = [0xaa, 0xaa, 0x03, 0x00, 0x00, 0x00, 0x08, 0x00];
        let atm = guess(circuit(1, 100), &data);
        assert_eq!(atm.aal, AtmAal::Aal5);
        assert_eq!(atm.traffic_type, AtmTrafficType::LlcMultiplexed);
    }

    #[test]
    fn test_signalling() {
        // short frame
        let atm = guess(circuit(1, 100), &[0x00; 12]);
        assert_eq!(atm.aal, AtmAal::Signalling);
        // protocol discriminator
        let mut data = [0u8; 32];
        data[0] = 0x83;
        let atm = guess(circuit(1, 100), &data);
        assert_eq!(atm.aal, AtmAal::Signalling);
        // short AAL5 trailer length
        let atm = AtmPseudoHeader {
            aal5t_len: 8,
            ..circuit(1, 100)
        };
        let atm = guess(atm, &[0x00; 32]);
        assert_eq!(atm.aal, AtmAal::Signalling);
        // too short to look at
        let atm = guess(circuit(1, 100), &[0xaa, 0xaa]);
        assert_eq!(atm.aal, AtmAal::Signalling);
    }

    #[test]
    fn test_lane() {
        let mut data = [0u8; 64];
        let atm = guess(circuit(1, 100), &data);
        assert_eq!(atm.aal, AtmAal::Aal5);
        assert_eq!(atm.traffic_type, AtmTrafficType::Lane);
        assert_eq!(atm.subtype, AtmTrafficSubtype::Lane8023);
        data[0] = 0xff;
        let atm = guess(circuit(1, 100), &data);
        assert_eq!(atm.subtype, AtmTrafficSubtype::LaneLeControl);
        // known LANE, unknown subtype
        let atm = AtmPseudoHeader {
            aal: AtmAal::Aal5,
            traffic_type: AtmTrafficType::Lane,
            ..circuit(1, 100)
        };
        let atm = guess(atm, &data);
        assert_eq!(atm.subtype, AtmTrafficSubtype::LaneLeControl);
    }

    #[test]
    fn test_no_guess() {
        // reassembly error
        let atm = AtmPseudoHeader {
            flags: ATM_REASSEMBLY_ERROR,
            ..circuit(0, 5)
        };
        let atm = guess(atm, &[0; 32]);
        assert_eq!(atm.aal, AtmAal::Unknown);
        // known AAL and type
        let atm = AtmPseudoHeader {
            aal: AtmAal::Aal5,
            traffic_type: AtmTrafficType::Ilmi,
            ..circuit(0, 5)
        };
        let atm = guess(atm, &[0; 32]);
        assert_eq!(atm.aal, AtmAal::Aal5);
        assert_eq!(atm.traffic_type, AtmTrafficType::Ilmi);
        // other encapsulation
        let mut ph = PseudoHeader::Atm(circuit(0, 5));
        guess_atm_type(Encapsulation::Ethernet, &mut ph, 0, &[], &StandardAtmGuesser);
        assert_eq!(ph, PseudoHeader::Atm(circuit(0, 5)));
    }

    struct CountingGuesser {
        calls: Cell<u32>,
    }

    impl AtmTrafficGuesser for CountingGuesser {
        fn guess_traffic_type(&self, atm: &mut AtmPseudoHeader, _caplen: u32, _data: &[u8]) {
            self.calls.set(self.calls.get() + 1);
            atm.traffic_type = AtmTrafficType::Ilmi;
        }
        fn guess_lane_type(&self, _atm: &mut AtmPseudoHeader, _caplen: u32, _data: &[u8]) {}
    }

    #[test]
    fn test_custom_guesser() {
        let guesser = CountingGuesser {
            calls: Cell::new(0),
        };
        let mut ph = PseudoHeader::Atm(circuit(0, 5));
        guess_atm_type(
            Encapsulation::AtmPdusUntruncated,
            &mut ph,
            0,
            &[],
            &guesser,
        );
        assert_eq!(guesser.calls.get(), 1);
        match ph {
            PseudoHeader::Atm(atm) => assert_eq!(atm.traffic_type, AtmTrafficType::Ilmi),
            _ => unreachable!(),
        }
    }
}

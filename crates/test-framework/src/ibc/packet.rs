/*!
   Neutral IBC packet records, parsed out of `send_packet`,
   `acknowledge_packet`, and `timeout_packet` events.
*/

use serde::{Deserialize, Serialize};

/// A packet's identity and payload. The identity is the 5-tuple of
/// sequence plus source and destination port/channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub sequence: u64,
    pub source_port: String,
    pub source_channel: String,
    pub destination_port: String,
    pub destination_channel: String,
    /// Raw packet payload. Empty when the emitting event only carried
    /// the hex form and it failed to decode.
    #[serde(default)]
    pub data: Vec<u8>,
    /// Timeout height in `<revision>-<height>` form, `0-0` for none.
    #[serde(default)]
    pub timeout_height: String,
    /// Timeout timestamp in nanoseconds, zero for none.
    #[serde(default)]
    pub timeout_timestamp: u64,
}

impl Packet {
    /// Whether `other` refers to the same packet. Payload and timeouts
    /// are ignored: the 5-tuple identity is authoritative.
    pub fn matches(&self, other: &Packet) -> bool {
        self.sequence == other.sequence
            && self.source_port == other.source_port
            && self.source_channel == other.source_channel
            && self.destination_port == other.destination_port
            && self.destination_channel == other.destination_channel
    }
}

/// An acknowledgement observed on the packet's source chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketAcknowledgement {
    pub packet: Packet,
    pub acknowledgement: Vec<u8>,
}

/// A timeout observed on the packet's source chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PacketTimeout {
    pub packet: Packet,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(sequence: u64) -> Packet {
        Packet {
            sequence,
            source_port: "transfer".to_string(),
            source_channel: "channel-0".to_string(),
            destination_port: "transfer".to_string(),
            destination_channel: "channel-1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn identity_ignores_payload() {
        let mut a = packet(7);
        let b = packet(7);
        a.data = b"{\"amount\":\"100\"}".to_vec();
        a.timeout_timestamp = 1_700_000_000_000_000_000;
        assert!(a.matches(&b));
    }

    #[test]
    fn different_sequences_do_not_match() {
        assert!(!packet(1).matches(&packet(2)));
    }

    #[test]
    fn different_channels_do_not_match() {
        let a = packet(1);
        let mut b = packet(1);
        b.source_channel = "channel-5".to_string();
        assert!(!a.matches(&b));
    }
}

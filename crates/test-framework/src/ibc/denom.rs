/*!
   IBC denom trace handling: the `transfer/<channel>/<denom>` prefix a
   received token carries, and the `ibc/<hash>` form the bank module
   stores it under.
*/

use sha2::{Digest, Sha256};

/// The trace path a denom acquires when received over a channel.
pub fn prefixed_denom(port_id: &str, channel_id: &str, denom: &str) -> String {
    format!("{port_id}/{channel_id}/{denom}")
}

/// The `ibc/<HASH>` form of a traced denom: uppercase hex SHA-256 of
/// the full trace path.
pub fn ibc_denom(trace_path: &str) -> String {
    let hash = Sha256::digest(trace_path.as_bytes());
    format!("ibc/{}", hex::encode_upper(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_composes_port_channel_denom() {
        assert_eq!(
            prefixed_denom("transfer", "channel-0", "ujuno"),
            "transfer/channel-0/ujuno"
        );
    }

    #[test]
    fn multihop_prefixes_stack() {
        let one_hop = prefixed_denom("transfer", "channel-1", "ujuno");
        let two_hop = prefixed_denom("transfer", "channel-7", &one_hop);
        assert_eq!(two_hop, "transfer/channel-7/transfer/channel-1/ujuno");
    }

    #[test]
    fn ibc_denom_matches_known_hash() {
        // sha256("transfer/channel-0/uatom"), as ibc-go computes it.
        assert_eq!(
            ibc_denom("transfer/channel-0/uatom"),
            "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2"
        );
    }
}

/*!
   Records parsed from chain CLI output and RPC responses.
*/

use core::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::ibc::packet::Packet;

/// The JSON a Cosmos-SDK binary prints after broadcasting a tx with
/// `--output json`. A non-zero `code` means the tx was rejected.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CosmosTx {
    pub txhash: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
}

/// A transaction that carried an IBC packet, as returned by
/// `send_ibc_transfer`.
#[derive(Clone, Debug, Default)]
pub struct Tx {
    pub height: u64,
    pub tx_hash: String,
    /// Amount of gas charged to the account.
    pub gas_spent: i64,
    pub packet: Packet,
}

/// Summary of a submitted governance proposal.
#[derive(Clone, Debug, Default)]
pub struct TxProposal {
    pub height: u64,
    pub tx_hash: String,
    pub gas_spent: i64,
    pub deposit_amount: String,
    pub proposal_id: String,
    pub proposal_type: String,
}

/// Governance proposal status strings as the gov module reports them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    #[serde(rename = "PROPOSAL_STATUS_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "PROPOSAL_STATUS_DEPOSIT_PERIOD")]
    DepositPeriod,
    #[serde(rename = "PROPOSAL_STATUS_VOTING_PERIOD")]
    VotingPeriod,
    #[serde(rename = "PROPOSAL_STATUS_PASSED")]
    Passed,
    #[serde(rename = "PROPOSAL_STATUS_REJECTED")]
    Rejected,
    #[serde(rename = "PROPOSAL_STATUS_FAILED")]
    Failed,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "PROPOSAL_STATUS_UNSPECIFIED",
            Self::DepositPeriod => "PROPOSAL_STATUS_DEPOSIT_PERIOD",
            Self::VotingPeriod => "PROPOSAL_STATUS_VOTING_PERIOD",
            Self::Passed => "PROPOSAL_STATUS_PASSED",
            Self::Rejected => "PROPOSAL_STATUS_REJECTED",
            Self::Failed => "PROPOSAL_STATUS_FAILED",
        }
    }
}

impl Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One transaction found in a block, as surfaced by `find_txs`.
/// Raw bytes are always present; decoded JSON and events only when the
/// chain could supply them.
#[derive(Clone, Debug, Default)]
pub struct BlockTx {
    pub raw: Vec<u8>,
    pub decoded: Option<serde_json::Value>,
    pub events: Vec<TxEvent>,
}

/// An indexed event attached to a transaction result.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TxEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<TxEventAttribute>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TxEventAttribute {
    pub key: String,
    pub value: String,
}

impl TxEvent {
    /// The value of the first attribute with the given key, if any.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_output_parses() {
        let tx: CosmosTx = serde_json::from_str(
            r#"{"height":"0","txhash":"ABC123","code":0,"raw_log":"[]"}"#,
        )
        .unwrap();
        assert_eq!(tx.txhash, "ABC123");
        assert_eq!(tx.code, 0);
    }

    #[test]
    fn failed_broadcast_carries_code_and_log() {
        let tx: CosmosTx = serde_json::from_str(
            r#"{"txhash":"DEF","code":13,"raw_log":"insufficient fee"}"#,
        )
        .unwrap();
        assert_eq!(tx.code, 13);
        assert_eq!(tx.raw_log, "insufficient fee");
    }

    #[test]
    fn proposal_status_round_trips_through_serde() {
        let s: ProposalStatus = serde_json::from_str(r#""PROPOSAL_STATUS_PASSED""#).unwrap();
        assert_eq!(s, ProposalStatus::Passed);
        assert_eq!(s.to_string(), "PROPOSAL_STATUS_PASSED");
    }

    #[test]
    fn event_attribute_lookup() {
        let event = TxEvent {
            kind: "send_packet".to_string(),
            attributes: vec![TxEventAttribute {
                key: "packet_sequence".to_string(),
                value: "1".to_string(),
            }],
        };
        assert_eq!(event.attribute("packet_sequence"), Some("1"));
        assert_eq!(event.attribute("missing"), None);
    }
}

/*!
   Governance module wrappers: proposal submission, voting, queries.
*/

use serde_json::Value;

use crate::chain::cosmos::CosmosChain;
use crate::chain::rpc::parse_height;
use crate::error::Error;
use crate::types::tx::TxProposal;

impl CosmosChain {
    /// Submit a text proposal with a deposit and return its record,
    /// including the proposal id parsed from the submit event.
    pub async fn submit_text_proposal(
        &self,
        key_name: &str,
        title: &str,
        description: &str,
        deposit: &str,
    ) -> Result<TxProposal, Error> {
        let node = self.designated_node();
        let tx_hash = node
            .exec_tx(
                key_name,
                &[
                    "gov",
                    "submit-legacy-proposal",
                    "--type",
                    "text",
                    "--title",
                    title,
                    "--description",
                    description,
                    "--deposit",
                    deposit,
                ],
            )
            .await?;

        let response = node.get_transaction(&tx_hash).await?;
        let proposal_id = response
            .tx_result
            .events
            .iter()
            .find(|e| e.kind == "submit_proposal")
            .and_then(|e| e.attribute("proposal_id"))
            .unwrap_or_default()
            .to_string();

        Ok(TxProposal {
            height: parse_height(&response.height)?,
            tx_hash,
            gas_spent: response.tx_result.gas_used.parse().unwrap_or_default(),
            deposit_amount: deposit.to_string(),
            proposal_id,
            proposal_type: "text".to_string(),
        })
    }

    /// Submit a software-upgrade proposal halting the chain at
    /// `halt_height`, used by upgrade tests.
    pub async fn submit_upgrade_proposal(
        &self,
        key_name: &str,
        upgrade_name: &str,
        halt_height: u64,
        deposit: &str,
    ) -> Result<TxProposal, Error> {
        let node = self.designated_node();
        let height_arg = halt_height.to_string();
        let title = format!("upgrade to {upgrade_name}");
        let tx_hash = node
            .exec_tx(
                key_name,
                &[
                    "gov",
                    "submit-legacy-proposal",
                    "software-upgrade",
                    upgrade_name,
                    "--upgrade-height",
                    &height_arg,
                    "--title",
                    &title,
                    "--description",
                    &title,
                    "--deposit",
                    deposit,
                    "--no-validate",
                ],
            )
            .await?;

        let response = node.get_transaction(&tx_hash).await?;
        let proposal_id = response
            .tx_result
            .events
            .iter()
            .find(|e| e.kind == "submit_proposal")
            .and_then(|e| e.attribute("proposal_id"))
            .unwrap_or_default()
            .to_string();

        Ok(TxProposal {
            height: parse_height(&response.height)?,
            tx_hash,
            gas_spent: response.tx_result.gas_used.parse().unwrap_or_default(),
            deposit_amount: deposit.to_string(),
            proposal_id,
            proposal_type: "software-upgrade".to_string(),
        })
    }

    /// The full proposal document, including the tally once voting has
    /// ended.
    pub async fn query_proposal(&self, proposal_id: &str) -> Result<Value, Error> {
        let response = self
            .designated_node()
            .exec_query(&["gov", "proposal", proposal_id])
            .await?;
        // SDK v1 gov nests under "proposal".
        Ok(response.get("proposal").cloned().unwrap_or(response))
    }

    /// Cast a single vote from one key.
    pub async fn vote_on_proposal(
        &self,
        key_name: &str,
        proposal_id: &str,
        vote: &str,
    ) -> Result<(), Error> {
        self.designated_node()
            .exec_tx(key_name, &["gov", "vote", proposal_id, vote])
            .await?;
        Ok(())
    }
}

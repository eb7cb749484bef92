/*!
   Interchain Security wiring.

   A consumer chain borrows the provider's validator set. The provider
   passes a consumer-addition governance proposal, emits a consumer
   genesis, and that section is injected into the consumer's genesis
   before any consumer node starts. Consumer validators sign with the
   provider validators' consensus keys, copied key file by key file.
*/

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::chain::cosmos::CosmosChain;
use crate::chain::node::VALIDATOR_KEY_NAME;
use crate::error::Error;
use crate::types::tx::ProposalStatus;

const PRIV_VALIDATOR_KEY: &str = "config/priv_validator_key.json";

/// Body of a consumer-addition proposal, serialized to a file in the
/// submitting node's volume.
#[derive(Clone, Debug, Serialize)]
pub struct ConsumerAdditionProposal {
    pub title: String,
    pub summary: String,
    pub chain_id: String,
    pub initial_height: InitialHeight,
    pub genesis_hash: String,
    pub binary_hash: String,
    pub spawn_time: String,
    pub unbonding_period: String,
    pub ccv_timeout_period: String,
    pub transfer_timeout_period: String,
    pub consumer_redistribution_fraction: String,
    pub blocks_per_distribution_transmission: u64,
    pub historical_entries: u64,
    pub deposit: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct InitialHeight {
    pub revision_number: u64,
    pub revision_height: u64,
}

impl ConsumerAdditionProposal {
    /// Workable defaults for a consumer spawning immediately.
    pub fn new(consumer_chain_id: &str, spawn_time: &str, deposit: &str) -> Self {
        Self {
            title: format!("Add {consumer_chain_id} consumer"),
            summary: format!("Onboard the {consumer_chain_id} consumer chain"),
            chain_id: consumer_chain_id.to_string(),
            initial_height: InitialHeight {
                revision_number: 1,
                revision_height: 1,
            },
            genesis_hash: "Z2VuZXNpcw==".to_string(),
            binary_hash: "YmluYXJ5".to_string(),
            spawn_time: spawn_time.to_string(),
            unbonding_period: "336h".to_string(),
            ccv_timeout_period: "2419200s".to_string(),
            transfer_timeout_period: "3600s".to_string(),
            consumer_redistribution_fraction: "0.75".to_string(),
            blocks_per_distribution_transmission: 1000,
            historical_entries: 10000,
            deposit: deposit.to_string(),
        }
    }
}

impl CosmosChain {
    /// Stage a provider-emitted ccvconsumer section for injection when
    /// this (consumer) chain assembles its genesis. Must happen before
    /// [`CosmosChain::start_consumer`].
    pub fn set_consumer_genesis(&mut self, section: Value) -> Result<(), Error> {
        if self.consumer_section.is_some() {
            return Err(Error::invalid_config(format!(
                "consumer genesis for {} set twice",
                self.chain_id()
            )));
        }
        self.consumer_section = Some(section);
        Ok(())
    }

    /// Submit a consumer-addition proposal and return its proposal id.
    /// The proposal signs with validator 0's operator key; the
    /// designated node may be a full node whose keyring is empty.
    pub async fn submit_consumer_addition_proposal(
        &self,
        proposal: &ConsumerAdditionProposal,
    ) -> Result<String, Error> {
        let node = self.first_validator();

        let rel_path = format!("consumer-addition-{}.json", proposal.chain_id);
        node.write_file(&rel_path, &serde_json::to_vec(proposal)?).await?;

        let file_arg = format!("{}/{}", crate::chain::node::CHAIN_HOME, rel_path);
        let tx_hash = node
            .exec_tx(
                VALIDATOR_KEY_NAME,
                &["gov", "submit-legacy-proposal", "consumer-addition", &file_arg],
            )
            .await?;

        let response = node.get_transaction(&tx_hash).await?;
        let proposal_id = response
            .tx_result
            .events
            .iter()
            .find(|e| e.kind == "submit_proposal")
            .and_then(|e| e.attribute("proposal_id"))
            .ok_or_else(|| {
                Error::packet_event_missing("submit_proposal".to_string(), tx_hash.clone())
            })?
            .to_string();

        info!(
            "submitted consumer-addition proposal {} for {}",
            proposal_id, proposal.chain_id
        );
        Ok(proposal_id)
    }

    /// Vote a consumer-addition proposal through with every validator
    /// and wait for it to pass.
    pub async fn pass_consumer_addition_proposal(
        &mut self,
        token: &CancellationToken,
        proposal_id: &str,
    ) -> Result<(), Error> {
        self.vote_on_proposal_all_validators(proposal_id, "yes").await?;

        let start = self.height().await?;
        self.poll_for_proposal_status(token, start, start + 20, proposal_id, ProposalStatus::Passed)
            .await?;

        // Give the provider module a couple of blocks to spawn the
        // consumer before its genesis is queried.
        self.designated_node().wait_for_blocks(2).await?;
        Ok(())
    }

    /// Fetch the ccvconsumer genesis section this provider emitted for
    /// a consumer chain.
    pub async fn query_consumer_genesis(&self, consumer_chain_id: &str) -> Result<Value, Error> {
        self.designated_node()
            .exec_query(&["provider", "consumer-genesis", consumer_chain_id])
            .await
    }

    /// Register a different consensus key for one provider validator's
    /// role on a consumer chain, instead of copying the key file.
    pub async fn assign_consensus_key(
        &self,
        validator_index: usize,
        consumer_chain_id: &str,
        consensus_pubkey: &str,
    ) -> Result<(), Error> {
        self.nodes[validator_index]
            .exec_tx(
                VALIDATOR_KEY_NAME,
                &[
                    "provider",
                    "assign-consensus-key",
                    consumer_chain_id,
                    consensus_pubkey,
                ],
            )
            .await?;
        Ok(())
    }
}

/// Copy each provider validator's consensus key file onto the matching
/// consumer validator, so the consumer's blocks carry signatures the
/// provider's validator set recognizes.
pub async fn copy_provider_validator_keys(
    provider: &CosmosChain,
    consumer: &CosmosChain,
) -> Result<(), Error> {
    let count = provider.num_validators.min(consumer.num_validators);
    for index in 0..count {
        let key = provider.nodes[index].read_file(PRIV_VALIDATOR_KEY).await?;
        consumer.nodes[index].write_file(PRIV_VALIDATOR_KEY, &key).await?;
    }
    info!(
        "copied {} consensus keys from {} to {}",
        count,
        provider.chain_id(),
        consumer.chain_id()
    );
    Ok(())
}

//! Halting a chain through a software-upgrade proposal, exporting its
//! state, and resuming every node on the upgraded image from the
//! exported genesis.

use core::time::Duration;

use interchain_test_framework::prelude::*;

use crate::chains::{self, GAIA_CHAIN_ID, GAIA_UPGRADE_NAME, GAIA_UPGRADE_VERSION};

/// Blocks between proposal submission and the halt, enough for the
/// shortened voting period to elapse.
const HALT_DELTA: u64 = 30;

const HALT_POLL_ATTEMPTS: u32 = 90;
const HALT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[tokio::test]
#[ignore]
async fn chain_upgrades_through_exported_state() -> Result<(), Error> {
    let config = init_test("chain_upgrades_through_exported_state");

    let mut interchain = Interchain::new(config)
        .add_chain(CosmosChain::new(&chains::fast_gov_gaia())?)?;
    interchain.build(&BuildOptions::default()).await?;
    let token = interchain.cancellation_token().clone();

    let gaia = interchain.get_chain_mut(GAIA_CHAIN_ID)?;
    let halt_height = gaia.height().await? + HALT_DELTA;

    let proposal = gaia
        .submit_upgrade_proposal(
            FAUCET_KEY_NAME,
            GAIA_UPGRADE_NAME,
            halt_height,
            "10000000uatom",
        )
        .await?;
    info!(
        "submitted upgrade proposal {} halting at {}",
        proposal.proposal_id, halt_height
    );

    gaia.vote_on_proposal_all_validators(&proposal.proposal_id, "yes")
        .await?;
    let start = gaia.height().await?;
    gaia.poll_for_proposal_status(
        &token,
        start,
        halt_height,
        &proposal.proposal_id,
        ProposalStatus::Passed,
    )
    .await?;

    // The upgrade module refuses to process the halt height, so the
    // committed height plateaus one block short of it.
    let halted = wait_for_halt(gaia, halt_height).await?;
    info!("{} halted at height {}", GAIA_CHAIN_ID, halted);

    gaia.stop_all_nodes().await?;

    let exported = gaia.export_state(halted).await?;
    let mut genesis: serde_json::Value = serde_json::from_slice(&exported)?;
    assert!(genesis
        .pointer("/app_state/bank/balances")
        .and_then(serde_json::Value::as_array)
        .is_some_and(|balances| !balances.is_empty()));

    // Resume from the export, one block past the halt.
    genesis["initial_height"] = serde_json::json!((halted + 1).to_string());
    let patched = serde_json::to_vec(&genesis)?;
    for node in &mut gaia.nodes {
        node.unsafe_reset_all().await?;
        node.overwrite_genesis_file(&patched).await?;
    }

    gaia.upgrade_version(GAIA_UPGRADE_VERSION)?;
    gaia.start_all_nodes().await?;

    let resumed: &CosmosChain = interchain.get_chain(GAIA_CHAIN_ID)?;
    wait_for_blocks(2, &[resumed as &dyn ChainHeighter]).await?;
    assert!(resumed.height().await? > halted);

    interchain.close().await;
    Ok(())
}

/// Poll until block production stops just short of `halt_height`,
/// returning the last committed height.
async fn wait_for_halt(chain: &CosmosChain, halt_height: u64) -> Result<u64, Error> {
    let mut last = chain.height().await?;
    for _ in 0..HALT_POLL_ATTEMPTS {
        tokio::time::sleep(HALT_POLL_INTERVAL).await;
        let now = chain.height().await?;
        if now == last && now + 1 >= halt_height {
            return Ok(now);
        }
        last = now;
    }
    Err(Error::generic(eyre::eyre!(
        "chain {} did not halt before {} (height {})",
        chain.chain_id(),
        halt_height,
        last
    )))
}

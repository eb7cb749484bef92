//! A text proposal going through submission, voting, and passage on a
//! chain with a shortened voting period.

use interchain_test_framework::prelude::*;

use crate::chains::{self, JUNO_CHAIN_ID};

#[tokio::test]
#[ignore]
async fn text_proposal_passes() -> Result<(), Error> {
    let config = init_test("text_proposal_passes");

    let mut interchain = Interchain::new(config)
        .add_chain(CosmosChain::new(&chains::fast_gov_juno())?)?;

    interchain.build(&BuildOptions::default()).await?;
    let token = interchain.cancellation_token().clone();

    let juno = interchain.get_chain_mut(JUNO_CHAIN_ID)?;
    let proposal = juno
        .submit_text_proposal(
            FAUCET_KEY_NAME,
            "Raise the community tax",
            "A proposal that only needs to pass",
            "10000000ujuno",
        )
        .await?;
    info!("submitted proposal {}", proposal.proposal_id);

    juno.vote_on_proposal_all_validators(&proposal.proposal_id, "yes")
        .await?;

    let start = juno.height().await?;
    let status = juno
        .poll_for_proposal_status(
            &token,
            start,
            start + 30,
            &proposal.proposal_id,
            ProposalStatus::Passed,
        )
        .await?;
    assert_eq!(status, ProposalStatus::Passed);

    // The queried document must carry the literal wire status and a
    // final tally reflecting the validators' yes votes.
    let document = juno.query_proposal(&proposal.proposal_id).await?;
    assert_eq!(
        document.get("status").and_then(serde_json::Value::as_str),
        Some("PROPOSAL_STATUS_PASSED")
    );
    let yes_count = document
        .pointer("/final_tally_result/yes_count")
        .or_else(|| document.pointer("/final_tally_result/yes"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("0");
    assert!(yes_count.parse::<u128>().unwrap_or(0) > 0, "empty yes tally");

    interchain.close().await;
    Ok(())
}

//! Interchain Security: a consumer chain onboarded through a provider's
//! consumer-addition proposal, validated by the provider's own set.

use interchain_test_framework::prelude::*;

use crate::chains::{self, CONSUMER_CHAIN_ID, PROVIDER_CHAIN_ID};
use crate::util::assert_eventual_balance;

#[tokio::test]
#[ignore]
async fn consumer_chain_starts_under_provider_security() -> Result<(), Error> {
    let config = init_test("consumer_chain_starts_under_provider_security");

    let mut interchain = Interchain::new(config)
        .add_chain(CosmosChain::new(&chains::ics_provider())?)?
        .add_chain(CosmosChain::new(&chains::ics_consumer())?)?
        .add_relayer(Box::new(RlyRelayer::new(None)))
        .add_link(Link::provider_consumer(
            "ics-path",
            PROVIDER_CHAIN_ID,
            CONSUMER_CHAIN_ID,
        ));

    interchain.build(&BuildOptions::default()).await?;

    // The consumer only produces blocks if the provider's validators
    // are signing for it.
    let consumer = interchain.get_chain(CONSUMER_CHAIN_ID)?;
    wait_for_blocks(3, &[consumer as &dyn ChainHeighter]).await?;

    // Plain bank sends must work on the consumer as well.
    let recipient = Wallet::new_random("recipient", "cosmos", 118)?;
    let recipient_address = recipient.formatted_address();
    consumer
        .send_funds(
            FAUCET_KEY_NAME,
            &WalletAmount {
                address: recipient_address.clone(),
                denom: "stake".to_string(),
                amount: 777,
            },
        )
        .await?;
    assert_eventual_balance(consumer, &recipient_address, "stake", 777).await?;

    interchain.close().await;
    Ok(())
}

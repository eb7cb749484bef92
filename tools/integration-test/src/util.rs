//! Assertion helpers for the scenarios.

use core::time::Duration;

use interchain_test_framework::prelude::*;

const BALANCE_POLL_ATTEMPTS: u32 = 60;
const BALANCE_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Wait until an address holds exactly `want` of `denom`, polling a
/// couple of minutes before giving up.
pub async fn assert_eventual_balance(
    chain: &CosmosChain,
    address: &str,
    denom: &str,
    want: u128,
) -> Result<(), Error> {
    let mut got = 0;
    for _ in 0..BALANCE_POLL_ATTEMPTS {
        got = chain.get_balance(address, denom).await?;
        if got == want {
            return Ok(());
        }
        tokio::time::sleep(BALANCE_POLL_INTERVAL).await;
    }
    Err(Error::generic(eyre::eyre!(
        "balance of {denom} for {address} on {} is {got}, want {want}",
        chain.chain_id()
    )))
}

/// Wait until an address holds strictly more than `floor` of `denom`,
/// returning the observed balance. Used to watch escrow refunds land
/// without pinning down the exact fee.
pub async fn assert_eventual_balance_above(
    chain: &CosmosChain,
    address: &str,
    denom: &str,
    floor: u128,
) -> Result<u128, Error> {
    let mut got = 0;
    for _ in 0..BALANCE_POLL_ATTEMPTS {
        got = chain.get_balance(address, denom).await?;
        if got > floor {
            return Ok(got);
        }
        tokio::time::sleep(BALANCE_POLL_INTERVAL).await;
    }
    Err(Error::generic(eyre::eyre!(
        "balance of {denom} for {address} on {} is {got}, want above {floor}",
        chain.chain_id()
    )))
}

//! Token transfer over a single IBC channel between two chains.

use interchain_test_framework::prelude::*;

use crate::chains::{self, GAIA_CHAIN_ID, JUNO_CHAIN_ID};
use crate::util::assert_eventual_balance;

const PATH_NAME: &str = "gaia-juno";
const TRANSFER_AMOUNT: u128 = 12_345;

#[tokio::test]
#[ignore]
async fn ibc_transfer_between_two_chains() -> Result<(), Error> {
    let config = init_test("ibc_transfer_between_two_chains");

    let mut interchain = Interchain::new(config)
        .add_chain(CosmosChain::new(&chains::gaia())?)?
        .add_chain(CosmosChain::new(&chains::juno())?)?
        .add_relayer(Box::new(RlyRelayer::new(None)))
        .add_link(Link::new(PATH_NAME, GAIA_CHAIN_ID, JUNO_CHAIN_ID));

    interchain.build(&BuildOptions::default()).await?;

    let recipient = Wallet::new_random("recipient", "juno", 118)?;
    let recipient_address = recipient.formatted_address();

    let src_channel = interchain
        .channel_for_path(PATH_NAME, GAIA_CHAIN_ID)?
        .channel
        .channel_id
        .clone();
    let dst_channel = interchain
        .channel_for_path(PATH_NAME, JUNO_CHAIN_ID)?
        .channel
        .channel_id
        .clone();

    let gaia = interchain.get_chain(GAIA_CHAIN_ID)?;
    let tx = gaia
        .send_ibc_transfer(
            &src_channel,
            FAUCET_KEY_NAME,
            &WalletAmount {
                address: recipient_address.clone(),
                denom: "uatom".to_string(),
                amount: TRANSFER_AMOUNT,
            },
            &TransferOptions::default(),
        )
        .await?;
    info!(
        "sent {} uatom over {} in tx {}",
        TRANSFER_AMOUNT, src_channel, tx.tx_hash
    );

    let voucher = ibc_denom(&prefixed_denom("transfer", &dst_channel, "uatom"));
    let juno = interchain.get_chain(JUNO_CHAIN_ID)?;
    assert_eventual_balance(juno, &recipient_address, &voucher, TRANSFER_AMOUNT).await?;

    // The escrowed amount must have left the sender, on top of fees.
    let faucet_address = interchain.faucet_wallet(GAIA_CHAIN_ID)?.formatted_address();
    let gaia = interchain.get_chain(GAIA_CHAIN_ID)?;
    let remaining = gaia.get_balance(&faucet_address, "uatom").await?;
    assert!(remaining < 10_000_000_000 * 10u128.pow(6) - TRANSFER_AMOUNT);

    interchain.close().await;
    Ok(())
}

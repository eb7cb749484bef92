//! Multihop transfer through the packet-forward middleware: tokens sent
//! from gaia land on osmosis after being forwarded through juno.

use interchain_test_framework::prelude::*;

use crate::chains::{self, GAIA_CHAIN_ID, JUNO_CHAIN_ID, OSMOSIS_CHAIN_ID};
use crate::util::{assert_eventual_balance, assert_eventual_balance_above};

const PATH_AB: &str = "gaia-juno";
const PATH_BC: &str = "juno-osmosis";
const TRANSFER_AMOUNT: u128 = 54_321;
const REFUND_AMOUNT: u128 = 98_765;

#[tokio::test]
#[ignore]
async fn transfer_forwards_through_middle_chain() -> Result<(), Error> {
    let config = init_test("transfer_forwards_through_middle_chain");

    let mut interchain = Interchain::new(config)
        .add_chain(CosmosChain::new(&chains::gaia())?)?
        .add_chain(CosmosChain::new(&chains::juno())?)?
        .add_chain(CosmosChain::new(&chains::osmosis())?)?
        .add_relayer(Box::new(RlyRelayer::new(None)))
        .add_link(Link::new(PATH_AB, GAIA_CHAIN_ID, JUNO_CHAIN_ID))
        .add_link(Link::new(PATH_BC, JUNO_CHAIN_ID, OSMOSIS_CHAIN_ID));

    interchain.build(&BuildOptions::default()).await?;

    let final_recipient = Wallet::new_random("recipient", "osmo", 118)?;
    let final_address = final_recipient.formatted_address();

    let gaia_to_juno = interchain
        .channel_for_path(PATH_AB, GAIA_CHAIN_ID)?
        .channel
        .channel_id
        .clone();
    let juno_receive = interchain
        .channel_for_path(PATH_AB, JUNO_CHAIN_ID)?
        .channel
        .channel_id
        .clone();
    let juno_to_osmosis = interchain
        .channel_for_path(PATH_BC, JUNO_CHAIN_ID)?
        .channel
        .channel_id
        .clone();
    let osmosis_receive = interchain
        .channel_for_path(PATH_BC, OSMOSIS_CHAIN_ID)?
        .channel
        .channel_id
        .clone();

    // The intermediate receiver is irrelevant; the middleware reads the
    // memo and forwards before any account is credited.
    let hop_account = Wallet::new_random("hop", "juno", 118)?;
    let memo = serde_json::json!({
        "forward": {
            "receiver": final_address,
            "port": "transfer",
            "channel": juno_to_osmosis,
        }
    })
    .to_string();

    let gaia = interchain.get_chain(GAIA_CHAIN_ID)?;
    gaia.send_ibc_transfer(
        &gaia_to_juno,
        FAUCET_KEY_NAME,
        &WalletAmount {
            address: hop_account.formatted_address(),
            denom: "uatom".to_string(),
            amount: TRANSFER_AMOUNT,
        },
        &TransferOptions {
            timeout_seconds: 600,
            memo: Some(memo),
        },
    )
    .await?;

    // The voucher on osmosis carries both hops in its trace.
    let one_hop = prefixed_denom("transfer", &juno_receive, "uatom");
    let two_hop = prefixed_denom("transfer", &osmosis_receive, &one_hop);
    let voucher = ibc_denom(&two_hop);
    info!("expecting {} on {}", voucher, OSMOSIS_CHAIN_ID);

    let osmosis = interchain.get_chain(OSMOSIS_CHAIN_ID)?;
    assert_eventual_balance(osmosis, &final_address, &voucher, TRANSFER_AMOUNT).await?;

    // A forward to a malformed receiver must unwind: the middleware
    // fails the hop and the escrowed amount returns to the sender.
    let faucet_address = interchain.faucet_wallet(GAIA_CHAIN_ID)?.formatted_address();
    let gaia = interchain.get_chain(GAIA_CHAIN_ID)?;
    let before = gaia.get_balance(&faucet_address, "uatom").await?;

    let bad_memo = serde_json::json!({
        "forward": {
            "receiver": "xyz1malformedreceiverxxxxxxxxxxxxxxxxxxx",
            "port": "transfer",
            "channel": juno_to_osmosis,
        }
    })
    .to_string();
    gaia.send_ibc_transfer(
        &gaia_to_juno,
        FAUCET_KEY_NAME,
        &WalletAmount {
            address: hop_account.formatted_address(),
            denom: "uatom".to_string(),
            amount: REFUND_AMOUNT,
        },
        &TransferOptions {
            timeout_seconds: 600,
            memo: Some(bad_memo),
        },
    )
    .await?;

    // Once refunded, only the fee is gone; the balance climbs back
    // above what an unrefunded escrow would leave.
    assert_eventual_balance_above(gaia, &faucet_address, "uatom", before - REFUND_AMOUNT).await?;

    // The failed hop must not have minted anything for the recipient.
    let osmosis = interchain.get_chain(OSMOSIS_CHAIN_ID)?;
    assert_eq!(
        osmosis.get_balance(&final_address, &voucher).await?,
        TRANSFER_AMOUNT
    );

    interchain.close().await;
    Ok(())
}

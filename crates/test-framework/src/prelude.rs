/*!
   Re-exports of everything a typical test needs.
*/

pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
pub use tracing::{debug, error, info, warn};

pub use crate::chain::cosmos::{CosmosChain, TransferOptions};
pub use crate::chain::ics::ConsumerAdditionProposal;
pub use crate::chain::node::ChainNode;
pub use crate::error::Error;
pub use crate::ibc::channel::{CreateChannelOptions, CreateClientOptions, Ordering};
pub use crate::ibc::denom::{ibc_denom, prefixed_denom};
pub use crate::ibc::packet::Packet;
pub use crate::init::init_test;
pub use crate::interchain::topology::{Link, LinkKind};
pub use crate::interchain::{
    BuildOptions, Interchain, FAUCET_KEY_NAME, RELAYER_KEY_NAME,
};
pub use crate::relayer::rly::RlyRelayer;
pub use crate::relayer::Relayer;
pub use crate::types::config::{
    ChainConfig, ChainSpec, DockerImage, GenesisAccount, GenesisKV, TestConfig, ValidatorAmounts,
    WalletAmount,
};
pub use crate::types::tx::{ProposalStatus, Tx};
pub use crate::types::wallet::Wallet;
pub use crate::util::poll::{
    poll_for_ack, poll_for_timeout, wait_for_blocks, ChainAcker, ChainHeighter, ChainTimeouter,
};

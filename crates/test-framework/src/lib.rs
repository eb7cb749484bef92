#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

//! Framework for spinning up Cosmos SDK chains and IBC relayers inside
//! Docker containers and driving them from Rust integration tests.
//!
//! A test declares the chains it wants as [`ChainSpec`](types::config::ChainSpec)
//! values, the paths between them as [`Link`](interchain::topology::Link)
//! declarations, and hands everything to an [`Interchain`](interchain::Interchain).
//! A single [`build`](interchain::Interchain::build) call pulls images,
//! assembles genesis files, launches validators and full nodes, funds
//! wallets, wires up the relayer, and returns once every chain is
//! producing blocks:
//!
//! ```rust,no_run
//! use interchain_test_framework::prelude::*;
//!
//! # async fn example(gaia: ChainSpec, osmosis: ChainSpec) -> Result<(), Error> {
//! let config = init_test("gaia_osmosis_transfer");
//! let env_chains = (CosmosChain::new(&gaia)?, CosmosChain::new(&osmosis)?);
//!
//! let mut interchain = Interchain::new(config)
//!     .add_chain(env_chains.0)?
//!     .add_chain(env_chains.1)?
//!     .add_relayer(Box::new(RlyRelayer::new(None)))
//!     .add_link(Link::new("gaia-osmosis", "localcosmos-1", "localosmosis-1"));
//!
//! interchain.build(&BuildOptions::default()).await?;
//! // ... drive transfers, queries, and assertions ...
//! interchain.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! Every node and relayer runs in its own container on a per-test
//! Docker network; every CLI invocation runs as a one-shot job container
//! sharing the node's home volume. All resources carry a cleanup label
//! so a crashed test is swept up by the next run.

pub mod chain;
pub mod dockerutil;
pub mod error;
pub mod ibc;
pub mod init;
pub mod interchain;
pub mod prelude;
pub mod relayer;
pub mod types;
pub mod util;

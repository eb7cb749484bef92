/*!
   The relayer capability.

   The orchestrator drives relayers only through this trait: path
   setup, the client/connection/channel handshakes, the long-running
   packet loop, and inventory queries. Whether the implementation runs
   in-process or in a container is its own business.
*/

pub mod rly;

use async_trait::async_trait;

use crate::chain::cosmos::CosmosChain;
use crate::dockerutil::DockerEnv;
use crate::error::Error;
use crate::ibc::channel::{
    ChannelOutput, ConnectionOutput, CreateChannelOptions, CreateClientOptions,
};
use crate::types::wallet::Wallet;

#[async_trait]
pub trait Relayer: Send + Sync {
    /// Provision the relayer against a Docker environment: pull its
    /// image, create its home volume, write an empty configuration.
    /// Called once by the orchestrator before any other method.
    async fn initialize(&mut self, env: &DockerEnv) -> Result<(), Error>;

    /// Register a chain in the relayer's configuration. The chain must
    /// already be producing blocks.
    async fn add_chain(&self, chain: &CosmosChain, key_name: &str) -> Result<(), Error>;

    /// Restore a funded wallet into the relayer's keyring for a chain.
    async fn restore_key(&self, chain: &CosmosChain, wallet: &Wallet) -> Result<(), Error>;

    /// Declare a named path between two configured chains.
    async fn generate_path(
        &self,
        path_name: &str,
        src_chain_id: &str,
        dst_chain_id: &str,
    ) -> Result<(), Error>;

    async fn create_clients(
        &self,
        path_name: &str,
        opts: &CreateClientOptions,
    ) -> Result<(), Error>;

    async fn create_connections(&self, path_name: &str) -> Result<(), Error>;

    async fn create_channel(
        &self,
        path_name: &str,
        opts: &CreateChannelOptions,
    ) -> Result<(), Error>;

    /// Composite client + connection + channel handshake for a path.
    async fn link_path(
        &self,
        path_name: &str,
        channel_opts: &CreateChannelOptions,
        client_opts: &CreateClientOptions,
    ) -> Result<(), Error>;

    /// Start the packet-relaying loop over the given paths. Only one
    /// start may be active at a time.
    async fn start(&mut self, path_names: &[String]) -> Result<(), Error>;

    /// Stop the packet loop. A no-op when never started.
    async fn stop(&mut self) -> Result<(), Error>;

    /// Clear pending packets and acks on one channel of a path. Safe
    /// to call while the relayer is running.
    async fn flush(&self, path_name: &str, channel_id: &str) -> Result<(), Error>;

    async fn update_clients(&self, path_name: &str) -> Result<(), Error>;

    async fn get_channels(&self, chain_id: &str) -> Result<Vec<ChannelOutput>, Error>;

    async fn get_connections(&self, chain_id: &str) -> Result<Vec<ConnectionOutput>, Error>;
}

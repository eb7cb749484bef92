/*!
   The top-level test object: a set of chains, an optional relayer, and
   the links binding them, driven to a steady state by [`Interchain::build`].
*/

pub mod topology;

use std::collections::{HashMap, HashSet};

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::chain::cosmos::CosmosChain;
use crate::chain::ics::{copy_provider_validator_keys, ConsumerAdditionProposal};
use crate::dockerutil::DockerEnv;
use crate::error::Error;
use crate::ibc::channel::ChannelOutput;
use crate::relayer::Relayer;
use crate::types::config::{TestConfig, WalletAmount};
use crate::types::wallet::Wallet;
use crate::util::poll::{wait_for_blocks, ChainHeighter};
use topology::{resolve_topology, Link, LinkKind};

/// Key name used for per-chain faucet accounts.
pub const FAUCET_KEY_NAME: &str = "faucet";

/// Key name used for relayer accounts on linked chains.
pub const RELAYER_KEY_NAME: &str = "relayer";

/// A past spawn time makes an ICS consumer eligible the moment its
/// addition proposal passes.
const CONSUMER_SPAWN_TIME: &str = "2023-01-01T00:00:00Z";

/// One side of a channel created for a path during the build.
#[derive(Clone, Debug)]
pub struct ChannelRecord {
    pub path_name: String,
    pub chain_id: String,
    pub channel: ChannelOutput,
}

#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    /// Leave paths unwired: chains start, but no clients, connections,
    /// channels, or relayer loop are created.
    pub skip_path_creation: bool,
}

pub struct Interchain {
    test_config: TestConfig,
    token: CancellationToken,
    env: Option<DockerEnv>,
    chains: Vec<CosmosChain>,
    relayer: Option<Box<dyn Relayer>>,
    links: Vec<Link>,
    additional_wallets: HashMap<String, Vec<WalletAmount>>,
    faucets: HashMap<String, Wallet>,
    relayer_wallets: HashMap<String, Wallet>,
    channels: Vec<ChannelRecord>,
    built: bool,
}

impl Interchain {
    pub fn new(test_config: TestConfig) -> Self {
        Self {
            test_config,
            token: CancellationToken::new(),
            env: None,
            chains: Vec::new(),
            relayer: None,
            links: Vec::new(),
            additional_wallets: HashMap::new(),
            faucets: HashMap::new(),
            relayer_wallets: HashMap::new(),
            channels: Vec::new(),
            built: false,
        }
    }

    pub fn add_chain(mut self, chain: CosmosChain) -> Result<Self, Error> {
        if self.chains.iter().any(|c| c.chain_id() == chain.chain_id()) {
            return Err(Error::invalid_config(format!(
                "chain {} added twice",
                chain.chain_id()
            )));
        }
        self.chains.push(chain);
        Ok(self)
    }

    pub fn add_relayer(mut self, relayer: Box<dyn Relayer>) -> Self {
        self.relayer = Some(relayer);
        self
    }

    pub fn add_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Bake an extra account into a chain's genesis.
    pub fn add_genesis_wallet(mut self, chain_id: &str, wallet: WalletAmount) -> Self {
        self.additional_wallets
            .entry(chain_id.to_string())
            .or_default()
            .push(wallet);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn get_chain(&self, chain_id: &str) -> Result<&CosmosChain, Error> {
        self.chains
            .iter()
            .find(|c| c.chain_id() == chain_id)
            .ok_or_else(|| Error::invalid_config(format!("unknown chain {chain_id}")))
    }

    pub fn get_chain_mut(&mut self, chain_id: &str) -> Result<&mut CosmosChain, Error> {
        self.chains
            .iter_mut()
            .find(|c| c.chain_id() == chain_id)
            .ok_or_else(|| Error::invalid_config(format!("unknown chain {chain_id}")))
    }

    fn chain_index(&self, chain_id: &str) -> Result<usize, Error> {
        self.chains
            .iter()
            .position(|c| c.chain_id() == chain_id)
            .ok_or_else(|| Error::invalid_config(format!("unknown chain {chain_id}")))
    }

    /// The faucet wallet provisioned for a chain during the build.
    pub fn faucet_wallet(&self, chain_id: &str) -> Result<&Wallet, Error> {
        self.faucets
            .get(chain_id)
            .ok_or_else(|| Error::invalid_config(format!("no faucet for chain {chain_id}")))
    }

    pub fn relayer_wallet(&self, chain_id: &str) -> Result<&Wallet, Error> {
        self.relayer_wallets
            .get(chain_id)
            .ok_or_else(|| Error::invalid_config(format!("no relayer wallet for chain {chain_id}")))
    }

    pub fn relayer(&mut self) -> Result<&mut Box<dyn Relayer>, Error> {
        self.relayer
            .as_mut()
            .ok_or_else(|| Error::invalid_config("no relayer was added".to_string()))
    }

    /// Channels created on one chain during the build.
    pub fn channels_for(&self, chain_id: &str) -> Vec<&ChannelRecord> {
        self.channels
            .iter()
            .filter(|r| r.chain_id == chain_id)
            .collect()
    }

    /// The channel a path created on one of its two chains.
    pub fn channel_for_path(&self, path_name: &str, chain_id: &str) -> Result<&ChannelRecord, Error> {
        self.channels
            .iter()
            .find(|r| r.path_name == path_name && r.chain_id == chain_id)
            .ok_or_else(|| Error::channel_not_found(chain_id.to_string(), path_name.to_string()))
    }

    /// One-shot build: validate, provision, assemble genesis, launch,
    /// wire paths, start the relayer. Any failure triggers `close`.
    pub async fn build(&mut self, options: &BuildOptions) -> Result<(), Error> {
        if self.built {
            return Err(Error::already_built());
        }
        self.built = true;

        match self.do_build(options).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("interchain build failed, tearing down: {}", e);
                self.close().await;
                Err(e)
            }
        }
    }

    async fn do_build(&mut self, options: &BuildOptions) -> Result<(), Error> {
        // Phase 1: validation.
        let chain_ids: HashSet<String> =
            self.chains.iter().map(|c| c.chain_id().to_string()).collect();
        resolve_topology(&self.links, &chain_ids)?;

        // Phase 2: engine, network, stale-resource sweep.
        let env = DockerEnv::new(&self.test_config).await?;
        self.env = Some(env.clone());

        // Phases 3-4: images, volumes, node handles, per chain in
        // parallel.
        futures::future::try_join_all(self.chains.iter_mut().map(|chain| chain.initialize(&env)))
            .await?;

        self.provision_wallets()?;

        // Phases 5-6: genesis and container launch. Consumers wait for
        // their provider's consumer genesis.
        let consumers: HashSet<String> = self
            .links
            .iter()
            .filter(|l| l.kind == LinkKind::ProviderConsumer)
            .map(|l| l.chain_b.clone())
            .collect();

        let wallets = self.additional_wallets.clone();
        let test_config = self.test_config.clone();
        futures::future::try_join_all(
            self.chains
                .iter_mut()
                .filter(|chain| !consumers.contains(chain.chain_id()))
                .map(|chain| {
                    let wallets = wallets
                        .get(chain.chain_id())
                        .cloned()
                        .unwrap_or_default();
                    let test_config = test_config.clone();
                    async move { chain.start(&wallets, &test_config).await }
                }),
        )
        .await?;

        self.start_consumers().await?;

        // Restore faucet keys now that query nodes are serving.
        for chain in &self.chains {
            let faucet = self.faucets[chain.chain_id()].clone();
            chain.recover_key(FAUCET_KEY_NAME, &faucet.mnemonic).await?;
        }

        // Phases 8-9: relayer wiring and start.
        if !options.skip_path_creation && !self.links.is_empty() {
            self.wire_paths().await?;
        }

        // Phase 10: sentinel wait, one more block everywhere.
        let heighters: Vec<&dyn ChainHeighter> =
            self.chains.iter().map(|c| c as &dyn ChainHeighter).collect();
        wait_for_blocks(1, &heighters).await?;

        info!("interchain build complete");
        Ok(())
    }

    /// One faucet per chain, plus one relayer wallet per linked chain,
    /// all baked into genesis.
    fn provision_wallets(&mut self) -> Result<(), Error> {
        let linked: HashSet<String> = self
            .links
            .iter()
            .flat_map(|l| [l.chain_a.clone(), l.chain_b.clone()])
            .collect();

        for chain in &self.chains {
            let config = &chain.config;
            let chain_id = chain.chain_id().to_string();

            let faucet =
                Wallet::new_random(FAUCET_KEY_NAME, &config.bech32_prefix, config.coin_type)?;
            let faucet_amount = 10_000_000_000u128 * 10u128.pow(config.coin_decimals as u32);
            self.additional_wallets
                .entry(chain_id.clone())
                .or_default()
                .push(WalletAmount {
                    address: faucet.formatted_address(),
                    denom: config.denom.clone(),
                    amount: faucet_amount,
                });
            self.faucets.insert(chain_id.clone(), faucet);

            if linked.contains(&chain_id) {
                let relayer_wallet =
                    Wallet::new_random(RELAYER_KEY_NAME, &config.bech32_prefix, config.coin_type)?;
                let relayer_amount = 1_000_000u128 * 10u128.pow(config.coin_decimals as u32);
                self.additional_wallets
                    .entry(chain_id.clone())
                    .or_default()
                    .push(WalletAmount {
                        address: relayer_wallet.formatted_address(),
                        denom: config.denom.clone(),
                        amount: relayer_amount,
                    });
                self.relayer_wallets.insert(chain_id, relayer_wallet);
            }
        }
        Ok(())
    }

    /// ICS consumers start only after their provider has passed a
    /// consumer-addition proposal and emitted a consumer genesis.
    async fn start_consumers(&mut self) -> Result<(), Error> {
        let pairs: Vec<(String, String)> = self
            .links
            .iter()
            .filter(|l| l.kind == LinkKind::ProviderConsumer)
            .map(|l| (l.chain_a.clone(), l.chain_b.clone()))
            .collect();

        for (provider_id, consumer_id) in pairs {
            let provider_idx = self.chain_index(&provider_id)?;
            let consumer_idx = self.chain_index(&consumer_id)?;

            let deposit = format!(
                "10000000{}",
                self.chains[provider_idx].config.denom
            );
            let proposal =
                ConsumerAdditionProposal::new(&consumer_id, CONSUMER_SPAWN_TIME, &deposit);

            let proposal_id = self.chains[provider_idx]
                .submit_consumer_addition_proposal(&proposal)
                .await?;
            let token = self.token.clone();
            self.chains[provider_idx]
                .pass_consumer_addition_proposal(&token, &proposal_id)
                .await?;

            let ccv_section = self.chains[provider_idx]
                .query_consumer_genesis(&consumer_id)
                .await?;

            self.chains[consumer_idx].prepare_consumer_nodes().await?;
            copy_provider_validator_keys(&self.chains[provider_idx], &self.chains[consumer_idx])
                .await?;

            self.chains[consumer_idx].set_consumer_genesis(ccv_section)?;
            let wallets = self
                .additional_wallets
                .get(&consumer_id)
                .cloned()
                .unwrap_or_default();
            let test_config = self.test_config.clone();
            self.chains[consumer_idx]
                .start_consumer(&wallets, &test_config)
                .await?;
        }
        Ok(())
    }

    async fn wire_paths(&mut self) -> Result<(), Error> {
        let env = self.env.clone().ok_or_else(|| {
            Error::invalid_config("docker environment missing during relayer wiring".to_string())
        })?;
        let relayer = self.relayer.as_mut().ok_or_else(|| {
            Error::invalid_config("links were declared but no relayer was added".to_string())
        })?;
        relayer.initialize(&env).await?;

        // Register every linked chain with the relayer once, restoring
        // its funded key.
        let mut registered = HashSet::new();
        for link in &self.links {
            for chain_id in [&link.chain_a, &link.chain_b] {
                if !registered.insert(chain_id.clone()) {
                    continue;
                }
                let chain = self
                    .chains
                    .iter()
                    .find(|c| c.chain_id() == chain_id.as_str())
                    .ok_or_else(|| Error::invalid_config(format!("unknown chain {chain_id}")))?;
                relayer.add_chain(chain, RELAYER_KEY_NAME).await?;
                let wallet = self.relayer_wallets.get(chain_id.as_str()).ok_or_else(|| {
                    Error::invalid_config(format!("no relayer wallet for chain {chain_id}"))
                })?;
                relayer.restore_key(chain, wallet).await?;
            }
        }

        // Handshakes, in declaration order.
        for link in &self.links {
            relayer
                .generate_path(&link.path_name, &link.chain_a, &link.chain_b)
                .await?;
            relayer
                .link_path(&link.path_name, &link.channel_opts, &link.client_opts)
                .await?;

            // Pick the just-linked channel out of each side's inventory
            // by port pair rather than position, then pin the far side
            // through the near side's counterparty.
            let inventory_a = relayer.get_channels(&link.chain_a).await?;
            let source_port = &link.channel_opts.source_port_name;
            let dest_port = &link.channel_opts.dest_port_name;
            let channel_a = match_channel(&inventory_a, source_port, dest_port)
                .cloned()
                .ok_or_else(|| {
                    Error::channel_not_found(link.chain_a.clone(), link.path_name.clone())
                })?;

            let inventory_b = relayer.get_channels(&link.chain_b).await?;
            let channel_b = inventory_b
                .iter()
                .find(|c| c.channel_id == channel_a.counterparty.channel_id)
                .or_else(|| match_channel(&inventory_b, dest_port, source_port))
                .cloned()
                .ok_or_else(|| {
                    Error::channel_not_found(link.chain_b.clone(), link.path_name.clone())
                })?;

            self.channels.push(ChannelRecord {
                path_name: link.path_name.clone(),
                chain_id: link.chain_a.clone(),
                channel: channel_a,
            });
            self.channels.push(ChannelRecord {
                path_name: link.path_name.clone(),
                chain_id: link.chain_b.clone(),
                channel: channel_b,
            });
        }

        let path_names: Vec<String> = self.links.iter().map(|l| l.path_name.clone()).collect();
        relayer.start(&path_names).await?;
        Ok(())
    }

    /// Stop the relayer and remove every container, volume, and network
    /// created for the test. Safe on a partially built interchain and
    /// safe to call twice.
    pub async fn close(&mut self) {
        self.token.cancel();

        if let Some(relayer) = self.relayer.as_mut() {
            if let Err(e) = relayer.stop().await {
                error!("failed to stop relayer during close: {}", e);
            }
        }

        if let Some(env) = &self.env {
            env.close().await;
        }
        info!("interchain closed");
    }
}

/// The most recent channel whose port pair matches the linked path,
/// regardless of inventory ordering.
fn match_channel<'a>(
    inventory: &'a [ChannelOutput],
    port_id: &str,
    counterparty_port_id: &str,
) -> Option<&'a ChannelOutput> {
    inventory
        .iter()
        .rev()
        .find(|c| c.port_id == port_id && c.counterparty.port_id == counterparty_port_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_build_is_rejected() {
        let mut ic = Interchain::new(TestConfig::from_env("unit-build-twice"));
        ic.built = true;

        let err = ic.build(&BuildOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn duplicate_chain_ids_are_rejected() {
        use crate::types::config::{ChainConfig, ChainSpec, DockerImage};

        let config = ChainConfig {
            chain_type: "cosmos".to_string(),
            name: "juno".to_string(),
            chain_id: "localjuno-1".to_string(),
            images: vec![DockerImage::new("juno", "v19.0.0", "1025:1025")],
            bin: "junod".to_string(),
            bech32_prefix: "juno".to_string(),
            denom: "ujuno".to_string(),
            coin_type: 118,
            coin_decimals: 6,
            gas_prices: "0.0025ujuno".to_string(),
            gas_adjustment: 1.3,
            trusting_period: "336h".to_string(),
            modify_genesis: vec![],
            accounts: vec![],
            config_file_overrides: Default::default(),
            additional_start_args: vec![],
            env: vec![],
            startup_commands: vec![],
            validator_amounts: vec![],
        };

        let ic = Interchain::new(TestConfig::from_env("unit-dup-chain"))
            .add_chain(CosmosChain::new(&ChainSpec::new(config.clone())).unwrap())
            .unwrap();
        let result = ic.add_chain(CosmosChain::new(&ChainSpec::new(config)).unwrap());
        assert!(result.is_err());
    }

    fn channel(channel_id: &str, port_id: &str, cp_port: &str, cp_channel: &str) -> ChannelOutput {
        ChannelOutput {
            state: "STATE_OPEN".to_string(),
            port_id: port_id.to_string(),
            channel_id: channel_id.to_string(),
            counterparty: crate::ibc::channel::ChannelCounterparty {
                port_id: cp_port.to_string(),
                channel_id: cp_channel.to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn channel_matching_ignores_inventory_order() {
        // A pre-existing ICA channel listed after the transfer channel
        // must not be picked up as the linked path's channel.
        let inventory = vec![
            channel("channel-0", "transfer", "transfer", "channel-0"),
            channel("channel-1", "icahost", "icacontroller-x", "channel-1"),
        ];

        let matched = match_channel(&inventory, "transfer", "transfer").unwrap();
        assert_eq!(matched.channel_id, "channel-0");
        assert!(match_channel(&inventory, "provider", "consumer").is_none());
    }

    #[test]
    fn channel_matching_prefers_the_newest_port_pair_match() {
        let inventory = vec![
            channel("channel-0", "transfer", "transfer", "channel-0"),
            channel("channel-2", "transfer", "transfer", "channel-5"),
        ];

        let matched = match_channel(&inventory, "transfer", "transfer").unwrap();
        assert_eq!(matched.channel_id, "channel-2");
    }
}

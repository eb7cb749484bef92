/*!
   A Cosmos chain: the set of nodes sharing one chain id, the genesis
   assembly pipeline, and chain-level operations tests drive.
*/

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;
use subtle_encoding::base64;
use tracing::{debug, info, warn};

use crate::chain::genesis::{
    apply_genesis_overrides, genesis_sha256, persistent_peers, substitute_stake_denom,
};
use crate::chain::node::{ChainNode, VALIDATOR_KEY_NAME};
use crate::dockerutil::DockerEnv;
use crate::error::Error;
use crate::ibc::packet::{Packet, PacketAcknowledgement, PacketTimeout};
use crate::types::config::{ChainSpec, ResolvedChainSpec, TestConfig, WalletAmount};
use crate::types::tx::{BlockTx, ProposalStatus, Tx, TxEvent};
use crate::types::wallet::{substitute_denom, Wallet};
use crate::util::poll::{do_poll, ChainAcker, ChainHeighter, ChainTimeouter};

/// Options for an ICS-20 transfer.
#[derive(Clone, Debug, Default)]
pub struct TransferOptions {
    /// Relative packet timeout in seconds. Zero lets the chain default
    /// apply.
    pub timeout_seconds: u64,
    pub memo: Option<String>,
}

pub struct CosmosChain {
    pub config: crate::types::config::ChainConfig,
    pub num_validators: usize,
    pub num_full_nodes: usize,
    pub nodes: Vec<ChainNode>,
    env: Option<DockerEnv>,
    started: bool,
    /// Provider-emitted ccvconsumer section to inject into genesis.
    /// Set on consumer chains between the provider's proposal passing
    /// and this chain's start.
    pub(crate) consumer_section: Option<Value>,
}

impl CosmosChain {
    pub fn new(spec: &ChainSpec) -> Result<Self, Error> {
        let ResolvedChainSpec {
            config,
            num_validators,
            num_full_nodes,
        } = spec.resolve()?;

        Ok(Self {
            config,
            num_validators,
            num_full_nodes,
            nodes: Vec::new(),
            env: None,
            started: false,
            consumer_section: None,
        })
    }

    pub fn chain_id(&self) -> &str {
        &self.config.chain_id
    }

    fn env(&self) -> Result<&DockerEnv, Error> {
        self.env.as_ref().ok_or_else(|| {
            Error::invalid_config(format!(
                "chain {} has not been initialized",
                self.config.chain_id
            ))
        })
    }

    /// The node tests and external queries target: the first full node
    /// when one exists, otherwise the first validator.
    pub fn designated_node(&self) -> &ChainNode {
        let idx = if self.num_full_nodes > 0 {
            self.num_validators
        } else {
            0
        };
        &self.nodes[idx]
    }

    /// Validator 0: the node whose keyring holds an operator key with a
    /// funded genesis account, so governance submissions sign from it.
    /// The designated node may be a full node with no keys at all.
    pub(crate) fn first_validator(&self) -> &ChainNode {
        &self.nodes[0]
    }

    fn validators_mut(&mut self) -> impl Iterator<Item = &mut ChainNode> {
        let n = self.num_validators;
        self.nodes.iter_mut().take(n)
    }

    // --- initialization ---------------------------------------------

    /// Pull the image, construct node handles, and create their
    /// volumes. Must precede [`CosmosChain::start`].
    pub async fn initialize(&mut self, env: &DockerEnv) -> Result<(), Error> {
        info!(
            "initializing chain {} with {} validators and {} full nodes",
            self.config.chain_id, self.num_validators, self.num_full_nodes
        );

        env.pull_image(&self.config.images[0]).await?;
        env.ensure_helper_image().await?;

        for index in 0..self.num_validators {
            self.nodes
                .push(ChainNode::new(env.clone(), self.config.clone(), index, true));
        }
        for index in 0..self.num_full_nodes {
            self.nodes
                .push(ChainNode::new(env.clone(), self.config.clone(), index, false));
        }

        try_join_all(self.nodes.iter_mut().map(|node| node.create_volume())).await?;

        self.env = Some(env.clone());
        Ok(())
    }

    // --- genesis pipeline and start ---------------------------------

    /// The genesis pipeline followed by container start for every node.
    /// Returns once the designated node has produced two blocks.
    pub async fn start(
        &mut self,
        additional_wallets: &[WalletAmount],
        test_config: &TestConfig,
    ) -> Result<(), Error> {
        self.env()?;
        if self.started {
            return Ok(());
        }

        self.init_all_nodes().await?;
        let genesis = self.assemble_genesis(additional_wallets).await?;
        self.export_genesis_hook(test_config, &genesis).await?;
        self.distribute_genesis(&genesis).await?;
        self.wire_peers().await?;

        try_join_all(self.nodes.iter_mut().map(|node| node.create_container())).await?;
        try_join_all(self.nodes.iter_mut().map(|node| node.start_container())).await?;

        self.designated_node().wait_for_blocks(2).await?;
        self.started = true;
        self.run_startup_commands().await?;

        info!("chain {} started", self.config.chain_id);
        Ok(())
    }

    /// The genesis pipeline for an ICS consumer chain. Consumer binaries
    /// carry no staking module, so nodes only init their homes: no
    /// operator keys, no gentxs, no collect. The validator set arrives
    /// in the ccvconsumer section staged via
    /// [`CosmosChain::set_consumer_genesis`].
    pub async fn start_consumer(
        &mut self,
        additional_wallets: &[WalletAmount],
        test_config: &TestConfig,
    ) -> Result<(), Error> {
        if self.consumer_section.is_none() {
            return Err(Error::invalid_config(format!(
                "chain {} has no consumer genesis staged",
                self.config.chain_id
            )));
        }
        self.env()?;
        if self.started {
            return Ok(());
        }

        self.prepare_consumer_nodes().await?;
        let genesis = self.assemble_consumer_genesis(additional_wallets).await?;
        self.export_genesis_hook(test_config, &genesis).await?;
        self.distribute_genesis(&genesis).await?;
        self.wire_peers().await?;

        try_join_all(self.nodes.iter_mut().map(|node| node.create_container())).await?;
        try_join_all(self.nodes.iter_mut().map(|node| node.start_container())).await?;

        self.designated_node().wait_for_blocks(2).await?;
        self.started = true;
        self.run_startup_commands().await?;

        info!("consumer chain {} started", self.config.chain_id);
        Ok(())
    }

    /// Init every consumer node's home ahead of
    /// [`CosmosChain::start_consumer`], so provider consensus keys can
    /// be copied in before container launch. `start_consumer` skips
    /// nodes already initialized here.
    pub async fn prepare_consumer_nodes(&mut self) -> Result<(), Error> {
        self.env()?;
        try_join_all(self.nodes.iter_mut().map(|node| node.init_home())).await?;
        Ok(())
    }

    /// Per-node init: every node inits its home; each validator also
    /// creates its operator key, credits its own genesis account, and
    /// produces a gentx for the self-delegation. Nodes that already
    /// completed this step are left alone.
    async fn init_all_nodes(&mut self) -> Result<(), Error> {
        let config = self.config.clone();

        try_join_all(self.nodes.iter_mut().map(|node| {
            let config = config.clone();
            async move {
                if node.validator && node.state() >= crate::chain::node::NodeState::GentxReady {
                    return Ok(());
                }
                node.init_home().await?;
                if node.validator {
                    let genesis_amount = config.genesis_amount_for(node.index);
                    let self_delegation = config.self_delegation_for(node.index);
                    let wallet = node.create_wallet(VALIDATOR_KEY_NAME).await?;
                    node.add_genesis_account(
                        &wallet.formatted_address(),
                        &format!("{genesis_amount}{}", config.denom),
                    )
                    .await?;
                    node.gentx(VALIDATOR_KEY_NAME, self_delegation).await?;
                }
                Ok::<(), Error>(())
            }
        }))
        .await?;

        Ok(())
    }

    /// Central merge on validator 0, additional accounts, collect, and
    /// post-processing. Produces the canonical genesis bytes.
    async fn assemble_genesis(
        &mut self,
        additional_wallets: &[WalletAmount],
    ) -> Result<Vec<u8>, Error> {
        let denom = self.config.denom.clone();

        // Addresses and gentx files of validators 1..n fold into
        // validator 0.
        let mut merged_accounts = Vec::new();
        let mut gentx_files = Vec::new();
        for node in self.nodes[1..self.num_validators].iter() {
            let address = node.key_bech32(VALIDATOR_KEY_NAME).await?;
            merged_accounts.push((address, self.config.genesis_amount_for(node.index)));
            let node_id = node.node_id().await?;
            let rel_path = format!("config/gentx/gentx-{node_id}.json");
            gentx_files.push((rel_path.clone(), node.read_file(&rel_path).await?));
        }

        let (first, _) = self.nodes.split_at_mut(1);
        let val0 = &mut first[0];

        for (address, amount) in &merged_accounts {
            val0.add_genesis_account(address, &format!("{amount}{denom}"))
                .await?;
        }
        for (rel_path, content) in &gentx_files {
            val0.write_file(rel_path, content).await?;
        }

        for wallet in additional_wallets {
            val0.add_genesis_account(&wallet.address, &format!("{}{}", wallet.amount, wallet.denom))
                .await?;
        }

        let spec_accounts = self.config.accounts.clone();
        let (first, _) = self.nodes.split_at_mut(1);
        let val0 = &mut first[0];
        for account in &spec_accounts {
            let address = match (&account.address, &account.mnemonic) {
                (Some(address), _) => address.clone(),
                (None, Some(mnemonic)) => {
                    val0.recover_key(&account.name, mnemonic).await?;
                    Wallet::from_mnemonic(
                        &account.name,
                        mnemonic,
                        &self.config.bech32_prefix,
                        self.config.coin_type,
                    )?
                    .formatted_address()
                }
                (None, None) => val0.create_wallet(&account.name).await?.formatted_address(),
            };
            let amount = substitute_denom(&account.amount, &denom);
            val0.add_genesis_account(&address, &amount).await?;
        }

        val0.collect_gentxs().await?;

        let raw = val0.genesis_file_content().await?;
        let substituted = substitute_stake_denom(&raw, &denom);
        apply_genesis_overrides(&substituted, &self.config.modify_genesis)
    }

    /// Consumer genesis: validator 0's bare init output plus additional
    /// wallet accounts, with the provider-emitted ccvconsumer section
    /// injected before denom substitution and overrides.
    async fn assemble_consumer_genesis(
        &mut self,
        additional_wallets: &[WalletAmount],
    ) -> Result<Vec<u8>, Error> {
        let section = self.consumer_section.take().ok_or_else(|| {
            Error::invalid_config(format!(
                "chain {} has no consumer genesis staged",
                self.config.chain_id
            ))
        })?;

        let (first, _) = self.nodes.split_at_mut(1);
        let val0 = &mut first[0];
        for wallet in additional_wallets {
            val0.add_genesis_account(&wallet.address, &format!("{}{}", wallet.amount, wallet.denom))
                .await?;
        }

        let raw = val0.genesis_file_content().await?;
        let injected = crate::chain::genesis::inject_consumer_genesis(&raw, section)?;
        let substituted = substitute_stake_denom(&injected, &self.config.denom);
        apply_genesis_overrides(&substituted, &self.config.modify_genesis)
    }

    /// Run the chain spec's post-startup commands on validator 0, with
    /// the home and chain-id placeholders substituted.
    async fn run_startup_commands(&self) -> Result<(), Error> {
        for template in &self.config.startup_commands {
            let rendered = render_startup_command(template, &self.config.chain_id);
            info!(
                "running startup command on {}: {}",
                self.config.chain_id, rendered
            );
            let cmd: Vec<String> = rendered.split_whitespace().map(str::to_string).collect();
            let output = self.nodes[0].exec_command(&cmd).await?;
            if !output.is_empty() {
                debug!("startup command output: {output}");
            }
        }
        Ok(())
    }

    async fn export_genesis_hook(
        &self,
        test_config: &TestConfig,
        genesis: &[u8],
    ) -> Result<(), Error> {
        let (Some(path), Some(chain)) = (
            &test_config.export_genesis_file_path,
            &test_config.export_genesis_chain,
        ) else {
            return Ok(());
        };

        if chain == &self.config.name {
            info!("exporting genesis of {} to {}", self.config.name, path.display());
            tokio::fs::write(path, genesis).await.map_err(Error::io)?;
        }
        Ok(())
    }

    /// Overwrite every node's genesis with the canonical bytes and
    /// verify the fan-out by hash.
    pub(crate) async fn distribute_genesis(&mut self, genesis: &[u8]) -> Result<(), Error> {
        let want = genesis_sha256(genesis);

        for node in &mut self.nodes {
            node.overwrite_genesis_file(genesis).await?;
            node.mark_genesis_installed()?;

            let got = genesis_sha256(&node.genesis_file_content().await?);
            debug!("genesis sha256 on {}: {}", node.name(), got);
            if got != want {
                return Err(Error::genesis_hash_mismatch(node.name(), want, got));
            }
        }
        Ok(())
    }

    /// Write `node_id@hostname:26656` for every node into each node's
    /// persistent_peers, along with the baseline config patches.
    pub(crate) async fn wire_peers(&mut self) -> Result<(), Error> {
        let mut peers = Vec::new();
        for node in &self.nodes {
            peers.push((node.node_id().await?, node.hostname()));
        }
        let peer_string = persistent_peers(&peers);

        try_join_all(
            self.nodes
                .iter()
                .map(|node| node.patch_config_files(&peer_string)),
        )
        .await?;
        Ok(())
    }

    // --- running-chain operations -----------------------------------

    pub async fn height(&self) -> Result<u64, Error> {
        self.designated_node().height().await
    }

    /// Restore a wallet's key into the designated node's keyring so it
    /// can sign transactions submitted through this chain.
    pub async fn recover_key(&self, key_name: &str, mnemonic: &str) -> Result<(), Error> {
        self.designated_node().recover_key(key_name, mnemonic).await
    }

    pub async fn send_funds(&self, key_name: &str, amount: &WalletAmount) -> Result<(), Error> {
        let coin = format!("{}{}", amount.amount, amount.denom);
        self.designated_node()
            .exec_tx(key_name, &["bank", "send", key_name, &amount.address, &coin])
            .await?;
        Ok(())
    }

    /// The balance of `denom` held by `address`, zero when absent.
    pub async fn get_balance(&self, address: &str, denom: &str) -> Result<u128, Error> {
        let response = self
            .designated_node()
            .exec_query(&["bank", "balances", address, "--limit", "100"])
            .await?;

        let balances = response
            .get("balances")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for balance in balances {
            if balance.get("denom").and_then(Value::as_str) == Some(denom) {
                let amount = balance
                    .get("amount")
                    .and_then(Value::as_str)
                    .unwrap_or("0");
                return amount.parse::<u128>().map_err(|_| {
                    Error::invalid_config(format!("unparseable balance amount {amount}"))
                });
            }
        }
        Ok(0)
    }

    /// Submit an ICS-20 transfer and parse the resulting `send_packet`
    /// event into a [`Tx`]. Fails with `PacketEventMissing` when the
    /// event is absent.
    pub async fn send_ibc_transfer(
        &self,
        channel_id: &str,
        key_name: &str,
        amount: &WalletAmount,
        options: &TransferOptions,
    ) -> Result<Tx, Error> {
        let coin = format!("{}{}", amount.amount, amount.denom);
        let mut args: Vec<String> = vec![
            "ibc-transfer".to_string(),
            "transfer".to_string(),
            "transfer".to_string(),
            channel_id.to_string(),
            amount.address.clone(),
            coin,
        ];
        if options.timeout_seconds > 0 {
            args.push("--packet-timeout-timestamp".to_string());
            args.push(format!("{}000000000", options.timeout_seconds));
        }
        if let Some(memo) = &options.memo {
            args.push("--memo".to_string());
            args.push(memo.clone());
        }

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let node = self.designated_node();
        let tx_hash = node.exec_tx(key_name, &arg_refs).await?;

        let response = node.get_transaction(&tx_hash).await?;
        let packet = response
            .tx_result
            .events
            .iter()
            .find(|e| e.kind == "send_packet")
            .and_then(packet_from_event)
            .ok_or_else(|| Error::packet_event_missing("send_packet".to_string(), tx_hash.clone()))?;

        Ok(Tx {
            height: crate::chain::rpc::parse_height(&response.height)?,
            tx_hash,
            gas_spent: response.tx_result.gas_used.parse().unwrap_or_default(),
            packet,
        })
    }

    /// Every transaction in the block at `height`. Raw bytes are always
    /// present; decode failures are logged, not raised.
    pub async fn find_txs(&self, height: u64) -> Result<Vec<BlockTx>, Error> {
        let rpc = self.designated_node().rpc()?;
        let blobs = rpc.block_txs(height).await?;
        let results = rpc.block_results(height).await?;
        let tx_results = results.txs_results.unwrap_or_default();

        let mut txs = Vec::with_capacity(blobs.len());
        for (i, blob) in blobs.iter().enumerate() {
            let raw = match base64::decode(blob) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("failed to decode tx {} in block {}: {}", i, height, e);
                    blob.as_bytes().to_vec()
                }
            };
            let decoded = serde_json::from_slice::<Value>(&raw).ok();
            let events = tx_results.get(i).map(|r| r.events.clone()).unwrap_or_default();
            txs.push(BlockTx { raw, decoded, events });
        }
        Ok(txs)
    }

    async fn packet_events(&self, height: u64, kind: &str) -> Result<Vec<Packet>, Error> {
        let rpc = self.designated_node().rpc()?;
        let results = rpc.block_results(height).await?;

        let mut packets = Vec::new();
        let tx_events = results
            .txs_results
            .unwrap_or_default()
            .into_iter()
            .flat_map(|r| r.events);
        let block_events = results
            .finalize_block_events
            .unwrap_or_default()
            .into_iter()
            .chain(results.end_block_events.unwrap_or_default());

        for event in tx_events.chain(block_events) {
            if event.kind == kind {
                if let Some(packet) = packet_from_event(&event) {
                    packets.push(packet);
                }
            }
        }
        Ok(packets)
    }

    /// IBC acknowledgements in the block at `height`.
    pub async fn acknowledgements(&self, height: u64) -> Result<Vec<PacketAcknowledgement>, Error> {
        let packets = self.packet_events(height, "acknowledge_packet").await?;
        Ok(packets
            .into_iter()
            .map(|packet| PacketAcknowledgement {
                packet,
                acknowledgement: Vec::new(),
            })
            .collect())
    }

    /// IBC timeouts in the block at `height`.
    pub async fn timeouts(&self, height: u64) -> Result<Vec<PacketTimeout>, Error> {
        let packets = self.packet_events(height, "timeout_packet").await?;
        Ok(packets.into_iter().map(|packet| PacketTimeout { packet }).collect())
    }

    // --- lifecycle control ------------------------------------------

    /// Stop and remove every node container. Volumes survive, so
    /// [`CosmosChain::start_all_nodes`] can re-create the containers,
    /// possibly on a new image tag after
    /// [`CosmosChain::upgrade_version`].
    pub async fn stop_all_nodes(&mut self) -> Result<(), Error> {
        try_join_all(self.nodes.iter_mut().map(|node| async move {
            node.stop_container().await?;
            node.remove_container().await
        }))
        .await?;
        Ok(())
    }

    /// Re-create every node container from the current image and start
    /// it.
    pub async fn start_all_nodes(&mut self) -> Result<(), Error> {
        try_join_all(self.nodes.iter_mut().map(|node| node.create_container())).await?;
        try_join_all(self.nodes.iter_mut().map(|node| node.start_container())).await?;
        Ok(())
    }

    /// Rewrite the image tag the next [`CosmosChain::start_all_nodes`]
    /// creates containers from. Every node must be stopped; volumes are
    /// untouched.
    pub fn upgrade_version(&mut self, new_tag: &str) -> Result<(), Error> {
        for node in &self.nodes {
            if node.state() != crate::chain::node::NodeState::Stopped {
                return Err(Error::invalid_config(format!(
                    "cannot upgrade {}: node {} is not stopped",
                    self.config.chain_id,
                    node.name()
                )));
            }
        }
        self.config.images[0].version = new_tag.to_string();
        for node in &mut self.nodes {
            node.chain_config.images[0].version = new_tag.to_string();
        }
        info!("chain {} upgraded to {}", self.config.chain_id, new_tag);
        Ok(())
    }

    /// Grow a running chain by `count` full nodes seeded with the
    /// chain's current genesis.
    pub async fn add_full_nodes(&mut self, count: usize) -> Result<(), Error> {
        let env = self.env()?.clone();
        let genesis = self.nodes[0].genesis_file_content().await?;

        let start_index = self.num_full_nodes;
        let mut new_nodes = Vec::with_capacity(count);
        for offset in 0..count {
            let mut node =
                ChainNode::new(env.clone(), self.config.clone(), start_index + offset, false);
            node.create_volume().await?;
            node.init_home().await?;
            node.overwrite_genesis_file(&genesis).await?;
            node.mark_genesis_installed()?;
            new_nodes.push(node);
        }

        self.nodes.extend(new_nodes);
        self.num_full_nodes += count;

        self.wire_peers().await?;

        let first_new = self.nodes.len() - count;
        try_join_all(
            self.nodes[first_new..]
                .iter_mut()
                .map(|node| node.create_container()),
        )
        .await?;
        try_join_all(
            self.nodes[first_new..]
                .iter_mut()
                .map(|node| node.start_container()),
        )
        .await?;
        Ok(())
    }

    /// Export application state at `height` from validator 0, which
    /// must be stopped.
    pub async fn export_state(&self, height: u64) -> Result<Vec<u8>, Error> {
        self.nodes[0].export_state(height).await
    }

    // --- governance helpers -----------------------------------------

    /// Cast the same vote from every validator, in parallel.
    pub async fn vote_on_proposal_all_validators(
        &mut self,
        proposal_id: &str,
        vote: &str,
    ) -> Result<(), Error> {
        let futures = self.validators_mut().map(|node| {
            let proposal_id = proposal_id.to_string();
            let vote = vote.to_string();
            async move {
                node.exec_tx(VALIDATOR_KEY_NAME, &["gov", "vote", &proposal_id, &vote])
                    .await?;
                Ok::<(), Error>(())
            }
        });
        try_join_all(futures).await?;
        Ok(())
    }

    /// Query a proposal's current status.
    pub async fn proposal_status(&self, proposal_id: &str) -> Result<ProposalStatus, Error> {
        let response = self
            .designated_node()
            .exec_query(&["gov", "proposal", proposal_id])
            .await?;

        // SDK v1 gov nests under "proposal", older versions are flat.
        let status = response
            .pointer("/proposal/status")
            .or_else(|| response.get("status"))
            .cloned()
            .ok_or_else(|| {
                Error::invalid_config(format!("proposal {proposal_id} query has no status field"))
            })?;

        serde_json::from_value(status).map_err(Error::json_parse)
    }

    /// Scan heights until the proposal reaches `want`.
    pub async fn poll_for_proposal_status(
        &self,
        token: &tokio_util::sync::CancellationToken,
        start_height: u64,
        max_height: u64,
        proposal_id: &str,
        want: ProposalStatus,
    ) -> Result<ProposalStatus, Error> {
        do_poll(
            token,
            || self.height(),
            |_| async move {
                let got = self.proposal_status(proposal_id).await?;
                if got == want {
                    Ok(got)
                } else {
                    Err(Error::proposal_status(
                        proposal_id.to_string(),
                        want.to_string(),
                        got.to_string(),
                    ))
                }
            },
            start_height,
            max_height,
        )
        .await
    }
}

#[async_trait]
impl ChainHeighter for CosmosChain {
    async fn height(&self) -> Result<u64, Error> {
        CosmosChain::height(self).await
    }
}

#[async_trait]
impl ChainAcker for CosmosChain {
    async fn acknowledgements(&self, height: u64) -> Result<Vec<PacketAcknowledgement>, Error> {
        CosmosChain::acknowledgements(self, height).await
    }
}

#[async_trait]
impl ChainTimeouter for CosmosChain {
    async fn timeouts(&self, height: u64) -> Result<Vec<PacketTimeout>, Error> {
        CosmosChain::timeouts(self, height).await
    }
}

/// Substitute the `%HOME%` and `%CHAIN_ID%` placeholders of a
/// post-startup command template.
pub(crate) fn render_startup_command(template: &str, chain_id: &str) -> String {
    template
        .replace("%HOME%", crate::chain::node::CHAIN_HOME)
        .replace("%CHAIN_ID%", chain_id)
}

/// Build a [`Packet`] from a `send_packet` / `acknowledge_packet` /
/// `timeout_packet` event's attributes.
pub(crate) fn packet_from_event(event: &TxEvent) -> Option<Packet> {
    let sequence = event.attribute("packet_sequence")?.parse().ok()?;

    let data = event
        .attribute("packet_data")
        .map(|d| d.as_bytes().to_vec())
        .or_else(|| {
            event
                .attribute("packet_data_hex")
                .and_then(|h| hex::decode(h).ok())
        })
        .unwrap_or_default();

    Some(Packet {
        sequence,
        source_port: event.attribute("packet_src_port")?.to_string(),
        source_channel: event.attribute("packet_src_channel")?.to_string(),
        destination_port: event.attribute("packet_dst_port")?.to_string(),
        destination_channel: event.attribute("packet_dst_channel")?.to_string(),
        data,
        timeout_height: event
            .attribute("packet_timeout_height")
            .unwrap_or("0-0")
            .to_string(),
        timeout_timestamp: event
            .attribute("packet_timeout_timestamp")
            .and_then(|t| t.parse().ok())
            .unwrap_or_default(),
    })
}

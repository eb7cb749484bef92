/*!
   One chain node: its volume, keyring, CLI invocations, and container.

   A node container only ever runs `<bin> start`. Every other CLI call
   (init, keys, gentx, tx, query) runs in a one-shot job container
   sharing the node's volume and network, so CLI use can never disturb
   a running validator.
*/

use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, info};

use crate::chain::rpc::CometRpcClient;
use crate::dockerutil::container::{ContainerLifecycle, ContainerOptions};
use crate::dockerutil::job::{run_job, JobOptions, RunOutput};
use crate::dockerutil::{file, volume, DockerEnv};
use crate::error::Error;
use crate::types::config::ChainConfig;
use crate::types::tx::CosmosTx;
use crate::types::wallet::Wallet;
use crate::util::moniker::condense_moniker;
use crate::util::random::{condense_host_name, sanitize_container_name};
use crate::util::retry::retry_task;

/// Canonical home directory inside node containers and job containers.
pub const CHAIN_HOME: &str = "/var/cosmos-chain";

pub const RPC_PORT: &str = "26657/tcp";
pub const P2P_PORT: &str = "26656/tcp";
pub const GRPC_PORT: &str = "9090/tcp";
pub const API_PORT: &str = "1317/tcp";
pub const PRIVVAL_PORT: &str = "1234/tcp";

/// Key name every validator uses for its operator key.
pub const VALIDATOR_KEY_NAME: &str = "validator";

const GENESIS_FILE: &str = "config/genesis.json";
const CONFIG_TOML: &str = "config/config.toml";
const APP_TOML: &str = "config/app.toml";

/// Node lifecycle. Transitions only move forward, except from
/// `Stopped`, which may cycle back to `Created` (container removed and
/// re-created, e.g. on a new image for an upgrade) or `Running`
/// (plain restart of the existing container).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeState {
    Fresh,
    Initialized,
    GentxReady,
    GenesisInstalled,
    Created,
    Running,
    Stopped,
}

impl NodeState {
    fn label(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Initialized => "initialized",
            Self::GentxReady => "gentx-ready",
            Self::GenesisInstalled => "genesis-installed",
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

pub struct ChainNode {
    pub index: usize,
    pub validator: bool,
    pub chain_config: ChainConfig,
    env: DockerEnv,
    pub volume_name: String,
    container: ContainerLifecycle,
    state: NodeState,
    /// Whether the binary uses the SDK >= 0.47 `genesis` subcommand
    /// family. Probed once on first use.
    uses_genesis_subcommand: Option<bool>,
    rpc: Option<CometRpcClient>,
    host_grpc: Option<String>,
    host_api: Option<String>,
}

impl ChainNode {
    pub fn new(env: DockerEnv, chain_config: ChainConfig, index: usize, validator: bool) -> Self {
        let container_name = sanitize_container_name(&format!(
            "{}-{}-{}-{}",
            chain_config.chain_id,
            if validator { "val" } else { "fn" },
            index,
            env.test_name,
        ));
        let container = ContainerLifecycle::new(env.client.clone(), container_name);

        Self {
            index,
            validator,
            chain_config,
            env,
            volume_name: String::new(),
            container,
            state: NodeState::Fresh,
            uses_genesis_subcommand: None,
            rpc: None,
            host_grpc: None,
            host_api: None,
        }
    }

    pub fn name(&self) -> String {
        self.container.name().to_string()
    }

    /// Hostname on the overlay network, condensed to the DNS label
    /// limit. Peers and job containers dial this name.
    pub fn hostname(&self) -> String {
        condense_host_name(self.container.name())
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    fn advance(&mut self, to: NodeState) -> Result<bool, Error> {
        use NodeState::*;
        if to == self.state {
            return Ok(false);
        }
        let allowed =
            to > self.state || matches!((self.state, to), (Stopped, Running) | (Stopped, Created));
        if !allowed {
            return Err(Error::state_transition(
                self.name(),
                self.state.label().to_string(),
                to.label().to_string(),
            ));
        }
        self.state = to;
        Ok(true)
    }

    /// RPC client over the host-published port. Available once the
    /// container is running.
    pub fn rpc(&self) -> Result<&CometRpcClient, Error> {
        self.rpc
            .as_ref()
            .ok_or_else(|| Error::invalid_config(format!("node {} is not running", self.name())))
    }

    pub fn host_grpc_endpoint(&self) -> Option<&str> {
        self.host_grpc.as_deref()
    }

    pub fn host_api_endpoint(&self) -> Option<&str> {
        self.host_api.as_deref()
    }

    pub async fn height(&self) -> Result<u64, Error> {
        self.rpc()?.height().await
    }

    // --- volume ------------------------------------------------------

    pub async fn create_volume(&mut self) -> Result<(), Error> {
        self.volume_name = self.env.create_volume(&self.name()).await?;
        volume::set_volume_owner(&self.env, &self.volume_name, &self.chain_config.images[0].uid_gid)
            .await
    }

    pub async fn read_file(&self, rel_path: &str) -> Result<Vec<u8>, Error> {
        file::read_file(&self.env, &self.volume_name, rel_path).await
    }

    pub async fn write_file(&self, rel_path: &str, content: &[u8]) -> Result<(), Error> {
        file::write_file(
            &self.env,
            &self.volume_name,
            &self.chain_config.images[0].uid_gid,
            rel_path,
            content,
        )
        .await
    }

    pub async fn genesis_file_content(&self) -> Result<Vec<u8>, Error> {
        self.read_file(GENESIS_FILE).await
    }

    pub async fn overwrite_genesis_file(&self, content: &[u8]) -> Result<(), Error> {
        self.write_file(GENESIS_FILE, content).await
    }

    // --- CLI plumbing ------------------------------------------------

    fn job_options(&self) -> JobOptions {
        JobOptions {
            image: self.chain_config.images[0].reference(),
            binds: vec![format!("{}:{}", self.volume_name, CHAIN_HOME)],
            env: self.chain_config.env.clone(),
            user: Some(self.chain_config.images[0].uid_gid.clone()),
        }
    }

    /// `<bin> <args> --home <home>`.
    pub fn bin_command(&self, args: &[&str]) -> Vec<String> {
        let mut cmd = vec![self.chain_config.bin.clone()];
        cmd.extend(args.iter().map(|s| s.to_string()));
        cmd.extend(["--home".to_string(), CHAIN_HOME.to_string()]);
        cmd
    }

    /// `bin_command` plus the `--node` flag pointing at this node.
    pub fn node_command(&self, args: &[&str]) -> Vec<String> {
        let mut cmd = self.bin_command(args);
        cmd.extend([
            "--node".to_string(),
            format!("tcp://{}:26657", self.hostname()),
        ]);
        cmd
    }

    /// Flags appended to every transaction: fees, signer, keyring,
    /// output shape, auto-confirm, chain id.
    pub fn tx_command(&self, key_name: &str, args: &[&str]) -> Vec<String> {
        let mut full = vec!["tx"];
        full.extend(args);
        let mut cmd = self.node_command(&full);
        cmd.extend([
            "--gas-prices".to_string(),
            self.chain_config.gas_prices.clone(),
            "--gas-adjustment".to_string(),
            self.chain_config.gas_adjustment.to_string(),
            "--gas".to_string(),
            "auto".to_string(),
            "--from".to_string(),
            key_name.to_string(),
            "--keyring-backend".to_string(),
            "test".to_string(),
            "--output".to_string(),
            "json".to_string(),
            "-y".to_string(),
            "--chain-id".to_string(),
            self.chain_config.chain_id.clone(),
        ]);
        cmd
    }

    pub fn query_command(&self, args: &[&str]) -> Vec<String> {
        let mut full = vec!["query"];
        full.extend(args);
        let mut cmd = self.node_command(&full);
        cmd.extend(["--output".to_string(), "json".to_string()]);
        cmd
    }

    async fn exec(&self, cmd: &[String]) -> Result<RunOutput, Error> {
        let output = run_job(&self.env, &format!("node-{}", self.index), &self.job_options(), cmd)
            .await?;
        output.into_result(&cmd.iter().join(" "))
    }

    /// Run an arbitrary command in a job container sharing this node's
    /// volume and return its trimmed stdout. Post-startup commands from
    /// the chain spec come through here.
    pub async fn exec_command(&self, cmd: &[String]) -> Result<String, Error> {
        let output = self.exec(cmd).await?;
        Ok(output.stdout_str().trim().to_string())
    }

    /// Whether the binary groups genesis commands under
    /// `<bin> genesis ...` (SDK >= 0.47).
    pub async fn has_genesis_subcommand(&mut self) -> Result<bool, Error> {
        if let Some(known) = self.uses_genesis_subcommand {
            return Ok(known);
        }
        let cmd = vec![
            self.chain_config.bin.clone(),
            "genesis".to_string(),
            "--help".to_string(),
        ];
        let probe = run_job(&self.env, "probe", &self.job_options(), &cmd).await?;
        let supported = probe.exit_code == 0;
        self.uses_genesis_subcommand = Some(supported);
        Ok(supported)
    }

    async fn genesis_command(&mut self, args: &[&str]) -> Result<RunOutput, Error> {
        let cmd = if self.has_genesis_subcommand().await? {
            let mut full = vec!["genesis"];
            full.extend(args);
            self.bin_command(&full)
        } else {
            self.bin_command(args)
        };
        self.exec(&cmd).await
    }

    // --- initialization ---------------------------------------------

    pub async fn init_home(&mut self) -> Result<(), Error> {
        if !self.advance(NodeState::Initialized)? {
            return Ok(());
        }
        let moniker = condense_moniker(&self.name());
        self.exec(&self.bin_command(&[
            "init",
            &moniker,
            "--chain-id",
            &self.chain_config.chain_id,
            "--overwrite",
        ]))
        .await?;
        Ok(())
    }

    /// Restore a key into this node's test keyring from a mnemonic.
    pub async fn recover_key(&self, key_name: &str, mnemonic: &str) -> Result<(), Error> {
        let add = self
            .bin_command(&[
                "keys",
                "add",
                key_name,
                "--recover",
                "--coin-type",
                &self.chain_config.coin_type.to_string(),
                "--keyring-backend",
                "test",
            ])
            .iter()
            .join(" ");

        // The mnemonic arrives on stdin, which a job container does not
        // have; feed it through the shell instead.
        let cmd = vec![
            "sh".to_string(),
            "-c".to_string(),
            format!("echo '{mnemonic}' | {add}"),
        ];
        self.exec(&cmd).await?;
        Ok(())
    }

    /// Generate a wallet in-process and restore it into the keyring, so
    /// the address is known without parsing CLI output.
    pub async fn create_wallet(&self, key_name: &str) -> Result<Wallet, Error> {
        let wallet = Wallet::new_random(
            key_name,
            &self.chain_config.bech32_prefix,
            self.chain_config.coin_type,
        )?;
        self.recover_key(key_name, &wallet.mnemonic).await?;
        Ok(wallet)
    }

    /// The bech32 address of a key in this node's keyring.
    pub async fn key_bech32(&self, key_name: &str) -> Result<String, Error> {
        let output = self
            .exec(&self.bin_command(&[
                "keys",
                "show",
                "--address",
                key_name,
                "--keyring-backend",
                "test",
            ]))
            .await?;
        Ok(output.stdout_str().trim().to_string())
    }

    pub async fn add_genesis_account(&mut self, address: &str, coins: &str) -> Result<(), Error> {
        self.genesis_command(&["add-genesis-account", address, coins])
            .await?;
        Ok(())
    }

    pub async fn gentx(&mut self, key_name: &str, amount: u128) -> Result<(), Error> {
        let coin = format!("{}{}", amount, self.chain_config.denom);
        let chain_id = self.chain_config.chain_id.clone();
        self.genesis_command(&[
            "gentx",
            key_name,
            &coin,
            "--keyring-backend",
            "test",
            "--chain-id",
            &chain_id,
        ])
        .await?;
        self.advance(NodeState::GentxReady)?;
        Ok(())
    }

    pub async fn collect_gentxs(&mut self) -> Result<(), Error> {
        self.genesis_command(&["collect-gentxs"]).await?;
        Ok(())
    }

    /// The node's P2P identifier, as peers reference it.
    pub async fn node_id(&self) -> Result<String, Error> {
        let output = self
            .exec(&self.bin_command(&["tendermint", "show-node-id"]))
            .await?;
        Ok(output.stdout_str().trim().to_string())
    }

    pub fn mark_genesis_installed(&mut self) -> Result<(), Error> {
        self.advance(NodeState::GenesisInstalled)?;
        Ok(())
    }

    // --- config files -----------------------------------------------

    /// Apply baseline consensus/app settings plus the chain spec's per-file
    /// overrides. Patches deep-merge over the generated files; keys the
    /// patch does not mention keep their generated values.
    pub async fn patch_config_files(&self, persistent_peers: &str) -> Result<(), Error> {
        let config_patch = baseline_config_toml(persistent_peers);
        self.patch_toml_file(CONFIG_TOML, &config_patch).await?;

        let app_patch = baseline_app_toml(&self.chain_config.gas_prices);
        self.patch_toml_file(APP_TOML, &app_patch).await?;

        for (rel_path, patch) in &self.chain_config.config_file_overrides {
            self.patch_toml_file(rel_path, patch).await?;
        }
        Ok(())
    }

    async fn patch_toml_file(&self, rel_path: &str, patch: &toml::Value) -> Result<(), Error> {
        let raw = self.read_file(rel_path).await?;
        let text = String::from_utf8_lossy(&raw);
        let mut doc: toml::Value = toml::from_str(&text).map_err(Error::toml_parse)?;

        merge_toml(&mut doc, patch);

        let rendered = toml::to_string_pretty(&doc)
            .map_err(|e| Error::invalid_config(format!("failed to render {rel_path}: {e}")))?;
        self.write_file(rel_path, rendered.as_bytes()).await
    }

    // --- container lifecycle ----------------------------------------

    pub async fn create_container(&mut self) -> Result<(), Error> {
        if !self.advance(NodeState::Created)? {
            return Ok(());
        }

        let mut cmd = vec![
            self.chain_config.bin.clone(),
            "start".to_string(),
            "--home".to_string(),
            CHAIN_HOME.to_string(),
        ];
        cmd.extend(self.chain_config.additional_start_args.clone());

        let opts = ContainerOptions {
            image: self.chain_config.images[0].reference(),
            cmd,
            env: self.chain_config.env.clone(),
            hostname: self.hostname(),
            binds: vec![format!("{}:{}", self.volume_name, CHAIN_HOME)],
            exposed_ports: vec![
                RPC_PORT.to_string(),
                P2P_PORT.to_string(),
                GRPC_PORT.to_string(),
                API_PORT.to_string(),
                PRIVVAL_PORT.to_string(),
            ],
            user: Some(self.chain_config.images[0].uid_gid.clone()),
            entrypoint: None,
        };

        let env = self.env.clone();
        self.container.create(&env, opts).await
    }

    /// Start the container and wait for the RPC endpoint to serve a
    /// height, surfacing an SDK panic instead of waiting forever.
    pub async fn start_container(&mut self) -> Result<(), Error> {
        self.advance(NodeState::Running)?;
        self.container.start().await?;

        let rpc_endpoint = self.container.host_endpoint(RPC_PORT).await?;
        let rpc = CometRpcClient::new(&rpc_endpoint);

        let probe = retry_task(
            &format!("rpc probe on {}", self.name()),
            40,
            core::time::Duration::from_millis(500),
            || async {
                rpc.status().await?;
                Ok(())
            },
        )
        .await;

        if probe.is_err() {
            self.container.detect_panic().await?;
            probe?;
        }

        self.host_grpc = self.container.host_endpoint(GRPC_PORT).await.ok();
        self.host_api = self.container.host_endpoint(API_PORT).await.ok();
        self.rpc = Some(rpc);

        info!("node {} is serving rpc at {}", self.name(), rpc_endpoint);
        Ok(())
    }

    pub async fn stop_container(&mut self) -> Result<(), Error> {
        self.advance(NodeState::Stopped)?;
        self.container.stop(30).await
    }

    pub async fn remove_container(&mut self) -> Result<(), Error> {
        self.container.remove().await
    }

    pub async fn logs_tail(&self, tail: usize) -> Result<String, Error> {
        self.container.logs_tail(tail).await
    }

    // --- transactions and queries -----------------------------------

    /// Broadcast a tx, wait for inclusion, and return the tx hash.
    /// Fails with `TxFailed` on a non-zero code either at broadcast or
    /// after inclusion.
    pub async fn exec_tx(&self, key_name: &str, args: &[&str]) -> Result<String, Error> {
        let cmd = self.tx_command(key_name, args);
        let output = self.exec(&cmd).await?;

        let broadcast: CosmosTx = serde_json::from_str(output.stdout_str().trim())?;
        if broadcast.code != 0 {
            return Err(Error::tx_failed(broadcast.code, broadcast.raw_log));
        }

        self.wait_for_blocks(2).await?;

        let included = self.get_transaction(&broadcast.txhash).await?;
        if included.tx_result.code != 0 {
            return Err(Error::tx_failed(included.tx_result.code, included.tx_result.log));
        }

        debug!("tx {} included at height {}", broadcast.txhash, included.height);
        Ok(broadcast.txhash)
    }

    /// Run a query subcommand and parse its JSON output.
    pub async fn exec_query(&self, args: &[&str]) -> Result<Value, Error> {
        let output = self.exec(&self.query_command(args)).await?;
        serde_json::from_str(output.stdout_str().trim()).map_err(Error::json_parse)
    }

    /// Fetch a tx by hash, retrying while the index catches up.
    pub async fn get_transaction(&self, hash: &str) -> Result<crate::chain::rpc::TxResponse, Error> {
        let rpc = self.rpc()?;
        retry_task(
            &format!("lookup of tx {hash}"),
            10,
            core::time::Duration::from_millis(500),
            || async { rpc.tx(hash).await },
        )
        .await
    }

    pub async fn wait_for_blocks(&self, delta: u64) -> Result<(), Error> {
        let rpc = self.rpc()?;
        let start = rpc.height().await?;
        retry_task(
            &format!("waiting {delta} blocks on {}", self.name()),
            120,
            core::time::Duration::from_millis(500),
            || async {
                let now = rpc.height().await?;
                if now >= start + delta {
                    Ok(())
                } else {
                    Err(Error::deadline_exceeded(format!(
                        "height {now}, want {}",
                        start + delta
                    )))
                }
            },
        )
        .await
    }

    // --- state export -----------------------------------------------

    /// Dump application state at the latest committed height. The node
    /// must be stopped.
    pub async fn export_state(&self, height: u64) -> Result<Vec<u8>, Error> {
        let height_arg = height.to_string();
        let output = self
            .exec(&self.bin_command(&["export", "--height", &height_arg]))
            .await?;
        // Some SDK versions print the export to stderr.
        if output.stdout.is_empty() {
            Ok(output.stderr)
        } else {
            Ok(output.stdout)
        }
    }

    /// Wipe consensus data while keeping keys and config.
    pub async fn unsafe_reset_all(&mut self) -> Result<(), Error> {
        let cmd = if self.has_genesis_subcommand().await? {
            self.bin_command(&["comet", "unsafe-reset-all"])
        } else {
            self.bin_command(&["unsafe-reset-all"])
        };
        self.exec(&cmd).await?;
        Ok(())
    }
}

fn baseline_config_toml(persistent_peers: &str) -> toml::Value {
    let text = format!(
        r#"
        [p2p]
        persistent_peers = "{persistent_peers}"
        laddr = "tcp://0.0.0.0:26656"
        allow_duplicate_ip = true
        addr_book_strict = false

        [rpc]
        laddr = "tcp://0.0.0.0:26657"

        [consensus]
        timeout_commit = "2s"
        timeout_propose = "2s"
        "#
    );
    toml::from_str(&text).unwrap_or(toml::Value::Table(Default::default()))
}

fn baseline_app_toml(gas_prices: &str) -> toml::Value {
    let text = format!(
        r#"
        minimum-gas-prices = "{gas_prices}"

        [grpc]
        address = "0.0.0.0:9090"

        [api]
        enable = true
        address = "tcp://0.0.0.0:1317"
        enabled-unsafe-cors = true
        "#
    );
    toml::from_str(&text).unwrap_or(toml::Value::Table(Default::default()))
}

/// Deep-merge `patch` into `base`. Tables merge recursively; any other
/// value in the patch replaces the base value.
pub(crate) fn merge_toml(base: &mut toml::Value, patch: &toml::Value) {
    match (base, patch) {
        (toml::Value::Table(base_table), toml::Value::Table(patch_table)) => {
            for (key, patch_value) in patch_table {
                match base_table.get_mut(key) {
                    Some(base_value) => merge_toml(base_value, patch_value),
                    None => {
                        base_table.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (base_value, patch_value) => *base_value = patch_value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::{ChainConfig, DockerImage};
    use crate::types::config::{DEFAULT_COIN_DECIMALS, DEFAULT_COIN_TYPE};

    fn test_node() -> ChainNode {
        let config = ChainConfig {
            chain_type: "cosmos".to_string(),
            name: "juno".to_string(),
            chain_id: "localjuno-1".to_string(),
            images: vec![DockerImage::new("juno", "v19.0.0", "1025:1025")],
            bin: "junod".to_string(),
            bech32_prefix: "juno".to_string(),
            denom: "ujuno".to_string(),
            coin_type: DEFAULT_COIN_TYPE,
            coin_decimals: DEFAULT_COIN_DECIMALS,
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

        let env = DockerEnv {
            client: bollard::Docker::connect_with_socket_defaults().unwrap(),
            test_name: "unit".to_string(),
            network_name: "unit-net".to_string(),
        };

        ChainNode::new(env, config, 0, true)
    }

    #[test]
    fn tx_command_carries_standard_flags() {
        let node = test_node();
        let cmd = node.tx_command("faucet", &["bank", "send", "faucet", "juno1abc", "100ujuno"]);
        let joined = cmd.join(" ");

        assert!(joined.starts_with("junod tx bank send"));
        assert!(joined.contains("--keyring-backend test"));
        assert!(joined.contains("--output json"));
        assert!(joined.contains("--gas-prices 0.0025ujuno"));
        assert!(joined.contains("--chain-id localjuno-1"));
        assert!(joined.contains("--node tcp://localjuno-1-val-0-unit:26657"));
        assert!(joined.contains("-y"));
    }

    #[test]
    fn query_command_requests_json() {
        let node = test_node();
        let cmd = node.query_command(&["bank", "balances", "juno1abc"]);
        assert_eq!(cmd[0], "junod");
        assert_eq!(cmd[1], "query");
        assert!(cmd.join(" ").ends_with("--output json"));
    }

    #[test]
    fn state_machine_rejects_backward_transitions() {
        let mut node = test_node();
        node.advance(NodeState::Initialized).unwrap();
        node.advance(NodeState::GentxReady).unwrap();
        assert!(node.advance(NodeState::Initialized).is_err());
    }

    #[test]
    fn state_machine_allows_restart_cycle() {
        let mut node = test_node();
        node.advance(NodeState::Running).unwrap();
        node.advance(NodeState::Stopped).unwrap();
        node.advance(NodeState::Running).unwrap();
        assert_eq!(node.state(), NodeState::Running);
    }

    #[test]
    fn state_machine_allows_recreate_after_stop() {
        // Version upgrades remove the stopped container and create a new
        // one from the rewritten image tag.
        let mut node = test_node();
        node.advance(NodeState::Running).unwrap();
        node.advance(NodeState::Stopped).unwrap();
        assert!(node.advance(NodeState::Created).unwrap());
        node.advance(NodeState::Running).unwrap();
        assert_eq!(node.state(), NodeState::Running);
    }

    #[test]
    fn repeated_transition_is_a_noop() {
        let mut node = test_node();
        assert!(node.advance(NodeState::Initialized).unwrap());
        assert!(!node.advance(NodeState::Initialized).unwrap());
    }

    #[test]
    fn toml_patches_merge_without_unsetting() {
        let mut base: toml::Value = toml::from_str(
            r#"
            [p2p]
            laddr = "tcp://0.0.0.0:26656"
            seeds = "seed-1"
            "#,
        )
        .unwrap();
        let patch: toml::Value = toml::from_str(
            r#"
            [p2p]
            persistent_peers = "abc@host:26656"
            "#,
        )
        .unwrap();

        merge_toml(&mut base, &patch);

        assert_eq!(
            base["p2p"]["persistent_peers"].as_str(),
            Some("abc@host:26656")
        );
        assert_eq!(base["p2p"]["seeds"].as_str(), Some("seed-1"));
    }

    #[test]
    fn node_hostname_fits_dns_label() {
        let node = test_node();
        assert!(node.hostname().len() <= 63);
        assert_eq!(node.hostname(), "localjuno-1-val-0-unit");
    }
}

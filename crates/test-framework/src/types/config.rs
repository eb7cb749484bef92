/*!
   Declarative inputs for building an interchain: chain specifications,
   Docker image references, and the per-process test configuration.
*/

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::util::random::random_u32;

/// Default number of validators when a spec does not say otherwise.
pub const DEFAULT_NUM_VALIDATORS: usize = 2;

/// Default number of full nodes when a spec does not say otherwise.
pub const DEFAULT_NUM_FULL_NODES: usize = 1;

/// Default BIP-44 coin type (Cosmos Hub).
pub const DEFAULT_COIN_TYPE: u32 = 118;

/// Default number of decimal places in the chain's native denom.
pub const DEFAULT_COIN_DECIMALS: u8 = 6;

/// A container image reference plus the UID:GID that owns files the
/// image writes into mounted volumes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerImage {
    pub repository: String,
    pub version: String,
    #[serde(default = "default_uid_gid")]
    pub uid_gid: String,
}

fn default_uid_gid() -> String {
    "1025:1025".to_string()
}

impl DockerImage {
    pub fn new(repository: &str, version: &str, uid_gid: &str) -> Self {
        Self {
            repository: repository.to_string(),
            version: version.to_string(),
            uid_gid: uid_gid.to_string(),
        }
    }

    /// The `repository:tag` form passed to the engine.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository, self.version)
    }
}

/// One ordered dotted-path substitution applied to the finalized
/// genesis document, such as
/// `app_state.gov.params.voting_period = "15s"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisKV {
    pub key: String,
    pub value: serde_json::Value,
}

impl GenesisKV {
    pub fn new(key: &str, value: serde_json::Value) -> Self {
        Self {
            key: key.to_string(),
            value,
        }
    }
}

/// An account baked into genesis from the chain spec. `amount` supports the
/// literal `%DENOM%`, substituted with the chain denom when the account
/// is materialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub name: String,
    pub amount: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub mnemonic: Option<String>,
}

/// Per-validator override of the amounts a validator's genesis account
/// is credited with and self-delegates. Entry `i` applies to validator
/// `i`; validators beyond the list keep the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorAmounts {
    pub genesis: u128,
    pub self_delegation: u128,
}

/// Full configuration of one chain, with every default resolved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_chain_type", rename = "type")]
    pub chain_type: String,
    pub name: String,
    pub chain_id: String,
    pub images: Vec<DockerImage>,
    pub bin: String,
    pub bech32_prefix: String,
    pub denom: String,
    #[serde(default = "default_coin_type")]
    pub coin_type: u32,
    #[serde(default = "default_coin_decimals")]
    pub coin_decimals: u8,
    pub gas_prices: String,
    #[serde(default = "default_gas_adjustment")]
    pub gas_adjustment: f64,
    #[serde(default = "default_trusting_period")]
    pub trusting_period: String,
    /// Ordered dotted-path substitutions applied after `collect-gentxs`.
    #[serde(default)]
    pub modify_genesis: Vec<GenesisKV>,
    /// Accounts added to genesis before the chain starts.
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,
    /// Map from a path relative to the node home (for example
    /// `config/config.toml`) to a TOML patch deep-merged into that file.
    #[serde(default)]
    pub config_file_overrides: BTreeMap<String, toml::Value>,
    /// Extra arguments appended to `<bin> start`.
    #[serde(default)]
    pub additional_start_args: Vec<String>,
    /// Environment variables for node containers, as `KEY=VALUE`.
    #[serde(default)]
    pub env: Vec<String>,
    /// Commands run on validator 0 once the chain is producing blocks.
    /// `%HOME%` and `%CHAIN_ID%` are substituted before execution.
    #[serde(default)]
    pub startup_commands: Vec<String>,
    /// Per-validator funding overrides, indexed by validator.
    #[serde(default)]
    pub validator_amounts: Vec<ValidatorAmounts>,
}

fn default_chain_type() -> String {
    "cosmos".to_string()
}

fn default_coin_type() -> u32 {
    DEFAULT_COIN_TYPE
}

fn default_coin_decimals() -> u8 {
    DEFAULT_COIN_DECIMALS
}

fn default_gas_adjustment() -> f64 {
    1.3
}

fn default_trusting_period() -> String {
    "336h".to_string()
}

impl ChainConfig {
    /// Amount credited to every validator's own genesis account.
    pub fn genesis_amount(&self) -> u128 {
        10_000_000u128 * 10u128.pow(self.coin_decimals as u32)
    }

    /// Amount each validator self-delegates in its gentx.
    pub fn self_delegation_amount(&self) -> u128 {
        5_000_000u128 * 10u128.pow(self.coin_decimals as u32)
    }

    /// The genesis credit for one validator, honoring
    /// [`ChainConfig::validator_amounts`] overrides.
    pub fn genesis_amount_for(&self, validator_index: usize) -> u128 {
        self.validator_amounts
            .get(validator_index)
            .map(|a| a.genesis)
            .unwrap_or_else(|| self.genesis_amount())
    }

    /// The gentx self-delegation for one validator, honoring
    /// [`ChainConfig::validator_amounts`] overrides.
    pub fn self_delegation_for(&self, validator_index: usize) -> u128 {
        self.validator_amounts
            .get(validator_index)
            .map(|a| a.self_delegation)
            .unwrap_or_else(|| self.self_delegation_amount())
    }

    fn validate(&self) -> Result<(), Error> {
        if self.chain_id.is_empty() {
            return Err(Error::invalid_config("chain_id must not be empty".to_string()));
        }
        if self.bin.is_empty() {
            return Err(Error::invalid_config(format!(
                "chain {} has no binary name",
                self.chain_id
            )));
        }
        if self.denom.is_empty() || self.bech32_prefix.is_empty() {
            return Err(Error::invalid_config(format!(
                "chain {} must set both denom and bech32_prefix",
                self.chain_id
            )));
        }
        if self.images.is_empty() {
            return Err(Error::invalid_config(format!(
                "chain {} has no docker image",
                self.chain_id
            )));
        }
        if self.coin_decimals == 0 {
            return Err(Error::invalid_config(format!(
                "chain {} has zero coin_decimals",
                self.chain_id
            )));
        }
        Ok(())
    }
}

/// Declarative description of one chain in the interchain, as tests
/// supply it. Resolved into a [`ChainConfig`] plus node counts by
/// [`ChainSpec::resolve`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainSpec {
    pub chain_config: ChainConfig,
    #[serde(default)]
    pub num_validators: Option<usize>,
    #[serde(default)]
    pub num_full_nodes: Option<usize>,
    /// Overrides the version of every image in the config.
    #[serde(default)]
    pub version: Option<String>,
}

impl ChainSpec {
    pub fn new(chain_config: ChainConfig) -> Self {
        Self {
            chain_config,
            num_validators: None,
            num_full_nodes: None,
            version: None,
        }
    }

    pub fn with_validators(mut self, n: usize) -> Self {
        self.num_validators = Some(n);
        self
    }

    pub fn with_full_nodes(mut self, n: usize) -> Self {
        self.num_full_nodes = Some(n);
        self
    }

    /// Apply defaults and validate, yielding the config the chain is
    /// built from.
    pub fn resolve(&self) -> Result<ResolvedChainSpec, Error> {
        let mut config = self.chain_config.clone();
        if let Some(version) = &self.version {
            for image in &mut config.images {
                image.version = version.clone();
            }
        }
        config.validate()?;

        let num_validators = self.num_validators.unwrap_or(DEFAULT_NUM_VALIDATORS);
        if num_validators == 0 {
            return Err(Error::invalid_config(format!(
                "chain {} must have at least one validator",
                config.chain_id
            )));
        }

        Ok(ResolvedChainSpec {
            config,
            num_validators,
            num_full_nodes: self.num_full_nodes.unwrap_or(DEFAULT_NUM_FULL_NODES),
        })
    }
}

/// A [`ChainSpec`] after default resolution and validation.
#[derive(Clone, Debug)]
pub struct ResolvedChainSpec {
    pub config: ChainConfig,
    pub num_validators: usize,
    pub num_full_nodes: usize,
}

/// An `{address, denom, amount}` triple appended to a chain's genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAmount {
    pub address: String,
    pub denom: String,
    pub amount: u128,
}

/// Per-process test configuration, read once from the environment.
#[derive(Clone, Debug)]
pub struct TestConfig {
    /// The enclosing test's name. Keys the cleanup label on every
    /// container, volume, and network created for the test.
    pub test_name: String,
    /// Random per-run suffix keeping parallel runs of the same test
    /// from colliding on Docker object names.
    pub run_id: u32,
    /// When set, the finalized genesis of the chain named by
    /// `export_genesis_chain` is also written to this host path.
    pub export_genesis_file_path: Option<PathBuf>,
    pub export_genesis_chain: Option<String>,
}

impl TestConfig {
    pub fn from_env(test_name: &str) -> Self {
        Self {
            test_name: test_name.to_string(),
            run_id: random_u32(),
            export_genesis_file_path: env::var("EXPORT_GENESIS_FILE_PATH")
                .ok()
                .map(PathBuf::from),
            export_genesis_chain: env::var("EXPORT_GENESIS_CHAIN").ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn juno_config() -> ChainConfig {
        ChainConfig {
            chain_type: "cosmos".to_string(),
            name: "juno".to_string(),
            chain_id: "localjuno-1".to_string(),
            images: vec![DockerImage::new("ghcr.io/strangelove-ventures/heighliner/juno", "v19.0.0", "1025:1025")],
            bin: "junod".to_string(),
            bech32_prefix: "juno".to_string(),
            denom: "ujuno".to_string(),
            coin_type: DEFAULT_COIN_TYPE,
            coin_decimals: DEFAULT_COIN_DECIMALS,
            gas_prices: "0.0025ujuno".to_string(),
            gas_adjustment: 1.3,
            trusting_period: "336h".to_string(),
            modify_genesis: vec![GenesisKV::new(
                "app_state.gov.params.voting_period",
                json!("15s"),
            )],
            accounts: vec![],
            config_file_overrides: BTreeMap::new(),
            additional_start_args: vec![],
            env: vec![],
            startup_commands: vec![],
            validator_amounts: vec![],
        }
    }

    #[test]
    fn spec_defaults_are_applied() {
        let resolved = ChainSpec::new(juno_config()).resolve().unwrap();
        assert_eq!(resolved.num_validators, DEFAULT_NUM_VALIDATORS);
        assert_eq!(resolved.num_full_nodes, DEFAULT_NUM_FULL_NODES);
    }

    #[test]
    fn version_override_rewrites_all_images() {
        let mut spec = ChainSpec::new(juno_config());
        spec.version = Some("v20.0.0".to_string());
        let resolved = spec.resolve().unwrap();
        assert_eq!(resolved.config.images[0].version, "v20.0.0");
    }

    #[test]
    fn zero_validators_is_rejected() {
        let spec = ChainSpec::new(juno_config()).with_validators(0);
        assert!(spec.resolve().is_err());
    }

    #[test]
    fn missing_denom_is_rejected() {
        let mut config = juno_config();
        config.denom = String::new();
        assert!(ChainSpec::new(config).resolve().is_err());
    }

    #[test]
    fn genesis_amounts_scale_with_decimals() {
        let config = juno_config();
        assert_eq!(config.genesis_amount(), 10_000_000_000_000);
        assert_eq!(config.self_delegation_amount(), 5_000_000_000_000);
    }

    #[test]
    fn validator_amounts_override_per_index() {
        let mut config = juno_config();
        config.validator_amounts = vec![ValidatorAmounts {
            genesis: 11_000_000_000,
            self_delegation: 1_000_000_000,
        }];

        assert_eq!(config.genesis_amount_for(0), 11_000_000_000);
        assert_eq!(config.self_delegation_for(0), 1_000_000_000);
        // Validators beyond the override list keep the defaults.
        assert_eq!(config.genesis_amount_for(1), config.genesis_amount());
        assert_eq!(
            config.self_delegation_for(1),
            config.self_delegation_amount()
        );
    }

    #[test]
    fn chain_spec_deserializes_from_json() {
        let spec: ChainSpec = serde_json::from_value(json!({
            "chain_config": {
                "name": "gaia",
                "chain_id": "localcosmos-1",
                "images": [ { "repository": "gaia", "version": "v14.1.0" } ],
                "bin": "gaiad",
                "bech32_prefix": "cosmos",
                "denom": "uatom",
                "gas_prices": "0.0025uatom"
            },
            "num_validators": 4
        }))
        .unwrap();

        let resolved = spec.resolve().unwrap();
        assert_eq!(resolved.num_validators, 4);
        assert_eq!(resolved.config.coin_type, DEFAULT_COIN_TYPE);
        assert_eq!(resolved.config.images[0].uid_gid, "1025:1025");
    }
}

//! Chain specifications shared by the scenarios. Images come from the
//! heighliner registry and are pinned so runs stay reproducible.

use interchain_test_framework::prelude::*;

pub const GAIA_CHAIN_ID: &str = "localcosmos-1";
pub const JUNO_CHAIN_ID: &str = "localjuno-1";
pub const OSMOSIS_CHAIN_ID: &str = "localosmosis-1";
pub const PROVIDER_CHAIN_ID: &str = "provider-1";
pub const CONSUMER_CHAIN_ID: &str = "consumer-1";

fn base_config(
    name: &str,
    chain_id: &str,
    image: &str,
    version: &str,
    bin: &str,
    prefix: &str,
    denom: &str,
) -> ChainConfig {
    ChainConfig {
        chain_type: "cosmos".to_string(),
        name: name.to_string(),
        chain_id: chain_id.to_string(),
        images: vec![DockerImage::new(image, version, "1025:1025")],
        bin: bin.to_string(),
        bech32_prefix: prefix.to_string(),
        denom: denom.to_string(),
        coin_type: 118,
        coin_decimals: 6,
        gas_prices: format!("0.0025{denom}"),
        gas_adjustment: 1.3,
        trusting_period: "336h".to_string(),
        modify_genesis: vec![],
        accounts: vec![],
        config_file_overrides: Default::default(),
        additional_start_args: vec![],
        env: vec![],
        startup_commands: vec![],
        validator_amounts: vec![],
    }
}

fn fast_gov(mut spec: ChainSpec, denom: &str) -> ChainSpec {
    spec.chain_config.modify_genesis = vec![
        GenesisKV::new(
            "app_state.gov.params.voting_period",
            serde_json::json!("20s"),
        ),
        GenesisKV::new(
            "app_state.gov.params.min_deposit",
            serde_json::json!([{ "denom": denom, "amount": "1000000" }]),
        ),
    ];
    spec
}

pub fn gaia() -> ChainSpec {
    ChainSpec::new(base_config(
        "gaia",
        GAIA_CHAIN_ID,
        "ghcr.io/strangelove-ventures/heighliner/gaia",
        "v14.1.0",
        "gaiad",
        "cosmos",
        "uatom",
    ))
}

pub fn juno() -> ChainSpec {
    ChainSpec::new(base_config(
        "juno",
        JUNO_CHAIN_ID,
        "ghcr.io/strangelove-ventures/heighliner/juno",
        "v19.0.0",
        "junod",
        "juno",
        "ujuno",
    ))
}

/// Osmosis ships the packet-forward middleware, which the multihop
/// scenario relies on.
pub fn osmosis() -> ChainSpec {
    ChainSpec::new(base_config(
        "osmosis",
        OSMOSIS_CHAIN_ID,
        "ghcr.io/strangelove-ventures/heighliner/osmosis",
        "v25.0.0",
        "osmosisd",
        "osmo",
        "uosmo",
    ))
}

/// A chain with a short voting period so governance scenarios finish
/// within a few blocks.
pub fn fast_gov_juno() -> ChainSpec {
    fast_gov(juno(), "ujuno")
}

/// Gaia with fast governance, used by the upgrade scenario: v14 carries
/// a registered `v15` upgrade handler, so the chain can halt on a
/// software-upgrade proposal and resume on the v15 image.
pub fn fast_gov_gaia() -> ChainSpec {
    fast_gov(gaia(), "uatom")
}

/// The image tag the upgrade scenario restarts gaia on.
pub const GAIA_UPGRADE_VERSION: &str = "v15.2.0";

/// The upgrade handler name baked into the gaia v15 binary.
pub const GAIA_UPGRADE_NAME: &str = "v15";

pub fn ics_provider() -> ChainSpec {
    ChainSpec::new(base_config(
        "ics-provider",
        PROVIDER_CHAIN_ID,
        "ghcr.io/strangelove-ventures/heighliner/ics",
        "v3.1.0",
        "interchain-security-pd",
        "cosmos",
        "stake",
    ))
}

pub fn ics_consumer() -> ChainSpec {
    ChainSpec::new(base_config(
        "ics-consumer",
        CONSUMER_CHAIN_ID,
        "ghcr.io/strangelove-ventures/heighliner/ics",
        "v3.1.0",
        "interchain-security-cd",
        "cosmos",
        "stake",
    ))
}

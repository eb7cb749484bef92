/*!
   Genesis document post-processing.

   After `collect-gentxs` produces the canonical genesis on the first
   validator, the bytes pass through these helpers before fan-out:
   denom substitution, the chain spec's ordered dotted-path overrides, and
   (for ICS consumers) ccvconsumer injection. Equality across nodes is
   checked by SHA-256.
*/

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::Error;
use crate::types::config::GenesisKV;
use crate::util::json::set_json_path;

/// Replace the SDK default `"stake"` denom with the chain's denom.
/// Operates on raw bytes so it reaches every occurrence, including
/// ones nested inside gentx blobs.
pub fn substitute_stake_denom(genesis: &[u8], denom: &str) -> Vec<u8> {
    let patched = String::from_utf8_lossy(genesis).replace("\"stake\"", &format!("\"{denom}\""));
    patched.into_bytes()
}

/// Apply the chain spec's ordered `(path, value)` overrides.
pub fn apply_genesis_overrides(genesis: &[u8], overrides: &[GenesisKV]) -> Result<Vec<u8>, Error> {
    if overrides.is_empty() {
        return Ok(genesis.to_vec());
    }

    let mut doc: Value = serde_json::from_slice(genesis)?;
    for kv in overrides {
        set_json_path(&mut doc, &kv.key, kv.value.clone())?;
    }
    serde_json::to_vec(&doc).map_err(Error::json_parse)
}

/// Insert a provider-emitted consumer section at
/// `app_state.ccvconsumer`.
pub fn inject_consumer_genesis(genesis: &[u8], ccv_section: Value) -> Result<Vec<u8>, Error> {
    let mut doc: Value = serde_json::from_slice(genesis)?;
    set_json_path(&mut doc, "app_state.ccvconsumer", ccv_section)?;
    serde_json::to_vec(&doc).map_err(Error::json_parse)
}

/// Hex SHA-256 of a genesis document, logged per node after fan-out.
pub fn genesis_sha256(genesis: &[u8]) -> String {
    hex::encode(Sha256::digest(genesis))
}

/// `node_id@hostname:26656` entries joined into a persistent_peers
/// string.
pub fn persistent_peers(peers: &[(String, String)]) -> String {
    peers
        .iter()
        .map(|(node_id, hostname)| format!("{node_id}@{hostname}:26656"))
        .collect::<Vec<_>>()
        .join(",")
}

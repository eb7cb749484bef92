/*!
   Deterministic wallet derivation.

   Keys derive from a BIP-39 mnemonic along the BIP-44 path
   `m/44'/<coin_type>'/0'/0/0`. The account address is
   `ripemd160(sha256(compressed_pubkey))`, formatted with the chain's
   bech32 prefix. No process-wide prefix state exists: the prefix
   travels with the wallet, so chains with different prefixes coexist
   in one test process.
*/

use bip32::{DerivationPath, XPrv};
use bip39::{Language, Mnemonic};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use subtle_encoding::bech32;

use crate::error::{handle_generic_error, Error};

/// A funded (or to-be-funded) account on one chain.
///
/// Two wallets refer to the same account iff their raw address bytes
/// match, regardless of bech32 prefix.
#[derive(Clone, Debug)]
pub struct Wallet {
    /// Name of the key inside the node's test keyring.
    pub key_name: String,
    pub mnemonic: String,
    /// Raw 20-byte account address.
    pub address: Vec<u8>,
    pub bech32_prefix: String,
    pub coin_type: u32,
}

impl PartialEq for Wallet {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.bech32_prefix == other.bech32_prefix
    }
}

impl Eq for Wallet {}

impl Wallet {
    /// Derive a wallet from an existing mnemonic.
    pub fn from_mnemonic(
        key_name: &str,
        mnemonic: &str,
        bech32_prefix: &str,
        coin_type: u32,
    ) -> Result<Self, Error> {
        let parsed =
            Mnemonic::parse_in(Language::English, mnemonic).map_err(handle_generic_error)?;
        let address = derive_address(&parsed, coin_type)?;

        Ok(Self {
            key_name: key_name.to_string(),
            mnemonic: mnemonic.to_string(),
            address,
            bech32_prefix: bech32_prefix.to_string(),
            coin_type,
        })
    }

    /// Generate a wallet from a fresh 24-word mnemonic.
    pub fn new_random(key_name: &str, bech32_prefix: &str, coin_type: u32) -> Result<Self, Error> {
        let mnemonic = Mnemonic::generate_in(Language::English, 24).map_err(handle_generic_error)?;
        let address = derive_address(&mnemonic, coin_type)?;

        Ok(Self {
            key_name: key_name.to_string(),
            mnemonic: mnemonic.to_string(),
            address,
            bech32_prefix: bech32_prefix.to_string(),
            coin_type,
        })
    }

    /// The bech32-formatted account address.
    pub fn formatted_address(&self) -> String {
        bech32::encode(&self.bech32_prefix, &self.address)
    }

    /// The same account formatted under another chain's prefix, used
    /// when one mnemonic is restored on both ends of an IBC path.
    pub fn address_with_prefix(&self, prefix: &str) -> String {
        bech32::encode(prefix, &self.address)
    }
}

fn derive_address(mnemonic: &Mnemonic, coin_type: u32) -> Result<Vec<u8>, Error> {
    let seed = mnemonic.to_seed("");

    let path: DerivationPath = format!("m/44'/{coin_type}'/0'/0/0")
        .parse()
        .map_err(handle_generic_error)?;
    let key = XPrv::derive_from_path(seed, &path).map_err(handle_generic_error)?;

    let pubkey = key.public_key().to_bytes();
    let hash = Sha256::digest(pubkey);
    let address = Ripemd160::digest(hash);

    Ok(address.to_vec())
}

/// Substitute the `%DENOM%` placeholder in a spec-supplied amount
/// string, such as `"10000000%DENOM%"`.
pub fn substitute_denom(amount: &str, denom: &str) -> String {
    amount.replace("%DENOM%", denom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon \
         abandon abandon abandon about";

    #[test]
    fn derivation_is_deterministic() {
        let a = Wallet::from_mnemonic("user", TEST_MNEMONIC, "cosmos", 118).unwrap();
        let b = Wallet::from_mnemonic("user2", TEST_MNEMONIC, "cosmos", 118).unwrap();
        assert_eq!(a.address, b.address);
        assert_eq!(a.formatted_address(), b.address_with_prefix("cosmos"));
    }

    #[test]
    fn formatted_address_carries_the_prefix() {
        let w = Wallet::from_mnemonic("user", TEST_MNEMONIC, "juno", 118).unwrap();
        assert!(w.formatted_address().starts_with("juno1"));
        assert_eq!(w.address.len(), 20);
    }

    #[test]
    fn same_bytes_under_two_prefixes_are_the_same_account() {
        let w = Wallet::from_mnemonic("user", TEST_MNEMONIC, "cosmos", 118).unwrap();
        let juno = w.address_with_prefix("juno");
        let decoded = bech32::decode(&juno).unwrap();
        assert_eq!(decoded.1, w.address);
    }

    #[test]
    fn coin_type_changes_the_derived_address() {
        let atom = Wallet::from_mnemonic("user", TEST_MNEMONIC, "cosmos", 118).unwrap();
        let eth = Wallet::from_mnemonic("user", TEST_MNEMONIC, "cosmos", 60).unwrap();
        assert_ne!(atom.address, eth.address);
    }

    #[test]
    fn random_wallets_are_distinct() {
        let a = Wallet::new_random("faucet", "juno", 118).unwrap();
        let b = Wallet::new_random("faucet", "juno", 118).unwrap();
        assert_ne!(a.mnemonic, b.mnemonic);
        assert_ne!(a, b);
    }

    #[test]
    fn denom_placeholder_substitution() {
        assert_eq!(substitute_denom("100%DENOM%", "ujuno"), "100ujuno");
        assert_eq!(substitute_denom("100uatom", "ujuno"), "100uatom");
    }
}

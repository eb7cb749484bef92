/*!
   Staking module wrappers.
*/

use serde_json::Value;

use crate::chain::cosmos::CosmosChain;
use crate::error::Error;

impl CosmosChain {
    pub async fn delegate(
        &self,
        key_name: &str,
        validator_address: &str,
        amount: u128,
    ) -> Result<(), Error> {
        let coin = format!("{}{}", amount, self.config.denom);
        self.designated_node()
            .exec_tx(key_name, &["staking", "delegate", validator_address, &coin])
            .await?;
        Ok(())
    }

    /// The chain's bonded validator set.
    pub async fn query_validators(&self) -> Result<Vec<Value>, Error> {
        let response = self
            .designated_node()
            .exec_query(&["staking", "validators"])
            .await?;
        Ok(response
            .get("validators")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Bonded tokens of one validator, looked up by operator address.
    pub async fn query_validator_bonded(&self, operator_address: &str) -> Result<u128, Error> {
        let response = self
            .designated_node()
            .exec_query(&["staking", "validator", operator_address])
            .await?;

        // SDK >= 0.50 nests under "validator".
        let tokens = response
            .pointer("/validator/tokens")
            .or_else(|| response.get("tokens"))
            .and_then(Value::as_str)
            .unwrap_or("0");
        tokens
            .parse::<u128>()
            .map_err(|_| Error::invalid_config(format!("unparseable bonded tokens {tokens}")))
    }
}

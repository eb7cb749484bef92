/*!
   Bank module wrappers beyond the core `send_funds`/`get_balance`.
*/

use serde_json::Value;

use crate::chain::cosmos::CosmosChain;
use crate::error::Error;
use crate::types::config::WalletAmount;

impl CosmosChain {
    /// Every balance held by an address.
    pub async fn all_balances(&self, address: &str) -> Result<Vec<WalletAmount>, Error> {
        let response = self
            .designated_node()
            .exec_query(&["bank", "balances", address])
            .await?;

        let mut balances = Vec::new();
        for entry in response
            .get("balances")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
        {
            let denom = entry
                .get("denom")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let amount = entry
                .get("amount")
                .and_then(Value::as_str)
                .and_then(|a| a.parse::<u128>().ok())
                .unwrap_or_default();
            balances.push(WalletAmount {
                address: address.to_string(),
                denom,
                amount,
            });
        }
        Ok(balances)
    }

    /// Total supply of one denom across the chain.
    pub async fn total_supply_of(&self, denom: &str) -> Result<u128, Error> {
        let response = self
            .designated_node()
            .exec_query(&["bank", "total", "--denom", denom])
            .await?;

        let amount = response
            .get("amount")
            .and_then(Value::as_str)
            .unwrap_or("0");
        amount
            .parse::<u128>()
            .map_err(|_| Error::invalid_config(format!("unparseable supply amount {amount}")))
    }
}

/*!
   CosmWasm module wrappers: store, instantiate, execute, query.
*/

use serde_json::Value;

use crate::chain::cosmos::CosmosChain;
use crate::chain::node::CHAIN_HOME;
use crate::error::Error;

impl CosmosChain {
    /// Upload contract bytecode and return the assigned code id.
    pub async fn store_contract(&self, key_name: &str, wasm: &[u8]) -> Result<String, Error> {
        let node = self.designated_node();

        let rel_path = "contract.wasm";
        node.write_file(rel_path, wasm).await?;

        let file_arg = format!("{CHAIN_HOME}/{rel_path}");
        let tx_hash = node.exec_tx(key_name, &["wasm", "store", &file_arg]).await?;

        let response = node.get_transaction(&tx_hash).await?;
        response
            .tx_result
            .events
            .iter()
            .find(|e| e.kind == "store_code")
            .and_then(|e| e.attribute("code_id"))
            .map(str::to_string)
            .ok_or_else(|| Error::packet_event_missing("store_code".to_string(), tx_hash))
    }

    /// Instantiate a stored contract and return its address.
    pub async fn instantiate_contract(
        &self,
        key_name: &str,
        code_id: &str,
        init_msg: &str,
        label: &str,
    ) -> Result<String, Error> {
        let node = self.designated_node();
        let tx_hash = node
            .exec_tx(
                key_name,
                &[
                    "wasm",
                    "instantiate",
                    code_id,
                    init_msg,
                    "--label",
                    label,
                    "--no-admin",
                ],
            )
            .await?;

        let response = node.get_transaction(&tx_hash).await?;
        response
            .tx_result
            .events
            .iter()
            .find(|e| e.kind == "instantiate")
            .and_then(|e| e.attribute("_contract_address"))
            .map(str::to_string)
            .ok_or_else(|| Error::packet_event_missing("instantiate".to_string(), tx_hash))
    }

    pub async fn execute_contract(
        &self,
        key_name: &str,
        contract_address: &str,
        msg: &str,
    ) -> Result<String, Error> {
        self.designated_node()
            .exec_tx(key_name, &["wasm", "execute", contract_address, msg])
            .await
    }

    /// Run a smart query against contract state.
    pub async fn query_contract(&self, contract_address: &str, query: &str) -> Result<Value, Error> {
        let response = self
            .designated_node()
            .exec_query(&["wasm", "contract-state", "smart", contract_address, query])
            .await?;
        Ok(response.get("data").cloned().unwrap_or(response))
    }
}

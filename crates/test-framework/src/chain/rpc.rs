/*!
   Minimal CometBFT JSON-RPC client over HTTP.

   Only the four endpoints the framework needs: `status`, `block`,
   `block_results`, and `tx`. All numbers arrive as JSON strings and
   are parsed at the edge.
*/

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;
use crate::types::tx::TxEvent;

/// Client for one node's RPC endpoint, such as `http://127.0.0.1:32779`.
#[derive(Clone, Debug)]
pub struct CometRpcClient {
    http: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    message: String,
    #[serde(default)]
    data: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StatusResponse {
    pub node_info: NodeInfo,
    pub sync_info: SyncInfo,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeInfo {
    pub id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SyncInfo {
    pub latest_block_height: String,
    pub catching_up: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlockResultsResponse {
    pub height: String,
    #[serde(default)]
    pub txs_results: Option<Vec<TxResult>>,
    /// Begin/end block events on older chains, finalize events on
    /// newer ones; both shapes share the event record.
    #[serde(default)]
    pub finalize_block_events: Option<Vec<TxEvent>>,
    #[serde(default)]
    pub end_block_events: Option<Vec<TxEvent>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TxResult {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub gas_used: String,
    #[serde(default)]
    pub events: Vec<TxEvent>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TxResponse {
    pub hash: String,
    pub height: String,
    pub tx_result: TxResult,
    /// Base64 raw tx bytes.
    pub tx: String,
}

impl CometRpcClient {
    pub fn new(host_endpoint: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: format!("http://{host_endpoint}"),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = format!("{}/{}", self.url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::rpc(url.clone(), e))?;

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| Error::rpc(url.clone(), e))?;

        match (envelope.result, envelope.error) {
            (Some(result), _) => Ok(result),
            (None, Some(err)) => Err(Error::invalid_config(format!(
                "rpc {} failed: {} {}",
                url, err.message, err.data
            ))),
            (None, None) => Err(Error::invalid_config(format!(
                "rpc {url} returned neither result nor error"
            ))),
        }
    }

    pub async fn status(&self) -> Result<StatusResponse, Error> {
        self.call("status").await
    }

    /// Latest finalized height, zero while the node is still catching
    /// up to its own genesis.
    pub async fn height(&self) -> Result<u64, Error> {
        let status = self.status().await?;
        parse_height(&status.sync_info.latest_block_height)
    }

    /// The raw block at a height, kept dynamic: only the tx list is
    /// read out of it and its schema varies across CometBFT versions.
    pub async fn block(&self, height: u64) -> Result<Value, Error> {
        self.call(&format!("block?height={height}")).await
    }

    /// Base64 tx blobs in the block at `height`.
    pub async fn block_txs(&self, height: u64) -> Result<Vec<String>, Error> {
        let block = self.block(height).await?;
        let txs = block
            .pointer("/block/data/txs")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(txs
            .into_iter()
            .filter_map(|tx| tx.as_str().map(str::to_string))
            .collect())
    }

    pub async fn block_results(&self, height: u64) -> Result<BlockResultsResponse, Error> {
        self.call(&format!("block_results?height={height}")).await
    }

    pub async fn tx(&self, hash: &str) -> Result<TxResponse, Error> {
        self.call(&format!("tx?hash=0x{hash}")).await
    }
}

pub(crate) fn parse_height(height: &str) -> Result<u64, Error> {
    height
        .parse::<u64>()
        .map_err(|_| Error::invalid_config(format!("unparseable block height {height}")))
}

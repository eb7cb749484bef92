/*!
   Authz module wrappers.
*/

use serde_json::Value;

use crate::chain::cosmos::CosmosChain;
use crate::error::Error;

impl CosmosChain {
    /// Grant `grantee` authorization to execute messages of
    /// `authorization_type` (such as `send` or `generic`) on behalf of
    /// the granter key.
    pub async fn authz_grant(
        &self,
        granter_key: &str,
        grantee_address: &str,
        authorization_type: &str,
        extra_flags: &[&str],
    ) -> Result<(), Error> {
        let mut args = vec!["authz", "grant", grantee_address, authorization_type];
        args.extend_from_slice(extra_flags);
        self.designated_node().exec_tx(granter_key, &args).await?;
        Ok(())
    }

    /// Execute a previously granted transaction from a file of signed
    /// messages in the node volume.
    pub async fn authz_exec(&self, grantee_key: &str, tx_file_path: &str) -> Result<(), Error> {
        self.designated_node()
            .exec_tx(grantee_key, &["authz", "exec", tx_file_path])
            .await?;
        Ok(())
    }

    pub async fn authz_revoke(
        &self,
        granter_key: &str,
        grantee_address: &str,
        msg_type_url: &str,
    ) -> Result<(), Error> {
        self.designated_node()
            .exec_tx(granter_key, &["authz", "revoke", grantee_address, msg_type_url])
            .await?;
        Ok(())
    }

    /// Grants issued by a granter to a grantee.
    pub async fn authz_query_grants(
        &self,
        granter_address: &str,
        grantee_address: &str,
    ) -> Result<Vec<Value>, Error> {
        let response = self
            .designated_node()
            .exec_query(&["authz", "grants", granter_address, grantee_address])
            .await?;
        Ok(response
            .get("grants")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }
}

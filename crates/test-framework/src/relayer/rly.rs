/*!
   The Go relayer (`rly`) driven inside Docker.

   Setup commands run as one-shot job containers sharing the relayer's
   home volume; `rly start` runs as a long-running container reaped by
   the test's cleanup label.
*/

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::chain::cosmos::CosmosChain;
use crate::dockerutil::container::{ContainerLifecycle, ContainerOptions};
use crate::dockerutil::job::{run_job, JobOptions};
use crate::dockerutil::{file, volume, DockerEnv};
use crate::error::Error;
use crate::ibc::channel::{
    ChannelOutput, ConnectionOutput, CreateChannelOptions, CreateClientOptions,
};
use crate::relayer::Relayer;
use crate::types::config::DockerImage;
use crate::types::wallet::Wallet;
use crate::util::random::sanitize_container_name;

const RLY_HOME: &str = "/home/relayer";
const RLY_BIN: &str = "rly";

pub const DEFAULT_RLY_REPOSITORY: &str = "ghcr.io/cosmos/relayer";
pub const DEFAULT_RLY_VERSION: &str = "latest";
const RLY_UID_GID: &str = "100:1000";

pub struct RlyRelayer {
    image: DockerImage,
    env: Option<DockerEnv>,
    volume_name: Option<String>,
    container: Option<ContainerLifecycle>,
}

impl RlyRelayer {
    /// Declare a relayer. Nothing touches Docker until [`Relayer::initialize`]
    /// runs during the interchain build.
    pub fn new(image: Option<DockerImage>) -> Self {
        let image = image.unwrap_or_else(|| {
            DockerImage::new(DEFAULT_RLY_REPOSITORY, DEFAULT_RLY_VERSION, RLY_UID_GID)
        });
        Self {
            image,
            env: None,
            volume_name: None,
            container: None,
        }
    }

    fn env(&self) -> Result<&DockerEnv, Error> {
        self.env.as_ref().ok_or_else(|| {
            Error::invalid_config("relayer used before it was initialized".to_string())
        })
    }

    fn volume(&self) -> Result<&str, Error> {
        self.volume_name.as_deref().ok_or_else(|| {
            Error::invalid_config("relayer used before it was initialized".to_string())
        })
    }

    fn job_options(&self) -> Result<JobOptions, Error> {
        Ok(JobOptions {
            image: self.image.reference(),
            binds: vec![format!("{}:{}", self.volume()?, RLY_HOME)],
            env: Vec::new(),
            user: Some(self.image.uid_gid.clone()),
        })
    }

    async fn exec(&self, args: &[&str]) -> Result<String, Error> {
        let mut cmd = vec![RLY_BIN.to_string()];
        cmd.extend(args.iter().map(|s| s.to_string()));
        cmd.extend(["--home".to_string(), RLY_HOME.to_string()]);

        let output = run_job(self.env()?, "rly", &self.job_options()?, &cmd).await?;
        let output = output.into_result(&format!("rly {}", args.join(" ")))?;
        Ok(output.stdout_str())
    }

    fn chain_config_json(chain: &CosmosChain, key_name: &str) -> serde_json::Value {
        let rpc_addr = format!("http://{}:26657", chain.designated_node().hostname());
        json!({
            "type": "cosmos",
            "value": {
                "key": key_name,
                "chain-id": chain.chain_id(),
                "rpc-addr": rpc_addr,
                "account-prefix": chain.config.bech32_prefix,
                "keyring-backend": "test",
                "gas-adjustment": chain.config.gas_adjustment,
                "gas-prices": chain.config.gas_prices,
                "coin-type": chain.config.coin_type,
                "debug": true,
                "timeout": "10s",
                "output-format": "json",
                "sign-mode": "direct"
            }
        })
    }
}

#[async_trait]
impl Relayer for RlyRelayer {
    async fn initialize(&mut self, env: &DockerEnv) -> Result<(), Error> {
        env.pull_image(&self.image).await?;

        let volume_name = env
            .create_volume(&sanitize_container_name(&format!("rly-{}", env.test_name)))
            .await?;
        volume::set_volume_owner(env, &volume_name, &self.image.uid_gid).await?;

        self.env = Some(env.clone());
        self.volume_name = Some(volume_name);

        self.exec(&["config", "init"]).await?;
        Ok(())
    }

    async fn add_chain(&self, chain: &CosmosChain, key_name: &str) -> Result<(), Error> {
        let config = Self::chain_config_json(chain, key_name);
        let rel_path = format!("{}.json", chain.chain_id());
        file::write_file(
            self.env()?,
            self.volume()?,
            &self.image.uid_gid,
            &rel_path,
            &serde_json::to_vec_pretty(&config)?,
        )
        .await?;

        let file_arg = format!("{RLY_HOME}/{rel_path}");
        self.exec(&["chains", "add", "--file", &file_arg, chain.chain_id()])
            .await?;
        info!("added chain {} to relayer config", chain.chain_id());
        Ok(())
    }

    async fn restore_key(&self, chain: &CosmosChain, wallet: &Wallet) -> Result<(), Error> {
        let coin_type = chain.config.coin_type.to_string();
        self.exec(&[
            "keys",
            "restore",
            chain.chain_id(),
            &wallet.key_name,
            &wallet.mnemonic,
            "--coin-type",
            &coin_type,
        ])
        .await?;
        Ok(())
    }

    async fn generate_path(
        &self,
        path_name: &str,
        src_chain_id: &str,
        dst_chain_id: &str,
    ) -> Result<(), Error> {
        self.exec(&["paths", "new", src_chain_id, dst_chain_id, path_name])
            .await?;
        Ok(())
    }

    async fn create_clients(
        &self,
        path_name: &str,
        opts: &CreateClientOptions,
    ) -> Result<(), Error> {
        let mut args = vec!["tx", "clients", path_name];
        if !opts.trusting_period.is_empty() {
            args.extend(["--client-tp", opts.trusting_period.as_str()]);
        }
        self.exec(&args).await?;
        Ok(())
    }

    async fn create_connections(&self, path_name: &str) -> Result<(), Error> {
        self.exec(&["tx", "connection", path_name]).await?;
        Ok(())
    }

    async fn create_channel(
        &self,
        path_name: &str,
        opts: &CreateChannelOptions,
    ) -> Result<(), Error> {
        let order = opts.order.to_string();
        self.exec(&[
            "tx",
            "channel",
            path_name,
            "--src-port",
            &opts.source_port_name,
            "--dst-port",
            &opts.dest_port_name,
            "--order",
            &order,
            "--version",
            &opts.version,
        ])
        .await?;
        Ok(())
    }

    async fn link_path(
        &self,
        path_name: &str,
        channel_opts: &CreateChannelOptions,
        client_opts: &CreateClientOptions,
    ) -> Result<(), Error> {
        let order = channel_opts.order.to_string();
        let mut args = vec![
            "tx",
            "link",
            path_name,
            "--src-port",
            channel_opts.source_port_name.as_str(),
            "--dst-port",
            channel_opts.dest_port_name.as_str(),
            "--order",
            order.as_str(),
            "--version",
            channel_opts.version.as_str(),
        ];
        if !client_opts.trusting_period.is_empty() {
            args.extend(["--client-tp", client_opts.trusting_period.as_str()]);
        }
        self.exec(&args).await?;
        info!("linked path {}", path_name);
        Ok(())
    }

    async fn start(&mut self, path_names: &[String]) -> Result<(), Error> {
        if self.container.is_some() {
            return Err(Error::invalid_config(
                "relayer is already running".to_string(),
            ));
        }

        let env = self.env()?.clone();
        let container_name = sanitize_container_name(&format!("rly-start-{}", env.test_name));
        let mut container = ContainerLifecycle::new(env.client.clone(), container_name);

        let mut cmd = vec![RLY_BIN.to_string(), "start".to_string()];
        cmd.extend(path_names.iter().cloned());
        cmd.extend([
            "--home".to_string(),
            RLY_HOME.to_string(),
            "-p".to_string(),
            "events".to_string(),
            "-b".to_string(),
            "100".to_string(),
        ]);

        let opts = ContainerOptions {
            image: self.image.reference(),
            cmd,
            env: Vec::new(),
            hostname: container.name().to_string(),
            binds: vec![format!("{}:{}", self.volume()?, RLY_HOME)],
            exposed_ports: Vec::new(),
            user: Some(self.image.uid_gid.clone()),
            entrypoint: None,
        };

        container.create(&env, opts).await?;
        container.start().await?;

        info!("relayer started over paths [{}]", path_names.join(", "));
        self.container = Some(container);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Error> {
        let Some(mut container) = self.container.take() else {
            debug!("relayer stop requested but it was never started");
            return Ok(());
        };
        container.stop(10).await?;
        container.remove().await?;
        info!("relayer stopped");
        Ok(())
    }

    async fn flush(&self, path_name: &str, channel_id: &str) -> Result<(), Error> {
        self.exec(&["tx", "flush", path_name, channel_id]).await?;
        Ok(())
    }

    async fn update_clients(&self, path_name: &str) -> Result<(), Error> {
        self.exec(&["tx", "update-clients", path_name]).await?;
        Ok(())
    }

    async fn get_channels(&self, chain_id: &str) -> Result<Vec<ChannelOutput>, Error> {
        let output = self.exec(&["q", "channels", chain_id]).await?;
        parse_json_lines(&output)
    }

    async fn get_connections(&self, chain_id: &str) -> Result<Vec<ConnectionOutput>, Error> {
        let output = self.exec(&["q", "connections", chain_id]).await?;
        parse_json_lines(&output)
    }
}

/// `rly q` commands emit one JSON document per line.
fn parse_json_lines<T: serde::de::DeserializeOwned>(output: &str) -> Result<Vec<T>, Error> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).map_err(Error::json_parse))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_listings_parse_line_by_line() {
        let output = concat!(
            r#"{"state":"STATE_OPEN","ordering":"ORDER_UNORDERED","counterparty":{"port_id":"transfer","channel_id":"channel-1"},"connection_hops":["connection-0"],"version":"ics20-1","port_id":"transfer","channel_id":"channel-0"}"#,
            "\n",
            r#"{"state":"STATE_OPEN","ordering":"ORDER_ORDERED","counterparty":{"port_id":"provider","channel_id":"channel-2"},"connection_hops":["connection-0"],"version":"1","port_id":"consumer","channel_id":"channel-1"}"#,
            "\n",
        );

        let channels: Vec<ChannelOutput> = parse_json_lines(output).unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].channel_id, "channel-0");
        assert_eq!(channels[1].counterparty.channel_id, "channel-2");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let channels: Vec<ChannelOutput> = parse_json_lines("\n  \n").unwrap();
        assert!(channels.is_empty());
    }
}

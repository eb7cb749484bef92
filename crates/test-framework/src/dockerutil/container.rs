/*!
   Lifecycle of one long-running container, start to removal.
*/

use std::collections::HashMap;

use bollard::container::{
    Config, CreateContainerOptions, LogsOptions, RemoveContainerOptions, StartContainerOptions,
    StopContainerOptions,
};
use bollard::models::HostConfig;
use bollard::Docker;
use futures::StreamExt;
use tracing::{debug, info};

use super::DockerEnv;
use crate::error::Error;

/// Inputs for creating a node or relayer container.
#[derive(Clone, Debug, Default)]
pub struct ContainerOptions {
    /// `repository:tag` image reference.
    pub image: String,
    pub cmd: Vec<String>,
    /// `KEY=VALUE` environment entries.
    pub env: Vec<String>,
    /// Hostname on the overlay network; peers dial this name.
    pub hostname: String,
    /// `volume:path` bind entries.
    pub binds: Vec<String>,
    /// Internal ports to publish, as `"<num>/tcp"`.
    pub exposed_ports: Vec<String>,
    /// `uid:gid` to run as, matching the volume owner.
    pub user: Option<String>,
    pub entrypoint: Option<Vec<String>>,
}

/// One container the framework keeps alive across operations, as
/// opposed to the one-shot containers in [`super::job`].
pub struct ContainerLifecycle {
    client: Docker,
    container_name: String,
    id: Option<String>,
}

impl ContainerLifecycle {
    pub fn new(client: Docker, container_name: String) -> Self {
        Self {
            client,
            container_name,
            id: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.container_name
    }

    fn id(&self) -> Result<&str, Error> {
        self.id.as_deref().ok_or_else(|| {
            Error::invalid_config(format!(
                "container {} has not been created",
                self.container_name
            ))
        })
    }

    /// Whether `create` has run and `remove` has not.
    pub fn is_created(&self) -> bool {
        self.id.is_some()
    }

    pub async fn create(&mut self, env: &DockerEnv, opts: ContainerOptions) -> Result<(), Error> {
        let exposed_ports: HashMap<String, HashMap<(), ()>> = opts
            .exposed_ports
            .iter()
            .map(|p| (p.clone(), HashMap::new()))
            .collect();

        let host_config = HostConfig {
            binds: Some(opts.binds),
            network_mode: Some(env.network_name.clone()),
            publish_all_ports: Some(true),
            ..Default::default()
        };

        let config = Config {
            image: Some(opts.image),
            cmd: Some(opts.cmd),
            env: Some(opts.env),
            hostname: Some(opts.hostname),
            user: opts.user,
            entrypoint: opts.entrypoint,
            exposed_ports: Some(exposed_ports),
            labels: Some(env.labels()),
            host_config: Some(host_config),
            ..Default::default()
        };

        let created = self
            .client
            .create_container(
                Some(CreateContainerOptions {
                    name: self.container_name.clone(),
                    platform: None,
                }),
                config,
            )
            .await?;

        debug!("created container {} ({})", self.container_name, created.id);
        self.id = Some(created.id);
        Ok(())
    }

    pub async fn start(&self) -> Result<(), Error> {
        let id = self.id()?;
        self.client
            .start_container(id, None::<StartContainerOptions<String>>)
            .await?;
        info!("started container {}", self.container_name);
        Ok(())
    }

    pub async fn stop(&self, timeout_secs: i64) -> Result<(), Error> {
        let id = self.id()?;
        self.client
            .stop_container(id, Some(StopContainerOptions { t: timeout_secs }))
            .await?;
        info!("stopped container {}", self.container_name);
        Ok(())
    }

    pub async fn remove(&mut self) -> Result<(), Error> {
        if let Some(id) = self.id.take() {
            self.client
                .remove_container(
                    &id,
                    Some(RemoveContainerOptions {
                        force: true,
                        v: true,
                        ..Default::default()
                    }),
                )
                .await?;
            debug!("removed container {}", self.container_name);
        }
        Ok(())
    }

    /// The host-visible `<ip>:<port>` endpoint for an internal port such
    /// as `"26657/tcp"`.
    pub async fn host_endpoint(&self, internal_port: &str) -> Result<String, Error> {
        let id = self.id()?;
        let inspected = self.client.inspect_container(id, None).await?;

        let bindings = inspected
            .network_settings
            .and_then(|s| s.ports)
            .and_then(|mut ports| ports.remove(internal_port).flatten())
            .unwrap_or_default();

        let binding = bindings.first().ok_or_else(|| {
            Error::invalid_config(format!(
                "container {} does not publish port {}",
                self.container_name, internal_port
            ))
        })?;

        let ip = match binding.host_ip.as_deref() {
            None | Some("") | Some("0.0.0.0") | Some("::") => "127.0.0.1",
            Some(ip) => ip,
        };
        let port = binding.host_port.as_deref().ok_or_else(|| {
            Error::invalid_config(format!(
                "port {} of container {} has no host binding",
                internal_port, self.container_name
            ))
        })?;

        Ok(format!("{ip}:{port}"))
    }

    /// The last `tail` lines of combined stdout and stderr.
    pub async fn logs_tail(&self, tail: usize) -> Result<String, Error> {
        let id = self.id()?;
        let mut stream = self.client.logs(
            id,
            Some(LogsOptions::<String> {
                stdout: true,
                stderr: true,
                tail: tail.to_string(),
                ..Default::default()
            }),
        );

        let mut out = String::new();
        while let Some(chunk) = stream.next().await {
            out.push_str(&chunk?.to_string());
        }
        Ok(out)
    }

    /// Scan recent output for an SDK panic, surfacing it as an error
    /// instead of letting callers hang waiting for blocks that will
    /// never come.
    pub async fn detect_panic(&self) -> Result<(), Error> {
        let logs = self.logs_tail(100).await?;
        for line in logs.lines() {
            if line.starts_with("panic:") {
                return Err(Error::command_failed(
                    format!("start {}", self.container_name),
                    -1,
                    line.to_string(),
                ));
            }
        }
        Ok(())
    }
}

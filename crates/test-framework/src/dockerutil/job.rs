/*!
   One-shot job containers.

   Every CLI invocation against a node runs in a fresh container that
   shares the node's volume and network, rather than an exec inside the
   node container. The node container only ever runs `<bin> start`, so
   a wedged CLI call can never corrupt a validator process.
*/

use bollard::container::{Config, CreateContainerOptions, LogsOptions, RemoveContainerOptions, StartContainerOptions, WaitContainerOptions};
use bollard::container::LogOutput;
use bollard::models::HostConfig;
use futures::StreamExt;
use itertools::Itertools;
use tracing::debug;

use super::DockerEnv;
use crate::error::Error;
use crate::util::random::{rand_lower_case_string, sanitize_container_name};

/// Static inputs shared by every job run against one node.
#[derive(Clone, Debug, Default)]
pub struct JobOptions {
    /// `repository:tag` image reference.
    pub image: String,
    /// `volume:path` binds, normally the node's home volume.
    pub binds: Vec<String>,
    /// `KEY=VALUE` environment entries.
    pub env: Vec<String>,
    /// `uid:gid` matching the volume owner.
    pub user: Option<String>,
}

/// Output of a finished job.
#[derive(Clone, Debug, Default)]
pub struct RunOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i64,
}

impl RunOutput {
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Convert a non-zero exit into `CommandFailed`.
    pub fn into_result(self, command: &str) -> Result<RunOutput, Error> {
        if self.exit_code != 0 {
            let stderr = if self.stderr.is_empty() {
                self.stdout_str()
            } else {
                self.stderr_str()
            };
            return Err(Error::command_failed(
                command.to_string(),
                self.exit_code,
                stderr,
            ));
        }
        Ok(self)
    }
}

/// Run `cmd` to completion in a fresh container and collect both output
/// streams and the exit code. The container is removed afterwards even
/// on failure; leftovers from interrupted runs are reaped by the
/// label sweep.
pub async fn run_job(
    env: &DockerEnv,
    name_hint: &str,
    opts: &JobOptions,
    cmd: &[String],
) -> Result<RunOutput, Error> {
    let container_name = sanitize_container_name(&format!(
        "{}-{}-{}",
        env.test_name,
        name_hint,
        rand_lower_case_string(8),
    ));

    debug!("running [{}] in {}", cmd.iter().join(" "), container_name);

    let config = Config {
        image: Some(opts.image.clone()),
        cmd: Some(cmd.to_vec()),
        env: Some(opts.env.clone()),
        user: opts.user.clone(),
        labels: Some(env.labels()),
        host_config: Some(HostConfig {
            binds: Some(opts.binds.clone()),
            network_mode: Some(env.network_name.clone()),
            ..Default::default()
        }),
        ..Default::default()
    };

    let created = env
        .client
        .create_container(
            Some(CreateContainerOptions {
                name: container_name.clone(),
                platform: None,
            }),
            config,
        )
        .await?;

    let result = run_to_completion(env, &created.id).await;

    // Remove regardless of how the run went.
    let removed = env
        .client
        .remove_container(
            &created.id,
            Some(RemoveContainerOptions {
                force: true,
                v: true,
                ..Default::default()
            }),
        )
        .await;

    let output = result?;
    removed?;

    Ok(output)
}

async fn run_to_completion(env: &DockerEnv, id: &str) -> Result<RunOutput, Error> {
    env.client
        .start_container(id, None::<StartContainerOptions<String>>)
        .await?;

    let mut wait = env
        .client
        .wait_container(id, None::<WaitContainerOptions<String>>);

    let exit_code = match wait.next().await {
        Some(Ok(resp)) => resp.status_code,
        // Non-zero exits surface as a dedicated error variant.
        Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => code,
        Some(Err(e)) => return Err(e.into()),
        None => 0,
    };

    let mut logs = env.client.logs(
        id,
        Some(LogsOptions::<String> {
            stdout: true,
            stderr: true,
            ..Default::default()
        }),
    );

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    while let Some(chunk) = logs.next().await {
        match chunk? {
            LogOutput::StdOut { message } => stdout.extend_from_slice(&message),
            LogOutput::StdErr { message } => stderr.extend_from_slice(&message),
            _ => {}
        }
    }

    Ok(RunOutput {
        stdout,
        stderr,
        exit_code,
    })
}

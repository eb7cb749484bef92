/*!
   Container-engine access.

   [`DockerEnv`] owns the engine handle, the per-test overlay network,
   and the cleanup label every created object carries. Everything the
   framework creates in Docker is tagged with that label so a teardown
   can reap stragglers even after a panicking test.
*/

pub mod cleanup;
pub mod container;
pub mod file;
pub mod job;
pub mod volume;

use std::collections::HashMap;

use bollard::image::CreateImageOptions;
use bollard::volume::CreateVolumeOptions;
use bollard::Docker;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::types::config::{DockerImage, TestConfig};
use crate::util::random::sanitize_container_name;

/// Label key identifying objects created by this framework. The value
/// is the test name.
pub const CLEANUP_LABEL: &str = "interchain-test";

/// Where file-transfer helper containers mount the target volume.
pub const MOUNT_PATH: &str = "/mnt/dockervolume";

/// Image used for volume chown and file-transfer helper containers.
pub const HELPER_IMAGE: &str = "busybox";
pub const HELPER_IMAGE_TAG: &str = "1.35";

/// Engine handle plus the per-test network and cleanup label.
#[derive(Clone)]
pub struct DockerEnv {
    pub client: Docker,
    pub test_name: String,
    pub network_name: String,
}

impl DockerEnv {
    /// Connect to the local engine, reap leftovers from a previous run
    /// of the same test, and create the overlay network all node
    /// containers join.
    pub async fn new(test_config: &TestConfig) -> Result<Self, Error> {
        let client = Docker::connect_with_socket_defaults()?;

        cleanup::cleanup_test_resources(&client, &test_config.test_name).await;

        let network_name = format!(
            "interchain-{}-{:x}",
            sanitize_container_name(&test_config.test_name),
            test_config.run_id
        );

        let env = Self {
            client,
            test_name: test_config.test_name.clone(),
            network_name: network_name.clone(),
        };

        env.client
            .create_network(bollard::network::CreateNetworkOptions {
                name: network_name.clone(),
                check_duplicate: true,
                labels: env.labels(),
                ..Default::default()
            })
            .await?;

        info!("created docker network {}", network_name);

        Ok(env)
    }

    /// The labels attached to every created container, volume, and
    /// network.
    pub fn labels(&self) -> HashMap<String, String> {
        HashMap::from([(CLEANUP_LABEL.to_string(), self.test_name.clone())])
    }

    /// Pull an image. A pull failure is tolerated when a matching image
    /// is already cached locally.
    pub async fn pull_image(&self, image: &DockerImage) -> Result<(), Error> {
        self.pull_reference(&image.repository, &image.version).await
    }

    pub(crate) async fn pull_reference(&self, repository: &str, tag: &str) -> Result<(), Error> {
        let reference = format!("{repository}:{tag}");
        debug!("pulling image {}", reference);

        let mut stream = self.client.create_image(
            Some(CreateImageOptions {
                from_image: repository.to_string(),
                tag: tag.to_string(),
                ..Default::default()
            }),
            None,
            None,
        );

        while let Some(progress) = stream.next().await {
            if let Err(e) = progress {
                return match self.client.inspect_image(&reference).await {
                    Ok(_) => {
                        warn!("failed to pull {}, using cached copy: {}", reference, e);
                        Ok(())
                    }
                    Err(_) => Err(Error::image_pull(reference, e)),
                };
            }
        }

        Ok(())
    }

    /// Create a labeled volume with the given name.
    pub async fn create_volume(&self, name: &str) -> Result<String, Error> {
        self.client
            .create_volume(CreateVolumeOptions {
                name: name.to_string(),
                labels: self.labels(),
                ..Default::default()
            })
            .await?;

        debug!("created volume {}", name);
        Ok(name.to_string())
    }

    /// Pull the helper image used by chown and file-transfer containers.
    pub async fn ensure_helper_image(&self) -> Result<(), Error> {
        self.pull_reference(HELPER_IMAGE, HELPER_IMAGE_TAG).await
    }

    /// Remove every container, volume, and network tagged with this
    /// test's cleanup label. Safe to call more than once.
    pub async fn close(&self) {
        cleanup::cleanup_test_resources(&self.client, &self.test_name).await;
    }
}

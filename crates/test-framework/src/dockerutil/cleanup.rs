/*!
   Label-driven teardown. Every object the framework creates carries
   the [`CLEANUP_LABEL`](super::CLEANUP_LABEL) with the test name as
   value, so reaping is a set of filtered list-and-remove sweeps.
*/

use std::collections::HashMap;

use bollard::container::{ListContainersOptions, RemoveContainerOptions};
use bollard::network::ListNetworksOptions;
use bollard::volume::{ListVolumesOptions, RemoveVolumeOptions};
use bollard::Docker;
use tracing::{debug, warn};

use super::CLEANUP_LABEL;

/// Stop and remove every container, volume, and network labeled with
/// `test_name`. Failures are logged, not raised: teardown must make
/// progress past individual missing or stuck objects.
pub async fn cleanup_test_resources(client: &Docker, test_name: &str) {
    let filters = label_filters(test_name);

    remove_containers(client, filters.clone()).await;
    remove_volumes(client, filters.clone()).await;
    remove_networks(client, filters).await;
}

fn label_filters(test_name: &str) -> HashMap<String, Vec<String>> {
    HashMap::from([(
        "label".to_string(),
        vec![format!("{CLEANUP_LABEL}={test_name}")],
    )])
}

async fn remove_containers(client: &Docker, filters: HashMap<String, Vec<String>>) {
    let containers = match client
        .list_containers(Some(ListContainersOptions {
            all: true,
            filters,
            ..Default::default()
        }))
        .await
    {
        Ok(containers) => containers,
        Err(e) => {
            warn!("failed to list containers for cleanup: {}", e);
            return;
        }
    };

    for container in containers {
        let Some(id) = container.id else { continue };
        debug!("removing container {}", id);
        if let Err(e) = client
            .remove_container(
                &id,
                Some(RemoveContainerOptions {
                    force: true,
                    v: true,
                    ..Default::default()
                }),
            )
            .await
        {
            warn!("failed to remove container {}: {}", id, e);
        }
    }
}

async fn remove_volumes(client: &Docker, filters: HashMap<String, Vec<String>>) {
    let listing = match client.list_volumes(Some(ListVolumesOptions { filters })).await {
        Ok(listing) => listing,
        Err(e) => {
            warn!("failed to list volumes for cleanup: {}", e);
            return;
        }
    };

    for volume in listing.volumes.unwrap_or_default() {
        debug!("removing volume {}", volume.name);
        if let Err(e) = client
            .remove_volume(&volume.name, Some(RemoveVolumeOptions { force: true }))
            .await
        {
            warn!("failed to remove volume {}: {}", volume.name, e);
        }
    }
}

async fn remove_networks(client: &Docker, filters: HashMap<String, Vec<String>>) {
    let networks = match client
        .list_networks(Some(ListNetworksOptions { filters }))
        .await
    {
        Ok(networks) => networks,
        Err(e) => {
            warn!("failed to list networks for cleanup: {}", e);
            return;
        }
    };

    for network in networks {
        let Some(name) = network.name else { continue };
        debug!("removing network {}", name);
        if let Err(e) = client.remove_network(&name).await {
            warn!("failed to remove network {}: {}", name, e);
        }
    }
}

/*!
   Volume ownership. Fresh volumes are root-owned; node containers run
   as the image's unprivileged uid, so each volume gets chowned once
   right after creation.
*/

use super::job::{run_job, JobOptions};
use super::{DockerEnv, HELPER_IMAGE, HELPER_IMAGE_TAG, MOUNT_PATH};
use crate::error::Error;

/// Recursively hand ownership of `volume` to `uid_gid`.
pub async fn set_volume_owner(env: &DockerEnv, volume: &str, uid_gid: &str) -> Result<(), Error> {
    let opts = JobOptions {
        image: format!("{HELPER_IMAGE}:{HELPER_IMAGE_TAG}"),
        binds: vec![format!("{volume}:{MOUNT_PATH}")],
        ..Default::default()
    };

    let cmd = vec![
        "sh".to_string(),
        "-c".to_string(),
        format!("chown -R {uid_gid} {MOUNT_PATH} && chmod -R 0700 {MOUNT_PATH}"),
    ];

    run_job(env, "volumeowner", &opts, &cmd)
        .await?
        .into_result(&format!("chown volume {volume}"))?;

    Ok(())
}

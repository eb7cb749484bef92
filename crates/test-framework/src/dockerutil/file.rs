/*!
   File transfer in and out of volumes.

   The engine only moves tar streams, and only against containers, so
   each transfer spins up a helper container with the volume mounted,
   copies through it, and removes it.
*/

use std::io::Read;

use bollard::container::{Config, CreateContainerOptions, DownloadFromContainerOptions, RemoveContainerOptions, UploadToContainerOptions};
use bollard::models::HostConfig;
use futures::StreamExt;
use tracing::debug;

use super::{DockerEnv, HELPER_IMAGE, HELPER_IMAGE_TAG, MOUNT_PATH};
use crate::error::Error;
use crate::util::random::{rand_lower_case_string, sanitize_container_name};

/// Write `content` to `rel_path` inside `volume`, owned by `uid_gid`.
/// Missing parent directories are created by the tar layout.
pub async fn write_file(
    env: &DockerEnv,
    volume: &str,
    uid_gid: &str,
    rel_path: &str,
    content: &[u8],
) -> Result<(), Error> {
    debug!("writing {} bytes to {}:{}", content.len(), volume, rel_path);

    let (uid, gid) = parse_uid_gid(uid_gid)?;
    let archive = build_archive(rel_path, content, uid, gid)?;

    let id = create_helper_container(env, volume, "filewriter").await?;

    let uploaded = env
        .client
        .upload_to_container(
            &id,
            Some(UploadToContainerOptions {
                path: MOUNT_PATH.to_string(),
                ..Default::default()
            }),
            archive.into(),
        )
        .await;

    remove_helper_container(env, &id).await?;
    uploaded?;

    Ok(())
}

/// Read the file at `rel_path` inside `volume`.
pub async fn read_file(env: &DockerEnv, volume: &str, rel_path: &str) -> Result<Vec<u8>, Error> {
    debug!("reading {}:{}", volume, rel_path);

    let id = create_helper_container(env, volume, "filereader").await?;

    let downloaded = download_archive(env, &id, rel_path).await;
    remove_helper_container(env, &id).await?;

    extract_single_file(&downloaded?)
}

async fn download_archive(env: &DockerEnv, id: &str, rel_path: &str) -> Result<Vec<u8>, Error> {
    let mut stream = env.client.download_from_container(
        id,
        Some(DownloadFromContainerOptions {
            path: format!("{MOUNT_PATH}/{rel_path}"),
        }),
    );

    let mut archive = Vec::new();
    while let Some(chunk) = stream.next().await {
        archive.extend_from_slice(&chunk?);
    }
    Ok(archive)
}

async fn create_helper_container(
    env: &DockerEnv,
    volume: &str,
    name_hint: &str,
) -> Result<String, Error> {
    let container_name = sanitize_container_name(&format!(
        "{}-{}-{}",
        env.test_name,
        name_hint,
        rand_lower_case_string(8),
    ));

    let created = env
        .client
        .create_container(
            Some(CreateContainerOptions {
                name: container_name,
                platform: None,
            }),
            Config {
                image: Some(format!("{HELPER_IMAGE}:{HELPER_IMAGE_TAG}")),
                labels: Some(env.labels()),
                host_config: Some(HostConfig {
                    binds: Some(vec![format!("{volume}:{MOUNT_PATH}")]),
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
        .await?;

    Ok(created.id)
}

async fn remove_helper_container(env: &DockerEnv, id: &str) -> Result<(), Error> {
    env.client
        .remove_container(
            id,
            Some(RemoveContainerOptions {
                force: true,
                v: true,
                ..Default::default()
            }),
        )
        .await?;
    Ok(())
}

fn build_archive(rel_path: &str, content: &[u8], uid: u64, gid: u64) -> Result<Vec<u8>, Error> {
    let mut builder = tar::Builder::new(Vec::new());

    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o600);
    header.set_uid(uid);
    header.set_gid(gid);
    header.set_cksum();

    builder
        .append_data(&mut header, rel_path, content)
        .map_err(Error::io)?;

    builder.into_inner().map_err(Error::io)
}

fn extract_single_file(archive: &[u8]) -> Result<Vec<u8>, Error> {
    let mut entries = tar::Archive::new(archive);
    for entry in entries.entries().map_err(Error::io)? {
        let mut entry = entry.map_err(Error::io)?;
        if entry.header().entry_type().is_file() {
            let mut content = Vec::new();
            entry.read_to_end(&mut content).map_err(Error::io)?;
            return Ok(content);
        }
    }
    Err(Error::invalid_config(
        "downloaded archive contains no regular file".to_string(),
    ))
}

fn parse_uid_gid(uid_gid: &str) -> Result<(u64, u64), Error> {
    let parse = |s: &str| {
        s.parse::<u64>().map_err(|_| {
            Error::invalid_config(format!("invalid uid:gid specification {uid_gid}"))
        })
    };
    match uid_gid.split_once(':') {
        Some((uid, gid)) => Ok((parse(uid)?, parse(gid)?)),
        None => Ok((parse(uid_gid)?, parse(uid_gid)?)),
    }
}

/// The relative path helpers treat as a path inside the volume mount;
/// re-exported for callers computing absolute in-container paths.
pub fn mounted_path(rel_path: &str) -> String {
    format!("{MOUNT_PATH}/{rel_path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archives_round_trip_a_file() {
        let archive = build_archive("config/genesis.json", b"{\"app_state\":{}}", 1025, 1025).unwrap();
        let content = extract_single_file(&archive).unwrap();
        assert_eq!(content, b"{\"app_state\":{}}");
    }

    #[test]
    fn uid_gid_parsing() {
        assert_eq!(parse_uid_gid("1025:1026").unwrap(), (1025, 1026));
        assert_eq!(parse_uid_gid("100").unwrap(), (100, 100));
        assert!(parse_uid_gid("abc:def").is_err());
    }
}

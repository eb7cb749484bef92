/*!
   The IBC path graph: link declarations and their validation.
*/

use std::collections::HashSet;

use crate::error::Error;
use crate::ibc::channel::{CreateChannelOptions, CreateClientOptions, Ordering};

/// How two chains are related by a link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    /// A plain IBC path.
    Ibc,
    /// An Interchain Security pairing; `chain_a` is the provider and
    /// `chain_b` the consumer. The consumer must not start before the
    /// provider has emitted its consumer genesis.
    ProviderConsumer,
}

/// A declaration that two chains should be bridged under a named path.
#[derive(Clone, Debug)]
pub struct Link {
    pub path_name: String,
    pub chain_a: String,
    pub chain_b: String,
    pub kind: LinkKind,
    pub channel_opts: CreateChannelOptions,
    pub client_opts: CreateClientOptions,
}

impl Link {
    pub fn new(path_name: &str, chain_a: &str, chain_b: &str) -> Self {
        Self {
            path_name: path_name.to_string(),
            chain_a: chain_a.to_string(),
            chain_b: chain_b.to_string(),
            kind: LinkKind::Ibc,
            channel_opts: CreateChannelOptions::default(),
            client_opts: CreateClientOptions::default(),
        }
    }

    /// An ICS pairing between a provider and a consumer. The channel
    /// runs ordered over the consumer/provider port pair.
    pub fn provider_consumer(path_name: &str, provider: &str, consumer: &str) -> Self {
        Self {
            path_name: path_name.to_string(),
            chain_a: provider.to_string(),
            chain_b: consumer.to_string(),
            kind: LinkKind::ProviderConsumer,
            channel_opts: CreateChannelOptions {
                source_port_name: "consumer".to_string(),
                dest_port_name: "provider".to_string(),
                order: Ordering::Ordered,
                version: "1".to_string(),
            },
            client_opts: CreateClientOptions::default(),
        }
    }

    pub fn with_channel_options(mut self, opts: CreateChannelOptions) -> Self {
        self.channel_opts = opts;
        self
    }

    pub fn with_client_options(mut self, opts: CreateClientOptions) -> Self {
        self.client_opts = opts;
        self
    }
}

/// Validate the path graph against the set of added chain ids.
///
/// Rejects self-links, endpoints that were never added, and duplicate
/// path names. The returned order follows declaration order so reruns
/// produce identical channel ids.
pub fn resolve_topology<'a>(
    links: &'a [Link],
    chain_ids: &HashSet<String>,
) -> Result<Vec<&'a Link>, Error> {
    let mut seen_paths = HashSet::new();

    for link in links {
        if link.chain_a == link.chain_b {
            return Err(Error::invalid_config(format!(
                "path {} links chain {} to itself",
                link.path_name, link.chain_a
            )));
        }
        for chain in [&link.chain_a, &link.chain_b] {
            if !chain_ids.contains(chain) {
                return Err(Error::invalid_config(format!(
                    "path {} references chain {} which was not added",
                    link.path_name, chain
                )));
            }
        }
        if !seen_paths.insert(link.path_name.clone()) {
            return Err(Error::invalid_config(format!(
                "duplicate path name {}",
                link.path_name
            )));
        }
    }

    Ok(links.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn declaration_order_is_preserved() {
        let links = vec![
            Link::new("path-b", "chain-2", "chain-3"),
            Link::new("path-a", "chain-1", "chain-2"),
        ];
        let resolved =
            resolve_topology(&links, &chain_set(&["chain-1", "chain-2", "chain-3"])).unwrap();
        assert_eq!(resolved[0].path_name, "path-b");
        assert_eq!(resolved[1].path_name, "path-a");
    }

    #[test]
    fn self_links_are_rejected() {
        let links = vec![Link::new("loop", "chain-1", "chain-1")];
        assert!(resolve_topology(&links, &chain_set(&["chain-1"])).is_err());
    }

    #[test]
    fn unknown_endpoints_are_rejected() {
        let links = vec![Link::new("path", "chain-1", "ghost")];
        assert!(resolve_topology(&links, &chain_set(&["chain-1"])).is_err());
    }

    #[test]
    fn duplicate_path_names_are_rejected() {
        let links = vec![
            Link::new("path", "chain-1", "chain-2"),
            Link::new("path", "chain-1", "chain-3"),
        ];
        assert!(
            resolve_topology(&links, &chain_set(&["chain-1", "chain-2", "chain-3"])).is_err()
        );
    }

    #[test]
    fn cycles_between_distinct_chains_are_allowed() {
        let links = vec![
            Link::new("ab", "a", "b"),
            Link::new("ac", "a", "c"),
            Link::new("bc", "b", "c"),
        ];
        assert!(resolve_topology(&links, &chain_set(&["a", "b", "c"])).is_ok());
    }
}

/*!
   Errors raised while orchestrating chains, containers, and relayers.
*/

use core::convert::Infallible;

use eyre::Report;
use flex_error::{define_error, TraceError};

define_error! {
    Error {
        Generic
            [ TraceError<Report> ]
            |_| { "generic error" },

        Io
            [ TraceError<std::io::Error> ]
            |_| { "io error" },

        Docker
            [ TraceError<bollard::errors::Error> ]
            |_| { "docker engine error" },

        ImagePull
            { reference: String }
            [ TraceError<bollard::errors::Error> ]
            |e| { format!("failed to pull image {}", e.reference) },

        Rpc
            { url: String }
            [ TraceError<reqwest::Error> ]
            |e| { format!("rpc request to {} failed", e.url) },

        JsonParse
            [ TraceError<serde_json::Error> ]
            |_| { "error parsing json" },

        TomlParse
            [ TraceError<toml::de::Error> ]
            |_| { "error parsing toml" },

        InvalidConfig
            { detail: String }
            |e| { format!("invalid configuration: {}", e.detail) },

        CommandFailed
            { command: String, exit_code: i64, stderr: String }
            |e| {
                format!("command {} exited with code {}: {}",
                    e.command, e.exit_code, e.stderr)
            },

        TxFailed
            { code: u32, raw_log: String }
            |e| { format!("transaction failed with code {}: {}", e.code, e.raw_log) },

        PacketEventMissing
            { event: String, tx_hash: String }
            |e| { format!("expected event {} missing from tx {}", e.event, e.tx_hash) },

        ProposalStatus
            { proposal_id: String, want: String, got: String }
            |e| {
                format!("proposal {} has status {}, want {}",
                    e.proposal_id, e.got, e.want)
            },

        DeadlineExceeded
            { description: String }
            |e| { format!("deadline exceeded: {}", e.description) },

        Canceled
            { description: String }
            |e| { format!("operation canceled: {}", e.description) },

        Retry
            { description: String, attempts: u16 }
            |e| {
                format!("expected eventual success of {}, but it failed after {} attempts",
                    e.description, e.attempts)
            },

        GenesisHashMismatch
            { node: String, want: String, got: String }
            |e| {
                format!("genesis hash on node {} is {}, want {}",
                    e.node, e.got, e.want)
            },

        StateTransition
            { node: String, from: String, to: String }
            |e| {
                format!("invalid lifecycle transition on node {}: {} -> {}",
                    e.node, e.from, e.to)
            },

        AlreadyBuilt
            |_| { "Interchain::build called more than once" },

        ChannelNotFound
            { chain_id: String, port_id: String }
            |e| {
                format!("no channel with port {} found on chain {}",
                    e.port_id, e.chain_id)
            },
    }
}

pub fn handle_generic_error(e: impl Into<Report>) -> Error {
    Error::generic(e.into())
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io(e)
    }
}

impl From<bollard::errors::Error> for Error {
    fn from(e: bollard::errors::Error) -> Self {
        Error::docker(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::json_parse(e)
    }
}

impl From<Infallible> for Error {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

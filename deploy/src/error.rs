use std::path::PathBuf;

use alloy::primitives::TxHash;
use alloy::providers::PendingTransactionError;
use alloy::transports::TransportError;

use crate::deployer::ContractType;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("no artifact for contract {name} under {}", dir.display())]
    ArtifactNotFound { name: String, dir: PathBuf },

    #[error("contract name {name} is ambiguous, use one of: {}", candidates.join(", "))]
    AmbiguousArtifact { name: String, candidates: Vec<String> },

    #[error("failed to read artifact {}", path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {}", path.display())]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("artifact {} holds invalid bytecode", path.display())]
    InvalidBytecode {
        path: PathBuf,
        #[source]
        source: alloy::primitives::hex::FromHexError,
    },

    #[error("contract {0} has no bytecode, it is abstract or an interface")]
    NotDeployable(String),

    #[error("contract {contract} needs libraries linked from {}", libraries.join(", "))]
    UnlinkedLibraries { contract: String, libraries: Vec<String> },

    #[error("{contract} constructor takes {expected} arguments, got {actual}")]
    ArgumentCount {
        contract: String,
        expected: usize,
        actual: usize,
    },

    #[error("{contract} constructor argument {index} ({ty}) cannot be {value:?}")]
    InvalidArgument {
        contract: String,
        index: usize,
        ty: String,
        value: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },

    #[error("failed to encode {contract} constructor arguments")]
    Encoding {
        contract: String,
        #[source]
        source: alloy::dyn_abi::Error,
    },

    #[error("failed to connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("node has no unlocked account to deploy from")]
    NoAccounts,

    #[error("{0} deployment was rejected")]
    Rejected(ContractType, #[source] TransportError),

    #[error("{0} deployment was not confirmed")]
    Unconfirmed(ContractType, #[source] PendingTransactionError),

    #[error("{contract} deployment reverted in transaction {tx_hash}")]
    Reverted { contract: ContractType, tx_hash: TxHash },

    #[error("receipt of transaction {tx_hash} carries no contract address")]
    MissingContractAddress { tx_hash: TxHash },

    #[error("failed to write deployment output")]
    Output(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for env var {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to load .env file")]
    DotEnv(#[from] dotenvy::Error),
}

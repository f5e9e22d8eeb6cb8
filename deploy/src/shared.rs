use std::path::PathBuf;
use std::str::FromStr;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use tracing::info;

use crate::error::{ConfigError, DeployError};

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone)]
pub struct Config {
    pub rpc_url: String,
    /// Signs deployments locally when set, otherwise the node's first
    /// unlocked account is used.
    pub deployer: Option<PrivateKeySigner>,
    pub artifacts_dir: PathBuf,
    pub log_filter: String,
}

/// Reads the configuration from the environment, after loading `.env` if
/// there is one.
pub fn config() -> Result<Config, ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err.into()),
    }
    Config::from_lookup(|name| std::env::var(name).ok())
}

impl Config {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let rpc_url = var("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        if !["http://", "https://", "ws://", "wss://"]
            .iter()
            .any(|scheme| rpc_url.starts_with(scheme))
        {
            return Err(ConfigError::Invalid {
                name: "RPC_URL",
                value: rpc_url,
                reason: "expected an http(s) or ws(s) url".to_string(),
            });
        }

        let deployer = var("DEPLOYER_PK")
            .map(|pk| {
                PrivateKeySigner::from_str(pk.trim()).map_err(|err| ConfigError::Invalid {
                    name: "DEPLOYER_PK",
                    value: "<redacted>".to_string(),
                    reason: err.to_string(),
                })
            })
            .transpose()?;

        Ok(Config {
            rpc_url,
            deployer,
            artifacts_dir: var("ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR)),
            log_filter: var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

/// Connects to the node and picks the account deployments are sent from.
pub async fn get_provider(config: &Config) -> Result<(DynProvider, Address), DeployError> {
    let connect_err = |source| DeployError::Connect {
        url: config.rpc_url.clone(),
        source,
    };
    match &config.deployer {
        Some(signer) => {
            let address = signer.address();
            let provider = ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer.clone()))
                .connect(&config.rpc_url)
                .await
                .map_err(connect_err)?
                .erased();
            info!(%address, "signing with local key");
            Ok((provider, address))
        }
        None => {
            let provider = ProviderBuilder::new()
                .connect(&config.rpc_url)
                .await
                .map_err(connect_err)?
                .erased();
            let address = node_account(&provider, &config.rpc_url).await?;
            info!(%address, "signing with node account");
            Ok((provider, address))
        }
    }
}

/// First account the node signs for.
pub async fn node_account(provider: &DynProvider, rpc_url: &str) -> Result<Address, DeployError> {
    let accounts = provider
        .get_accounts()
        .await
        .map_err(|source| DeployError::Connect {
            url: rpc_url.to_string(),
            source,
        })?;
    accounts.first().copied().ok_or(DeployError::NoAccounts)
}

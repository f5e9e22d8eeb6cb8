use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::TransactionRequest;
use chrono::{DateTime, Utc};
use maplit::hashmap;
use tracing::{info, instrument};

use crate::artifacts::ContractFactory;
use crate::error::DeployError;
use crate::params::{self, SaleSchedule};
use crate::shared::{get_provider, Config};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractType {
    AffynToken,
    IcoSale,
}

impl ContractType {
    /// Name of the compiled contract in the artifacts directory.
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ContractType::AffynToken => "AffynToken",
            ContractType::IcoSale => "TSTokenPrivateSale",
        }
    }

    /// Name used in the output lines.
    pub fn label(&self) -> &'static str {
        match self {
            ContractType::AffynToken => "affynToken",
            ContractType::IcoSale => "icoSale",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.artifact_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployResult {
    pub address: Address,
    pub tx_hash: TxHash,
}

#[derive(Debug, Clone)]
pub struct Deployment {
    pub token: DeployResult,
    pub sale: DeployResult,
    pub schedule: SaleSchedule,
}

impl Deployment {
    pub fn contracts(&self) -> HashMap<ContractType, DeployResult> {
        hashmap! {
            ContractType::AffynToken => self.token,
            ContractType::IcoSale => self.sale,
        }
    }
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait ContractDeployer: Send + Sync {
    /// Deploys `contract`, coercing `args` to its constructor parameters, and
    /// waits until the creation transaction is mined.
    async fn deploy(
        &self,
        contract: ContractType,
        args: Vec<String>,
    ) -> Result<DeployResult, DeployError>;
}

/// Deploys contracts from Hardhat artifacts through a JSON-RPC node.
pub struct ChainDeployer {
    provider: DynProvider,
    from: Address,
    artifacts_dir: PathBuf,
}

impl ChainDeployer {
    pub fn new(provider: DynProvider, from: Address, artifacts_dir: PathBuf) -> Self {
        Self {
            provider,
            from,
            artifacts_dir,
        }
    }

    pub async fn connect(config: &Config) -> Result<Self, DeployError> {
        let (provider, from) = get_provider(config).await?;
        Ok(Self::new(provider, from, config.artifacts_dir.clone()))
    }

    pub fn sender(&self) -> Address {
        self.from
    }
}

#[async_trait::async_trait]
impl ContractDeployer for ChainDeployer {
    #[instrument(skip_all, fields(%contract))]
    async fn deploy(
        &self,
        contract: ContractType,
        args: Vec<String>,
    ) -> Result<DeployResult, DeployError> {
        let factory = ContractFactory::load(&self.artifacts_dir, contract.artifact_name())?;
        let code = factory.deploy_code(&args)?;
        info!(artifact = %factory.fully_qualified_name(), ?args, "deploying");

        let tx = TransactionRequest::default()
            .with_from(self.from)
            .with_deploy_code(code);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|err| DeployError::Rejected(contract, err))?;
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, "creation transaction sent");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|err| DeployError::Unconfirmed(contract, err))?;
        if !receipt.status() {
            return Err(DeployError::Reverted { contract, tx_hash });
        }
        let address = receipt
            .contract_address()
            .ok_or(DeployError::MissingContractAddress { tx_hash })?;
        info!(%address, block = ?receipt.block_number(), gas_used = receipt.gas_used(), "deployed");
        Ok(DeployResult { address, tx_hash })
    }
}

/// Deploys the token, then the sale selling it, writing one line per deployed
/// contract to `out`.
///
/// The sale schedule is derived from `clock` once the token is mined. A failed
/// sale deployment leaves the token deployed; nothing is rolled back and
/// running again deploys a new token.
pub async fn run<D, C, W>(deployer: &D, clock: C, out: &mut W) -> Result<Deployment, DeployError>
where
    D: ContractDeployer + ?Sized,
    C: Fn() -> DateTime<Utc>,
    W: Write,
{
    let token = deployer
        .deploy(ContractType::AffynToken, params::token_args())
        .await?;
    writeln!(out, "{} deployed to: {}", ContractType::AffynToken.label(), token.address)?;
    out.flush()?;

    let schedule = SaleSchedule::starting_at(clock());
    info!(
        opening_time = schedule.opening_time,
        closing_time = schedule.closing_time,
        opens_at = ?schedule.opening(),
        "sale schedule"
    );
    let sale = deployer
        .deploy(ContractType::IcoSale, params::sale_args(token.address, &schedule))
        .await?;
    writeln!(out, "\n{} deployed to: {}", ContractType::IcoSale.label(), sale.address)?;
    out.flush()?;

    Ok(Deployment {
        token,
        sale,
        schedule,
    })
}

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use alloy::primitives::{address, keccak256, Address, Bytes, U256};
use alloy::transports::TransportErrorKind;
use chrono::{DateTime, TimeZone, Utc};
use ico_deploy::artifacts::ContractFactory;
use ico_deploy::deployer::{ContractDeployer, ContractType, DeployResult};
use ico_deploy::error::DeployError;
use serde_json::json;

pub const DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const TOKEN_BYTECODE: &str = "0x60806040526000";
pub const SALE_BYTECODE: &str = "0x60806040526001";

pub fn at(timestamp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0).unwrap()
}

fn input(name: &str, ty: &str) -> serde_json::Value {
    json!({ "name": name, "type": ty, "internalType": ty })
}

fn write_artifact(dir: &Path, contract: &str, bytecode: &str, inputs: Vec<serde_json::Value>) {
    let source = format!("contracts/{contract}.sol");
    let dir = dir.join(&source);
    fs::create_dir_all(&dir).unwrap();
    let artifact = json!({
        "_format": "hh-sol-artifact-1",
        "contractName": contract,
        "sourceName": source,
        "abi": [{ "type": "constructor", "stateMutability": "nonpayable", "inputs": inputs }],
        "bytecode": bytecode,
        "deployedBytecode": bytecode,
        "linkReferences": {},
        "deployedLinkReferences": {}
    });
    fs::write(dir.join(format!("{contract}.json")), artifact.to_string()).unwrap();
    fs::write(dir.join(format!("{contract}.dbg.json")), "{}").unwrap();
}

pub fn write_token_artifact(dir: &Path) {
    write_artifact(
        dir,
        "AffynToken",
        TOKEN_BYTECODE,
        vec![input("name_", "string"), input("symbol_", "string"), input("totalSupply_", "uint256")],
    );
}

pub fn sale_inputs() -> Vec<serde_json::Value> {
    vec![
        input("token_", "address"),
        input("cap_", "uint256"),
        input("individualCap_", "uint256"),
        input("openingTime_", "uint256"),
        input("closingTime_", "uint256"),
        input("wallet_", "address"),
        input("rate_", "uint256"),
        input("cliffDuration_", "uint256"),
        input("vestingDuration_", "uint256"),
        input("releaseInterval_", "uint256"),
    ]
}

pub fn write_sale_artifact(dir: &Path, inputs: Vec<serde_json::Value>) {
    write_artifact(dir, "TSTokenPrivateSale", SALE_BYTECODE, inputs);
}

/// Hardhat artifacts for both contracts in a fresh temporary directory.
pub fn artifacts() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_token_artifact(dir.path());
    write_sale_artifact(dir.path(), sale_inputs());
    dir
}

#[derive(Debug, Clone)]
pub struct SimulatedDeployment {
    pub contract: ContractType,
    pub address: Address,
    pub code: Bytes,
}

impl SimulatedDeployment {
    /// Constructor arguments, without the creation bytecode.
    pub fn encoded_args(&self) -> &[u8] {
        let bytecode_len = match self.contract {
            ContractType::AffynToken => TOKEN_BYTECODE.len(),
            ContractType::IcoSale => SALE_BYTECODE.len(),
        };
        &self.code[(bytecode_len - 2) / 2..]
    }

    /// The `index`-th head word of the encoded arguments.
    pub fn word(&self, index: usize) -> U256 {
        U256::from_be_slice(&self.encoded_args()[index * 32..(index + 1) * 32])
    }
}

/// A node stand-in: builds creation code from the artifacts like a real
/// deployment, assigns `CREATE` addresses from the sender nonce and keeps
/// every mined contract.
pub struct SimulatedChain {
    artifacts_dir: PathBuf,
    rejects: Option<ContractType>,
    nonce: Mutex<u64>,
    deployments: Mutex<Vec<SimulatedDeployment>>,
    attempts: Mutex<Vec<ContractType>>,
}

impl SimulatedChain {
    pub fn new(artifacts_dir: &Path) -> Self {
        ico_deploy::logging::initialize_reentrant("info,ico_deploy=debug");
        Self {
            artifacts_dir: artifacts_dir.to_path_buf(),
            rejects: None,
            nonce: Mutex::new(0),
            deployments: Mutex::new(Vec::new()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Makes every deployment of `contract` revert.
    pub fn rejecting(mut self, contract: ContractType) -> Self {
        self.rejects = Some(contract);
        self
    }

    pub fn deployed(&self) -> Vec<SimulatedDeployment> {
        self.deployments.lock().unwrap().clone()
    }

    pub fn attempted(&self) -> Vec<ContractType> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ContractDeployer for SimulatedChain {
    async fn deploy(
        &self,
        contract: ContractType,
        args: Vec<String>,
    ) -> Result<DeployResult, DeployError> {
        self.attempts.lock().unwrap().push(contract);
        let factory = ContractFactory::load(&self.artifacts_dir, contract.artifact_name())?;
        let code = factory.deploy_code(&args)?;

        let nonce = {
            let mut next = self.nonce.lock().unwrap();
            *next += 1;
            *next - 1
        };
        if self.rejects == Some(contract) {
            return Err(DeployError::Rejected(
                contract,
                TransportErrorKind::custom_str("execution reverted: sale parameters rejected"),
            ));
        }

        let tx_hash = keccak256([&code[..], nonce.to_be_bytes().as_slice()].concat());
        let address = DEPLOYER.create(nonce);
        self.deployments.lock().unwrap().push(SimulatedDeployment {
            contract,
            address,
            code,
        });
        Ok(DeployResult { address, tx_hash })
    }
}

/// Every message in the error's source chain.
pub fn error_chain(err: &DeployError) -> Vec<String> {
    let mut messages = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(err) = source {
        messages.push(err.to_string());
        source = err.source();
    }
    messages
}

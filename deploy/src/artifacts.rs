//! Contract factory backed by Hardhat compilation artifacts.
//!
//! Hardhat writes one JSON file per contract under
//! `artifacts/<source path>/<ContractName>.json`, next to a `.dbg.json` file
//! and a shared `build-info/` directory. A factory only needs the ABI and the
//! creation bytecode from that file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use alloy::dyn_abi::{DynSolValue, JsonAbiExt, Specifier};
use alloy::json_abi::JsonAbi;
use alloy::primitives::{hex, Bytes};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::DeployError;

const BUILD_INFO_DIR: &str = "build-info";
/// Marks a library address still to be linked into the bytecode.
const LINK_PLACEHOLDER: &str = "__$";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    source_name: String,
    abi: JsonAbi,
    // kept as text: unlinked bytecode is not valid hex
    bytecode: String,
    #[serde(default)]
    link_references: BTreeMap<String, serde_json::Value>,
}

/// A deployable contract: its ABI and creation bytecode.
#[derive(Debug, Clone)]
pub struct ContractFactory {
    pub name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractFactory {
    /// Resolves `name` under `artifacts_dir`.
    ///
    /// `name` is either a bare contract name (`AffynToken`), searched for in
    /// every source file, or a fully qualified one
    /// (`contracts/AffynToken.sol:AffynToken`).
    pub fn load(artifacts_dir: &Path, name: &str) -> Result<Self, DeployError> {
        let path = match name.rsplit_once(':') {
            Some((source, contract)) => {
                let path = artifacts_dir.join(source).join(format!("{contract}.json"));
                if !path.is_file() {
                    return Err(DeployError::ArtifactNotFound {
                        name: name.to_string(),
                        dir: artifacts_dir.to_path_buf(),
                    });
                }
                path
            }
            None => find_artifact(artifacts_dir, name)?,
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, DeployError> {
        let contents = fs::read_to_string(path).map_err(|source| DeployError::ArtifactIo {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: HardhatArtifact =
            serde_json::from_str(&contents).map_err(|source| DeployError::ArtifactFormat {
                path: path.to_path_buf(),
                source,
            })?;
        if !artifact.link_references.is_empty() || artifact.bytecode.contains(LINK_PLACEHOLDER) {
            return Err(DeployError::UnlinkedLibraries {
                contract: artifact.contract_name,
                libraries: artifact.link_references.into_keys().collect(),
            });
        }
        let bytecode = hex::decode(artifact.bytecode.trim()).map_err(|source| {
            DeployError::InvalidBytecode {
                path: path.to_path_buf(),
                source,
            }
        })?;
        if bytecode.is_empty() {
            return Err(DeployError::NotDeployable(artifact.contract_name));
        }
        Ok(ContractFactory {
            name: artifact.contract_name,
            source_name: artifact.source_name,
            abi: artifact.abi,
            bytecode: bytecode.into(),
        })
    }

    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.name)
    }

    /// Creation code for a deployment: the bytecode followed by the
    /// ABI-encoded constructor arguments.
    ///
    /// Arguments are given as strings and coerced to the parameter types the
    /// constructor declares.
    pub fn deploy_code(&self, args: &[String]) -> Result<Bytes, DeployError> {
        let Some(constructor) = &self.abi.constructor else {
            if !args.is_empty() {
                return Err(self.arity_error(0, args.len()));
            }
            return Ok(self.bytecode.clone());
        };
        if constructor.inputs.len() != args.len() {
            return Err(self.arity_error(constructor.inputs.len(), args.len()));
        }

        let values = constructor
            .inputs
            .iter()
            .zip(args)
            .enumerate()
            .map(|(index, (param, value))| {
                let invalid = |source| DeployError::InvalidArgument {
                    contract: self.name.clone(),
                    index,
                    ty: param.ty.clone(),
                    value: value.clone(),
                    source,
                };
                param.resolve().map_err(invalid)?.coerce_str(value).map_err(invalid)
            })
            .collect::<Result<Vec<DynSolValue>, _>>()?;

        let encoded = constructor
            .abi_encode_input(&values)
            .map_err(|source| DeployError::Encoding {
                contract: self.name.clone(),
                source,
            })?;
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&encoded);
        Ok(code.into())
    }

    fn arity_error(&self, expected: usize, actual: usize) -> DeployError {
        DeployError::ArgumentCount {
            contract: self.name.clone(),
            expected,
            actual,
        }
    }
}

fn find_artifact(artifacts_dir: &Path, name: &str) -> Result<PathBuf, DeployError> {
    let file_name = format!("{name}.json");
    let not_found = || DeployError::ArtifactNotFound {
        name: name.to_string(),
        dir: artifacts_dir.to_path_buf(),
    };
    if !artifacts_dir.is_dir() {
        return Err(not_found());
    }

    // symlinks are not followed, so link cycles cannot trap the walk
    let mut matches = Vec::new();
    let entries = WalkDir::new(artifacts_dir)
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && entry.file_name() == BUILD_INFO_DIR));
    for entry in entries {
        let entry = entry.map_err(|err| DeployError::ArtifactIo {
            path: err.path().unwrap_or(artifacts_dir).to_path_buf(),
            source: err.into(),
        })?;
        if entry.file_type().is_file() && entry.file_name() == file_name.as_str() {
            matches.push(entry.into_path());
        }
    }
    matches.sort();

    match matches.len() {
        0 => Err(not_found()),
        1 => Ok(matches.remove(0)),
        _ => Err(DeployError::AmbiguousArtifact {
            name: name.to_string(),
            candidates: matches
                .iter()
                .map(|path| qualified_name(artifacts_dir, path, name))
                .collect(),
        }),
    }
}

fn qualified_name(artifacts_dir: &Path, path: &Path, name: &str) -> String {
    let source = path
        .parent()
        .and_then(|parent| parent.strip_prefix(artifacts_dir).ok())
        .map(|source| source.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    format!("{source}:{name}")
}

//! Contract blueprints loaded from Hardhat build artifacts.
//!
//! A Hardhat `artifacts/` directory mirrors the source tree: the artifact of
//! contract `Name` declared in `contracts/Name.sol` lives at
//! `artifacts/contracts/Name.sol/Name.json`, next to a `Name.dbg.json` file
//! that points at the build-info holding the compiler input.

use alloy::{
    json_abi::JsonAbi,
    primitives::Bytes,
};
use serde::Deserialize;
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};
use thiserror::Error;
use tracing::debug;

const BUILD_INFO_DIR: &str = "build-info";

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("No artifact named {0}")]
    NotFound(String),

    #[error("Multiple artifacts named {name}, use a fully qualified name: {candidates:?}")]
    Ambiguous {
        name: String,
        candidates: Vec<PathBuf>,
    },

    #[error("{name} is not deployable: {reason}")]
    NotDeployable { name: String, reason: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Compiler input and version a contract was built with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub solc_long_version: String,
    /// Solidity standard JSON input.
    pub input: serde_json::Value,
}

/// Compiled contract template from which instances are deployed.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    pub build_info: Option<BuildInfo>,
}

impl Blueprint {
    /// `<source>:<name>`, the form explorers expect.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    contract_name: String,
    source_name: String,
    abi: JsonAbi,
    bytecode: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    build_info: PathBuf,
}

/// Read-only view over a Hardhat `artifacts/` directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the blueprint for `name`.
    ///
    /// `name` is either a bare contract name (`CoinFlip`) or a fully
    /// qualified one (`contracts/CoinFlip.sol:CoinFlip`).
    pub fn blueprint(&self, name: &str) -> Result<Blueprint, ArtifactError> {
        let path = self.locate(name)?;
        debug!(artifact = %path.display(), "Loading contract artifact");

        let artifact: HardhatArtifact = read_json(&path)?;
        let bytecode = decode_bytecode(&artifact.contract_name, &artifact.bytecode)?;
        let build_info = self.build_info_for(&path)?;

        Ok(Blueprint {
            contract_name: artifact.contract_name,
            source_name: artifact.source_name,
            abi: artifact.abi,
            bytecode,
            build_info,
        })
    }

    fn locate(&self, name: &str) -> Result<PathBuf, ArtifactError> {
        if let Some((source, contract)) = name.rsplit_once(':') {
            let path = self.root.join(source).join(format!("{contract}.json"));
            return if path.is_file() {
                Ok(path)
            } else {
                Err(ArtifactError::NotFound(name.to_string()))
            };
        }

        let mut candidates = Vec::new();
        collect_artifacts(&self.root, &format!("{name}.json"), &mut candidates)?;
        candidates.sort();

        match candidates.len() {
            0 => Err(ArtifactError::NotFound(name.to_string())),
            1 => Ok(candidates.remove(0)),
            _ => {
                Err(ArtifactError::Ambiguous {
                    name: name.to_string(),
                    candidates,
                })
            }
        }
    }

    /// Resolve the build-info referenced by the `.dbg.json` next to `artifact`.
    /// Artifacts without a debug file carry no build info.
    fn build_info_for(&self, artifact: &Path) -> Result<Option<BuildInfo>, ArtifactError> {
        let dbg_path = artifact.with_extension("dbg.json");
        if !dbg_path.is_file() {
            return Ok(None);
        }

        let dbg: DebugFile = read_json(&dbg_path)?;
        let base = dbg_path.parent().unwrap_or(self.root.as_path());
        let build_info_path = base.join(dbg.build_info);
        if !build_info_path.is_file() {
            return Ok(None);
        }

        read_json(&build_info_path).map(Some)
    }
}

fn collect_artifacts(
    dir: &Path,
    file_name: &str,
    out: &mut Vec<PathBuf>,
) -> Result<(), ArtifactError> {
    let entries = fs::read_dir(dir).map_err(|source| {
        ArtifactError::Io {
            path: dir.to_path_buf(),
            source,
        }
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| {
            ArtifactError::Io {
                path: dir.to_path_buf(),
                source,
            }
        })?;
        let path = entry.path();

        if path.is_dir() {
            if entry.file_name() != BUILD_INFO_DIR {
                collect_artifacts(&path, file_name, out)?;
            }
        } else if entry.file_name() == file_name {
            out.push(path);
        }
    }

    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ArtifactError> {
    let contents = fs::read_to_string(path).map_err(|source| {
        ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    serde_json::from_str(&contents).map_err(|source| {
        ArtifactError::Json {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn decode_bytecode(name: &str, bytecode: &str) -> Result<Bytes, ArtifactError> {
    // Unlinked library placeholders look like `__$<hash>$__`.
    if bytecode.contains("__") {
        return Err(ArtifactError::NotDeployable {
            name: name.to_string(),
            reason: "bytecode has unlinked library references".to_string(),
        });
    }

    let bytes = alloy::hex::decode(bytecode).map_err(|e| {
        ArtifactError::NotDeployable {
            name: name.to_string(),
            reason: format!("invalid bytecode: {e}"),
        }
    })?;

    if bytes.is_empty() {
        return Err(ArtifactError::NotDeployable {
            name: name.to_string(),
            reason: "empty bytecode (abstract contract or interface)".to_string(),
        });
    }

    Ok(Bytes::from(bytes))
}

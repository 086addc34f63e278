//! Compiled contract artifact store.
//!
//! Resolves build output produced by the usual contract toolchains: Hardhat
//! artifacts (`"bytecode": "0x…"`, nested under `<Name>.sol/`) and Foundry
//! artifacts (`"bytecode": { "object": "0x…" }`).

use std::path::{Path, PathBuf};

use alloy_core::primitives::Bytes;
use anyhow::{Context, Result};
use serde_json::Value;

/// A compiled contract loaded from a build-output JSON file.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: Value,
    /// Creation bytecode.
    pub bytecode: Bytes,
    /// The file this artifact was loaded from.
    pub source_path: PathBuf,
}

impl ContractArtifact {
    /// Load an artifact from a build-output JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&content, path)
    }

    fn from_json(content: &str, path: &Path) -> Result<Self> {
        let data: Value = serde_json::from_str(content)
            .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;

        let contract_name = data["contractName"]
            .as_str()
            .map(String::from)
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .context("Artifact has no contract name")?;

        let bytecode_hex = data["bytecode"]
            .as_str()
            .or_else(|| data["bytecode"]["object"].as_str())
            .with_context(|| format!("No creation bytecode in {}", path.display()))?;

        let stripped = bytecode_hex.trim_start_matches("0x");
        if stripped.is_empty() {
            anyhow::bail!(
                "{} has empty bytecode (abstract contract or interface?)",
                contract_name
            );
        }

        let bytecode = hex::decode(stripped)
            .with_context(|| format!("Bytecode in {} is not valid hex", path.display()))?;

        Ok(Self {
            contract_name,
            abi: data["abi"].clone(),
            bytecode: bytecode.into(),
            source_path: path.to_path_buf(),
        })
    }

    /// Creation calldata: the bytecode with optional ABI-encoded constructor
    /// arguments (hex) appended.
    pub fn deploy_data(&self, constructor_args: Option<&str>) -> Result<Bytes> {
        let mut data = self.bytecode.to_vec();

        if let Some(args) = constructor_args {
            let args = hex::decode(args.trim_start_matches("0x"))
                .context("Constructor arguments are not valid hex")?;
            data.extend_from_slice(&args);
        }

        Ok(data.into())
    }
}

/// Find and load the artifact for `name` under `dir`.
///
/// Searches recursively for `<name>.json`, skipping Hardhat debug artifacts
/// (`*.dbg.json`). When several files match, the lexicographically first one
/// wins and a warning is logged.
pub fn find_artifact(dir: &Path, name: &str) -> Result<ContractArtifact> {
    if !dir.exists() {
        anyhow::bail!(
            "Artifacts directory not found: {} (did you compile the contracts?)",
            dir.display()
        );
    }

    let mut matches = Vec::new();
    collect_matches(dir, &format!("{}.json", name), &mut matches)?;
    matches.sort();

    let Some(first) = matches.first() else {
        anyhow::bail!("No artifact named '{}' found under {}", name, dir.display());
    };

    if matches.len() > 1 {
        tracing::warn!(
            contract = %name,
            count = matches.len(),
            using = %first.display(),
            "Multiple artifacts match, using the first"
        );
    }

    ContractArtifact::from_file(first)
}

fn collect_matches(dir: &Path, file_name: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        if path.is_dir() {
            collect_matches(&path, file_name, out)?;
            continue;
        }

        let Some(candidate) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if candidate.ends_with(".dbg.json") {
            continue;
        }

        if candidate == file_name {
            out.push(path);
        }
    }

    Ok(())
}

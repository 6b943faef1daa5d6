// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! User defaults for the form: preselected asset/network, default expiry and
//! the asset → network presets offered in the pickers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "PAYPACK_CONFIG";
/// Config file name inside the home directory.
const CONFIG_FILE_NAME: &str = ".paypack.toml";

/// Networks offered for one asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPreset {
    pub asset: String,
    pub networks: Vec<String>,
}

impl AssetPreset {
    fn new(asset: &str, networks: &[&str]) -> Self {
        Self {
            asset: asset.to_string(),
            networks: networks.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// Form defaults, all keys optional in the TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayConfig {
    pub default_asset: String,
    pub default_network: String,
    /// Hours from now for the prefilled expiry; `0` leaves expiry unset.
    pub default_expiry_hours: u32,
    pub presets: Vec<AssetPreset>,
}

impl Default for PayConfig {
    fn default() -> Self {
        Self {
            default_asset: "USDC".into(),
            default_network: "ETH-mainnet".into(),
            default_expiry_hours: 24,
            presets: vec![
                AssetPreset::new("USDC", &["ETH-mainnet", "Base-mainnet"]),
                AssetPreset::new("BTC", &["BTC-mainnet"]),
                AssetPreset::new("ETH", &["ETH-mainnet", "ETH-sepolia"]),
            ],
        }
    }
}

impl PayConfig {
    /// Load the user config, falling back to built-in defaults.
    ///
    /// A missing file is normal; unreadable or malformed files are logged.
    pub fn load() -> Self {
        let Some(path) = config_file_path() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(Some(config)) => {
                tracing::info!(path = %path.display(), "loaded config");
                config
            }
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "ignoring config file");
                Self::default()
            }
        }
    }

    /// Read `path`; `Ok(None)` when it does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {:?}", path))?;
        Self::parse(&content).map(Some)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Assets offered in the picker, in preset order.
    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.asset.as_str())
    }

    /// Networks offered for `asset`; empty when the asset has no preset.
    pub fn networks_for(&self, asset: &str) -> &[String] {
        self.presets
            .iter()
            .find(|p| p.asset == asset)
            .map(|p| p.networks.as_slice())
            .unwrap_or(&[])
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(explicit));
    }
    dirs::home_dir().map(|mut p| {
        p.push(CONFIG_FILE_NAME);
        p
    })
}

//! Persisted tool configuration.
//!
//! Settings live in a single TOML file under the user config directory.
//! Every switch has a typed key with a documented default; reading an
//! absent key yields the default, writing persists immediately visible
//! values for the next session.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsFile {
    #[serde(default)]
    values: BTreeMap<String, toml::Value>,
}

/// A boolean switch with its default.
#[derive(Debug, Clone, Copy)]
pub struct BoolSettingKey {
    pub key: &'static str,
    pub default: bool,
    pub description: &'static str,
}

impl BoolSettingKey {
    pub const fn new(key: &'static str, default: bool, description: &'static str) -> Self {
        Self {
            key,
            default,
            description,
        }
    }
}

/// A string-valued setting with its default.
#[derive(Debug, Clone, Copy)]
pub struct StringSettingKey {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

impl StringSettingKey {
    pub const fn new(key: &'static str, default: &'static str, description: &'static str) -> Self {
        Self {
            key,
            default,
            description,
        }
    }
}

/// Whether already-installed packages should be brought up to date when a
/// dependency set is installed.
pub const KEEP_UPTODATE: BoolSettingKey = BoolSettingKey::new(
    "keep_uptodate",
    true,
    "also update installed packages that have a newer version available",
);

/// How the confirmation gate behaves: `manual`, `auto` or `force`.
pub const INSTALL_MODE: StringSettingKey = StringSettingKey::new(
    "install_mode",
    "manual",
    "manual: show the install command and let the user run it; auto: install without prompting; force: always install",
);

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    data: SettingsFile,
}

impl SettingsStore {
    pub fn load() -> Result<Self> {
        Self::load_from(settings_file_path()?)
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path,
                data: SettingsFile::default(),
            });
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading settings file from {}", path.display()))?;
        let data = toml::from_str(&contents)
            .with_context(|| format!("parsing settings file at {}", path.display()))?;

        Ok(Self { path, data })
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating settings directory at {}", parent.display()))?;
        }

        let contents =
            toml::to_string_pretty(&self.data).context("serializing settings to toml")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("writing settings file to {}", self.path.display()))?;
        Ok(())
    }

    pub fn bool(&self, key: BoolSettingKey) -> bool {
        self.data
            .values
            .get(key.key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(key.default)
    }

    pub fn set_bool(&mut self, key: BoolSettingKey, value: bool) {
        self.data
            .values
            .insert(key.key.to_string(), toml::Value::Boolean(value));
    }

    pub fn string(&self, key: StringSettingKey) -> String {
        self.data
            .values
            .get(key.key)
            .and_then(toml::Value::as_str)
            .unwrap_or(key.default)
            .to_string()
    }

    pub fn set_string(&mut self, key: StringSettingKey, value: impl Into<String>) {
        self.data
            .values
            .insert(key.key.to_string(), toml::Value::String(value.into()));
    }
}

fn settings_file_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("could not determine user config directory")?;
    Ok(config_dir.join("osdeps").join("settings.toml"))
}

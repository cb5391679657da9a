// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration document that dfctl uses to
//! generate a shell run-control file, and to keep track of installed plugins
//! and themes. File I/O is left to the [`store`](crate::store) module.
//!
//! # General Layout
//!
//! The document is composed of the following parts:
//!
//! - `theme`: identifier of the active theme, empty means no custom theme.
//! - `paths`: entries appended to the shell `PATH`.
//! - `plugins`: framework bundled plugin identifiers, and custom plugins that
//!   get cloned from remote repositories.
//! - `themes`: themes that get cloned from remote repositories, or that refer
//!   to themes shipped with the framework.
//! - `aliases`, `exports`: shell aliases and exported variables.
//! - `source`: scripts to source before and after the main body.
//! - `configs`: user variables, framework options, and shell options.
//!
//! Both YAML and TOML are supported. The format is chosen by the extension of
//! the configuration file.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

/// Root configuration document.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfigDocument {
    /// Identifier of the active theme.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub theme: String,

    /// Entries appended to the shell path.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,

    #[serde(skip_serializing_if = "PluginLists::is_empty")]
    pub plugins: PluginLists,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<ThemeSpec>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub exports: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "SourceScripts::is_empty")]
    pub source: SourceScripts,

    #[serde(skip_serializing_if = "Configs::is_empty")]
    pub configs: Configs,
}

impl ConfigDocument {
    /// Decode document from text in target format.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::DeserializeToml`] or [`ConfigError::Yaml`] if
    ///   the text cannot be decoded.
    pub fn decode(data: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Toml => Ok(toml::de::from_str(data)?),
            ConfigFormat::Yaml => Ok(serde_yaml::from_str(data)?),
        }
    }

    /// Encode document into text of target format.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::SerializeToml`] or [`ConfigError::Yaml`] if
    ///   the document cannot be encoded.
    pub fn encode(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Toml => Ok(toml::ser::to_string_pretty(self)?),
            ConfigFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }

    /// Theme entry with target identifier.
    ///
    /// Later entries win if the identifier was reused in a hand-edited file.
    pub fn find_theme(&self, id: impl AsRef<str>) -> Option<&ThemeSpec> {
        self.themes.iter().rev().find(|theme| theme.id == id.as_ref())
    }

    /// Check if a theme entry for target repository already exists.
    pub fn contains_theme_repo(&self, repo: impl AsRef<str>, kind: RepoKind) -> bool {
        self.themes
            .iter()
            .any(|theme| theme.kind == kind && theme.repo == repo.as_ref())
    }
}

/// Plugin listings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginLists {
    /// Plugins shipped with the framework.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bundled: Vec<BundledPluginRef>,

    /// Plugins cloned from remote repositories.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<PluginSpec>,
}

impl PluginLists {
    pub fn is_empty(&self) -> bool {
        self.bundled.is_empty() && self.custom.is_empty()
    }

    /// Check if framework bundled plugin is listed.
    pub fn contains_bundled(&self, id: impl AsRef<str>) -> bool {
        self.bundled.iter().any(|plugin| plugin.as_str() == id.as_ref())
    }

    /// Check if a custom plugin entry for target repository already exists.
    pub fn contains_repo(&self, repo: impl AsRef<str>, kind: RepoKind) -> bool {
        self.custom
            .iter()
            .any(|plugin| plugin.kind == kind && plugin.repo == repo.as_ref())
    }

    /// Custom plugin entry with target identifier.
    ///
    /// Later entries win if the identifier was reused in a hand-edited file.
    pub fn find_custom(&self, id: impl AsRef<str>) -> Option<&PluginSpec> {
        self.custom.iter().rev().find(|plugin| plugin.id == id.as_ref())
    }
}

/// Custom plugin entry.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct PluginSpec {
    pub id: String,

    /// Repository locator, `user/name` for hosted repositories, or a full URL.
    #[serde(default)]
    pub repo: String,

    /// Directory name on disk, basename of `id` if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub kind: RepoKind,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl PluginSpec {
    /// Directory name to use on disk.
    pub fn dir_name(&self) -> &str {
        dir_name(self.name.as_deref(), &self.id)
    }
}

/// Theme entry.
///
/// Whether a theme is enabled is decided by [`ConfigDocument::theme`], so
/// there is no flag for it here.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ThemeSpec {
    pub id: String,

    #[serde(default)]
    pub repo: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub kind: RepoKind,
}

impl ThemeSpec {
    /// Directory name to use on disk.
    pub fn dir_name(&self) -> &str {
        dir_name(self.name.as_deref(), &self.id)
    }
}

fn dir_name<'a>(name: Option<&'a str>, id: &'a str) -> &'a str {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => id.rsplit('/').next().unwrap_or(id),
    }
}

fn enabled_by_default() -> bool {
    true
}

/// Reference to plugin shipped with the framework.
#[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BundledPluginRef(String);

impl BundledPluginRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for BundledPluginRef {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

/// Where an installable comes from.
#[derive(Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Deserialize, Serialize)]
pub enum RepoKind {
    /// Repository hosted on GitHub, referenced as `user/name`.
    #[default]
    #[serde(rename = "github", alias = "gh")]
    HostedGit,

    /// Any repository that git can clone, referenced by full URL.
    #[serde(rename = "git")]
    GenericGit,

    /// Shipped with the framework, never cloned.
    #[serde(rename = "omz")]
    FrameworkBundled,
}

impl RepoKind {
    /// Listing precedence, lower sorts first.
    pub fn order(self) -> u8 {
        match self {
            Self::HostedGit => 0,
            Self::GenericGit => 1,
            Self::FrameworkBundled => 2,
        }
    }

    /// Determine clone URL for repository locator.
    ///
    /// Framework bundled entries have no clone URL.
    pub fn clone_url(self, repo: impl AsRef<str>) -> Option<String> {
        match self {
            Self::HostedGit => Some(format!("https://github.com/{}", repo.as_ref())),
            Self::GenericGit => Some(repo.as_ref().to_string()),
            Self::FrameworkBundled => None,
        }
    }

    /// Short name as shown in listings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostedGit => "github",
            Self::GenericGit => "git",
            Self::FrameworkBundled => "omz",
        }
    }
}

impl Display for RepoKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

/// Scripts to source around the main body of the generated script.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceScripts {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post: Vec<String>,
}

impl SourceScripts {
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.post.is_empty()
    }
}

/// Free-form settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Configs {
    /// Exported user variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub user: BTreeMap<String, String>,

    /// Framework variables, e.g., `DISABLE_AUTO_TITLE`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub framework_options: BTreeMap<String, String>,

    /// Shell options to set or unset.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub shell_options: BTreeMap<String, bool>,
}

impl Configs {
    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.framework_options.is_empty() && self.shell_options.is_empty()
    }
}

/// Serialization format of the configuration file.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Select format by file extension.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::UnsupportedFormat`] if the extension is not
    ///   one of `yaml`, `yml`, or `toml`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let extension = path
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

        match extension.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.as_ref().to_path_buf(),
            }),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize TOML configuration.
    #[error(transparent)]
    DeserializeToml(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error(transparent)]
    SerializeToml(#[from] toml::ser::Error),

    /// Failed to deserialize or serialize YAML configuration.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration file extension names no supported format.
    #[error("unsupported configuration format for {:?}, expected .yaml, .yml, or .toml", path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

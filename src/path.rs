// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where dfctl keeps its configuration file, the framework
//! installation, and every directory that installables get cloned into.
//!
//! # Resolution Order
//!
//! Each root path is resolved independently with the following precedence:
//!
//! 1. Explicit [`Overrides`] supplied at process start, e.g., through
//!    command-line options.
//! 2. Environment variables `DFCTL_HOME`, `DFCTL_OMZ`, and `DFCTL_CONFIG`.
//! 3. Compiled-in defaults rooted at `$HOME/.config/dfctl`.
//!
//! Values taken from the environment go through shell expansion, so `~` and
//! `$VAR` references work the same way they do in a shell.
//!
//! # Layout
//!
//! ```text
//! <home>/dfctl.yaml               configuration document
//! <home>/omz/                     framework installation root
//! <home>/omz/plugins/             framework bundled plugins
//! <home>/omz/themes/              framework bundled themes
//! <home>/omz/custom/plugins/      cloned custom plugins
//! <home>/omz/custom/themes/       cloned custom themes
//! <home>/extensions/              binary extensions
//! ```

use crate::config::ConfigFormat;

use std::{
    env::VarError,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

pub const HOME_VAR: &str = "DFCTL_HOME";
pub const FRAMEWORK_VAR: &str = "DFCTL_OMZ";
pub const CONFIG_VAR: &str = "DFCTL_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "dfctl.yaml";

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(PathError::NoWayHome)
}

/// Determine default absolute path to dfctl home directory.
///
/// Uses `$HOME/.config/dfctl`. Does not check if the path returned actually
/// exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn default_home_dir() -> Result<PathBuf> {
    home_dir().map(|path| path.join(".config").join("dfctl"))
}

/// Explicit path overrides supplied at process start.
///
/// Any field left as `None` falls back to the environment, then to the
/// compiled-in default.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub home: Option<PathBuf>,
    pub framework: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

/// Resolved filesystem layout for a single invocation.
///
/// Constructed once at process start, then handed to everything that needs to
/// know where things live. Nothing in the crate reads the environment after
/// this point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    home: PathBuf,
    framework: PathBuf,
    config_file: PathBuf,
    config_format: ConfigFormat,
}

impl Layout {
    /// Construct layout from explicit root paths.
    ///
    /// # Errors
    ///
    /// - Return [`PathError::Format`] if the config file extension does not
    ///   name a supported format.
    pub fn new(
        home: impl Into<PathBuf>,
        framework: impl Into<PathBuf>,
        config_file: impl Into<PathBuf>,
    ) -> Result<Self> {
        let config_file = config_file.into();
        let config_format = ConfigFormat::from_path(&config_file)?;

        Ok(Self {
            home: home.into(),
            framework: framework.into(),
            config_file,
            config_format,
        })
    }

    /// Construct layout rooted at `home` with every other path defaulted.
    ///
    /// # Errors
    ///
    /// - Return [`PathError::Format`] if the config file extension does not
    ///   name a supported format.
    pub fn with_home(home: impl Into<PathBuf>) -> Result<Self> {
        let home = home.into();
        Self::new(&home, home.join("omz"), home.join(DEFAULT_CONFIG_FILE))
    }

    /// Resolve layout through overrides, the environment, then defaults.
    ///
    /// # Errors
    ///
    /// - Return [`PathError::NoWayHome`] if a default is needed, but the home
    ///   directory cannot be determined.
    /// - Return [`PathError::ShellExpansion`] if an environment value refers
    ///   to an undefined variable.
    /// - Return [`PathError::Format`] if the config file extension does not
    ///   name a supported format.
    #[instrument(skip(overrides), level = "debug")]
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let home = match overrides.home.clone() {
            Some(home) => home,
            None => match from_env(HOME_VAR)? {
                Some(home) => home,
                None => default_home_dir()?,
            },
        };

        let framework = match overrides.framework.clone() {
            Some(framework) => framework,
            None => from_env(FRAMEWORK_VAR)?.unwrap_or_else(|| home.join("omz")),
        };

        let config_file = match overrides.config_file.clone() {
            Some(config_file) => config_file,
            None => from_env(CONFIG_VAR)?.unwrap_or_else(|| home.join(DEFAULT_CONFIG_FILE)),
        };

        let layout = Self::new(home, framework, config_file)?;
        debug!("resolved layout: {layout:?}");

        Ok(layout)
    }

    pub fn home(&self) -> &Path {
        self.home.as_path()
    }

    pub fn framework(&self) -> &Path {
        self.framework.as_path()
    }

    pub fn config_file(&self) -> &Path {
        self.config_file.as_path()
    }

    pub fn config_format(&self) -> ConfigFormat {
        self.config_format
    }

    /// Clone destination for custom plugins.
    pub fn custom_plugins_dir(&self) -> PathBuf {
        self.framework.join("custom").join("plugins")
    }

    /// Clone destination for custom themes.
    pub fn custom_themes_dir(&self) -> PathBuf {
        self.framework.join("custom").join("themes")
    }

    /// Plugins shipped with the framework itself.
    pub fn framework_plugins_dir(&self) -> PathBuf {
        self.framework.join("plugins")
    }

    /// Themes shipped with the framework itself.
    pub fn framework_themes_dir(&self) -> PathBuf {
        self.framework.join("themes")
    }

    pub fn extensions_dir(&self) -> PathBuf {
        self.home.join("extensions")
    }
}

fn from_env(key: &str) -> Result<Option<PathBuf>> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => {
            let expanded = shellexpand::full(value.as_str())?;
            Ok(Some(PathBuf::from(expanded.into_owned())))
        }
        _ => Ok(None),
    }
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's home directory.
    #[error("cannot determine absolute path to user's home directory")]
    NoWayHome,

    /// Environment value refers to something that cannot be expanded.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<VarError>),

    /// Config file extension is not supported.
    #[error(transparent)]
    Format(#[from] crate::config::ConfigError),
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;

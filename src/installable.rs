// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Installable plugins and themes.
//!
//! An __installable__ is anything dfctl can identify, locate on disk, check
//! for install and enabled state, install, and toggle. There are three
//! variants:
//!
//! - [`Plugin`]: custom plugin cloned from a remote repository into the
//!   framework's custom plugin directory.
//! - [`Theme`]: theme cloned from a remote repository into the framework's
//!   custom theme directory, or a theme shipped with the framework.
//! - [`BundledPlugin`]: plugin shipped with the framework, never cloned.
//!
//! Every variant implements the [`Installable`] capability set once, and
//! [`Entry`] ties them together as a sum type with an explicit discriminant so
//! the catalog can hold all of them in one collection.
//!
//! # Derived State
//!
//! Installables never cache whether they are installed or enabled. Install
//! state is read from the filesystem, and enabled state from the
//! configuration document, every time it is asked for. The configuration
//! file and the filesystem are the only sources of truth.
//!
//! # Idempotence
//!
//! Installing something that is already on disk is a no-op that reports
//! [`InstallOutcome::Unchanged`]. Enabling something that is already enabled,
//! or disabling something that is not enabled, is a no-op that succeeds.
//! Re-running a failed command is therefore always safe.

pub mod bundled;
pub mod plugin;
pub mod theme;

#[doc(inline)]
pub use bundled::BundledPlugin;
#[doc(inline)]
pub use plugin::Plugin;
#[doc(inline)]
pub use theme::Theme;

use crate::{
    config::{ConfigDocument, RepoKind},
    git::{CloneError, RepoCloner},
    path::Layout,
    session::Session,
    store::StoreError,
    urn::RepoUrn,
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Capability set shared by every installable.
pub trait Installable {
    /// Identifier that users refer to the installable by.
    fn id(&self) -> &str;

    /// Where the installable comes from.
    fn kind(&self) -> RepoKind;

    /// Whether the installable is a plugin or a theme.
    fn role(&self) -> Role;

    /// Location of the installable on disk.
    fn locate_path(&self, layout: &Layout) -> PathBuf;

    /// Check if the installable exists on disk.
    fn is_installed(&self, layout: &Layout) -> bool {
        self.locate_path(layout).exists()
    }

    /// Check if the configuration document enables the installable.
    fn is_enabled(&self, document: &ConfigDocument) -> bool;

    /// Install the installable if it is not on disk yet.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Clone`] if cloning fails. The configuration
    ///   document is left untouched in that case.
    /// - Return [`InstallError::Store`] if the configuration document cannot
    ///   be saved after cloning.
    fn install(&self, session: &mut Session<impl RepoCloner>) -> Result<InstallOutcome>;

    /// Enable or disable the installable, and persist the change.
    ///
    /// # Errors
    ///
    /// - Return [`InstallError::Store`] if the configuration document cannot
    ///   be saved.
    fn set_enabled(&self, session: &mut Session<impl RepoCloner>, enable: bool) -> Result<()>;
}

/// Whether an installable is a plugin or a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Plugin,
    Theme,
}

impl Display for Role {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Plugin => fmt.write_str("plugin"),
            Self::Theme => fmt.write_str("theme"),
        }
    }
}

/// Result of a successful install call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Cloned onto disk by this call.
    Installed,

    /// Nothing to do, already on disk or never needs cloning.
    Unchanged,
}

impl InstallOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed)
    }
}

/// Any installable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Plugin(Plugin),
    Theme(Theme),
    Bundled(BundledPlugin),
}

impl Entry {
    /// Construct plugin entry from repository URN.
    ///
    /// Framework bundled URNs become [`BundledPlugin`] entries, everything
    /// else becomes a custom [`Plugin`].
    pub fn plugin_from_urn(urn: &RepoUrn, id: Option<String>, name: Option<String>) -> Self {
        match urn.kind() {
            RepoKind::FrameworkBundled => {
                let (id, _) = urn.identify(id, name);
                Self::Bundled(BundledPlugin::new(id))
            }
            _ => Self::Plugin(Plugin::new(urn.to_plugin_spec(id, name))),
        }
    }

    /// Construct theme entry from repository URN.
    pub fn theme_from_urn(urn: &RepoUrn, id: Option<String>, name: Option<String>) -> Self {
        Self::Theme(Theme::new(urn.to_theme_spec(id, name)))
    }

    /// URL the entry gets cloned from, if it is cloned at all.
    pub fn clone_url(&self) -> Option<String> {
        match self {
            Self::Plugin(plugin) => plugin.kind().clone_url(&plugin.spec().repo),
            Self::Theme(theme) => theme.kind().clone_url(&theme.spec().repo),
            Self::Bundled(_) => None,
        }
    }
}

impl Installable for Entry {
    fn id(&self) -> &str {
        match self {
            Self::Plugin(plugin) => plugin.id(),
            Self::Theme(theme) => theme.id(),
            Self::Bundled(bundled) => bundled.id(),
        }
    }

    fn kind(&self) -> RepoKind {
        match self {
            Self::Plugin(plugin) => plugin.kind(),
            Self::Theme(theme) => theme.kind(),
            Self::Bundled(bundled) => bundled.kind(),
        }
    }

    fn role(&self) -> Role {
        match self {
            Self::Plugin(plugin) => plugin.role(),
            Self::Theme(theme) => theme.role(),
            Self::Bundled(bundled) => bundled.role(),
        }
    }

    fn locate_path(&self, layout: &Layout) -> PathBuf {
        match self {
            Self::Plugin(plugin) => plugin.locate_path(layout),
            Self::Theme(theme) => theme.locate_path(layout),
            Self::Bundled(bundled) => bundled.locate_path(layout),
        }
    }

    fn is_installed(&self, layout: &Layout) -> bool {
        match self {
            Self::Plugin(plugin) => plugin.is_installed(layout),
            Self::Theme(theme) => theme.is_installed(layout),
            Self::Bundled(bundled) => bundled.is_installed(layout),
        }
    }

    fn is_enabled(&self, document: &ConfigDocument) -> bool {
        match self {
            Self::Plugin(plugin) => plugin.is_enabled(document),
            Self::Theme(theme) => theme.is_enabled(document),
            Self::Bundled(bundled) => bundled.is_enabled(document),
        }
    }

    fn install(&self, session: &mut Session<impl RepoCloner>) -> Result<InstallOutcome> {
        match self {
            Self::Plugin(plugin) => plugin.install(session),
            Self::Theme(theme) => theme.install(session),
            Self::Bundled(bundled) => bundled.install(session),
        }
    }

    fn set_enabled(&self, session: &mut Session<impl RepoCloner>, enable: bool) -> Result<()> {
        match self {
            Self::Plugin(plugin) => plugin.set_enabled(session, enable),
            Self::Theme(theme) => theme.set_enabled(session, enable),
            Self::Bundled(bundled) => bundled.set_enabled(session, enable),
        }
    }
}

impl From<Plugin> for Entry {
    fn from(plugin: Plugin) -> Self {
        Self::Plugin(plugin)
    }
}

impl From<Theme> for Entry {
    fn from(theme: Theme) -> Self {
        Self::Theme(theme)
    }
}

impl From<BundledPlugin> for Entry {
    fn from(bundled: BundledPlugin) -> Self {
        Self::Bundled(bundled)
    }
}

/// Clone repository into target path unless something is already there.
///
/// Returns `false` if the path already exists, and `true` if this call
/// cloned it.
pub(crate) fn clone_if_absent(
    session: &Session<impl RepoCloner>,
    id: &str,
    url: &str,
    path: &Path,
) -> Result<bool> {
    if path.exists() {
        debug!("{id} is already installed at {:?}", path.display());
        return Ok(false);
    }

    info!("install {id} from {url}");
    session
        .cloner()
        .clone_repo(url, path)
        .map_err(|err| InstallError::Clone {
            source: err,
            id: id.to_string(),
            url: url.to_string(),
        })?;

    Ok(true)
}

/// Installable error types.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// Repository cannot be cloned.
    #[error("failed to install {id} from {url}")]
    Clone {
        #[source]
        source: CloneError,
        id: String,
        url: String,
    },

    /// Configuration document cannot be saved.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Friendly result alias :3
pub type Result<T, E = InstallError> = std::result::Result<T, E>;

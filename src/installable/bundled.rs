// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Framework bundled plugins.
//!
//! Bundled plugins ship with the framework installation itself, so there is
//! never anything to clone. They are enabled by listing their identifier
//! under `plugins.bundled`.

use crate::{
    config::{BundledPluginRef, ConfigDocument, RepoKind},
    git::RepoCloner,
    installable::{InstallOutcome, Installable, Result, Role},
    path::Layout,
    session::Session,
};

use std::path::PathBuf;
use tracing::instrument;

/// Plugin shipped with the framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledPlugin {
    id: String,
}

impl BundledPlugin {
    /// Construct new bundled plugin.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl From<&BundledPluginRef> for BundledPlugin {
    fn from(reference: &BundledPluginRef) -> Self {
        Self::new(reference.as_str())
    }
}

impl Installable for BundledPlugin {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn kind(&self) -> RepoKind {
        RepoKind::FrameworkBundled
    }

    fn role(&self) -> Role {
        Role::Plugin
    }

    fn locate_path(&self, layout: &Layout) -> PathBuf {
        layout.framework_plugins_dir().join(&self.id)
    }

    fn is_installed(&self, _layout: &Layout) -> bool {
        true
    }

    fn is_enabled(&self, document: &ConfigDocument) -> bool {
        document.plugins.contains_bundled(&self.id)
    }

    fn install(&self, _session: &mut Session<impl RepoCloner>) -> Result<InstallOutcome> {
        Ok(InstallOutcome::Unchanged)
    }

    #[instrument(skip(self, session), fields(id = %self.id), level = "debug")]
    fn set_enabled(&self, session: &mut Session<impl RepoCloner>, enable: bool) -> Result<()> {
        if self.is_enabled(session.document()) == enable {
            return Ok(());
        }

        let bundled = &mut session.document_mut().plugins.bundled;
        if enable {
            bundled.push(BundledPluginRef::new(&self.id));
        } else {
            bundled.retain(|reference| reference.as_str() != self.id);
        }

        session.persist()?;
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Custom plugins.
//!
//! A custom plugin is cloned from a remote repository into
//! `<framework>/custom/plugins/<name>`. The framework picks it up from there
//! once the plugin identifier appears in the generated plugin list.
//!
//! Enabling a custom plugin means listing it under `plugins.custom` in the
//! configuration document, and disabling it removes it from that list.

use crate::{
    config::{ConfigDocument, PluginSpec, RepoKind},
    git::RepoCloner,
    installable::{clone_if_absent, InstallOutcome, Installable, Result, Role},
    path::Layout,
    session::Session,
};

use std::path::PathBuf;
use tracing::{debug, instrument};

/// Custom plugin backed by a [`PluginSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    spec: PluginSpec,
}

impl Plugin {
    /// Construct new custom plugin.
    pub fn new(spec: PluginSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &PluginSpec {
        &self.spec
    }
}

impl Installable for Plugin {
    fn id(&self) -> &str {
        self.spec.id.as_str()
    }

    fn kind(&self) -> RepoKind {
        self.spec.kind
    }

    fn role(&self) -> Role {
        Role::Plugin
    }

    fn locate_path(&self, layout: &Layout) -> PathBuf {
        match self.spec.kind {
            RepoKind::FrameworkBundled => layout.framework_plugins_dir(),
            _ => layout.custom_plugins_dir(),
        }
        .join(self.spec.dir_name())
    }

    fn is_enabled(&self, document: &ConfigDocument) -> bool {
        document
            .plugins
            .find_custom(&self.spec.id)
            .is_some_and(|spec| spec.enabled)
    }

    /// Clone plugin if absent, then make sure the configuration lists it.
    ///
    /// Entries are keyed by repository and kind, so installing the same
    /// repository twice never produces a duplicate entry.
    #[instrument(skip(self, session), fields(id = %self.spec.id), level = "debug")]
    fn install(&self, session: &mut Session<impl RepoCloner>) -> Result<InstallOutcome> {
        let Some(url) = self.spec.kind.clone_url(&self.spec.repo) else {
            debug!("plugin {} of kind omz does not need to be installed", self.spec.id);
            return Ok(InstallOutcome::Unchanged);
        };

        let path = self.locate_path(session.layout());
        let outcome = if clone_if_absent(&*session, &self.spec.id, &url, &path)? {
            InstallOutcome::Installed
        } else {
            InstallOutcome::Unchanged
        };

        // INVARIANT: A plugin directory on disk is always declared afterwards.
        if !session
            .document()
            .plugins
            .contains_repo(&self.spec.repo, self.spec.kind)
        {
            debug!("declare plugin {}", self.spec.id);
            session.document_mut().plugins.custom.push(self.spec.clone());
            session.persist()?;
        }

        Ok(outcome)
    }

    #[instrument(skip(self, session), fields(id = %self.spec.id), level = "debug")]
    fn set_enabled(&self, session: &mut Session<impl RepoCloner>, enable: bool) -> Result<()> {
        let custom = &mut session.document_mut().plugins.custom;
        let position = custom.iter().rposition(|spec| spec.id == self.spec.id);

        match (position, enable) {
            (Some(index), true) if custom[index].enabled => return Ok(()),
            (Some(index), true) => custom[index].enabled = true,
            (Some(_), false) => custom.retain(|spec| spec.id != self.spec.id),
            (None, true) => custom.push(PluginSpec {
                enabled: true,
                ..self.spec.clone()
            }),
            (None, false) => return Ok(()),
        }

        session.persist()?;
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Themes.
//!
//! At most one theme is enabled at any time: the one whose identifier the
//! configuration document names as its `theme`. Enabling a theme replaces
//! whatever theme was active before.

use crate::{
    config::{ConfigDocument, RepoKind, ThemeSpec},
    git::RepoCloner,
    installable::{clone_if_absent, InstallOutcome, Installable, Result, Role},
    path::Layout,
    session::Session,
};

use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Theme backed by a [`ThemeSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    spec: ThemeSpec,
}

impl Theme {
    /// Construct new theme.
    pub fn new(spec: ThemeSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &ThemeSpec {
        &self.spec
    }
}

impl Installable for Theme {
    fn id(&self) -> &str {
        self.spec.id.as_str()
    }

    fn kind(&self) -> RepoKind {
        self.spec.kind
    }

    fn role(&self) -> Role {
        Role::Theme
    }

    fn locate_path(&self, layout: &Layout) -> PathBuf {
        match self.spec.kind {
            RepoKind::FrameworkBundled => layout.framework_themes_dir(),
            _ => layout.custom_themes_dir(),
        }
        .join(self.spec.dir_name())
    }

    /// Framework themes ship as single files, so they always count as
    /// installed.
    fn is_installed(&self, layout: &Layout) -> bool {
        self.spec.kind == RepoKind::FrameworkBundled || self.locate_path(layout).exists()
    }

    fn is_enabled(&self, document: &ConfigDocument) -> bool {
        document.theme == self.spec.id
    }

    /// Clone theme if absent, then make sure the configuration lists it.
    ///
    /// Framework themes and themes already on disk are still declared, so
    /// the catalog always sees the theme the document makes active.
    #[instrument(skip(self, session), fields(id = %self.spec.id), level = "debug")]
    fn install(&self, session: &mut Session<impl RepoCloner>) -> Result<InstallOutcome> {
        let outcome = match self.spec.kind.clone_url(&self.spec.repo) {
            Some(url) => {
                let path = self.locate_path(session.layout());
                if clone_if_absent(&*session, &self.spec.id, &url, &path)? {
                    InstallOutcome::Installed
                } else {
                    InstallOutcome::Unchanged
                }
            }
            None => {
                debug!("theme {} of kind omz does not need to be cloned", self.spec.id);
                InstallOutcome::Unchanged
            }
        };

        if !session
            .document()
            .contains_theme_repo(&self.spec.repo, self.spec.kind)
        {
            debug!("declare theme {}", self.spec.id);
            session.document_mut().themes.push(self.spec.clone());
            session.persist()?;
        }

        Ok(outcome)
    }

    #[instrument(skip(self, session), fields(id = %self.spec.id), level = "debug")]
    fn set_enabled(&self, session: &mut Session<impl RepoCloner>, enable: bool) -> Result<()> {
        let active = &mut session.document_mut().theme;
        match (*active == self.spec.id, enable) {
            (true, true) | (false, false) => return Ok(()),
            (false, true) => {
                info!("switch theme from {active:?} to {:?}", self.spec.id);
                *active = self.spec.id.clone();
            }
            (true, false) => {
                info!("disable theme {:?}", self.spec.id);
                active.clear();
            }
        }

        session.persist()?;
        Ok(())
    }
}

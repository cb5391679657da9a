// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository URN parsing.
//!
//! Users reference the source of a plugin or theme through a compact
//! `<kind>:<locator>` string:
//!
//! | Kind token | Repository kind                         | Clone URL                         |
//! |------------|-----------------------------------------|-----------------------------------|
//! | `gh`       | [`RepoKind::HostedGit`]                 | `https://github.com/<locator>`    |
//! | `git`      | [`RepoKind::GenericGit`]                | `<locator>` verbatim              |
//! | `omz`      | [`RepoKind::FrameworkBundled`]          | none, shipped with the framework  |
//!
//! Kind tokens are matched case-insensitively. The identifier of the entry
//! is derived from the last path segment of the locator unless the user
//! supplies one explicitly.

use crate::config::{PluginSpec, RepoKind, ThemeSpec};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Parsed repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoUrn {
    kind: RepoKind,
    locator: String,
    derived_id: String,
}

impl RepoUrn {
    pub fn kind(&self) -> RepoKind {
        self.kind
    }

    pub fn locator(&self) -> &str {
        self.locator.as_str()
    }

    /// Last path segment of the locator.
    pub fn derived_id(&self) -> &str {
        self.derived_id.as_str()
    }

    /// Resolved clone URL, none for framework bundled references.
    pub fn clone_url(&self) -> Option<String> {
        self.kind.clone_url(&self.locator)
    }

    /// Determine identifier and directory name from optional overrides.
    ///
    /// Identifier falls back to the derived identifier, and the name falls
    /// back to the identifier.
    pub fn identify(&self, id: Option<String>, name: Option<String>) -> (String, String) {
        let id = id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.derived_id.clone());
        let name = name.filter(|name| !name.is_empty()).unwrap_or_else(|| id.clone());
        (id, name)
    }

    /// Build enabled custom plugin entry.
    pub fn to_plugin_spec(&self, id: Option<String>, name: Option<String>) -> PluginSpec {
        let (id, name) = self.identify(id, name);
        PluginSpec {
            id,
            repo: self.locator.clone(),
            name: Some(name),
            kind: self.kind,
            enabled: true,
        }
    }

    /// Build theme entry.
    pub fn to_theme_spec(&self, id: Option<String>, name: Option<String>) -> ThemeSpec {
        let (id, name) = self.identify(id, name);
        ThemeSpec {
            id,
            repo: self.locator.clone(),
            name: Some(name),
            kind: self.kind,
        }
    }
}

impl FromStr for RepoUrn {
    type Err = UrnError;

    fn from_str(urn: &str) -> Result<Self, Self::Err> {
        let (token, locator) = urn
            .split_once(':')
            .ok_or_else(|| UrnError::MissingSeparator(urn.to_string()))?;

        let kind = match token.to_ascii_lowercase().as_str() {
            "gh" => RepoKind::HostedGit,
            "git" => RepoKind::GenericGit,
            "omz" => RepoKind::FrameworkBundled,
            _ => return Err(UrnError::UnsupportedKind(token.to_string())),
        };

        // INVARIANT: Trailing slashes never produce an empty identifier.
        let derived_id = locator
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if derived_id.is_empty() {
            return Err(UrnError::EmptyLocator(urn.to_string()));
        }

        Ok(Self {
            kind,
            locator: locator.to_string(),
            derived_id,
        })
    }
}

impl Display for RepoUrn {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let token = match self.kind {
            RepoKind::HostedGit => "gh",
            RepoKind::GenericGit => "git",
            RepoKind::FrameworkBundled => "omz",
        };
        write!(fmt, "{token}:{}", self.locator)
    }
}

/// URN parsing error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrnError {
    /// Kind token is not one of `gh`, `git`, or `omz`.
    #[error("kind {0:?} is not supported, expected one of gh, git, or omz")]
    UnsupportedKind(String),

    /// No `:` between kind token and locator.
    #[error("{0:?} is not a repository urn, expected <kind>:<locator>")]
    MissingSeparator(String),

    /// Locator yields no identifier.
    #[error("{0:?} has an empty locator")]
    EmptyLocator(String),
}

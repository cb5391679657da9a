// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Catalog of installables.
//!
//! The catalog is the unified view over every plugin and theme dfctl knows
//! about at a point in time. It is the union of:
//!
//! 1. Framework bundled plugins discovered by listing the framework's plugin
//!    directory on disk.
//! 2. Framework bundled plugins declared in the configuration document.
//! 3. Themes declared in the configuration document.
//! 4. Custom plugins declared in the configuration document.
//!
//! Entries are deduplicated by role and identifier. Later sources win over
//! earlier ones, so anything the configuration document declares replaces a
//! plain directory discovered on disk.
//!
//! A catalog is a snapshot. Install and enabled state are projected from the
//! filesystem and the configuration document when the catalog is built, and
//! never refreshed afterwards. Build a new catalog after mutating either.

use crate::{
    config::{ConfigDocument, RepoKind},
    git::RepoCloner,
    installable::{BundledPlugin, Entry, Installable, Plugin, Role, Theme},
    path::Layout,
    session::Session,
    store::{ConfigStore, StoreError},
};

use std::{
    collections::BTreeMap,
    fs::read_dir,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, instrument};

/// Installable with its state projected at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    entry: Entry,
    path: PathBuf,
    installed: bool,
    enabled: bool,
}

impl CatalogItem {
    /// Project state of installable entry.
    pub fn project(entry: Entry, layout: &Layout, document: &ConfigDocument) -> Self {
        let path = entry.locate_path(layout);
        let installed = entry.is_installed(layout);
        let enabled = entry.is_enabled(document);

        Self {
            entry,
            path,
            installed,
            enabled,
        }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn id(&self) -> &str {
        self.entry.id()
    }

    pub fn kind(&self) -> RepoKind {
        self.entry.kind()
    }

    pub fn role(&self) -> Role {
        self.entry.role()
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Predicate over catalog items.
///
/// Filters compose by logical AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Match everything.
    All,

    /// Match by enabled state.
    Enabled(bool),

    /// Match by install state.
    Installed(bool),

    /// Match by repository kind.
    Kind(RepoKind),

    /// Match plugins or themes only.
    Role(Role),
}

impl Filter {
    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            Self::All => true,
            Self::Enabled(enabled) => item.is_enabled() == *enabled,
            Self::Installed(installed) => item.is_installed() == *installed,
            Self::Kind(kind) => item.kind() == *kind,
            Self::Role(role) => item.role() == *role,
        }
    }
}

impl FromStr for Filter {
    type Err = CatalogError;

    fn from_str(filter: &str) -> Result<Self, Self::Err> {
        match filter.trim() {
            "all" => Ok(Self::All),
            "enabled" => Ok(Self::Enabled(true)),
            "disabled" => Ok(Self::Enabled(false)),
            "installed" => Ok(Self::Installed(true)),
            "uninstalled" => Ok(Self::Installed(false)),
            "kind:gh" | "kind:github" => Ok(Self::Kind(RepoKind::HostedGit)),
            "kind:git" => Ok(Self::Kind(RepoKind::GenericGit)),
            "kind:omz" => Ok(Self::Kind(RepoKind::FrameworkBundled)),
            _ => Err(CatalogError::UnknownFilter(filter.to_string())),
        }
    }
}

/// Parse list of filter strings.
///
/// `all` discards every filter parsed before it, and ends parsing, so
/// `all,enabled` matches everything.
///
/// # Errors
///
/// - Return [`CatalogError::UnknownFilter`] if a filter before any `all` is
///   not recognized.
pub fn parse_filters<I, S>(filters: I) -> Result<Vec<Filter>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = Vec::new();
    for filter in filters {
        match filter.as_ref().parse::<Filter>()? {
            Filter::All => return Ok(vec![Filter::All]),
            filter => parsed.push(filter),
        }
    }

    Ok(parsed)
}

/// Unified, sorted, deduplicated set of installables.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Build catalog from configuration document and filesystem state.
    ///
    /// Items are sorted by kind precedence first, then by identifier.
    #[instrument(skip(layout, document), level = "debug")]
    pub fn build(layout: &Layout, document: &ConfigDocument) -> Self {
        let discovered = discover_bundled(&layout.framework_plugins_dir())
            .into_iter()
            .map(|id| Entry::from(BundledPlugin::new(id)));
        let declared = document
            .plugins
            .bundled
            .iter()
            .map(|reference| Entry::from(BundledPlugin::from(reference)));
        let themes = document
            .themes
            .iter()
            .map(|spec| Entry::from(Theme::new(spec.clone())));
        let custom = document
            .plugins
            .custom
            .iter()
            .map(|spec| Entry::from(Plugin::new(spec.clone())));

        // INVARIANT: Dedupe per role, a theme and a plugin may share an id.
        let mut unique: BTreeMap<(Role, String), Entry> = BTreeMap::new();
        for entry in discovered.chain(declared).chain(themes).chain(custom) {
            unique.insert((entry.role(), entry.id().to_string()), entry);
        }

        let mut items = unique
            .into_values()
            .map(|entry| CatalogItem::project(entry, layout, document))
            .collect::<Vec<_>>();
        items.sort_by(|lhs, rhs| {
            (lhs.kind().order(), lhs.id()).cmp(&(rhs.kind().order(), rhs.id()))
        });
        debug!("catalog holds {} items", items.len());

        Self { items }
    }

    /// Load configuration document of layout, and build catalog from it.
    ///
    /// # Errors
    ///
    /// - Return [`CatalogError::Load`] if the configuration document cannot
    ///   be loaded. No partial catalog is produced.
    pub fn load(layout: &Layout) -> Result<Self> {
        let store = ConfigStore::new(layout.config_file(), layout.config_format());
        let document = store.load()?;
        Ok(Self::build(layout, &document))
    }

    /// Build catalog from the current state of a session.
    pub fn from_session(session: &Session<impl RepoCloner>) -> Self {
        Self::build(session.layout(), session.document())
    }

    pub fn items(&self) -> &[CatalogItem] {
        self.items.as_slice()
    }

    pub fn into_items(self) -> Vec<CatalogItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// List items matching every filter, in catalog order.
    pub fn list(&self, filters: &[Filter]) -> Vec<&CatalogItem> {
        self.items
            .iter()
            .filter(|item| filters.iter().all(|filter| filter.matches(item)))
            .collect()
    }

    /// Resolve identifiers against the catalog.
    ///
    /// Items come back in request order. Identifiers that match nothing are
    /// dropped, and identifiers that match both a plugin and a theme yield
    /// both.
    pub fn resolve<S>(&self, ids: &[S], filters: &[Filter]) -> Vec<&CatalogItem>
    where
        S: AsRef<str>,
    {
        let candidates = self.list(filters);
        let mut resolved = Vec::new();
        for id in ids {
            let matches = candidates
                .iter()
                .copied()
                .filter(|item| item.id() == id.as_ref())
                .collect::<Vec<_>>();

            if matches.is_empty() {
                debug!("{:?} is not in the catalog, skipping", id.as_ref());
            }
            resolved.extend(matches);
        }

        resolved
    }
}

impl<'catalog> IntoIterator for &'catalog Catalog {
    type Item = &'catalog CatalogItem;
    type IntoIter = std::slice::Iter<'catalog, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// List framework plugin directory.
///
/// A missing or unreadable directory just means the framework has not been
/// installed yet, so it contributes nothing.
fn discover_bundled(dir: &Path) -> Vec<String> {
    let entries = match read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("cannot list framework plugins at {:?}: {err}", dir.display());
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect()
}

/// Catalog error types.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Configuration document cannot be loaded.
    #[error(transparent)]
    Load(#[from] StoreError),

    /// Filter string is not recognized.
    #[error("unsupported filter {0:?}")]
    UnknownFilter(String),
}

/// Friendly result alias :3
pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

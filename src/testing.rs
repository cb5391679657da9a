// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shared unit test harness.

use crate::{
    config::ConfigDocument,
    git::{CloneError, RepoCloner},
    path::Layout,
    session::Session,
    store::ConfigStore,
};

use std::{cell::RefCell, collections::HashSet, fs, path::Path};
use tempfile::TempDir;

/// Cloner that never touches the network.
///
/// Every successful "clone" creates the destination directory with a single
/// README in it. URLs registered as failing produce a libgit2 error instead.
#[derive(Debug, Default)]
pub(crate) struct FakeCloner {
    failing: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeCloner {
    pub(crate) fn failing<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            failing: urls.into_iter().map(Into::into).collect(),
            calls: RefCell::default(),
        }
    }

    /// URLs cloned so far, in call order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl RepoCloner for FakeCloner {
    fn clone_repo(&self, url: &str, destination: &Path) -> Result<(), CloneError> {
        self.calls.borrow_mut().push(url.to_string());
        if self.failing.contains(url) {
            return Err(CloneError::Git2(git2::Error::from_str(&format!(
                "failed to resolve address for {url}"
            ))));
        }

        let create_err = |err| CloneError::CreateDir {
            source: err,
            path: destination.to_path_buf(),
        };
        fs::create_dir_all(destination).map_err(create_err)?;
        fs::write(destination.join("README.md"), url).map_err(create_err)?;

        Ok(())
    }
}

/// Scratch home directory with a saved default configuration document.
#[derive(Debug)]
pub(crate) struct Fixture {
    _root: TempDir,
    pub(crate) layout: Layout,
}

impl Fixture {
    pub(crate) fn new() -> anyhow::Result<Self> {
        let root = TempDir::new()?;
        let layout = Layout::with_home(root.path())?;
        let fixture = Self {
            _root: root,
            layout,
        };
        fixture.store(&ConfigDocument::default())?;

        Ok(fixture)
    }

    pub(crate) fn store(&self, document: &ConfigDocument) -> anyhow::Result<()> {
        self.config_store().save(document)?;
        Ok(())
    }

    pub(crate) fn stored(&self) -> anyhow::Result<ConfigDocument> {
        Ok(self.config_store().load()?)
    }

    pub(crate) fn session(&self) -> anyhow::Result<Session<FakeCloner>> {
        Ok(Session::open(self.layout.clone(), FakeCloner::default())?)
    }

    pub(crate) fn session_failing<I, S>(&self, urls: I) -> anyhow::Result<Session<FakeCloner>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Session::open(self.layout.clone(), FakeCloner::failing(urls))?)
    }

    /// Create framework bundled plugin directories on disk.
    pub(crate) fn framework_plugins(&self, ids: &[&str]) -> anyhow::Result<()> {
        for id in ids {
            fs::create_dir_all(self.layout.framework_plugins_dir().join(id))?;
        }
        Ok(())
    }

    fn config_store(&self) -> ConfigStore {
        ConfigStore::new(self.layout.config_file(), self.layout.config_format())
    }
}

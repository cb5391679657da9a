// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Invocation context.
//!
//! A [`Session`] bundles everything a single command needs to query and
//! mutate installables: the resolved [`Layout`], the [`ConfigStore`], the
//! loaded [`ConfigDocument`], and the [`RepoCloner`] to install through.
//!
//! The session exclusively owns the in-memory document for the duration of a
//! command. Mutations happen on that value, and only reach the disk through
//! an explicit [`Session::persist`] call.

use crate::{
    config::ConfigDocument,
    git::{Git2Cloner, RepoCloner},
    path::Layout,
    store::{ConfigStore, StoreError},
};

/// Context for a single command invocation.
#[derive(Debug)]
pub struct Session<C = Git2Cloner>
where
    C: RepoCloner,
{
    layout: Layout,
    store: ConfigStore,
    document: ConfigDocument,
    cloner: C,
}

impl<C> Session<C>
where
    C: RepoCloner,
{
    /// Open session by loading the configuration document of target layout.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError`] if the configuration document cannot be
    ///   loaded.
    pub fn open(layout: Layout, cloner: C) -> Result<Self, StoreError> {
        let store = ConfigStore::new(layout.config_file(), layout.config_format());
        let document = store.load()?;

        Ok(Self {
            layout,
            store,
            document,
            cloner,
        })
    }

    /// Construct session from an already loaded document.
    pub fn with_document(layout: Layout, document: ConfigDocument, cloner: C) -> Self {
        let store = ConfigStore::new(layout.config_file(), layout.config_format());
        Self {
            layout,
            store,
            document,
            cloner,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut ConfigDocument {
        &mut self.document
    }

    pub fn cloner(&self) -> &C {
        &self.cloner
    }

    /// Save current document through the configuration store.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError`] if the document cannot be saved.
    pub fn persist(&self) -> Result<(), StoreError> {
        self.store.save(&self.document)
    }

    /// Consume session, and hand back the document.
    pub fn into_document(self) -> ConfigDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::BundledPluginRef,
        testing::{FakeCloner, Fixture},
    };
    use pretty_assertions::assert_eq;
    use std::fs::read_dir;

    #[test]
    fn last_writer_wins() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut first = fixture.session()?;
        let mut second = fixture.session()?;

        first.document_mut().theme = "agnoster".into();
        second
            .document_mut()
            .plugins
            .bundled
            .push(BundledPluginRef::new("git"));
        first.persist()?;
        second.persist()?;

        assert_eq!(fixture.stored()?, second.into_document());
        assert_eq!(fixture.stored()?.theme, "");

        // INVARIANT: Atomic saves never leave temporary files behind.
        let leftovers = read_dir(fixture.layout.home())?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);

        Ok(())
    }

    #[test]
    fn session_with_document_persists_it() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut document = ConfigDocument::default();
        document.paths.push("$HOME/bin".into());

        let layout = fixture.layout.clone();
        let session = Session::with_document(layout, document.clone(), FakeCloner::default());
        assert_eq!(session.store().path(), fixture.layout.config_file());
        session.persist()?;
        assert_eq!(fixture.stored()?, document);

        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration store.
//!
//! Load and save the [`ConfigDocument`] from and to its file. The store knows
//! nothing about plugins or themes. It only moves documents between memory
//! and disk in whatever format the file extension calls for.
//!
//! # Atomic Saves
//!
//! A save never truncates the configuration file in place. The encoded
//! document is written to a temporary file inside the same directory, flushed
//! to disk, and then renamed over the original. Readers either see the old
//! document or the new one, never a partial write.
//!
//! Concurrent invocations against the same file are not coordinated. The
//! last writer wins.

use crate::config::{ConfigDocument, ConfigFormat};

use std::{
    fs::read_to_string,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Configuration file handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
    format: ConfigFormat,
}

impl ConfigStore {
    /// Construct new configuration store for target file.
    pub fn new(path: impl Into<PathBuf>, format: ConfigFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Load configuration document.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Load`] if the file cannot be read.
    /// - Return [`StoreError::Decode`] if the file content cannot be decoded.
    #[instrument(skip(self), level = "debug")]
    pub fn load(&self) -> Result<ConfigDocument> {
        debug!("load configuration from {:?}", self.path.display());
        let data = read_to_string(&self.path).map_err(|err| StoreError::Load {
            source: err,
            path: self.path.clone(),
        })?;

        self.decode(&data)
    }

    /// Decode document from text in the store's format.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Decode`] if the text cannot be decoded.
    pub fn decode(&self, data: &str) -> Result<ConfigDocument> {
        ConfigDocument::decode(data, self.format).map_err(|err| StoreError::Decode {
            source: err,
            path: self.path.clone(),
        })
    }

    /// Encode document into text in the store's format.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Encode`] if the document cannot be encoded.
    pub fn encode(&self, document: &ConfigDocument) -> Result<String> {
        document.encode(self.format).map_err(StoreError::Encode)
    }

    /// Save configuration document atomically.
    ///
    /// Creates parent directories if they do not exist yet.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Encode`] if the document cannot be encoded.
    /// - Return [`StoreError::Save`] if the document cannot be written.
    #[instrument(skip(self, document), level = "debug")]
    pub fn save(&self, document: &ConfigDocument) -> Result<()> {
        let contents = self.encode(document)?;
        let save_err = |err| StoreError::Save {
            source: err,
            path: self.path.clone(),
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        mkdirp::mkdirp(&parent).map_err(save_err)?;

        let mut temp = NamedTempFile::new_in(&parent).map_err(save_err)?;
        temp.write_all(contents.as_bytes()).map_err(save_err)?;
        temp.as_file().sync_all().map_err(save_err)?;
        temp.persist(&self.path).map_err(|err| save_err(err.error))?;
        debug!("saved configuration to {:?}", self.path.display());

        Ok(())
    }

    /// Write default configuration document if none exists yet.
    ///
    /// Returns `true` if a new file was written.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Save`] if the document cannot be written.
    pub fn init(&self) -> Result<bool> {
        if self.path.exists() {
            info!("configuration already exists at {:?}", self.path.display());
            return Ok(false);
        }

        info!("write default configuration to {:?}", self.path.display());
        self.save(&ConfigDocument::default())?;

        Ok(true)
    }
}

/// Configuration store error types.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Configuration file cannot be read.
    #[error("failed to load configuration from {:?}", path.display())]
    Load {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Configuration file content cannot be decoded.
    #[error("failed to decode configuration at {:?}", path.display())]
    Decode {
        #[source]
        source: crate::config::ConfigError,
        path: PathBuf,
    },

    /// Configuration document cannot be encoded.
    #[error("failed to encode configuration")]
    Encode(#[source] crate::config::ConfigError),

    /// Configuration file cannot be written.
    #[error("failed to save configuration to {:?}", path.display())]
    Save {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Repository cloning through libgit2.
//!
//! Installing a plugin or theme boils down to cloning a full working copy of
//! its repository into the right directory. This module provides the
//! [`RepoCloner`] seam the rest of the crate clones through, and a libgit2
//! implementation of it that reports progress through a progress bar and
//! prompts for credentials when a remote asks for them.
//!
//! Remote and local `HEAD` lookups used for update checking live here as
//! well.

use auth_git2::{GitAuthenticator, Prompter};
use git2::{build::RepoBuilder, Config, Direction, FetchOptions, Oid, Remote, RemoteCallbacks, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{debug, info, instrument};

/// Layer of indirection for repository cloning.
pub trait RepoCloner {
    /// Clone full working copy of repository at `url` into `destination`.
    ///
    /// Must create `destination` if it does not exist yet.
    fn clone_repo(&self, url: &str, destination: &Path) -> Result<()>;
}

/// Repository cloning through libgit2.
#[derive(Debug, Clone)]
pub struct Git2Cloner {
    show_progress: bool,
}

impl Default for Git2Cloner {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

impl Git2Cloner {
    /// Construct new cloner that draws progress bars on stderr.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct new cloner that never draws anything.
    pub fn hidden() -> Self {
        Self {
            show_progress: false,
        }
    }

    fn progress_bar(&self, url: &str) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }

        let style = ProgressStyle::with_template(
            "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
        )?
        .progress_chars("-Cco.");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        bar.set_message(url.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Ok(bar)
    }
}

impl RepoCloner for Git2Cloner {
    /// Clone repository with a progress bar.
    ///
    /// If any credentials are required for the clone to continue, then the
    /// user will be prompted for that information accordingly. The progress
    /// bar is suspended for user input.
    ///
    /// # Errors
    ///
    /// - Return [`CloneError::CreateDir`] if parent directories of the
    ///   destination cannot be created.
    /// - Return [`CloneError::Git2`] if libgit2 fails to clone.
    #[instrument(skip(self, url, destination), level = "debug")]
    fn clone_repo(&self, url: &str, destination: &Path) -> Result<()> {
        info!("clone {url} into {:?}", destination.display());
        if let Some(parent) = destination.parent() {
            mkdirp::mkdirp(parent).map_err(|err| CloneError::CreateDir {
                source: err,
                path: parent.to_path_buf(),
            })?;
        }

        let bar = self.progress_bar(url)?;
        let prompter = IndicatifPrompter::new(bar);
        let authenticator = GitAuthenticator::default().set_prompter(prompter.clone());
        let config = Config::open_default()?;

        let mut throttle = Instant::now();
        let mut rc = RemoteCallbacks::new();
        rc.credentials(authenticator.credentials(&config));
        rc.transfer_progress(|progress| {
            if throttle.elapsed() > Duration::from_millis(10) {
                throttle = Instant::now();
                prompter.bar.set_length(progress.total_objects() as u64);
                prompter.bar.set_position(progress.received_objects() as u64);
            }
            true
        });

        let mut fo = FetchOptions::new();
        fo.remote_callbacks(rc);
        let result = RepoBuilder::new().fetch_options(fo).clone(url, destination);
        prompter.bar.finish_and_clear();
        result?;

        Ok(())
    }
}

/// Commit that `HEAD` of a local working copy points to.
///
/// # Errors
///
/// - Return [`CloneError::Git2`] if the repository cannot be opened, or has
///   no commits.
pub fn local_head(path: impl AsRef<Path>) -> Result<Oid> {
    let repository = Repository::open(path.as_ref())?;
    let oid = repository.head()?.peel_to_commit()?.id();
    Ok(oid)
}

/// Commit that `HEAD` of a remote repository advertises.
///
/// Equivalent of `git ls-remote <url> HEAD`.
///
/// # Errors
///
/// - Return [`CloneError::Git2`] if the remote cannot be contacted.
/// - Return [`CloneError::NoRemoteHead`] if the remote advertises no `HEAD`.
#[instrument(level = "debug")]
pub fn remote_head(url: &str) -> Result<Oid> {
    let mut remote = Remote::create_detached(url)?;
    remote.connect(Direction::Fetch)?;
    let head = remote
        .list()?
        .iter()
        .find(|head| head.name() == "HEAD")
        .map(|head| head.oid());
    remote.disconnect()?;

    debug!("remote {url} advertises HEAD {head:?}");
    head.ok_or_else(|| CloneError::NoRemoteHead(url.to_string()))
}

/// Git2 authentication prompter for progress bar.
#[derive(Debug, Clone)]
pub struct IndicatifPrompter {
    pub(crate) bar: ProgressBar,
}

impl IndicatifPrompter {
    /// Construct new progress bar authenticator.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for IndicatifPrompter {
    #[instrument(skip(self, url, _config), level = "debug")]
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| -> Option<(String, String)> {
            let username = Text::new("username").prompt().ok()?;
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
    }

    #[instrument(skip(self, username, url, _config), level = "debug")]
    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("authentication required at {url} for user {username}");
        self.bar.suspend(|| -> Option<String> {
            Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }

    #[instrument(skip(self, ssh_key_path, _config), level = "debug")]
    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!(
            "authentication required with ssh key at {}",
            ssh_key_path.display()
        );
        self.bar.suspend(|| -> Option<String> {
            Password::new("passphrase")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }
}

/// Repository cloning error types.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// Parent directories of clone destination cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Remote repository does not advertise a `HEAD`.
    #[error("remote {0} does not advertise HEAD")]
    NoRemoteHead(String),

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = CloneError> = std::result::Result<T, E>;

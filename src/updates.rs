// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Update checking.
//!
//! Compare the commit each installed repository has checked out against the
//! commit its remote advertises as `HEAD`. Every comparison needs a network
//! round trip, so they run concurrently on the blocking thread pool, with an
//! upper bound on how many run at once and a time limit on each one.
//!
//! All probes are awaited before [`check`] returns. A probe that exceeds its
//! time limit is reported as [`UpdateStatus::TimedOut`], but the underlying
//! libgit2 call cannot be interrupted, and keeps its blocking thread busy
//! until it returns on its own.

use crate::{
    catalog::CatalogItem,
    git::{local_head, remote_head},
    installable::Role,
};

use futures::stream::{self, StreamExt};
use git2::Oid;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::{task::spawn_blocking, time::timeout};
use tracing::{debug, instrument, warn};

/// Knobs for [`check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Maximum number of probes in flight.
    pub concurrency: usize,

    /// Time limit of a single probe.
    pub timeout: Duration,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            timeout: Duration::from_secs(20),
        }
    }
}

/// Update state of a single installable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Local and remote `HEAD` match.
    UpToDate,

    /// Remote `HEAD` moved on.
    Outdated { local: Oid, remote: Oid },

    /// Not cloned, or not installed yet.
    Skipped,

    /// Either `HEAD` could not be determined.
    Failed(String),

    /// Probe exceeded its time limit.
    TimedOut,
}

impl Display for UpdateStatus {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::UpToDate => fmt.write_str("up to date"),
            Self::Outdated { local, remote } => {
                write!(fmt, "outdated {} -> {}", short(local), short(remote))
            }
            Self::Skipped => fmt.write_str("skipped"),
            Self::Failed(message) => write!(fmt, "failed: {message}"),
            Self::TimedOut => fmt.write_str("timed out"),
        }
    }
}

/// Update state of a catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub id: String,
    pub role: Role,
    pub status: UpdateStatus,
}

/// Check catalog items for updates.
///
/// Reports come back in the order of `items`, no matter in which order the
/// probes finish.
#[instrument(skip(items), level = "debug")]
pub async fn check<'a, I>(items: I, options: UpdateOptions) -> Vec<UpdateReport>
where
    I: IntoIterator<Item = &'a CatalogItem>,
{
    let items = items.into_iter().collect::<Vec<_>>();
    let mut reports = items
        .iter()
        .map(|item| UpdateReport {
            id: item.id().to_string(),
            role: item.role(),
            status: UpdateStatus::Skipped,
        })
        .collect::<Vec<_>>();

    let probes = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if !item.is_installed() {
                return None;
            }
            let url = item.entry().clone_url()?;
            Some((index, item.path().to_path_buf(), url))
        })
        .collect::<Vec<_>>();
    debug!("probe {} of {} items for updates", probes.len(), items.len());

    let limit = options.timeout;
    let mut results = stream::iter(probes)
        .map(|(index, path, url)| async move { (index, probe(path, url, limit).await) })
        .buffer_unordered(options.concurrency.max(1));

    // INVARIANT: Every probe owns a distinct slot of the report list.
    while let Some((index, status)) = results.next().await {
        reports[index].status = status;
    }

    reports
}

async fn probe(path: PathBuf, url: String, limit: Duration) -> UpdateStatus {
    let task = spawn_blocking({
        let url = url.clone();
        move || compare_heads(&path, &url)
    });

    match timeout(limit, task).await {
        Err(_) => {
            warn!("update check of {url} timed out after {limit:?}");
            UpdateStatus::TimedOut
        }
        Ok(Err(error)) => UpdateStatus::Failed(error.to_string()),
        Ok(Ok(Err(error))) => {
            debug!("update check of {url} failed: {error}");
            UpdateStatus::Failed(error.to_string())
        }
        Ok(Ok(Ok((local, remote)))) if local == remote => UpdateStatus::UpToDate,
        Ok(Ok(Ok((local, remote)))) => UpdateStatus::Outdated { local, remote },
    }
}

fn short(oid: &Oid) -> String {
    oid.to_string().chars().take(7).collect()
}

fn compare_heads(path: &Path, url: &str) -> crate::git::Result<(Oid, Oid)> {
    let local = local_head(path)?;
    let remote = remote_head(url)?;
    Ok((local, remote))
}

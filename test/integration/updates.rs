// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::Sandbox;

use anyhow::Result;
use dfctl::{
    catalog::{Catalog, Filter},
    installable::{Entry, Installable},
    updates::{self, UpdateOptions, UpdateStatus},
    urn::RepoUrn,
};
use pretty_assertions::assert_eq;
use std::{fs::remove_dir_all, time::Duration};

fn options() -> UpdateOptions {
    UpdateOptions {
        concurrency: 2,
        timeout: Duration::from_secs(10),
    }
}

#[tokio::test]
async fn check_tracks_remote_head() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let current = sandbox.source("current")?;
    let stale = sandbox.source("stale")?;
    let gone = sandbox.source("gone")?;

    let mut session = sandbox.session()?;
    for source in [&current, &stale, &gone] {
        let urn = format!("git:{}", source.url()).parse::<RepoUrn>()?;
        Entry::plugin_from_urn(&urn, None, None).install(&mut session)?;
    }

    let local = git2::Repository::open(sandbox.layout.custom_plugins_dir().join("stale"))?
        .head()?
        .peel_to_commit()?
        .id();
    let remote = stale.stage_and_commit("CHANGELOG.md", "new release\n")?;
    remove_dir_all(gone.url())?;

    let catalog = Catalog::load(&sandbox.layout)?;
    let reports = updates::check(catalog.list(&[Filter::Installed(true)]), options()).await;
    let ids = reports.iter().map(|report| report.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["current", "gone", "stale"]);

    assert_eq!(reports[0].status, UpdateStatus::UpToDate);
    assert!(matches!(reports[1].status, UpdateStatus::Failed(_)));
    assert_eq!(reports[2].status, UpdateStatus::Outdated { local, remote });

    Ok(())
}

// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::Sandbox;

use anyhow::Result;
use dfctl::{
    catalog::{Catalog, Filter},
    config::ConfigDocument,
    installable::{Entry, InstallError, InstallOutcome, Installable, Role},
    sync,
    urn::RepoUrn,
};
use pretty_assertions::assert_eq;

fn plugin(url: &str) -> Result<Entry> {
    let urn = format!("git:{url}").parse::<RepoUrn>()?;
    Ok(Entry::plugin_from_urn(&urn, None, None))
}

fn theme(url: &str) -> Result<Entry> {
    let urn = format!("git:{url}").parse::<RepoUrn>()?;
    Ok(Entry::theme_from_urn(&urn, None, None))
}

fn custom_ids(document: &ConfigDocument) -> Vec<&str> {
    document
        .plugins
        .custom
        .iter()
        .map(|spec| spec.id.as_str())
        .collect()
}

#[test]
fn install_plugin_is_idempotent() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let source = sandbox.source("zsh-autosuggestions")?;
    let mut session = sandbox.session()?;
    let entry = plugin(&source.url())?;
    let path = sandbox.layout.custom_plugins_dir().join("zsh-autosuggestions");

    assert_eq!(entry.install(&mut session)?, InstallOutcome::Installed);
    assert!(path.join(".git").is_dir());
    assert!(path.join("zsh-autosuggestions.plugin.zsh").is_file());
    let stored = sandbox.stored()?;
    assert_eq!(custom_ids(&stored), vec!["zsh-autosuggestions"]);

    assert_eq!(entry.install(&mut session)?, InstallOutcome::Unchanged);
    assert_eq!(sandbox.stored()?, stored);

    Ok(())
}

#[test]
fn install_all_is_best_effort() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let first = sandbox.source("first")?;
    let third = sandbox.source("third")?;
    let entries = vec![
        plugin(&first.url())?,
        plugin(&sandbox.missing_source("second"))?,
        plugin(&third.url())?,
    ];

    let mut session = sandbox.session()?;
    let reports = sync::install_all(&mut session, &entries);
    let status = reports.iter().map(|report| report.is_ok()).collect::<Vec<_>>();
    assert_eq!(status, vec![true, false, true]);
    assert!(matches!(reports[1].error, Some(InstallError::Clone { .. })));

    let plugins_dir = sandbox.layout.custom_plugins_dir();
    assert!(plugins_dir.join("first").is_dir());
    assert!(!plugins_dir.join("second").exists());
    assert!(plugins_dir.join("third").is_dir());
    assert_eq!(custom_ids(&sandbox.stored()?), vec!["first", "third"]);

    Ok(())
}

#[test]
fn enable_installs_declared_plugin() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let source = sandbox.source("fzf-tab")?;
    let mut session = sandbox.session()?;
    let Entry::Plugin(declared) = plugin(&source.url())? else {
        anyhow::bail!("expected custom plugin");
    };
    session.document_mut().plugins.custom.push(declared.spec().clone());
    session.persist()?;

    let reports = sync::set_enabled(&mut session, &["fzf-tab"], &[Filter::Role(Role::Plugin)], true);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].installed && reports[0].is_ok());

    let catalog = Catalog::load(&sandbox.layout)?;
    let item = catalog.resolve(&["fzf-tab"], &[]);
    assert_eq!(item.len(), 1);
    assert!(item[0].is_installed() && item[0].is_enabled());

    Ok(())
}

#[test]
fn installing_second_theme_replaces_first() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let first = sandbox.source("spaceship")?;
    let second = sandbox.source("pure")?;
    let mut session = sandbox.session()?;

    sync::install_and_enable(&mut session, &theme(&first.url())?)?;
    assert_eq!(sandbox.stored()?.theme, "spaceship");

    sync::install_and_enable(&mut session, &theme(&second.url())?)?;
    let stored = sandbox.stored()?;
    assert_eq!(stored.theme, "pure");
    assert_eq!(stored.themes.len(), 2);

    let catalog = Catalog::load(&sandbox.layout)?;
    let enabled = catalog
        .list(&[Filter::Role(Role::Theme), Filter::Enabled(true)])
        .into_iter()
        .map(|item| item.id())
        .collect::<Vec<_>>();
    assert_eq!(enabled, vec!["pure"]);

    Ok(())
}

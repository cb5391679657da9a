// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::Sandbox;

use anyhow::Result;
use dfctl::{
    catalog::{Catalog, CatalogError, CatalogItem, Filter},
    config::{BundledPluginRef, PluginSpec, RepoKind, ThemeSpec},
    installable::Role,
    render,
    store::StoreError,
};
use pretty_assertions::assert_eq;
use std::fs::{create_dir_all, remove_file, write};

#[test]
fn catalog_merges_config_and_framework_dir() -> Result<()> {
    let sandbox = Sandbox::new()?;
    for id in ["brew", "git", "docker"] {
        create_dir_all(sandbox.layout.framework_plugins_dir().join(id))?;
    }
    write(sandbox.layout.framework_plugins_dir().join("README.md"), "not a plugin")?;

    let mut session = sandbox.session()?;
    let document = session.document_mut();
    document.plugins.bundled = vec![BundledPluginRef::new("brew"), BundledPluginRef::new("git")];
    document.plugins.custom.push(PluginSpec {
        id: "zsh-syntax-highlighting".into(),
        repo: "zsh-users/zsh-syntax-highlighting".into(),
        name: None,
        kind: RepoKind::HostedGit,
        enabled: true,
    });
    document.themes.push(ThemeSpec {
        id: "agnoster".into(),
        repo: String::new(),
        name: None,
        kind: RepoKind::FrameworkBundled,
    });
    document.theme = "agnoster".into();
    session.persist()?;

    let catalog = Catalog::load(&sandbox.layout)?;
    let rows = catalog
        .items()
        .iter()
        .map(|item| (item.id(), item.role(), item.is_installed(), item.is_enabled()))
        .collect::<Vec<_>>();
    assert_eq!(
        rows,
        vec![
            ("zsh-syntax-highlighting", Role::Plugin, false, true),
            ("agnoster", Role::Theme, true, true),
            ("brew", Role::Plugin, true, true),
            ("docker", Role::Plugin, true, false),
            ("git", Role::Plugin, true, true),
        ]
    );

    let disabled = catalog
        .list(&[Filter::Role(Role::Plugin), "disabled".parse::<Filter>()?])
        .into_iter()
        .map(CatalogItem::id)
        .collect::<Vec<_>>();
    assert_eq!(disabled, vec!["docker"]);

    Ok(())
}

#[test]
fn catalog_needs_config_file() -> Result<()> {
    let sandbox = Sandbox::new()?;
    remove_file(sandbox.layout.config_file())?;

    let result = Catalog::load(&sandbox.layout);
    assert!(matches!(result, Err(CatalogError::Load(StoreError::Load { .. }))));

    Ok(())
}

#[test]
fn rendered_script_lists_enabled_plugins() -> Result<()> {
    let sandbox = Sandbox::new()?;
    let mut session = sandbox.session()?;
    let document = session.document_mut();
    document.plugins.bundled.push(BundledPluginRef::new("git"));
    for (id, enabled) in [("on", true), ("off", false)] {
        document.plugins.custom.push(PluginSpec {
            id: id.into(),
            repo: format!("someone/{id}"),
            name: None,
            kind: RepoKind::HostedGit,
            enabled,
        });
    }
    session.persist()?;

    let script = render::zshrc(&sandbox.stored()?, sandbox.layout.framework());
    assert!(script.contains("plugins=(\n  # OMZ\n  git\n  # CUSTOM\n  on\n)\n"));
    assert!(script.contains(&format!(
        "export ZSH=\"{}\"",
        sandbox.layout.framework().display()
    )));

    Ok(())
}

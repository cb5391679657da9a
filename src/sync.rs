// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Install and enable orchestration.
//!
//! Batch operations over installables. Every batch is best effort: a failure
//! on one installable is recorded in its report, and the rest of the batch
//! still runs. Nothing is rolled back, and nothing is retried. Since every
//! single install and toggle is idempotent, re-running a batch that partially
//! failed is always safe.
//!
//! # Unknown Identifiers
//!
//! Enabling or disabling an identifier that the catalog does not know about
//! is silently skipped. It is only visible at debug log level.
//!
//! # Implicit Installs
//!
//! Enabling something that is not installed yet installs it first. If that
//! install fails, the enable step is not attempted, so the configuration
//! document never lists something that is not on disk because of this call.

use crate::{
    catalog::{Catalog, Filter},
    git::RepoCloner,
    installable::{Entry, InstallError, InstallOutcome, Installable, Role},
    session::Session,
};

use tracing::{debug, info, instrument, warn};

/// Outcome of installing one installable in a batch.
#[derive(Debug)]
pub struct InstallReport {
    pub id: String,
    pub role: Role,

    /// Cloned onto disk by this batch. False means no action was taken.
    pub installed: bool,

    pub error: Option<InstallError>,
}

impl InstallReport {
    fn new(entry: &Entry) -> Self {
        Self {
            id: entry.id().to_string(),
            role: entry.role(),
            installed: false,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of enabling or disabling one installable in a batch.
#[derive(Debug)]
pub struct EnableReport {
    pub id: String,
    pub role: Role,

    /// Installed by this call before enabling.
    pub installed: bool,

    pub error: Option<InstallError>,
}

impl EnableReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Install every entry that is not on disk yet.
///
/// Entries already installed are reported with `installed` set to false and
/// no error. Reports come back in the order of `entries`.
#[instrument(skip(session, entries), level = "debug")]
pub fn install_all<'a, I>(session: &mut Session<impl RepoCloner>, entries: I) -> Vec<InstallReport>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut reports = Vec::new();
    for entry in entries {
        let mut report = InstallReport::new(entry);
        if entry.is_installed(session.layout()) {
            debug!("{} {} is already installed", entry.role(), entry.id());
            reports.push(report);
            continue;
        }

        match entry.install(session) {
            Ok(outcome) => report.installed = outcome.is_installed(),
            Err(error) => {
                warn!("failed to install {} {}: {error}", entry.role(), entry.id());
                report.error = Some(error);
            }
        }
        reports.push(report);
    }

    reports
}

/// Enable or disable installables by identifier.
///
/// Identifiers are resolved against a fresh catalog of the session, narrowed
/// down by `filters`. Identifiers that resolve to nothing are skipped.
#[instrument(skip(session, ids, filters), level = "debug")]
pub fn set_enabled<S>(
    session: &mut Session<impl RepoCloner>,
    ids: &[S],
    filters: &[Filter],
    enable: bool,
) -> Vec<EnableReport>
where
    S: AsRef<str>,
{
    let catalog = Catalog::from_session(&*session);
    let mut reports = Vec::new();

    for item in catalog.resolve(ids, filters) {
        let entry = item.entry();
        let mut report = EnableReport {
            id: entry.id().to_string(),
            role: entry.role(),
            installed: false,
            error: None,
        };

        if enable && !entry.is_installed(session.layout()) {
            debug!("install {} {} before enabling it", entry.role(), entry.id());
            match entry.install(session) {
                Ok(outcome) => report.installed = outcome.is_installed(),
                Err(error) => {
                    warn!("not enabling {} {}, install failed: {error}", entry.role(), entry.id());
                    report.error = Some(error);
                    reports.push(report);
                    continue;
                }
            }
        }

        if let Err(error) = entry.set_enabled(session, enable) {
            warn!("failed to toggle {} {}: {error}", entry.role(), entry.id());
            report.error = Some(error);
        }
        reports.push(report);
    }

    reports
}

/// Install entry, then enable it.
///
/// Used for entries that come straight from a repository URN, which the
/// catalog does not know about yet.
///
/// # Errors
///
/// - Return [`InstallError::Clone`] if the install fails. Nothing is enabled
///   in that case.
/// - Return [`InstallError::Store`] if the configuration document cannot be
///   saved.
#[instrument(skip(session, entry), fields(id = entry.id()), level = "debug")]
pub fn install_and_enable(
    session: &mut Session<impl RepoCloner>,
    entry: &Entry,
) -> Result<InstallOutcome, InstallError> {
    let outcome = entry.install(session)?;
    entry.set_enabled(session, true)?;
    info!("{} {} is enabled", entry.role(), entry.id());

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{BundledPluginRef, ConfigDocument, RepoKind, ThemeSpec},
        testing::Fixture,
        urn::RepoUrn,
    };
    use pretty_assertions::assert_eq;

    fn plugin(urn: &str) -> anyhow::Result<Entry> {
        Ok(Entry::plugin_from_urn(&urn.parse::<RepoUrn>()?, None, None))
    }

    #[test]
    fn install_all_keeps_going_after_failure() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut session = fixture.session_failing(["https://github.com/someone/broken"])?;
        let entries = vec![
            plugin("gh:someone/first")?,
            plugin("gh:someone/broken")?,
            plugin("gh:someone/third")?,
        ];

        let reports = install_all(&mut session, &entries);
        let status = reports
            .iter()
            .map(|report| (report.id.as_str(), report.installed, report.is_ok()))
            .collect::<Vec<_>>();
        assert_eq!(
            status,
            vec![("first", true, true), ("broken", false, false), ("third", true, true)]
        );

        let plugins_dir = fixture.layout.custom_plugins_dir();
        assert!(plugins_dir.join("first").is_dir());
        assert!(!plugins_dir.join("broken").exists());
        assert!(plugins_dir.join("third").is_dir());

        let stored = fixture.stored()?;
        let stored_ids = stored
            .plugins
            .custom
            .iter()
            .map(|spec| spec.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(stored_ids, vec!["first", "third"]);

        Ok(())
    }

    #[test]
    fn install_all_reports_no_action_for_installed() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut session = fixture.session()?;
        let entries = vec![plugin("gh:someone/first")?, plugin("omz:brew")?];

        let first = install_all(&mut session, &entries);
        assert!(first[0].installed);
        assert!(!first[1].installed);

        let second = install_all(&mut session, &entries);
        assert!(second.iter().all(|report| !report.installed && report.is_ok()));
        assert_eq!(session.cloner().calls().len(), 1);

        Ok(())
    }

    #[test]
    fn enable_installs_declared_plugin_first() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut document = ConfigDocument::default();
        let Entry::Plugin(first) = plugin("gh:someone/first")? else {
            anyhow::bail!("expected custom plugin");
        };
        document.plugins.custom.push(first.spec().clone());
        fixture.store(&document)?;

        let mut session = fixture.session()?;
        let reports = set_enabled(&mut session, &["first"], &[], true);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].installed && reports[0].is_ok());
        assert!(fixture.layout.custom_plugins_dir().join("first").is_dir());

        Ok(())
    }

    #[test]
    fn enable_skips_toggle_when_install_fails() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut document = ConfigDocument::default();
        document.themes.push(ThemeSpec {
            id: "broken".into(),
            repo: "someone/broken".into(),
            name: None,
            kind: RepoKind::HostedGit,
        });
        fixture.store(&document)?;

        let mut session = fixture.session_failing(["https://github.com/someone/broken"])?;
        let reports = set_enabled(&mut session, &["broken"], &[], true);
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0].error, Some(InstallError::Clone { .. })));
        assert_eq!(fixture.stored()?.theme, "");

        Ok(())
    }

    #[test]
    fn enable_silently_skips_unknown_ids() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut session = fixture.session()?;

        let reports = set_enabled(&mut session, &["does-not-exist"], &[], true);
        assert!(reports.is_empty());
        assert_eq!(fixture.stored()?, ConfigDocument::default());

        Ok(())
    }

    #[test]
    fn enable_and_disable_bundled_is_idempotent() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        fixture.framework_plugins(&["brew", "git"])?;
        let mut session = fixture.session()?;
        let plugins_only = [Filter::Role(Role::Plugin)];

        for _ in 0..2 {
            let reports = set_enabled(&mut session, &["brew", "git"], &plugins_only, true);
            assert!(reports.iter().all(EnableReport::is_ok));
        }
        assert_eq!(
            fixture.stored()?.plugins.bundled,
            vec![BundledPluginRef::new("brew"), BundledPluginRef::new("git")]
        );

        for _ in 0..2 {
            let reports = set_enabled(&mut session, &["brew"], &plugins_only, false);
            assert!(reports.iter().all(EnableReport::is_ok));
        }
        assert_eq!(fixture.stored()?.plugins.bundled, vec![BundledPluginRef::new("git")]);

        Ok(())
    }

    #[test]
    fn enabling_theme_replaces_active_one() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut document = ConfigDocument::default();
        for id in ["A", "B"] {
            document.themes.push(ThemeSpec {
                id: id.into(),
                repo: String::new(),
                name: None,
                kind: RepoKind::FrameworkBundled,
            });
        }
        document.theme = "A".into();
        fixture.store(&document)?;

        let mut session = fixture.session()?;
        set_enabled(&mut session, &["B"], &[Filter::Role(Role::Theme)], true);

        let catalog = Catalog::from_session(&session);
        let enabled = catalog
            .list(&[Filter::Enabled(true)])
            .into_iter()
            .map(|item| item.id())
            .collect::<Vec<_>>();
        assert_eq!(enabled, vec!["B"]);
        assert_eq!(fixture.stored()?.theme, "B");

        Ok(())
    }

    #[test]
    fn install_and_enable_bundled_urn() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut session = fixture.session()?;

        let outcome = install_and_enable(&mut session, &plugin("omz:brew")?)?;
        assert_eq!(outcome, InstallOutcome::Unchanged);
        assert_eq!(fixture.stored()?.plugins.bundled, vec![BundledPluginRef::new("brew")]);
        assert!(fixture.stored()?.plugins.custom.is_empty());

        Ok(())
    }

    #[test]
    fn install_and_enable_stops_on_clone_failure() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut session = fixture.session_failing(["https://github.com/someone/broken"])?;

        let result = install_and_enable(&mut session, &plugin("gh:someone/broken")?);
        assert!(matches!(result, Err(InstallError::Clone { .. })));
        assert_eq!(fixture.stored()?, ConfigDocument::default());

        Ok(())
    }

    #[test]
    fn framework_theme_can_be_disabled_after_install() -> anyhow::Result<()> {
        let fixture = Fixture::new()?;
        let mut session = fixture.session()?;
        let urn = "omz:agnoster".parse::<RepoUrn>()?;

        install_and_enable(&mut session, &Entry::theme_from_urn(&urn, None, None))?;
        let stored = fixture.stored()?;
        assert_eq!(stored.theme, "agnoster");
        assert_eq!(stored.themes.len(), 1);

        let catalog = Catalog::from_session(&session);
        let themes = catalog
            .list(&[Filter::Role(Role::Theme)])
            .into_iter()
            .map(|item| item.id())
            .collect::<Vec<_>>();
        assert_eq!(themes, vec!["agnoster"]);

        let reports = set_enabled(&mut session, &["agnoster"], &[Filter::Role(Role::Theme)], false);
        assert_eq!(reports.len(), 1);
        assert_eq!(fixture.stored()?.theme, "");

        Ok(())
    }
}

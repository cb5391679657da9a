// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dfctl::{
    catalog::{self, Catalog, CatalogItem, Filter},
    config::ConfigFormat,
    git::Git2Cloner,
    installable::{Entry, Installable, Role},
    path::{Layout, Overrides},
    render,
    session::Session,
    store::ConfigStore,
    sync,
    updates::{self, UpdateOptions},
    urn::RepoUrn,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::{
    env,
    error::Error,
    fs::read_to_string,
    io::Write,
    iter::once,
    path::{Path, PathBuf},
    process::{exit, Command as Process},
    time::Duration,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "dfctl [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Root directory of dfctl.
    #[arg(long, global = true, value_name = "path")]
    pub home: Option<PathBuf>,

    /// Root directory of the framework installation.
    #[arg(long, global = true, value_name = "path")]
    pub omz: Option<PathBuf>,

    /// Path to configuration file, extension selects the format.
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    async fn run(self) -> Result<()> {
        let overrides = Overrides {
            home: self.home,
            framework: self.omz,
            config_file: self.config,
        };
        let layout = Layout::resolve(&overrides)?;

        match self.command {
            Command::Config(command) => run_config(layout, command),
            Command::Zsh(command) => run_zsh(layout, command).await,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Inspect and edit configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Manage zsh run-control file, plugins, and themes.
    #[command(subcommand)]
    Zsh(ZshCommand),
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print configuration document.
    View,

    /// Print path to configuration file.
    Path,

    /// Edit configuration file with $VISUAL or $EDITOR.
    Edit,

    /// Write default configuration file if none exists.
    Init,
}

#[derive(Debug, Clone, Subcommand)]
enum ZshCommand {
    /// Print generated zsh run-control script.
    Source,

    /// Install every plugin and theme that is not installed yet.
    Install,

    /// Manage plugins.
    #[command(subcommand)]
    Plugins(PluginsCommand),

    /// Manage themes.
    #[command(subcommand)]
    Themes(ThemesCommand),
}

#[derive(Debug, Clone, Subcommand)]
enum PluginsCommand {
    /// List plugins.
    #[command(override_usage = "dfctl zsh plugins list [options]")]
    List(ListOptions),

    /// Install plugin from repository URN, and enable it.
    #[command(override_usage = "dfctl zsh plugins install [options] <urn>")]
    Install(InstallOptions),

    /// Enable plugins, installing them first if needed.
    #[command(override_usage = "dfctl zsh plugins enable <id>...")]
    Enable(ToggleOptions),

    /// Disable plugins.
    #[command(override_usage = "dfctl zsh plugins disable <id>...")]
    Disable(ToggleOptions),

    /// Check installed plugins for upstream changes.
    #[command(override_usage = "dfctl zsh plugins outdated [options]")]
    Outdated(OutdatedOptions),
}

#[derive(Debug, Clone, Subcommand)]
enum ThemesCommand {
    /// List themes.
    #[command(override_usage = "dfctl zsh themes list [options]")]
    List(ListOptions),

    /// Install theme from repository URN, and make it the active theme.
    #[command(override_usage = "dfctl zsh themes install [options] <urn>")]
    Install(InstallOptions),

    /// Make theme the active theme, installing it first if needed.
    #[command(override_usage = "dfctl zsh themes enable <id>")]
    Enable(ToggleOptions),

    /// Clear active theme if it is one of the given themes.
    #[command(override_usage = "dfctl zsh themes disable <id>...")]
    Disable(ToggleOptions),
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ListOptions {
    /// Filters to narrow listing down by, all of which must match.
    ///
    /// Supported: all, enabled, disabled, installed, uninstalled, kind:gh,
    /// kind:git, kind:omz. Filters from `all` onwards are ignored, so
    /// `all,enabled` lists everything.
    #[arg(short, long, value_delimiter = ',', default_value = "all", value_name = "filter")]
    pub filters: Vec<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub out: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    List,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InstallOptions {
    /// Repository URN, e.g., gh:zsh-users/zsh-autosuggestions or omz:brew.
    #[arg(required = true, value_name = "urn")]
    pub urn: String,

    /// Identifier to use instead of the last segment of the URN.
    #[arg(long, value_name = "id")]
    pub id: Option<String>,

    /// Directory name to use instead of the identifier.
    #[arg(long, value_name = "name")]
    pub name: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct ToggleOptions {
    /// Identifiers to toggle.
    #[arg(required = true, value_name = "id")]
    pub ids: Vec<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct OutdatedOptions {
    /// Maximum number of remotes to contact at once.
    #[arg(short, long, default_value_t = 8, value_name = "count")]
    pub jobs: usize,

    /// Seconds to wait for a single remote.
    #[arg(short, long, default_value_t = 20, value_name = "seconds")]
    pub timeout: u64,
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}

fn run_config(layout: Layout, command: ConfigCommand) -> Result<()> {
    let store = ConfigStore::new(layout.config_file(), layout.config_format());
    match command {
        ConfigCommand::View => print!("{}", store.encode(&store.load()?)?),
        ConfigCommand::Path => println!("{}", store.path().display()),
        ConfigCommand::Edit => run_config_edit(&store)?,
        ConfigCommand::Init => {
            store.init()?;
        }
    }

    Ok(())
}

fn run_config_edit(store: &ConfigStore) -> Result<()> {
    let original = read_to_string(store.path())
        .with_context(|| format!("failed to read {:?}", store.path().display()))?;

    let suffix = match store.format() {
        ConfigFormat::Yaml => ".yaml",
        ConfigFormat::Toml => ".toml",
    };
    let mut scratch = tempfile::Builder::new()
        .prefix("dfctl-")
        .suffix(suffix)
        .tempfile()?;
    scratch.write_all(original.as_bytes())?;
    scratch.flush()?;

    open_in_editor(scratch.path())?;

    // INVARIANT: Never touch the original unless the edit still decodes.
    let edited = read_to_string(scratch.path())?;
    let document = store.decode(&edited)?;
    store.save(&document)?;
    info!("saved configuration to {:?}", store.path().display());

    Ok(())
}

fn open_in_editor(path: &Path) -> Result<()> {
    let editor = ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "vi".into());

    let mut words = editor.split_whitespace();
    let Some(program) = words.next() else {
        bail!("no editor configured");
    };
    let status = Process::new(program)
        .args(words)
        .arg(path)
        .spawn()
        .with_context(|| format!("failed to run editor {program:?}"))?
        .wait()?;
    if !status.success() {
        bail!("editor {program:?} exited with {status}");
    }

    Ok(())
}

async fn run_zsh(layout: Layout, command: ZshCommand) -> Result<()> {
    match command {
        ZshCommand::Source => run_source(&layout),
        ZshCommand::Install => run_install(layout),
        ZshCommand::Plugins(PluginsCommand::List(opts)) => run_list(&layout, Role::Plugin, opts),
        ZshCommand::Plugins(PluginsCommand::Install(opts)) => {
            let urn = opts.urn.parse::<RepoUrn>()?;
            let entry = Entry::plugin_from_urn(&urn, opts.id, opts.name);
            run_add(layout, entry)
        }
        ZshCommand::Plugins(PluginsCommand::Enable(opts)) => {
            run_toggle(layout, Role::Plugin, opts, true)
        }
        ZshCommand::Plugins(PluginsCommand::Disable(opts)) => {
            run_toggle(layout, Role::Plugin, opts, false)
        }
        ZshCommand::Plugins(PluginsCommand::Outdated(opts)) => run_outdated(&layout, opts).await,
        ZshCommand::Themes(ThemesCommand::List(opts)) => run_list(&layout, Role::Theme, opts),
        ZshCommand::Themes(ThemesCommand::Install(opts)) => {
            let urn = opts.urn.parse::<RepoUrn>()?;
            let entry = Entry::theme_from_urn(&urn, opts.id, opts.name);
            run_add(layout, entry)
        }
        ZshCommand::Themes(ThemesCommand::Enable(opts)) => {
            run_toggle(layout, Role::Theme, opts, true)
        }
        ZshCommand::Themes(ThemesCommand::Disable(opts)) => {
            run_toggle(layout, Role::Theme, opts, false)
        }
    }
}

fn run_source(layout: &Layout) -> Result<()> {
    let store = ConfigStore::new(layout.config_file(), layout.config_format());
    let document = store.load()?;
    print!("{}", render::zshrc(&document, layout.framework()));

    Ok(())
}

fn run_install(layout: Layout) -> Result<()> {
    let mut session = Session::open(layout, Git2Cloner::new())?;
    let catalog = Catalog::from_session(&session);
    let reports = sync::install_all(&mut session, catalog.items().iter().map(CatalogItem::entry));

    let mut failed = 0;
    for report in &reports {
        match &report.error {
            Some(error) => {
                failed += 1;
                error!("{} {}: {}", report.role, report.id, describe(error));
            }
            None if report.installed => info!("installed {} {}", report.role, report.id),
            None => info!("{} {} already installed", report.role, report.id),
        }
    }

    if failed > 0 {
        bail!("{failed} of {} installs failed", reports.len());
    }

    Ok(())
}

fn run_list(layout: &Layout, role: Role, opts: ListOptions) -> Result<()> {
    let mut filters = catalog::parse_filters(&opts.filters)?;
    filters.push(Filter::Role(role));

    let catalog = Catalog::load(layout)?;
    let items = catalog.list(&filters);
    match opts.out {
        OutputFormat::List => {
            for item in items {
                println!("{}", item.id());
            }
        }
        OutputFormat::Table => print_table(&items),
    }

    Ok(())
}

fn print_table(items: &[&CatalogItem]) {
    let header = ["NAME", "KIND", "ENABLED", "INSTALLED"].map(String::from);
    let rows = items
        .iter()
        .map(|item| {
            [
                item.id().to_string(),
                item.kind().to_string(),
                item.is_enabled().to_string(),
                item.is_installed().to_string(),
            ]
        })
        .collect::<Vec<_>>();

    let mut widths = [0; 4];
    for row in once(&header).chain(&rows) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    for row in once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}

fn run_add(layout: Layout, entry: Entry) -> Result<()> {
    let mut session = Session::open(layout, Git2Cloner::new())?;
    let outcome = sync::install_and_enable(&mut session, &entry)?;
    if outcome.is_installed() {
        info!("installed {} {}", entry.role(), entry.id());
    }

    Ok(())
}

fn run_toggle(layout: Layout, role: Role, opts: ToggleOptions, enable: bool) -> Result<()> {
    let mut session = Session::open(layout, Git2Cloner::new())?;
    let reports = sync::set_enabled(&mut session, &opts.ids, &[Filter::Role(role)], enable);

    let mut failed = 0;
    for report in &reports {
        match &report.error {
            Some(error) => {
                failed += 1;
                error!("{} {}: {}", report.role, report.id, describe(error));
            }
            None if enable => info!("enabled {} {}", report.role, report.id),
            None => info!("disabled {} {}", report.role, report.id),
        }
    }

    if failed > 0 {
        bail!("{failed} of {} {role}s could not be toggled", reports.len());
    }

    Ok(())
}

async fn run_outdated(layout: &Layout, opts: OutdatedOptions) -> Result<()> {
    let options = UpdateOptions {
        concurrency: opts.jobs,
        timeout: Duration::from_secs(opts.timeout),
    };

    let catalog = Catalog::load(layout)?;
    let items = catalog.list(&[Filter::Role(Role::Plugin), Filter::Installed(true)]);
    let reports = updates::check(items, options).await;
    for report in reports {
        println!("{}  {}", report.id, report.status);
    }

    Ok(())
}

/// Flatten error and its sources into one line.
fn describe(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

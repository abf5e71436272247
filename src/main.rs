use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use package_monitor::audit::CommandAuditRunner;
use package_monitor::config::{self, MonitorConfig};
use package_monitor::logging;
use package_monitor::monitor::{
    Category, ConsoleNotifier, FsExtractor, Monitor, MonitorDeps, SqliteProjectStore,
};
use package_monitor::report;
use package_monitor::version::lookup::PackageLookup;
use package_monitor::version::registries::{GitHubReleases, NpmRegistry};

#[derive(Parser)]
#[command(name = "package-monitor")]
#[command(
    version,
    about = "Tracks outdated and vulnerable dependencies of local JavaScript projects"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a project directory
    Add { path: PathBuf },
    /// Remove a project
    Remove { name: String },
    /// List projects
    List,
    /// Show outdated dependencies of a project
    Outdated { name: String },
    /// Run the security audit of a project
    Audit { name: String },
    /// Flag or unflag a priority package
    Priority {
        name: String,
        #[command(subcommand)]
        action: PriorityAction,
    },
    /// Set the check period in seconds (0 disables)
    Notify {
        name: String,
        category: CategoryArg,
        period_secs: u64,
    },
    /// Run the scheduled checks until Ctrl-C
    Watch,
}

#[derive(Subcommand)]
enum PriorityAction {
    Add { package: String },
    Remove { package: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Outdated,
    Vulnerabilities,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Outdated => Category::Outdated,
            CategoryArg::Vulnerabilities => Category::Vulnerabilities,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(&config::log_path()).context("failed to initialize logging")?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

fn build_monitor() -> anyhow::Result<Monitor> {
    let config = MonitorConfig::load(&config::config_path())?;

    std::fs::create_dir_all(config::data_dir()).context("failed to create data directory")?;
    let store = SqliteProjectStore::new(&config::db_path())?;

    let lookup = PackageLookup::new(
        Arc::new(NpmRegistry::new(&config.registry.npm_url)),
        Arc::new(GitHubReleases::new(
            &config.registry.github_api_url,
            config::github_token(),
        )),
    );

    let monitor = Monitor::new(MonitorDeps {
        store: Arc::new(store),
        extractor: Arc::new(FsExtractor),
        lookup,
        auditor: Arc::new(CommandAuditRunner::new(&config.audit)),
        notifier: Arc::new(ConsoleNotifier),
        icon: config.notifications.icon,
    });
    monitor.load()?;

    Ok(monitor)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let monitor = build_monitor()?;

    match cli.command {
        Command::Add { path } => {
            let path = path
                .canonicalize()
                .with_context(|| format!("cannot resolve {:?}", path))?;
            let project = monitor.add_project(&path).await?;
            println!("Added {} ({})", project.display_name(), project.path.display());
        }
        Command::Remove { name } => {
            let project = monitor.remove_project(&name)?;
            println!("Removed {}", project.display_name());
        }
        Command::List => {
            println!("{}", report::projects_table(&monitor.projects()));
        }
        Command::Outdated { name } => {
            monitor.open_project(&name).await?;
            let outdated = monitor.outdated(&name).await?;

            println!("{}", outdated.source.describe());
            if outdated.is_empty() {
                println!("All dependencies are up to date.");
            } else {
                if !outdated.priority.is_empty() {
                    println!("Priority updates");
                    println!("{}", report::updates_table(&outdated.priority));
                }
                if !outdated.other.is_empty() {
                    println!("Other updates");
                    println!("{}", report::updates_table(&outdated.other));
                }
            }
        }
        Command::Audit { name } => {
            let records = monitor.vulnerabilities(&name).await?;
            if records.is_empty() {
                println!("No vulnerabilities found.");
            } else {
                println!("{}", report::vulnerabilities_table(&records));
            }
        }
        Command::Priority { name, action } => match action {
            PriorityAction::Add { package } => {
                if !monitor.add_priority(&name, &package, None)? {
                    println!("{} is already a priority", package);
                }
            }
            PriorityAction::Remove { package } => {
                if !monitor.remove_priority(&name, &package, None)? {
                    println!("{} is not a priority", package);
                }
            }
        },
        Command::Notify {
            name,
            category,
            period_secs,
        } => {
            monitor.set_notification_period(&name, category.into(), period_secs)?;
        }
        Command::Watch => watch(&monitor).await?,
    }

    Ok(())
}

async fn watch(monitor: &Monitor) -> anyhow::Result<()> {
    let armed = monitor.resume_schedules();
    info!("Watching with {} active checks", armed);
    println!("Watching {} checks, press Ctrl-C to stop", armed);

    let mut clicks = monitor
        .take_clicks()
        .context("click channel already taken")?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(click) = clicks.recv() => {
                match monitor.handle_click(&click).await {
                    Ok(tab) => println!("Opening {} ({})", tab.project.display_name(), tab.category),
                    Err(e) => warn!("Cannot open {}: {}", click.project, e),
                }
            }
        }
    }

    monitor.shutdown();
    Ok(())
}

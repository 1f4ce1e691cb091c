//! Tank - a security-first package manager for AI-agent skills.
//!
//! Usage:
//!   tank init
//!   tank install [name] [range]
//!   tank publish [--dry-run]
//!   ...

mod interactive;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use tank_core::context::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tank")]
#[command(about = "A security-first package manager for AI-agent skills", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter skills.json
    Init {
        name: Option<String>,
        description: Option<String>,
    },
    /// Pack and publish the current directory to the registry
    Publish {
        #[arg(long)]
        dry_run: bool,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Install one named skill, or everything in skills.json / skills.lock
    Install {
        name: Option<String>,
        range: Option<String>,
        #[arg(short, long)]
        global: bool,
    },
    /// Remove an installed skill
    Remove {
        name: String,
        #[arg(short, long)]
        global: bool,
    },
    /// Update one dependency, or all of them, to the highest matching version
    Update {
        name: Option<String>,
        #[arg(short, long)]
        global: bool,
    },
    /// Check the lockfile against the extracted skill tree
    Verify {
        #[arg(short, long)]
        global: bool,
    },
    /// Fetch current audit scores for every installed skill
    Audit {
        #[arg(short, long)]
        global: bool,
    },
    /// Query the registry
    Search { query: String },
    /// Print registry metadata for a skill
    Info { name: String },
    /// Print the union of installed skills' permission requests
    Permissions {
        #[arg(short, long)]
        global: bool,
    },
    /// Dev-link the current directory into every detected host agent
    Link {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Reverse of `link`
    Unlink { name: String },
    /// Diagnose agent detection, link consistency, and dangling entries
    Doctor,
    /// Persist a bearer token obtained out-of-band
    Login {
        token: String,
        user: Option<String>,
    },
    /// Clear the persisted bearer token
    Logout,
    /// Print the logged-in user, if any
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tank=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => Ok(()),
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").bold().red());
            std::process::exit(exit_code_for(&err));
        }
    }
}

/// Map a failure to a process exit code, per §7's taxonomy. Individual
/// subsystems return their own narrow error types; this is the one place
/// that inspects them to pick a code.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    use tank_core::error::{
        AuditVerdictError, ExtractError, IntegrityError, NetworkError, PackError, PermissionViolation, RegistryError,
    };

    if let Some(RegistryError::VersionExists) = err.downcast_ref::<RegistryError>() {
        return 10;
    }
    if err.downcast_ref::<PermissionViolation>().is_some() {
        return 11;
    }
    if err.downcast_ref::<IntegrityError>().is_some() {
        return 12;
    }
    if err.downcast_ref::<PackError>().is_some() {
        return 13;
    }
    if err.downcast_ref::<ExtractError>().is_some() {
        return 14;
    }
    if err.downcast_ref::<NetworkError>().is_some() || err.downcast_ref::<RegistryError>().is_some() {
        return 15;
    }
    if err.downcast_ref::<AuditVerdictError>().is_some() {
        return 16;
    }
    1
}

async fn run(command: Commands) -> Result<()> {
    let ctx = Context::discover()?;

    match command {
        Commands::Init { name, description } => {
            let answers = interactive::collect_init_answers(name, description)?;
            tank_core::commands::init::run(&ctx, &answers.name, &answers.description)?;
            println!("{} {}", style("wrote").green(), ctx.manifest_path().display());
        }
        Commands::Publish { dry_run, dir } => {
            let outcome = tank_core::commands::publish::run(&ctx, &dir, dry_run).await?;
            match outcome.version {
                Some(version) => println!("{} version {version}", style("published").green()),
                None => println!("dry run complete: {:?}", outcome.state),
            }
        }
        Commands::Install { name, range, global } => {
            let budget = load_budget(&ctx)?;
            match name {
                Some(name) => {
                    let outcome = tank_core::commands::install::install_one(
                        &ctx,
                        &name,
                        range.as_deref().unwrap_or("*"),
                        global,
                        &budget,
                    )
                    .await?;
                    for warning in &outcome.warnings {
                        eprintln!("{} {warning}", style("warning:").yellow());
                    }
                    println!("{} {}@{}", style("installed").green(), outcome.name, outcome.version);
                }
                None => {
                    let outcomes = tank_core::commands::install::install_from_lockfile(&ctx, global).await?;
                    println!("{} {} skill(s)", style("installed").green(), outcomes.len());
                }
            }
        }
        Commands::Remove { name, global } => {
            let outcome = tank_core::commands::remove::run(&ctx, &name, global)?;
            println!("removed {} ({} broken link(s))", outcome.name, outcome.broken_links);
        }
        Commands::Update { name, global } => {
            let outcomes = tank_core::commands::update::run(&ctx, name.as_deref(), global).await?;
            println!("updated {} skill(s)", outcomes.len());
        }
        Commands::Verify { global } => {
            let findings = tank_core::commands::verify::run(&ctx, global)?;
            println!("{} skill(s) verified", findings.len());
        }
        Commands::Audit { global } => {
            let findings = tank_core::commands::audit::run(&ctx, global).await?;
            for finding in findings {
                println!("{}: {:?} ({:?})", finding.key, finding.audit_status, finding.audit_score);
            }
        }
        Commands::Search { query } => {
            let results = tank_core::commands::search::search(&ctx, &query).await?;
            for result in results {
                println!("{} ({}) — {}", result.name, result.latest_version, result.description);
            }
        }
        Commands::Info { name } => {
            let info = tank_core::commands::search::info(&ctx, &name).await?;
            println!("{} ({}) — {}", info.name, info.latest_version, info.description);
        }
        Commands::Permissions { global } => {
            let union = tank_core::commands::permissions::run(&ctx, global)?;
            println!("{}", serde_json::to_string_pretty(&union)?);
        }
        Commands::Link { dir } => {
            let name = tank_core::commands::link::link(&ctx, &dir)?;
            println!("linked {name}");
        }
        Commands::Unlink { name } => {
            let broken = tank_core::commands::link::unlink(&ctx, &name)?;
            println!("unlinked {name} ({broken} broken link(s))");
        }
        Commands::Doctor => {
            let report = tank_core::commands::doctor::run(&ctx)?;
            println!("detected agents: {}", report.detected_agents.len());
            println!("local links: {}", report.local_links.len());
            println!("global links: {}", report.global_links.len());
            println!("dangling entries: {}", report.dangling.len());
            for finding in &report.dangling {
                println!(
                    "  {} [{}]: {}",
                    finding.skill_name,
                    finding.agent,
                    style(&finding.reason).yellow()
                );
            }
        }
        Commands::Login { token, user } => {
            tank_core::commands::auth::login(&ctx, &token, user.as_deref())?;
        }
        Commands::Logout => {
            tank_core::commands::auth::logout(&ctx)?;
        }
        Commands::Whoami => match tank_core::commands::auth::whoami(&ctx)? {
            Some(user) => println!("{user}"),
            None => println!("not logged in"),
        },
    }

    Ok(())
}

fn load_budget(ctx: &Context) -> Result<Option<tank_core::manifest::Permissions>> {
    let manifest_path = ctx.manifest_path();
    if !manifest_path.is_file() {
        return Ok(None);
    }
    let manifest = tank_core::manifest::SkillManifest::parse(&std::fs::read(&manifest_path)?)?;
    Ok(manifest.permissions)
}

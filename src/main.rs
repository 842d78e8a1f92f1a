use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

/// Exit status of `mes access check` and `mes access guard` on denial.
const EXIT_DENIED: i32 = 3;

#[derive(Parser)]
#[command(name = "mes")]
#[command(
    version,
    about = "Menu-driven access control and derived form fields for the MES admin console"
)]
pub struct Cli {
    /// Force debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .mes/mes.toml with default settings
    Init,
    /// Inspect and evaluate menu-based permissions
    Access {
        #[command(subcommand)]
        command: AccessCommands,
    },
    /// Generate codes, descriptions and material names
    Derive {
        #[command(subcommand)]
        command: DeriveCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum AccessCommands {
    /// Print the allowed path set of a menu tree
    Paths {
        /// Menu JSON: `{"menus": [...]}` or a bare array
        #[arg(long)]
        menus: PathBuf,
    },
    /// Decide whether a path may be opened (exit 3 when denied)
    Check {
        path: String,
        #[arg(long)]
        menus: PathBuf,
        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a navigation through the guard (exit 3 when redirected)
    Guard {
        path: String,
        /// Menu JSON; omit to simulate a failed menu fetch
        #[arg(long)]
        menus: Option<PathBuf>,
        /// Session state: authenticated, anonymous, expired, unavailable
        #[arg(long, default_value = "authenticated")]
        session: String,
        #[arg(long, default_value = "")]
        user: String,
        #[arg(long)]
        json: bool,
    },
    /// Build the menu tree visible to a set of groups
    Tree {
        /// Flat menu records JSON
        #[arg(long)]
        records: PathBuf,
        /// Comma-separated group names
        #[arg(long, default_value = "")]
        groups: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum DeriveCommands {
    /// Derive the code and description of a BOM or process route
    Code {
        /// Reference snapshot JSON
        #[arg(long)]
        snapshot: PathBuf,
        /// Entity kind: bom, process-route, category-route
        #[arg(long)]
        kind: String,
        /// Product or category id
        #[arg(long)]
        parent: Option<i64>,
        #[arg(long, default_value = "")]
        version: String,
        #[arg(long)]
        json: bool,
    },
    /// Derive the code and name of a material
    Material {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        category: Option<i64>,
        /// Parameter value as ID=VALUE, repeatable
        #[arg(long = "param")]
        params: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Replay form events through a session and print the resulting record
    Replay {
        #[arg(long)]
        snapshot: PathBuf,
        /// bom, process-route, category-route or material
        #[arg(long)]
        kind: String,
        /// JSON array of form events
        #[arg(long)]
        events: PathBuf,
        /// Validate the final record as a submit would
        #[arg(long)]
        submit: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default mes.toml file
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let config = mes::mes_config::MesConfig::with_cli_args(project_dir.clone(), cli.verbose)?;
    mes::logging::init(&config.log_filter(), config.toml.logging.json);

    match &cli.command {
        Commands::Init => cmd::cmd_init(&project_dir)?,
        Commands::Access { command } => {
            if !cmd::cmd_access(&config, command.clone())? {
                std::process::exit(EXIT_DENIED);
            }
        }
        Commands::Derive { command } => cmd::cmd_derive(&config, command.clone())?,
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
    }

    Ok(())
}

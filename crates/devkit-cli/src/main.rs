mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "devkit",
    about = "Developer tooling: changed-file linting, coding standards gates and migration scaffolding",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .devkit/ or .git/)
    #[arg(long, global = true, env = "DEVKIT_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files changed against a git reference, filtered by extension
    #[command(alias = "resolve-changes")]
    ChangedFiles {
        /// Git reference to diff against
        #[arg(required_unless_present = "staged", conflicts_with = "staged")]
        reference: Option<String>,
        /// Diff the index against HEAD instead of a reference
        #[arg(long)]
        staged: bool,
        /// Only keep paths ending with this suffix (default: vcs.extension)
        #[arg(long)]
        ext: Option<String>,
    },

    /// Lint the staged files
    LintStaged,

    /// Lint the files changed on this branch
    LintBranch {
        /// Reference to compare with (default: vcs.base_branch)
        #[arg(long)]
        against: Option<String>,
    },

    /// Check the staged files for coding standard warnings & errors
    CheckStagedCs,

    /// Check the files changed on this branch for coding standard warnings & errors
    CheckBranchCs {
        /// Reference to compare with (default: vcs.base_branch)
        #[arg(long)]
        against: Option<String>,
    },

    /// Check for all coding standard errors
    CheckCs {
        /// Extra arguments passed to the script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Check for all coding standard warnings & errors
    CheckCsWarnings {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Fix auto-fixable coding standards
    FixCs {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Verify coding standard violations are below the configured thresholds
    CheckCsThresholds,

    /// Pick a coding standards command from a menu
    #[command(alias = "dispatch-choice")]
    CodingStandards {
        /// Menu key (omit to choose interactively)
        choice: Option<String>,
    },

    /// Run a configured script by name
    Script {
        name: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Scaffold a new migration file
    GenerateMigration {
        /// Migration name, e.g. "add indexable column"
        #[arg(num_args = 0..)]
        name: Vec<String>,
    },

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::ChangedFiles { reference, ext, .. } => {
            let reference =
                reference.unwrap_or_else(|| devkit_core::changes::STAGED.to_string());
            cmd::changes::list(&root, &reference, ext.as_deref(), cli.json)
        }
        Commands::LintStaged => cmd::changes::lint(&root, cmd::changes::Scope::Staged),
        Commands::LintBranch { against } => {
            cmd::changes::lint(&root, cmd::changes::Scope::Branch(against))
        }
        Commands::CheckStagedCs => cmd::changes::check_cs(&root, cmd::changes::Scope::Staged),
        Commands::CheckBranchCs { against } => {
            cmd::changes::check_cs(&root, cmd::changes::Scope::Branch(against))
        }
        Commands::CheckCs { args } => cmd::script::run(&root, "check-cs", &args),
        Commands::CheckCsWarnings { args } => cmd::script::run(&root, "check-cs-warnings", &args),
        Commands::FixCs { args } => cmd::script::run(&root, "fix-cs", &args),
        Commands::Script { name, args } => cmd::script::run(&root, &name, &args),
        Commands::CheckCsThresholds => cmd::gate::run(&root, cli.json),
        Commands::CodingStandards { choice } => cmd::menu::run(&root, choice.as_deref()),
        Commands::GenerateMigration { name } => {
            cmd::migration::run(&root, &name.join(" "), cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

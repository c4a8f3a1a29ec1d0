mod dependency;
mod impact;
mod report;
mod vcs;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ripplescope",
    version,
    about = "Reports the scope of impact of code changes",
    long_about = "Ripplescope analyzes a multi-package project into a declaration-level \
                  reverse-dependency graph and reports which declarations and service \
                  entrypoints are affected by a set of changes between two revisions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the reverse dependencies of a declaration
    #[command(
        long_about = "Analyzes the repository and prints every declaration that \
                      transitively depends on the target, one per line. The target is an \
                      object id of the form <package>/<file>:<member>."
    )]
    Dependency {
        /// Target object id (e.g. github.com/acme/app/store/db.go:Open)
        #[arg(short, long, value_name = "OBJECT_ID")]
        target: String,

        /// Repository path
        #[arg(short, long, value_name = "PATH", default_value = ".")]
        repo: PathBuf,
    },
    /// Report what is affected between two revisions
    #[command(
        long_about = "Exports both revisions, diffs their top-level declarations and \
                      reports either every change with its reverse dependencies (--scope all) \
                      or the deduplicated set of affected services (--scope service)."
    )]
    Impact {
        /// Old commit
        #[arg(short, long, value_name = "COMMIT")]
        old: String,

        /// New commit
        #[arg(short, long, value_name = "COMMIT")]
        new: String,

        /// Repository path
        #[arg(short, long, value_name = "PATH", default_value = ".")]
        repo: PathBuf,

        /// Report scope
        #[arg(short, long, value_enum, default_value_t = Scope::All)]
        scope: Scope,
    },
    /// Report affected entrypoints from the file-level import graph
    #[command(
        long_about = "Runs a git diff between the two commits and maps each changed file \
                      onto the services whose import closure contains its package.\n\n\
                      Example:\n  ripplescope report --old HEAD~1 --new HEAD"
    )]
    Report {
        /// Old commit
        #[arg(short, long, value_name = "COMMIT")]
        old: String,

        /// New commit
        #[arg(short, long, value_name = "COMMIT")]
        new: String,

        /// Repository path
        #[arg(short, long, value_name = "PATH", default_value = ".")]
        repo: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Oneline)]
        format: OutputFormat,
    },
    /// Print the version number
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    All,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Oneline,
    Text,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = crate::logging::init_logging("cli");

    match cli.command {
        Commands::Dependency { target, repo } => dependency::run(&target, &repo),
        Commands::Impact {
            old,
            new,
            repo,
            scope,
        } => impact::run(&old, &new, &repo, scope),
        Commands::Report {
            old,
            new,
            repo,
            format,
        } => report::run(&old, &new, &repo, format),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

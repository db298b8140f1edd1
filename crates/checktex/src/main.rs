//! checktex CLI - Main entry point

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "checktex")]
#[command(version)]
#[command(about = "Inspect how checktex sees a LaTeX document", long_about = None)]
struct Cli {
    /// Directory that inclusion paths are relative to (defaults to the
    /// directory of the main file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the flattened source
    Flatten {
        /// Main file of the document
        main: PathBuf,
    },

    /// Print the plain text
    Text {
        /// Main file of the document
        main: PathBuf,
    },

    /// List the files of the document in inclusion order
    Files {
        /// Main file of the document
        main: PathBuf,
    },

    /// Print the flat source, the file contents and the plain text as JSON
    Dump {
        /// Main file of the document
        main: PathBuf,
    },

    /// Print the origin of every match of a regular expression, one JSON
    /// object per line
    Find {
        /// Main file of the document
        main: PathBuf,

        /// Regular expression to search for
        pattern: String,

        /// Search the flattened source instead of the plain text
        #[arg(long)]
        source: bool,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checktex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let options = commands::LoadOptions {
        root: cli.root,
        config: cli.config,
    };

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Flatten { main } => commands::show::flatten(&main, &options, &mut stdout),
        Commands::Text { main } => commands::show::text(&main, &options, &mut stdout),
        Commands::Files { main } => commands::show::files(&main, &options, &mut stdout),
        Commands::Dump { main } => commands::show::dump(&main, &options, &mut stdout),
        Commands::Find {
            main,
            pattern,
            source,
        } => commands::find::execute(&main, &pattern, source, &options, &mut stdout),
    }
}

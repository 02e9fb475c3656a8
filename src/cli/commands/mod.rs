//! CLI parser and command dispatch.

mod counter;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use horse::{Config, Settings};

#[derive(Parser)]
#[command(name = "horse")]
#[command(about = "Headless page enhancer for static sites")]
#[command(version)]
pub struct Cli {
    /// Config file path (otherwise a horse.toml or horse.json is searched for)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance a page and print the resulting HTML
    Render {
        /// Page path, relative to --root or to --origin
        page: String,
        /// Site root directory for file-based pages
        #[arg(long, default_value = ".", conflicts_with = "origin")]
        root: PathBuf,
        /// Site origin URL (e.g. https://example.com) to fetch the page over HTTP
        #[arg(long)]
        origin: Option<String>,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or reset the stored visitor count
    Counter {
        #[command(subcommand)]
        command: CounterCommands,
    },
}

#[derive(Subcommand)]
enum CounterCommands {
    /// Show the stored visitor count
    Show,
    /// Forget the stored visitor count so the next visit reseeds it
    Reset,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::discover(cli.config.as_deref()).await?;
    let settings = Settings::from_config(&config);

    match cli.command {
        Commands::Render {
            page,
            root,
            origin,
            output,
        } => {
            let source = match origin {
                Some(origin) => render::PageSource::Origin(origin),
                None => render::PageSource::Root(root),
            };
            render::cmd_render(&config, &settings, source, &page, output.as_deref()).await
        }
        Commands::Counter { command } => match command {
            CounterCommands::Show => counter::cmd_counter_show(&config, &settings),
            CounterCommands::Reset => counter::cmd_counter_reset(&config, &settings),
        },
    }
}

//! CLI entry point for content-rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "content-rs")]
#[command(version)]
#[command(about = "Inspect a file-backed content repository", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a collection in its display order
    #[command(alias = "ls")]
    List {
        /// Collection to list (pages, news, references, jobs, team, partners)
        #[arg(default_value = "news")]
        collection: String,
    },

    /// Print a single item as JSON
    Show {
        /// Collection the item belongs to
        collection: String,

        /// Item slug (file name without `.md`)
        slug: String,

        /// Include page metadata (clamped title, description, alternates)
        #[arg(short, long)]
        meta: bool,
    },

    /// Render a markdown file to HTML
    Render {
        /// File to render
        file: PathBuf,
    },

    /// Show site settings
    Settings,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "content_rs=debug,info"
    } else {
        "content_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List { collection } => {
            let site = content_rs::Site::new(&base_dir)?;
            content_rs::commands::list::run(&site, &collection)?;
        }

        Commands::Show {
            collection,
            slug,
            meta,
        } => {
            let site = content_rs::Site::new(&base_dir)?;
            content_rs::commands::show::run(&site, &collection, &slug, meta)?;
        }

        Commands::Render { file } => {
            let site = content_rs::Site::new(&base_dir)?;
            let file = if file.is_absolute() {
                file
            } else {
                base_dir.join(file)
            };
            content_rs::commands::render::run(&site, &file)?;
        }

        Commands::Settings => {
            let site = content_rs::Site::new(&base_dir)?;
            content_rs::commands::settings::run(&site)?;
        }

        Commands::Version => {
            println!("content-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

//! Front door for site binaries.
//!
//! A site crate registers its statically linked pages and hands the registry
//! builder to [`run`], which provides the `init` / `build` / `serve` command
//! line:
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     site_kit::run(|| {
//!         let mut pages = site_kit::PageRegistry::new();
//!         pages.insert("index", home::HomePage);
//!         pages.insert("about", about::AboutPage);
//!         pages
//!     })
//!     .await
//! }
//! ```

mod commands;

pub use site_kit_core::config::{UserConfig, load_config};
pub use site_kit_core::types::{
    HtmlTemplateData, LocaleInfo, Metadata, OpenGraph, Script, ScriptTag, Translations,
    TwitterCard,
};
pub use site_kit_generator::component::ViewPage;
pub use site_kit_generator::page::{Page, PageRegistry};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use site_kit_generator::page::RegistryBuilder;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "site-kit")]
#[command(version, about = "Static site generator for localized pages", long_about = None)]
struct Cli {
    /// Project root containing site.toml
    #[arg(short = 'C', long, default_value = ".", global = true)]
    project: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Scaffold the site asset directories and a starter site.toml
    Init,

    /// Build the full site to the output directory
    Build {
        /// Output directory override
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Serve the site locally with live reload
    Serve {
        /// Port override
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse the command line and dispatch. `pages` reconstructs the page set;
/// the dev server calls it again whenever watched files change.
pub async fn run(
    pages: impl Fn() -> PageRegistry + Send + Sync + 'static,
) -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "site-kit", &mut io::stdout());
        return Ok(());
    }

    let project = std::fs::canonicalize(&cli.project).with_context(|| {
        format!("Project directory does not exist: {}", cli.project.display())
    })?;
    let builder: RegistryBuilder = Arc::new(pages);

    match cli.command {
        Command::Init => commands::init::run(&project).await,
        Command::Build { output } => commands::build::run(&project, output, (builder)()).await,
        Command::Serve { port } => commands::serve::run(&project, port, builder).await,
        Command::Completions { .. } => unreachable!("handled above"),
    }
}

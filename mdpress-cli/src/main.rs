//! # mdpress CLI
//!
//! Command-line interface for the mdpress document converter.

mod commands;

use clap::{Args, Parser, Subcommand};
use mdpress_types::{ConvertOptions, Theme};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mdpress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert Markdown to a standalone HTML page
    Html {
        /// Input Markdown file ("-" reads stdin)
        input: PathBuf,

        /// Output file (defaults to the input name, or the title for stdin)
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        doc: DocArgs,
    },

    /// Convert Markdown to a Word document
    Docx {
        /// Input Markdown file ("-" reads stdin)
        input: PathBuf,

        /// Output file (defaults to the input name, or the title for stdin)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Deflate package entries instead of storing them uncompressed
        #[arg(long)]
        deflate: bool,

        #[command(flatten)]
        doc: DocArgs,
    },
}

#[derive(Args)]
struct DocArgs {
    /// Document title
    #[arg(long, default_value = "Document")]
    title: String,

    /// Author line under the title
    #[arg(long, default_value = "")]
    author: String,

    /// Date line under the title (defaults to today)
    #[arg(long)]
    date: Option<String>,

    /// Color theme
    #[arg(long, value_enum, default_value_t = Theme::Color)]
    theme: Theme,

    /// Include a table of contents
    #[arg(long)]
    toc: bool,

    /// Omit the embedded stylesheet (HTML output only)
    #[arg(long)]
    no_styles: bool,
}

impl DocArgs {
    fn into_options(self) -> ConvertOptions {
        ConvertOptions {
            title: self.title,
            author: self.author,
            date: self
                .date
                .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
            theme: self.theme,
            include_table_of_contents: self.toc,
            include_styles: !self.no_styles,
            page_numbers: false,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Html { input, out, doc } => {
            commands::export_html(&input, out, &doc.into_options())
        }
        Commands::Docx {
            input,
            out,
            deflate,
            doc,
        } => commands::export_docx(&input, out, deflate, &doc.into_options()),
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// AI ScanMaster — document scanning from the command line.
//
// Entry point. Initialises logging, parses the command, runs it, and turns any
// failure into a plain-language message.

mod commands;
mod services;
mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use scanmaster_core::human_errors::humanize_error;
use scanmaster_core::types::{DocumentId, FilterKind, LanguageCode, UserPlan};

#[derive(Parser)]
#[command(name = "scanmaster", version, about = "AI ScanMaster document scanner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a filter to an image
    Filter {
        input: PathBuf,
        output: PathBuf,
        /// original, grayscale, magic, or lighten
        #[arg(long, short)]
        filter: FilterKind,
    },
    /// Rotate an image clockwise by a multiple of 90 degrees
    Rotate {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, short, default_value = "90", allow_negative_numbers = true)]
        degrees: i32,
    },
    /// Draw a diagonal watermark across an image or a saved page
    Watermark {
        #[arg(required_unless_present = "document")]
        input: Option<PathBuf>,
        #[arg(required_unless_present = "document")]
        output: Option<PathBuf>,
        #[arg(long, short)]
        text: String,
        #[command(flatten)]
        target: PageTarget,
    },
    /// Stamp a signature in the bottom-right corner of an image or a saved page
    Sign {
        #[arg(required_unless_present = "document")]
        input: Option<PathBuf>,
        #[arg(required_unless_present = "document")]
        output: Option<PathBuf>,
        /// Signature image, ideally with a transparent background
        #[arg(long, short)]
        signature: PathBuf,
        #[command(flatten)]
        target: PageTarget,
    },
    /// Re-encode an image at a lower quality
    Compress {
        input: PathBuf,
        output: PathBuf,
        /// Quality factor in (0, 1]; defaults to the configured value
        #[arg(long, short)]
        quality: Option<f32>,
    },
    /// Export a saved document or a list of images as a PDF
    Export {
        output: PathBuf,
        /// Images to export, one page each
        images: Vec<PathBuf>,
        /// Saved document to export instead of images
        #[arg(long, conflicts_with = "images")]
        document: Option<DocumentId>,
    },
    /// Capture images as the pages of a new document
    Scan {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        #[arg(long, short, default_value = "original")]
        filter: FilterKind,
        /// Clockwise quarter turns applied to every page
        #[arg(long, default_value = "0")]
        turns: u8,
    },
    /// List saved documents
    List,
    /// Delete a saved document
    Delete { id: DocumentId },
    /// Extract the text of a document and fill in its details
    Ocr { id: DocumentId },
    /// Translate the extracted text of a document
    Translate {
        id: DocumentId,
        /// Target language code or name; defaults to the configured one
        #[arg(long, short)]
        language: Option<LanguageCode>,
    },
    /// Show the extracted text of a document, or replace it
    Text {
        id: DocumentId,
        /// New text; an empty value clears it
        #[arg(long)]
        set: Option<String>,
    },
    /// Show or change settings
    Config {
        /// Default translation target
        #[arg(long)]
        language: Option<LanguageCode>,
        /// Default compress quality in (0, 1]
        #[arg(long)]
        quality: Option<f32>,
    },
    /// Show the plan and today's usage, or switch plan
    Plan { set: Option<UserPlan> },
    /// Delete all local data
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

/// A page of a saved document, edited in place instead of a file.
#[derive(Args)]
struct PageTarget {
    #[arg(long, conflicts_with_all = ["input", "output"])]
    document: Option<DocumentId>,
    /// Zero-based page index
    #[arg(long, default_value = "0", requires = "document")]
    page: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match commands::run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

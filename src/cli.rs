//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::category::Category;

/// Pick the best photo from a batch, and upscale or cut out the winner.
#[derive(Parser, Debug)]
#[command(name = "bestphoto", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Vision model name or short alias (overrides the config file).
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server.
    Serve {
        /// Address to bind (defaults to the config file's `server.host`).
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (defaults to the config file's `server.port`).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Ask the vision model for the best photo among FILES.
    Select {
        /// Photo category: portrait, animal or landscape.
        #[arg(short, long)]
        category: Category,
        /// Feedback for a second round in the same session.
        #[arg(short, long)]
        feedback: Option<String>,
        /// Photos to compare, in order.
        files: Vec<PathBuf>,
    },

    /// Print the URL of an AI-upscaled copy of an image.
    Upscale {
        /// The image to upscale.
        #[command(flatten)]
        source: Source,
        /// Upscale factor: 2 or 4.
        #[arg(long)]
        factor: u64,
    },

    /// Print the URL of a background-removed copy of an image.
    RemoveBg {
        /// The image to process.
        #[command(flatten)]
        source: Source,
    },

    /// Upload a file to the image CDN and print its public ID.
    Upload {
        /// File to upload.
        file: PathBuf,
    },
}

/// An image that is either already on the CDN or a local file to upload first.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Source {
    /// Public ID of an asset already on the CDN.
    #[arg(long)]
    pub public_id: Option<String>,
    /// Local file to upload before processing.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

//! CLI module for TrimX Studio
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// TrimX Studio
///
/// Upload a video to the TrimX trimming service, mark segments and download
/// the concatenated result.
#[derive(Parser, Debug)]
#[command(name = "studio")]
#[command(about = "TrimX Studio - Segment editing client for the TrimX trimming service")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Base URL of the trimming backend
    #[arg(long, env = "STUDIO_BACKEND_URL", global = true)]
    pub backend_url: Option<String>,

    /// Configuration file ([studio] table)
    #[arg(long, env = "STUDIO_CONFIG", global = true)]
    pub config: Option<String>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, env = "STUDIO_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, env = "STUDIO_LOG_FORMAT", global = true, value_parser = ["text", "json"])]
    pub log_format: Option<String>,

    /// Directory downloads are saved into
    #[arg(long, env = "STUDIO_DOWNLOAD_DIR", global = true)]
    pub download_dir: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check backend health and FFmpeg availability
    Health,
    /// List videos stored on the backend
    Videos(args::VideosArgs),
    /// Upload a video and print its descriptor
    Upload(args::UploadArgs),
    /// Upload, mark segments, process and optionally download
    Run(args::RunArgs),
    /// Delete an uploaded video from the backend
    DeleteVideo(args::DeleteArgs),
    /// Delete a processed output from the backend
    DeleteOutput(args::DeleteArgs),
}

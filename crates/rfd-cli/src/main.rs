// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rfd_core::RequestMetadata;
use rfd_summary::{DEFAULT_MAX_LENGTH, summarize_text};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rfd", version, about = "Replay fault dispatcher CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show which error representation a failed request would get.
    Explain {
        /// TOML config file (defaults plus RFD_* env overrides when omitted).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Referer of the embedding page.
        #[arg(long)]
        referer: Option<String>,

        /// Requested archived URL.
        #[arg(long)]
        url: Option<String>,

        /// Treat the request as query mode instead of replay.
        #[arg(long)]
        query: bool,

        /// Ask for an XML error (query mode only).
        #[arg(long)]
        xml: bool,

        /// Request came from an image context.
        #[arg(long)]
        image: bool,

        /// Request came from a script context.
        #[arg(long)]
        script: bool,

        /// Request came from a stylesheet context.
        #[arg(long)]
        style: bool,

        /// Failure text, e.g. "org.example.NotFound: gone".
        #[arg(long)]
        failure: Option<String>,

        /// Print JSON instead of pretty output.
        #[arg(long)]
        json: bool,
    },

    /// Load and validate a configuration.
    CheckConfig {
        /// TOML config file (defaults plus RFD_* env overrides when omitted).
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the diagnostic-header summary of a failure text.
    Summarize {
        /// Maximum summary length in characters.
        #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
        max: usize,

        /// Failure text.
        text: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("rfd=debug")
    } else {
        EnvFilter::new("rfd=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Explain {
            config,
            referer,
            url,
            query,
            xml,
            image,
            script,
            style,
            failure,
            json,
        } => {
            let metadata = RequestMetadata {
                referer_url: referer,
                request_url: url,
                replay_request: !query,
                xml_mode: xml,
                image_context: image,
                script_context: script,
                style_context: style,
            };
            let config = commands::load(config.as_deref())?;
            let plan = commands::explain(config, &metadata, failure.as_deref());
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print!("{}", commands::format_plan(&plan));
            }
            Ok(())
        }
        Commands::CheckConfig { config } => {
            let warnings = commands::check_config(config.as_deref())?;
            for w in &warnings {
                println!("warning: {w}");
            }
            println!("config ok ({} warning(s))", warnings.len());
            Ok(())
        }
        Commands::Summarize { max, text } => {
            println!("{}", summarize_text(&text, max));
            Ok(())
        }
    }
}

//! CLI argument parsing for paycoord

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pc")]
#[command(author, version, about = "Checkout payment request coordinator", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fire concurrent identical submissions through the deduplicator
    Submit {
        /// Target URL (relative URLs use http.base-url)
        #[arg(required = true)]
        url: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,

        /// HTTP method
        #[arg(short, long, default_value = "POST")]
        method: String,

        /// Number of concurrent submissions
        #[arg(short, long, default_value = "1")]
        repeat: usize,
    },

    /// Shape a payment payload file and submit it to the payment endpoint
    Pay {
        /// JSON file with the full checkout payload
        #[arg(required = true)]
        payload: PathBuf,

        /// Number of concurrent submissions
        #[arg(short, long, default_value = "1")]
        repeat: usize,
    },

    /// Print the shaped form of a payment payload file
    Shape {
        /// JSON file with the full checkout payload
        #[arg(required = true)]
        payload: PathBuf,
    },

    /// Show whether a URL is watched and its dedup fingerprint
    Fingerprint {
        /// Target URL
        #[arg(required = true)]
        url: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },

    /// Warm the configured prefetch resources
    Prefetch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit_defaults() {
        let cli = Cli::try_parse_from(["pc", "submit", "/api/pagar"]).unwrap();
        match cli.command {
            Command::Submit {
                url,
                body,
                method,
                repeat,
            } => {
                assert_eq!(url, "/api/pagar");
                assert!(body.is_none());
                assert_eq!(method, "POST");
                assert_eq!(repeat, 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pc", "prefetch", "--log-level", "debug", "-c", "pc.yml"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config, Some(PathBuf::from("pc.yml")));
    }
}

// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// The CLI plays the part of the hosting page:
// - scan: "mount" one or more pages and sweep their outbound links
// - mediate / decode: work with a single link or redirect token
// - status: refresh the partner-link status cache and show the tags
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "linkgate",
    version,
    about = "Route outbound links through a redirect page and report partner-link status",
    long_about = "linkgate rewrites untrusted outbound links on your pages into /go?u=... \
                  redirect links, and shows the cached reachability of your partner links."
)]
pub struct Cli {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(long, global = true, env = "LINKGATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep HTML or Markdown pages and report which links would be rewritten
    ///
    /// Example: linkgate scan public/index.html posts/hello.md https://example.com
    Scan {
        /// Local files (.html, .htm, .md, .markdown) or http(s) URLs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the href a single link would be rewritten to
    ///
    /// Example: linkgate mediate https://example.com/page
    Mediate {
        url: String,
    },

    /// Decode a redirect token (the `u` parameter of /go) back into its URL
    ///
    /// Example: linkgate decode aHR0cHM6Ly9leGFtcGxlLmNvbS9h
    Decode {
        /// A bare token or a full "/go?u=..." href
        token: String,
    },

    /// Show the probed status of partner links
    ///
    /// Example: linkgate status https://blog.example.com https://friend.example
    Status {
        /// Links to look up; every link in the snapshot when empty
        links: Vec<String>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_with_global_config() {
        let cli = Cli::try_parse_from(["linkgate", "scan", "a.html", "b.md", "--json", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Commands::Scan { inputs, json } => {
                assert_eq!(inputs, vec!["a.html", "b.md"]);
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_scan_requires_input() {
        assert!(Cli::try_parse_from(["linkgate", "scan"]).is_err());
    }
}

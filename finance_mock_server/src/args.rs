//! Command-line arguments for the stub server.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::Parser;

/// Port the stub API listens on when none is given.
pub const DEFAULT_PORT: u16 = 12111;
/// Port of the market-state config endpoint.
pub const DEFAULT_CONFIG_PORT: u16 = 12112;
/// Bundled fixtures.
pub const DEFAULT_FIXTURES_PATH: &str = "./fixture/resources.json";
/// Bundled spec.
pub const DEFAULT_SPEC_PATH: &str = "./fixture/spec.json";

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Port to listen on. 0 picks the default port.
    #[clap(long, conflicts_with = "unix")]
    pub port: Option<u16>,

    /// Unix socket to listen on instead of a TCP port.
    #[clap(long)]
    pub unix: Option<PathBuf>,

    /// Port of the market-state config endpoint. 0 disables it.
    #[clap(long, default_value_t = DEFAULT_CONFIG_PORT)]
    pub config_port: u16,

    /// Path to fixtures to use instead of the bundled version.
    #[clap(long, default_value = DEFAULT_FIXTURES_PATH)]
    pub fixtures: String,

    /// Path to spec to use instead of the bundled version.
    #[clap(long, default_value = DEFAULT_SPEC_PATH)]
    pub spec: String,

    /// Enable verbose mode (debug logging, response payloads).
    #[clap(long)]
    pub verbose: bool,
}

impl Args {
    /// TCP port of the stub API.
    pub fn listen_port(&self) -> u16 {
        match self.port {
            None | Some(0) => DEFAULT_PORT,
            Some(port) => port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bundled_layout() {
        let args = Args::parse_from(["finance_mock_server"]);
        assert_eq!(args.listen_port(), DEFAULT_PORT);
        assert_eq!(args.config_port, DEFAULT_CONFIG_PORT);
        assert_eq!(args.spec, DEFAULT_SPEC_PATH);
        assert_eq!(args.fixtures, DEFAULT_FIXTURES_PATH);
        assert!(args.unix.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn zero_port_means_default() {
        let args = Args::parse_from(["finance_mock_server", "--port", "0"]);
        assert_eq!(args.listen_port(), DEFAULT_PORT);
        let args = Args::parse_from(["finance_mock_server", "--port", "9000"]);
        assert_eq!(args.listen_port(), 9000);
    }

    #[test]
    fn port_and_unix_socket_are_exclusive() {
        let result = Args::try_parse_from([
            "finance_mock_server",
            "--port",
            "9000",
            "--unix",
            "/tmp/finance-mock.sock",
        ]);
        assert!(result.is_err());
    }
}

//! Logging CLI arguments.

use clap::Args;
use serde::{Deserialize, Serialize};

/// Logging configuration.
#[derive(Debug, Args, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[command(next_help_heading = "Logging")]
#[serde(default)]
pub struct LogArgs {
    /// Silence all output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (-v, -vv, -vvv, etc.).
    #[arg(short, long, action = clap::ArgAction::Count)]
    #[serde(skip)] // CLI-only, count action doesn't make sense in config
    pub verbosity: u8,

    /// Log filter directive (e.g., "vertex_swarm_netstore=trace").
    #[arg(long = "log.filter", value_name = "DIRECTIVE")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Use JSON format for log output.
    #[arg(long = "log.json")]
    pub json: bool,
}

impl LogArgs {
    /// Base level implied by the quiet and verbosity flags.
    pub fn base_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Apply values given on the command line over values from a config file.
    ///
    /// Flags only ever switch on, so a flag left unset keeps the file value.
    pub fn merge_from_cli(&mut self, cli: &LogArgs) {
        self.quiet |= cli.quiet;
        self.json |= cli.json;
        self.verbosity = self.verbosity.max(cli.verbosity);
        if cli.filter.is_some() {
            self.filter.clone_from(&cli.filter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        log: LogArgs,
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["vertex", "-vv", "--log.filter", "vertex=trace", "--log.json"]);
        assert_eq!(cli.log.verbosity, 2);
        assert_eq!(cli.log.filter.as_deref(), Some("vertex=trace"));
        assert!(cli.log.json);
        assert_eq!(cli.log.base_level(), "trace");
    }

    #[test]
    fn test_quiet_wins() {
        let args = LogArgs {
            quiet: true,
            verbosity: 3,
            ..Default::default()
        };
        assert_eq!(args.base_level(), "error");
    }

    #[test]
    fn test_from_toml_skips_verbosity() {
        let args: LogArgs = toml::from_str("json = true\nfilter = \"info\"\n").unwrap();
        assert!(args.json);
        assert_eq!(args.verbosity, 0);
        assert_eq!(args.filter.as_deref(), Some("info"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = LogArgs {
            filter: Some("info".into()),
            ..Default::default()
        };
        let cli = LogArgs {
            verbosity: 1,
            filter: Some("debug".into()),
            ..Default::default()
        };
        file.merge_from_cli(&cli);
        assert_eq!(file.verbosity, 1);
        assert_eq!(file.filter.as_deref(), Some("debug"));
    }
}

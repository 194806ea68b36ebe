//! Global subscriber installation.

use eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use crate::LogArgs;

/// Build the event filter for `args`.
///
/// The filter is built with the following precedence:
/// 1. If `--quiet` is set, only errors are shown
/// 2. Otherwise, start with `RUST_LOG` env var if set, or the level implied
///    by the verbosity flags (-v, -vv, etc.)
/// 3. Apply any custom filter from `--log.filter`
pub fn build_filter(args: &LogArgs) -> EnvFilter {
    if args.quiet {
        return EnvFilter::new("error");
    }

    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.base_level()));

    if let Some(custom_filter) = &args.filter {
        for directive in custom_filter.split(',') {
            match directive.trim().parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(err) => eprintln!("ignoring log filter directive {directive:?}: {err}"),
            }
        }
    }

    filter
}

/// Initialize logging based on command line arguments.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(args: &LogArgs) -> Result<()> {
    let filter = build_filter(args);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if args.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|err| eyre!("failed to install log subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_filter() {
        let filter = build_filter(&LogArgs {
            quiet: true,
            ..Default::default()
        });
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn test_custom_directives_are_added() {
        let filter = build_filter(&LogArgs {
            filter: Some("vertex_swarm_netstore=trace, bogus=[".into()),
            ..Default::default()
        });
        assert!(filter.to_string().contains("vertex_swarm_netstore=trace"));
    }
}

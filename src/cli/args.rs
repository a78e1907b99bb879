//! Command-line argument parsing for the credit-sync binary.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Load the session, reconcile once, print the balance and exit
    Once,
    /// Keep the balance in sync until interrupted (default)
    Run,
}

/// Parse command-line arguments and return the appropriate command.
///
/// The first argument (program name) is skipped. Unknown arguments are
/// ignored; the first recognised flag wins.
///
/// # Examples
///
/// ```
/// use credit_sync::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["credit-sync".to_string(), "--once".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Once);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    for arg in args.skip(1) {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--once" => return CliCommand::Once,
            _ => {}
        }
    }
    CliCommand::Run
}

/// Usage text printed by `--help`.
pub fn usage() -> String {
    format!(
        "credit-sync {}\n\n\
         Usage: credit-sync [--once | --version | --help]\n\n\
         Options:\n  \
           --once       Reconcile the balance once, print it and exit\n  \
           -V, --version  Print version\n  \
           -h, --help   Print this help\n\n\
         Configuration is read from CREDIT_SYNC_* environment variables;\n\
         log level from RUST_LOG (default: info).",
        super::VERSION
    )
}

//! CLI module for the credit-sync binary.
//!
//! - Argument parsing
//! - Version and usage text
//!
//! # Usage
//!
//! ```ignore
//! use credit_sync::cli::{parse_args, run_cli_command, CliCommand};
//!
//! let command = parse_args(std::env::args());
//! if run_cli_command(&command) {
//!     return Ok(());
//! }
//! // Once or Run: start the client
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, usage, CliCommand};
pub use version::{version_line, VERSION};

/// Handle commands that need no client.
///
/// Returns true when the command was fully handled and the process should
/// exit.
pub fn run_cli_command(command: &CliCommand) -> bool {
    match command {
        CliCommand::Version => {
            println!("{}", version_line());
            true
        }
        CliCommand::Help => {
            println!("{}", usage());
            true
        }
        CliCommand::Once | CliCommand::Run => false,
    }
}

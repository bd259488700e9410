// Command-line interface
//
// `ponder run <approach> <query>` runs one strategy against the configured
// completion service and prints the result. Logs go to stderr, results to
// stdout.

pub mod args;
pub mod report;

pub use args::{Cli, Commands, RunArgs};
pub use report::{render_approaches, render_json, render_text};

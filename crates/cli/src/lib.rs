//! The `beat` command line: collects definitions from a content tree and
//! installs them into the selected AI coding tools.

#![deny(unsafe_code)]

mod app;
mod cli;
mod select;

pub use app::run;
pub use cli::{Cli, Commands, ConfigAction, SourceArgs, TargetArgs};

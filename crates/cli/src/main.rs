//! Command-line interface for the `beat` installer.
//!
//! This crate's binary is a thin entry point; everything happens in
//! [`beat::run`].

fn main() -> anyhow::Result<()> {
    beat::run()
}

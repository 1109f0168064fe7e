//! Input and output formats for the CLI.

pub mod csv;

//! Library components of the `exset` command line tool.

pub mod commands;
pub mod logging;

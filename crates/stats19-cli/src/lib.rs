//! Library side of the `stats19` command-line tool.

pub mod config;
pub mod logging;
pub mod output;
pub mod pipeline;

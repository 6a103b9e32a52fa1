//! Command handlers -- one module per subcommand

pub mod config;
pub mod job;
pub mod send;
pub mod template;

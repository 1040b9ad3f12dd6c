//! Maestro core library — skill catalog, relevance scoring, and the
//! multi-agent pipeline coordinator used by the CLI.

pub mod agents;
pub mod config;
pub mod init;
pub mod intent;
pub mod pipeline;
pub mod session;
pub mod skills;
pub mod state;

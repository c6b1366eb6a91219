//! Fetch a GitHub repository card over GraphQL.
//!
//! ## Modules
//!
//! - [`domain`]: environment resolution and the single-shot GraphQL dispatcher
//! - [`infrastructure`]: process environment and blocking HTTP transport
//! - [`config`]: settings loaded from `repocard.toml`
//! - [`commands`]: orchestration used by the CLI

pub mod commands;
pub mod config;
pub mod domain;
pub mod infrastructure;

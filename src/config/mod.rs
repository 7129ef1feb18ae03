//! Configuration module for docmirror
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, and command-line flags are
//! applied on top of the loaded values by the binary.
//!
//! # Example
//!
//! ```no_run
//! use docmirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("docmirror.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, DEFAULT_USER_AGENTS, MAX_DELAY_SECS,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_start_url};

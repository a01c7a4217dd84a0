//! Command handlers for gacha CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod catalog;
pub mod collection;
pub mod configure;
pub mod draw;
pub mod reset;

//! Core types for parley
//!
//! This crate provides the session history store, the session manager
//! with its filtering and statistics operations, and the import/export
//! codecs used by the parley chat service.

pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod utils;

pub use error::{Error, Result};

//! Cloud storage abstraction.
//!
//! This module provides a `CloudStorage` trait for the remote account that
//! downloads torrents on our behalf and serves the finished files back
//! (Seedr, or a mock in tests).

mod seedr;
mod types;

pub use seedr::SeedrClient;
pub use types::*;

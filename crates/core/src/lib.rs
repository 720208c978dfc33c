//! Strata Core - Shared foundational types for the Strata query compiler.
//!
//! This crate provides:
//!
//! - `Error`: Compilation failures, most of them carrying a `Position`
//! - `Position`: Character offset into the SQL text
//! - `chars`: Case-insensitive token comparison
//!
//! # Example
//!
//! ```rust
//! use strata_core::{Error, Position};
//!
//! let err = Error::compilation(7, "unexpected token");
//! assert_eq!(err.position(), Some(Position::new(7)));
//! ```

#![no_std]

extern crate alloc;

pub mod chars;
mod error;
mod position;

pub use error::{Error, Result};
pub use position::Position;

//! Foundation types shared by every Giraffe crate.
//!
//! Kept deliberately small: the network layer and the browser engine both
//! depend on this crate, so anything here is visible across the pipeline.

pub mod error;

pub use error::{GiraffeError, Result};

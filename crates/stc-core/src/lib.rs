//! stc-core: stable foundation for the self-triggered control workspace.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - vector (State/Action aliases over nalgebra + dimension checks)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod vector;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use vector::*;

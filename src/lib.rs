// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod fuzzy;
pub mod persistence;

pub use crate::config::{FoldMode, ReferencePaths, ResolverConfig};
pub use crate::core::engine::AddressResolver;
pub use crate::core::types::{AddressRecord, ResolutionResult};
pub use crate::error::ResolveError;

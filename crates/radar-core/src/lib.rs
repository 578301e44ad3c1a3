//! Domain types, content validation and the [`store::RadarStore`] trait for
//! the Thoughts Radar.
//!
//! No HTTP or database code lives here. The store, API, server and CLI crates
//! all build on these types.

pub mod band;
pub mod error;
pub mod ingest;
pub mod item;
pub mod reaction;
pub mod store;
pub mod validate;
pub mod wire;

pub use error::{Error, Failure, FailureKind, Result, ValidationError};

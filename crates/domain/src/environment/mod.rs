//! Environment domain types

mod spec;

pub use spec::{Environment, UpdateSource};

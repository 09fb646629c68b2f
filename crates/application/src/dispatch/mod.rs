//! Dispatch pipeline

mod post_hooks;
mod service;

#[cfg(test)]
mod tests;

pub use service::{DispatchOptions, DispatchService};

//! Authentication domain types

mod types;

pub use types::{Auth, AuthCredential, resolve_auth};

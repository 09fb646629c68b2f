//! Variables and `{{name}}` substitution
//!
//! Resolution happens in two passes per dispatch. The global store is first
//! applied to the environment's own values, so an environment entry may
//! reference a global. The resolved environment, backed by the globals, is
//! then applied once to a cloned request.

mod apply;
mod parser;
mod store;

pub use apply::{Substitution, apply_to_env};
pub use parser::{Placeholder, has_placeholders, parse_placeholders, replace_placeholders};
pub use store::VariableStore;

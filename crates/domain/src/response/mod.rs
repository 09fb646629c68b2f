//! Response types

mod cookie;
mod spec;

pub use cookie::Cookie;
pub use spec::Response;

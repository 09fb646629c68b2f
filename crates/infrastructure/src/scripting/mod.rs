//! Post-request script DSL
//!
//! Values are interpolated with `{{name}}` for environment variables and
//! `{{$status}}`, `{{$body}}`, `{{$url}}`, `{{$method}}` and
//! `{{$header.Name}}` for the exchange.

mod executor;
mod parser;

pub use executor::DslScriptExecutor;
pub use parser::{ParseError, ScriptCommand, parse_script};

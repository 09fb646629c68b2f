//! Global preferences: storage and the live provider

mod repository;
mod shared;

pub use repository::{PreferencesError, PreferencesRepository};
pub use shared::SharedPreferences;

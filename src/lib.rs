pub mod autocomplete;
pub mod config;
pub mod cursor;
pub mod error;
pub mod query;
pub mod registry;
pub mod session;
pub mod source;
pub mod tags;

//! Glowbook client core: appointment lifecycle, local keyed store and the
//! backends they talk to.

pub mod backend;
pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod lifecycle;
pub mod store;

#[cfg(test)]
mod test_support;

pub use catalog::CachedCatalog;
pub use config::Config;
pub use lifecycle::{AppointmentStore, Collaborators};
pub use store::{KeyedStore, SetOptions};

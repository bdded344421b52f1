//! Local persistence: the keyed store and the mediums underneath it.

mod keyed;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use keyed::{KeyedStore, SetOptions};
pub use memory::MemoryMedium;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteMedium;

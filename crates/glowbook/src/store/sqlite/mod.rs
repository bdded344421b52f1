//! SQLite storage medium using `rusqlite` wrapped by `tokio-rusqlite`.

mod error;
mod medium;
mod schema;

pub use medium::SqliteMedium;

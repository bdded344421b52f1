mod error;
mod traits;

pub use error::{BackendError, Result};
pub use traits::{AppointmentBackend, CatalogBackend};

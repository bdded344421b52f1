mod types;

pub use types::{services_by_provider, Professional, Service};

mod clock;
mod envelope;
mod error;
mod keys;
mod traits;

pub use clock::{Clock, ManualClock, SystemClock};
pub use envelope::{decode_entry, decode_metadata, encode_entry, CacheEntry};
pub use error::{CacheError, Result};
pub use keys::{
    feature_namespace, namespace_prefix, namespaced_key, strip_namespace, APPOINTMENTS_KEY,
    NAMESPACE_SEPARATOR, PROFESSIONALS_KEY, SERVICES_KEY,
};
pub use traits::StorageMedium;

mod error;
mod traits;
mod types;

pub use error::NotificationError;
pub use traits::{Diagnostics, NotificationScheduler, Toaster};
pub use types::{Reminder, Toast, ToastKind};

//! Backend implementations.

mod inmemory;
mod supabase;

pub use inmemory::InMemoryBackend;
pub use supabase::SupabaseBackend;

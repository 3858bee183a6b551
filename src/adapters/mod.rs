// Adapters layer: concrete implementations of the domain ports.

pub mod memory;
pub mod supabase;

pub use memory::InMemoryBackend;
pub use supabase::SupabaseClient;

// Adapters layer: concrete implementations of the domain ports (http, supabase, local files).

pub mod http;
pub mod local;
pub mod supabase;

pub use http::HttpFetcher;
pub use local::LocalStore;
pub use supabase::SupabaseStore;

pub mod scorer_client;
pub mod supabase_client;

pub use scorer_client::ScorerClient;
pub use supabase_client::SupabaseClient;

pub mod identity;
pub mod likes;
pub mod saved_recipes;
pub mod store;
pub mod tasty;
pub mod upstream;

// Re-export public types
pub use identity::{GoogleProvider, IdentityGate, IdentityProvider};
pub use likes::{load_saved_set, AnnotatedRecipe, SavedSet};
pub use saved_recipes::SavedRecipeService;
pub use store::{MemoryStore, PostgresStore, Store};
pub use tasty::{RecipeQuery, TastyClient};
pub use upstream::{Upstream, UpstreamError};

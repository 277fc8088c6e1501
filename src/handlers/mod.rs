pub mod auth;
pub mod health;
pub mod pages;
pub mod saved_recipes;

pub use auth::auth_config;
pub use health::health_check;
pub use pages::pages_config;
pub use saved_recipes::saved_recipes_config;

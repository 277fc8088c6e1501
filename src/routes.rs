use actix_web::{web, Scope};

use crate::handlers::{auth_config, health_check, pages_config, saved_recipes_config};

/// Configure all routes for the API
pub fn api_routes() -> Scope {
    web::scope("/api")
        .service(health_check)
        .configure(saved_recipes_config)
        .configure(auth_config)
        .configure(pages_config)
}

use lattice::{AuthMiddleware, Router};

use crate::controllers;

pub fn register() -> Router {
    Router::new()
        .get("/api/health", controllers::health::check)
        .name("health")
        .get("/api/products", controllers::products::index)
        .name("products.index")
        .get("/api/products/{id}", controllers::products::show)
        .name("products.show")
        .post("/api/quotes", controllers::products::quote)
        .name("quotes.store")
        .get("/api/me", controllers::account::me)
        .name("account.me")
        .middleware(AuthMiddleware::new())
        .fallback(controllers::home::shell)
}

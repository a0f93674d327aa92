pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::create_routes as build_router;
pub use state::AppState;

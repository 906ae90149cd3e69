pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sessions;

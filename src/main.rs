mod chat;
mod config;
mod model;
mod web;

use actix_web::{App, HttpServer, web::Data};
use actix_files as fs;
use dotenv::dotenv;
use log::{info, error};
use std::sync::Arc;
use tera::Tera;

use config::{AssistantConfig, Config};
use model::CompletionClient;
use web::routes;
use web::sessions::SessionStore;

// App state structure
struct AppState {
    tera: Tera,
    sessions: SessionStore,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting construction assistant");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let client = match CompletionClient::with_timeout(
        config.completion_url.clone(),
        config.api_key.clone(),
        config.request_timeout,
    ) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize completion client: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize template engine
    let mut tera = match Tera::new(&format!("{}/**/*", config.templates_dir)) {
        Ok(t) => t,
        Err(e) => {
            error!("Template parsing error: {}", e);
            std::process::exit(1);
        }
    };
    tera.autoescape_on(vec![".html"]);

    // Create app state
    let app_state = Data::new(AppState {
        tera,
        sessions: SessionStore::new(Arc::new(AssistantConfig::default()), Arc::new(client)),
    });

    let static_dir = config.static_dir.clone();
    info!("Listening on {}:{}", config.host, config.port);

    // Start web server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", static_dir.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

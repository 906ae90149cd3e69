use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tera::Context;
use uuid::Uuid;
use log::{info, debug};

use crate::web::errors::ApiError;
use crate::web::models::{AssistantInfo, ChatRequest, ChatResponse, ClearRequest, ClearResponse};
use crate::AppState;

// Index page handler
pub async fn index(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let assistant = data.sessions.config();
    let mut context = Context::new();
    context.insert("title", "Construction Industry Assistant");
    context.insert("examples", &assistant.examples);

    let html = data.tera.render("index.html", &context)?;
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Fixed texts the page may need to show verbatim
pub async fn assistant_info(data: web::Data<AppState>) -> impl Responder {
    let assistant = data.sessions.config();
    HttpResponse::Ok().json(AssistantInfo {
        system_prompt: assistant.system_prompt.clone(),
        rejection_message: assistant.rejection_message.clone(),
        examples: assistant.examples.clone(),
    })
}

// Chat API endpoint
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let session_id = req.session_id.unwrap_or_else(Uuid::new_v4);
    info!("Chat request from session {}", session_id);
    debug!("Message: {}", req.message);

    // Held across the upstream call so turns on one session never interleave
    let session = data.sessions.get_or_create(session_id)?;
    let mut session = session.lock().await;
    let (history, reply) = session.handle_turn(&req.message).await;

    Ok(HttpResponse::Ok().json(ChatResponse {
        session_id,
        reply,
        history: history.to_vec(),
        message: String::new(),
    }))
}

// Clear chat endpoint
pub async fn clear(
    data: web::Data<AppState>,
    req: web::Json<ClearRequest>,
) -> Result<HttpResponse, ApiError> {
    let session_id = req
        .session_id
        .ok_or_else(|| ApiError::Validation("session_id is required".to_string()))?;
    info!("Clear request from session {}", session_id);

    if let Some(session) = data.sessions.remove(session_id)? {
        session.lock().await.clear();
    }

    Ok(HttpResponse::Ok().json(ClearResponse {
        session_id,
        history: Vec::new(),
        message: String::new(),
    }))
}

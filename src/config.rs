use anyhow::{Context, Result};
use log::warn;
use std::env;
use std::time::Duration;

pub const DEFAULT_COMPLETION_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are a specialized construction industry assistant. You only provide information, advice, and support related to:

- Building construction and architecture
- Construction materials and their properties
- Construction techniques and methods
- Building codes and regulations
- Safety protocols in construction
- Project management for construction projects
- Cost estimation and budgeting
- Structural engineering basics
- MEP (Mechanical, Electrical, Plumbing) systems
- Construction equipment and tools
- Sustainable and green building practices
- Quality control and inspections

If a user asks about topics unrelated to construction, politely redirect them back to construction-related topics. Always prioritize safety and compliance with local building codes in your responses.";

pub const REJECTION_MESSAGE: &str = "I'm a specialized construction assistant. I can only help with construction-related topics such as building techniques, materials, safety, codes, project management, and other construction industry matters. Please ask me something related to construction!";

const KEYWORDS: &[&str] = &[
    "construction", "building", "concrete", "steel", "foundation", "roofing",
    "plumbing", "electrical", "hvac", "architecture", "blueprint", "contractor",
    "excavation", "framing", "drywall", "flooring", "insulation", "windows",
    "doors", "safety", "permit", "code", "inspection", "materials", "tools",
    "equipment", "project", "budget", "estimate", "structural", "mechanical",
    "residential", "commercial", "industrial", "renovation", "remodeling",
];

const EXAMPLE_QUESTIONS: &[&str] = &[
    "What are the different types of concrete and their uses?",
    "How do I calculate the amount of steel required for a beam?",
    "What safety measures should be followed on a construction site?",
    "What are the latest building codes for residential construction?",
    "How do I estimate the cost of a small renovation project?",
    "What are the best practices for foundation waterproofing?",
    "How do I choose the right insulation material?",
    "What are the steps in the construction project lifecycle?",
];

// Read-only after startup, shared by every session
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub system_prompt: String,
    pub keywords: Vec<String>,
    pub rejection_message: String,
    pub examples: Vec<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            keywords: KEYWORDS.iter().map(|k| k.to_string()).collect(),
            rejection_message: REJECTION_MESSAGE.to_string(),
            examples: EXAMPLE_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub completion_url: String,
    pub host: String,
    pub port: u16,
    pub templates_dir: String,
    pub static_dir: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Not validated; a missing key surfaces as a 401 on first call
        let api_key = env::var("API_KEY").unwrap_or_else(|_| {
            warn!("API_KEY is not set; completion requests will be unauthorized");
            String::new()
        });

        let port = env::var("PORT")
            .unwrap_or_else(|_| "7860".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let request_timeout = parse_timeout(
            &env::var("REQUEST_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string()),
        )?;

        Ok(Self {
            api_key,
            completion_url: env::var("COMPLETION_API_URL")
                .unwrap_or_else(|_| DEFAULT_COMPLETION_URL.to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            templates_dir: env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            request_timeout,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs = raw
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .context("REQUEST_TIMEOUT_SECS must be a positive whole number of seconds")?;
    Ok(Duration::from_secs(secs))
}

//! HTTP API
//!
//! Exposes prediction and chat endpoints. Handlers share immutable state;
//! each request makes at most one data fetch and one model call.

mod error;
mod handlers;
mod types;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::assistant::Assistant;
use crate::llm::LlmClient;
use crate::predict::Predictor;
use crate::{Config, MatchdayError, Result};

pub use error::AppError;
pub use types::{ChatRequest, ChatResponse, GenerateRequest, GenerateResponse, TeamsRequest};

/// Internal server state shared between request handlers
pub(crate) struct AppState {
    service: String,
    predictor: Predictor,
    assistant: Assistant,
}

/// Main server struct
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Wire the prediction pipeline and assistant around one model client
    pub fn new(config: &Config, http: reqwest::Client, llm: Arc<dyn LlmClient>) -> Result<Self> {
        let assistant_llm = config.assistant.use_model.then(|| llm.clone());
        let assistant = Assistant::new(config.assistant.clone(), assistant_llm)?;
        let predictor = Predictor::new(config, http, llm);

        Ok(Server {
            state: Arc::new(AppState {
                service: config.assistant.company.clone(),
                predictor,
                assistant,
            }),
        })
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(handlers::root))
            .route("/predict", get(handlers::predict_info).post(handlers::predict))
            .route("/predict/live", post(handlers::predict_live))
            .route("/analyze", post(handlers::analyze))
            .route("/generate", post(handlers::generate))
            .route("/chat", post(handlers::chat))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Starts the server and listens for requests on the specified address
    pub async fn run(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("Listening on http://{}", addr);

        axum::serve(listener, self.router())
            .await
            .map_err(MatchdayError::Io)
    }
}

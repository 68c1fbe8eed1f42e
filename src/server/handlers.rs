use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::error::AppError;
use super::types::{ChatRequest, ChatResponse, GenerateRequest, GenerateResponse, TeamsRequest};
use super::AppState;
use crate::predict::{ManualMatch, Prediction};

/// GET /
pub async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    let llm = state.predictor.llm();
    Json(json!({
        "status": "running",
        "service": state.service,
        "provider": llm.provider().name(),
        "model": llm.model(),
    }))
}

/// GET /predict
pub async fn predict_info() -> Json<Value> {
    Json(json!({
        "detail": "Please use POST /predict with JSON body {\"home_team\": \"Team A\", \"away_team\": \"Team B\"}"
    }))
}

/// POST /predict
///
/// Predicts from both teams' recent form in the match history.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TeamsRequest>,
) -> Result<Json<Prediction>, AppError> {
    log::info!("POST /predict {} vs {}", req.home_team, req.away_team);
    let prediction = state.predictor.predict(&req.home_team, &req.away_team).await?;
    Ok(Json(prediction))
}

/// POST /predict/live
///
/// Predicts a fixture found in the live feed.
pub async fn predict_live(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TeamsRequest>,
) -> Result<Json<Value>, AppError> {
    log::info!("POST /predict/live {} vs {}", req.home_team, req.away_team);
    let prediction = state.predictor.predict_live(&req.home_team, &req.away_team).await?;
    Ok(Json(json!({ "prediction": prediction })))
}

/// POST /analyze
///
/// Predicts from hand-entered match facts.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let facts = ManualMatch::from_json(&body)?;
    log::info!("POST /analyze {} vs {}", facts.home_team, facts.away_team);

    let prediction = state.predictor.analyze(&facts).await?;
    Ok(Json(json!({ "status": "success", "prediction": prediction })))
}

/// POST /generate
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let output = state.assistant.reply(&req.prompt).await?;
    Ok(Json(GenerateResponse { output }))
}

/// POST /chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let reply = state.assistant.reply(&req.message).await?;
    Ok(Json(ChatResponse { reply }))
}

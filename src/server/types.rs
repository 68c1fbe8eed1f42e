use serde::{Deserialize, Serialize};

/// Request payload naming the two sides of a fixture
#[derive(Debug, Deserialize)]
pub struct TeamsRequest {
    pub home_team: String,
    pub away_team: String,
}

/// Request payload for `/generate`
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub output: String,
}

/// Request payload for `/chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

//! Prompt templates
//!
//! Fixed natural-language prompts for each way a prediction can be requested.

use crate::data::LiveFixture;
use crate::features::FormSummary;
use crate::{AssistantConfig, MatchdayError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Fields a hand-entered match analysis must carry, in reporting order
pub const MANUAL_FIELDS: &[&str] = &[
    "league",
    "home_team",
    "away_team",
    "home_form",
    "away_form",
    "home_goals_avg",
    "away_goals_avg",
    "h2h",
];

/// Match facts supplied directly by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ManualMatch {
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub home_form: String,
    pub away_form: String,
    pub home_goals_avg: String,
    pub away_goals_avg: String,
    pub h2h: String,
}

impl ManualMatch {
    /// Build from a JSON object, reporting the first missing field
    pub fn from_json(body: &Value) -> Result<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| MatchdayError::InvalidRequest("expected a JSON object".to_string()))?;

        if let Some(missing) = MANUAL_FIELDS.iter().find(|f| !object.contains_key(**f)) {
            return Err(MatchdayError::InvalidRequest(format!("Missing field: {}", missing)));
        }

        let text = |key: &str| match &object[key] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Ok(ManualMatch {
            league: text("league"),
            home_team: text("home_team"),
            away_team: text("away_team"),
            home_form: text("home_form"),
            away_form: text("away_form"),
            home_goals_avg: text("home_goals_avg"),
            away_goals_avg: text("away_goals_avg"),
            h2h: text("h2h"),
        })
    }
}

fn describe_form(form: &FormSummary) -> String {
    format!(
        "{} matches, {} wins, {} goals scored, {} goals conceded, rating {:.2}",
        form.matches_considered, form.wins, form.goals_for, form.goals_against, form.rating
    )
}

/// Prompt built from both teams' recent form
pub fn form_prompt(
    home: &str,
    home_form: &FormSummary,
    away: &str,
    away_form: &FormSummary,
    window: usize,
) -> String {
    format!(
        r#"You are a football analyst. Predict the outcome of the upcoming match using the recent form below.

Home Team: {home}
Home Form (last {window} matches): {home_form}

Away Team: {away}
Away Form (last {window} matches): {away_form}

Respond only with JSON in this format:
{{"winner": "{home}" | "{away}" | "Draw", "confidence": 0-100, "reasoning": "short explanation"}}"#,
        home = home,
        away = away,
        window = window,
        home_form = describe_form(home_form),
        away_form = describe_form(away_form),
    )
}

/// Prompt built from a live feed fixture
pub fn live_prompt(fixture: &LiveFixture) -> String {
    let field = |key: &str| fixture.field(key).unwrap_or_else(|| "N/A".to_string());

    format!(
        r#"You are a sports analyst AI. Given the following match data, predict which team is more likely to win and explain why:

Home Team: {}
Away Team: {}
Home Form (last 5 matches): {}
Away Form (last 5 matches): {}
Head-to-Head: {}
Injuries: {}
Home Advantage: {}
Other Stats: {}

Provide your prediction clearly, reasoning, and probability estimate for each outcome (Home win, Draw, Away win)."#,
        fixture.home_team,
        fixture.away_team,
        field("home_form"),
        field("away_form"),
        field("head_to_head"),
        field("injuries"),
        field("home_advantage"),
        field("other_stats"),
    )
}

/// Prompt built from hand-entered match facts
pub fn manual_prompt(facts: &ManualMatch, now: DateTime<Utc>) -> String {
    format!(
        r#"You are an AI football betting analyst.

Analyze the match and predict the winner.

MATCH DATE: {}
LEAGUE: {}

HOME TEAM: {}
AWAY TEAM: {}

HOME TEAM FORM (last 5): {}
AWAY TEAM FORM (last 5): {}

HOME GOALS AVG: {}
AWAY GOALS AVG: {}

HEAD TO HEAD: {}

TASK:
1. Predict winner (Home / Away / Draw)
2. Give short reasoning
3. Give confidence percentage"#,
        now.format("%Y-%m-%d %H:%M UTC"),
        facts.league,
        facts.home_team,
        facts.away_team,
        facts.home_form,
        facts.away_form,
        facts.home_goals_avg,
        facts.away_goals_avg,
        facts.h2h,
    )
}

/// System prompt for the service assistant
pub fn assistant_system_prompt(config: &AssistantConfig) -> String {
    let services: String = config
        .services
        .iter()
        .map(|s| format!("  - {}\n", s))
        .collect();

    format!(
        r#"You are {name}.

About {company}:
- We offer technology services only
- Our main services:
{services}
Contact:
- {contact}

Rules:
- Only answer questions about {company} services
- If a question is unrelated, steer the customer back to our services
- Answer in simple, business-friendly language
- Respond ONLY in Markdown
- Do not mention the model provider
- Never change your identity
- If asked about your identity, say: "I am {name}, built by {developer}.""#,
        name = config.name,
        company = config.company,
        services = services,
        contact = config.contact,
        developer = config.developer,
    )
}

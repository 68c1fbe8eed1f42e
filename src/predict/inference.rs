//! Prediction pipeline
//!
//! Gathers match data, renders the prompt and asks the configured model.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use super::prompt::{form_prompt, live_prompt, manual_prompt, ManualMatch};
use super::response::extract_json;
use crate::data::feed::find_fixture;
use crate::data::{FeedClient, HistorySource};
use crate::features::{FormAggregator, FormSummary};
use crate::llm::{GenerationRequest, LlmClient};
use crate::{Config, MatchRecord, MatchdayError, Result};

/// Form-based prediction for one fixture
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub home_team: String,
    pub away_team: String,
    pub home_form: FormSummary,
    pub away_form: FormSummary,
    /// Model text as returned
    pub prediction: String,
    /// The model text parsed as JSON, when it is JSON
    pub analysis: Option<Value>,
}

/// Predictor for making match predictions
pub struct Predictor {
    llm: Arc<dyn LlmClient>,
    http: reqwest::Client,
    history: HistorySource,
    timeout: Duration,
    feed: FeedClient,
    aggregator: FormAggregator,
}

impl Predictor {
    /// Create a new predictor
    pub fn new(config: &Config, http: reqwest::Client, llm: Arc<dyn LlmClient>) -> Self {
        let timeout = Duration::from_secs(config.data.timeout_secs);
        let feed = FeedClient::new(http.clone(), config.data.feed_url.clone(), timeout);

        Predictor {
            llm,
            http,
            history: HistorySource::parse(&config.data.history),
            timeout,
            feed,
            aggregator: FormAggregator::from(&config.form),
        }
    }

    pub fn llm(&self) -> &dyn LlmClient {
        self.llm.as_ref()
    }

    pub fn aggregator(&self) -> FormAggregator {
        self.aggregator
    }

    /// Load the full match history; done fresh for every prediction
    pub async fn load_history(&self) -> Result<Vec<MatchRecord>> {
        self.history.load(&self.http, self.timeout).await
    }

    /// Recent form for a team, or `UnknownTeam` when it has no matches
    pub fn team_form(&self, history: &[MatchRecord], team: &str) -> Result<FormSummary> {
        self.aggregator
            .compute(history, team)
            .ok_or_else(|| MatchdayError::UnknownTeam(team.to_string()))
    }

    /// Predict a fixture from both teams' recent form
    pub async fn predict(&self, home_team: &str, away_team: &str) -> Result<Prediction> {
        let (home_team, away_team) = require_teams(home_team, away_team)?;
        let history = self.load_history().await?;
        self.predict_with_history(&history, home_team, away_team).await
    }

    /// Predict using an already loaded history
    pub async fn predict_with_history(
        &self,
        history: &[MatchRecord],
        home_team: &str,
        away_team: &str,
    ) -> Result<Prediction> {
        let home_form = self.team_form(history, home_team)?;
        let away_form = self.team_form(history, away_team)?;

        let prompt = form_prompt(
            home_team,
            &home_form,
            away_team,
            &away_form,
            self.aggregator.window(),
        );
        log::debug!("Form prompt for {} vs {}:\n{}", home_team, away_team, prompt);

        let text = self.llm.generate(&GenerationRequest::new(prompt)).await?;
        let analysis = extract_json(&text);
        if analysis.is_none() {
            log::debug!("Model reply for {} vs {} is not JSON", home_team, away_team);
        }

        Ok(Prediction {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            home_form,
            away_form,
            prediction: text,
            analysis,
        })
    }

    /// Predict a fixture listed in the live feed
    pub async fn predict_live(&self, home_team: &str, away_team: &str) -> Result<String> {
        let (home_team, away_team) = require_teams(home_team, away_team)?;

        let fixtures = self.feed.fetch().await.map_err(|e| {
            log::warn!("Live feed request failed: {}", e);
            MatchdayError::FeedUnavailable(e.to_string())
        })?;
        if fixtures.is_empty() {
            return Err(MatchdayError::FeedUnavailable("feed is empty".to_string()));
        }

        let fixture = find_fixture(&fixtures, home_team, away_team, self.aggregator.matching())
            .ok_or_else(|| MatchdayError::MatchNotFound {
                home: home_team.to_string(),
                away: away_team.to_string(),
            })?;

        self.llm
            .generate(&GenerationRequest::new(live_prompt(fixture)))
            .await
    }

    /// Analyse hand-entered match facts
    pub async fn analyze(&self, facts: &ManualMatch) -> Result<String> {
        let prompt = manual_prompt(facts, Utc::now());
        self.llm.generate(&GenerationRequest::new(prompt)).await
    }
}

fn require_teams<'a>(home: &'a str, away: &'a str) -> Result<(&'a str, &'a str)> {
    let (home, away) = (home.trim(), away.trim());
    if home.is_empty() || away.is_empty() {
        return Err(MatchdayError::InvalidRequest(
            "home_team and away_team are required".to_string(),
        ));
    }
    Ok((home, away))
}

fn describe(form: &FormSummary) -> String {
    format!(
        "{}W from {} | GF {} GA {} | rating {:.2}",
        form.wins, form.matches_considered, form.goals_for, form.goals_against, form.rating
    )
}

/// Format a prediction for display
pub fn format_prediction(pred: &Prediction) -> String {
    let verdict = match &pred.analysis {
        Some(analysis) => {
            let winner = analysis
                .get("winner")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            match analysis.get("confidence") {
                Some(confidence) => format!("{} ({}%)", winner, confidence),
                None => winner.to_string(),
            }
        }
        None => pred.prediction.trim().to_string(),
    };

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} vs {}
├─────────────────────────────────────────────────┤
│  {} form:  {}
│  {} form:  {}
│  Prediction:  {}
└─────────────────────────────────────────────────┘
"#,
        pred.home_team,
        pred.away_team,
        pred.home_team,
        describe(&pred.home_form),
        pred.away_team,
        describe(&pred.away_form),
        verdict
    )
}

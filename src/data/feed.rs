//! Live fixtures feed
//!
//! Current matches from a public JSON feed, with whatever pre-match facts the
//! feed carries (form strings, head-to-head, injuries).

use crate::features::TeamMatching;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// A fixture as published by the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveFixture {
    pub home_team: String,
    pub away_team: String,
    /// Remaining feed fields, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LiveFixture {
    /// Render a feed field as prompt text
    pub fn field(&self, key: &str) -> Option<String> {
        match self.extra.get(key)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Client for the live fixtures feed
pub struct FeedClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl FeedClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>, timeout: Duration) -> Self {
        FeedClient {
            client,
            url: url.into(),
            timeout,
        }
    }

    /// Fetch the current fixtures
    pub async fn fetch(&self) -> Result<Vec<LiveFixture>> {
        log::debug!("Fetching live fixtures from {}", self.url);

        let body: Value = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let fixtures = parse_feed(body);
        log::info!("Feed returned {} fixtures", fixtures.len());
        Ok(fixtures)
    }
}

/// Accept either a bare array or an object wrapping one in `data`
pub fn parse_feed(body: Value) -> Vec<LiveFixture> {
    let entries = match body {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect()
}

/// Find the fixture with `home` at home and `away` away
pub fn find_fixture<'a>(
    fixtures: &'a [LiveFixture],
    home: &str,
    away: &str,
    matching: TeamMatching,
) -> Option<&'a LiveFixture> {
    fixtures
        .iter()
        .find(|f| matching.matches(&f.home_team, home) && matching.matches(&f.away_team, away))
}

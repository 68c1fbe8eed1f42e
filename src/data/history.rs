//! Match history loading
//!
//! Reads a results CSV (local file or URL) into [`MatchRecord`]s. Column
//! names follow either a plain `home_team/away_team` layout or the
//! `team1/team2/spi1/spi2` layout used by public club ratings exports.

use crate::{MatchRecord, MatchdayError, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

const DATE_COLUMNS: &[&str] = &["date"];
const HOME_TEAM_COLUMNS: &[&str] = &["home_team", "team1", "home"];
const AWAY_TEAM_COLUMNS: &[&str] = &["away_team", "team2", "away"];
const HOME_SCORE_COLUMNS: &[&str] = &["home_score", "score1", "home_goals"];
const AWAY_SCORE_COLUMNS: &[&str] = &["away_score", "score2", "away_goals"];
const HOME_RATING_COLUMNS: &[&str] = &["home_rating", "spi1"];
const AWAY_RATING_COLUMNS: &[&str] = &["away_rating", "spi2"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Where match history comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistorySource {
    Path(PathBuf),
    Url(String),
}

impl HistorySource {
    /// Interpret a configured location; http(s) prefixes are URLs
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            HistorySource::Url(location.to_string())
        } else {
            HistorySource::Path(PathBuf::from(location))
        }
    }

    /// Read and parse the full history; `timeout` bounds a URL download
    pub async fn load(
        &self,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> Result<Vec<MatchRecord>> {
        let text = match self {
            HistorySource::Path(path) => {
                log::debug!("Reading match history from {}", path.display());
                tokio::fs::read_to_string(path).await?
            }
            HistorySource::Url(url) => {
                log::debug!("Downloading match history from {}", url);
                client
                    .get(url)
                    .timeout(timeout)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?
            }
        };

        let records = parse_history_csv(&text)?;
        log::info!("Loaded {} matches from {}", records.len(), self);
        Ok(records)
    }
}

impl std::fmt::Display for HistorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistorySource::Path(path) => write!(f, "{}", path.display()),
            HistorySource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Column positions resolved from the header row
struct Columns {
    date: usize,
    home_team: usize,
    away_team: usize,
    home_score: usize,
    away_score: usize,
    home_rating: usize,
    away_rating: usize,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self> {
        let find = |aliases: &[&str]| -> Result<usize> {
            header
                .iter()
                .position(|name| aliases.iter().any(|a| name.trim().eq_ignore_ascii_case(a)))
                .ok_or_else(|| {
                    MatchdayError::Parse(format!(
                        "match history is missing a column (expected one of: {})",
                        aliases.join(", ")
                    ))
                })
        };

        Ok(Columns {
            date: find(DATE_COLUMNS)?,
            home_team: find(HOME_TEAM_COLUMNS)?,
            away_team: find(AWAY_TEAM_COLUMNS)?,
            home_score: find(HOME_SCORE_COLUMNS)?,
            away_score: find(AWAY_SCORE_COLUMNS)?,
            home_rating: find(HOME_RATING_COLUMNS)?,
            away_rating: find(AWAY_RATING_COLUMNS)?,
        })
    }

    fn record(&self, fields: &[String]) -> Option<MatchRecord> {
        let field = |i: usize| fields.get(i).map(|s| s.trim()).filter(|s| !s.is_empty());

        let home_team = field(self.home_team)?;
        let away_team = field(self.away_team)?;

        Some(MatchRecord {
            date: parse_date(field(self.date)?)?,
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            home_score: parse_score(field(self.home_score)?)?,
            away_score: parse_score(field(self.away_score)?)?,
            home_rating: field(self.home_rating)?.parse().ok()?,
            away_rating: field(self.away_rating)?.parse().ok()?,
        })
    }
}

/// Parse a results CSV with a header row.
///
/// Rows with a missing or unreadable date, score or rating (unplayed
/// fixtures, for instance) are skipped.
pub fn parse_history_csv(text: &str) -> Result<Vec<MatchRecord>> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| MatchdayError::Parse("match history is empty".to_string()))?;
    let columns = Columns::from_header(&split_record(header))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for line in lines {
        match columns.record(&split_record(line)) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {} incomplete history rows", skipped);
    }

    Ok(records)
}

/// Split one CSV line, honouring double quotes and `""` escapes
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Scores are integers, sometimes exported as `2.0`
fn parse_score(s: &str) -> Option<u32> {
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    let value: f64 = s.parse().ok()?;
    if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    const SPI_CSV: &str = "\
season,date,league_id,league,team1,team2,spi1,spi2,prob1,prob2,probtie,score1,score2
2023,2023-08-11,2411,Barclays Premier League,Burnley,Manchester City,61.42,91.57,0.11,0.71,0.18,0.0,3.0
2023,2023-08-12,2411,Barclays Premier League,Arsenal,Nottingham Forest,80.54,61.88,0.73,0.09,0.18,2.0,1.0
2024,2024-05-19,2411,Barclays Premier League,Arsenal,Everton,82.10,65.00,0.80,0.05,0.15,,
";

    #[test]
    fn test_parse_spi_layout() {
        let records = parse_history_csv(SPI_CSV).unwrap();

        // The unplayed fixture has no score and is skipped
        assert_eq!(records.len(), 2);

        let arsenal = &records[1];
        assert_eq!(arsenal.date, NaiveDate::from_ymd_opt(2023, 8, 12).unwrap());
        assert_eq!(arsenal.home_team, "Arsenal");
        assert_eq!(arsenal.away_team, "Nottingham Forest");
        assert_eq!(arsenal.home_score, 2);
        assert_eq!(arsenal.away_score, 1);
        assert_eq!(arsenal.home_rating, 80.54);
        assert_eq!(arsenal.away_rating, 61.88);
    }

    #[test]
    fn test_parse_plain_layout_with_quotes() {
        let csv = "date,home_team,away_team,home_score,away_score,home_rating,away_rating\r\n\
                   10/01/2024,\"Brighton & Hove, Albion\",\"The \"\"Saints\"\"\",3,3,70.1,55\r\n";
        let records = parse_history_csv(csv).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(records[0].home_team, "Brighton & Hove, Albion");
        assert_eq!(records[0].away_team, "The \"Saints\"");
        assert_eq!(records[0].away_rating, 55.0);
    }

    #[test]
    fn test_missing_column() {
        let err =
            parse_history_csv("date,home_team,away_team,home_score,away_score\n").unwrap_err();
        assert!(matches!(err, MatchdayError::Parse(_)));
        assert!(err.to_string().contains("home_rating"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_history_csv(""), Err(MatchdayError::Parse(_))));
    }

    #[test]
    fn test_header_only() {
        let csv = "date,home,away,home_goals,away_goals,home_rating,away_rating\n";
        assert!(parse_history_csv(csv).unwrap().is_empty());
    }

    #[test]
    fn test_bad_values_skipped() {
        let csv = "date,home,away,home_goals,away_goals,home_rating,away_rating\n\
                   yesterday,A,B,1,0,50,50\n\
                   2024-01-01,A,B,-1,0,50,50\n\
                   2024-01-01,A,B,1.5,0,50,50\n\
                   2024-01-02,A,B,1,0,n/a,50\n\
                   2024-01-03,A,B,1,0,50,50\n";
        let records = parse_history_csv(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            HistorySource::parse("https://example.com/spi_matches.csv"),
            HistorySource::Url("https://example.com/spi_matches.csv".to_string())
        );
        assert_eq!(
            HistorySource::parse("data/matches.csv"),
            HistorySource::Path(PathBuf::from("data/matches.csv"))
        );
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.csv");
        std::fs::write(&path, SPI_CSV).unwrap();

        let source = HistorySource::Path(path);
        let records = source.load(&reqwest::Client::new(), TIMEOUT).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let source = HistorySource::Path(PathBuf::from("/nonexistent/matches.csv"));
        let err = source.load(&reqwest::Client::new(), TIMEOUT).await.unwrap_err();
        assert!(matches!(err, MatchdayError::Io(_)));
    }

    #[tokio::test]
    async fn test_load_url_times_out() {
        // Accepts the connection but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let source = HistorySource::Url(format!("http://{}/matches.csv", addr));
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            source.load(&reqwest::Client::new(), Duration::from_millis(300)),
        )
        .await
        .expect("load should give up before the outer deadline");

        match result {
            Err(MatchdayError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("expected a timeout error, got {:?}", other.map(|r| r.len())),
        }
        hold.abort();
    }
}

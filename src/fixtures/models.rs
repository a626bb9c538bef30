use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

pub type FixtureId = u64;

/// Snapshot of one match as delivered by the fixtures service.
///
/// Fixtures are plain values: every refresh replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub id: FixtureId,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_team_logo: Option<String>,
    #[serde(default)]
    pub away_team_logo: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub home_score: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub away_score: u32,
    /// Long-form status text, e.g. "Match Finished"
    #[serde(default)]
    pub status: String,
    /// Short status code; the source of truth for classification
    #[serde(default)]
    pub status_short: String,
    /// Minutes played, only meaningful while the match is in play
    #[serde(default)]
    pub elapsed: Option<u32>,
    #[serde(default)]
    pub league_name: String,
    #[serde(default)]
    pub country: String,
    /// Hint from the source data; never trusted for classification
    #[serde(default)]
    pub live: bool,
}

/// Per-team statistics for one fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureStats {
    #[serde(default)]
    pub fixture_id: Option<FixtureId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shots_on_goal: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shots_off_goal: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_shots: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocked_shots: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fouls: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub corner_kicks: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub offsides: u32,
    #[serde(default = "zero_percent", deserialize_with = "null_as_zero_percent")]
    pub ball_possession: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub yellow_cards: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub red_cards: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub goalkeeper_saves: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_passes: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub passes_accurate: u32,
    #[serde(default = "zero_percent", deserialize_with = "null_as_zero_percent")]
    pub passes_percentage: String,
}

impl Default for FixtureStats {
    fn default() -> Self {
        FixtureStats {
            fixture_id: None,
            team: String::new(),
            shots_on_goal: 0,
            shots_off_goal: 0,
            total_shots: 0,
            blocked_shots: 0,
            fouls: 0,
            corner_kicks: 0,
            offsides: 0,
            ball_possession: zero_percent(),
            yellow_cards: 0,
            red_cards: 0,
            goalkeeper_saves: 0,
            total_passes: 0,
            passes_accurate: 0,
            passes_percentage: zero_percent(),
        }
    }
}

/// Home and away statistics for the same fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsPair {
    pub home: FixtureStats,
    pub away: FixtureStats,
}

impl StatsPair {
    /// Accept exactly two records (home first), rejecting anything else.
    pub fn from_records(fixture_id: FixtureId, records: Vec<FixtureStats>) -> Result<Self> {
        let count = records.len();
        let [home, away]: [FixtureStats; 2] = records
            .try_into()
            .map_err(|_| Error::StatsShape { fixture_id, count })?;

        for record in [&home, &away] {
            if let Some(found) = record.fixture_id {
                if found != fixture_id {
                    return Err(Error::StatsFixtureMismatch {
                        expected: fixture_id,
                        found,
                    });
                }
            }
        }

        Ok(StatsPair { home, away })
    }
}

/// Decode one push message: a JSON array of fixtures.
pub fn parse_fixture_list(text: &str) -> Result<Vec<Fixture>> {
    serde_json::from_str(text).map_err(Error::MalformedMessage)
}

fn zero_percent() -> String {
    "0%".to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_zero_percent<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(zero_percent))
}

//! Input data: flat team-rating tables and cached event files.
//!
//! Event data lives in `<data_dir>/<event_key>Teams.json` and
//! `<data_dir>/<event_key>Matches.json`, in the shape the tournament data
//! service hands out. Only the fields used here are deserialized; the rest
//! of each record is ignored.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{Roster, Team};

/// One match from an event file, not yet tied to a roster. Turned into real
/// matches per trial by the scheduler, so relations are re-recorded fresh.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub round: u32,
    pub red: [u32; 2],
    pub blue: [u32; 2],
    pub played: bool,
    pub red_score: i64,
    pub blue_score: i64,
    pub red_penalty: i64,
    pub blue_penalty: i64,
}

pub fn event_teams_path(dir: &Path, event_key: &str) -> PathBuf {
    dir.join(format!("{}Teams.json", event_key))
}

pub fn event_matches_path(dir: &Path, event_key: &str) -> PathBuf {
    dir.join(format!("{}Matches.json", event_key))
}

/// Load a roster from a cached event teams file.
pub fn teams_from_event(dir: &Path, event_key: &str) -> Result<Roster> {
    let path = event_teams_path(dir, event_key);
    let text = fs::read_to_string(&path).map_err(|e| Error::data(&path, e.to_string()))?;
    parse_teams_json(&text).map_err(|reason| Error::data(&path, reason))
}

/// Load the qualification match records of a cached event matches file.
pub fn matches_from_event(
    dir: &Path,
    event_key: &str,
    teams: &Roster,
    include_scores: bool,
) -> Result<Vec<MatchRecord>> {
    let path = event_matches_path(dir, event_key);
    let text = fs::read_to_string(&path).map_err(|e| Error::data(&path, e.to_string()))?;
    parse_matches_json(&text, teams, include_scores).map_err(|reason| Error::data(&path, reason))
}

/// Load a roster from a flat `number<TAB>name<TAB>rating` table. Blank
/// lines and `#` comments are skipped.
pub fn teams_from_rating_table(path: &Path) -> Result<Roster> {
    let text = fs::read_to_string(path).map_err(|e| Error::data(path, e.to_string()))?;
    parse_rating_table(&text).map_err(|reason| Error::data(path, reason))
}

#[derive(Debug, Deserialize)]
struct TeamFileEntry {
    team_key: String,
    team: TeamInfo,
    #[serde(default)]
    opr: f64,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    team_name_short: String,
}

#[derive(Debug, Deserialize)]
struct MatchFileEntry {
    #[serde(default = "qualification_level")]
    tournament_level: i64,
    participants: Vec<Participant>,
    #[serde(default)]
    red_score: i64,
    #[serde(default)]
    blue_score: i64,
    #[serde(default)]
    red_penalty: i64,
    #[serde(default)]
    blue_penalty: i64,
}

fn qualification_level() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
struct Participant {
    team_key: String,
}

fn parse_teams_json(text: &str) -> std::result::Result<Roster, String> {
    let entries: Vec<TeamFileEntry> =
        serde_json::from_str(text).map_err(|e| format!("unparseable teams file: {}", e))?;

    let mut teams = Roster::new();
    for entry in entries {
        let number: u32 = entry
            .team_key
            .parse()
            .map_err(|_| format!("bad team key `{}`", entry.team_key))?;
        let mut team = Team::new(number, entry.team.team_name_short);
        team.base_rating = entry.opr;
        if teams.insert(number, team).is_some() {
            return Err(format!("duplicate team {}", number));
        }
    }
    Ok(teams)
}

fn parse_matches_json(
    text: &str,
    teams: &Roster,
    include_scores: bool,
) -> std::result::Result<Vec<MatchRecord>, String> {
    let entries: Vec<MatchFileEntry> =
        serde_json::from_str(text).map_err(|e| format!("unparseable matches file: {}", e))?;

    let mut records = Vec::new();
    for entry in entries.into_iter().filter(|e| e.tournament_level == 1) {
        if entry.participants.len() != 4 {
            return Err(format!(
                "match {} has {} participants, expected 4",
                records.len() + 1,
                entry.participants.len()
            ));
        }
        let mut slots = [0u32; 4];
        for (slot, p) in slots.iter_mut().zip(entry.participants.iter()) {
            let number: u32 = p
                .team_key
                .parse()
                .map_err(|_| format!("bad team key `{}`", p.team_key))?;
            if !teams.contains_key(&number) {
                return Err(format!("match references unknown team {}", number));
            }
            *slot = number;
        }
        records.push(MatchRecord {
            round: 1,
            red: [slots[0], slots[1]],
            blue: [slots[2], slots[3]],
            played: include_scores,
            red_score: if include_scores { entry.red_score } else { 0 },
            blue_score: if include_scores { entry.blue_score } else { 0 },
            red_penalty: if include_scores { entry.red_penalty } else { 0 },
            blue_penalty: if include_scores { entry.blue_penalty } else { 0 },
        });
    }
    Ok(records)
}

fn parse_rating_table(text: &str) -> std::result::Result<Roster, String> {
    let mut teams = Roster::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(format!(
                "line {}: expected number<TAB>name<TAB>rating",
                idx + 1
            ));
        }
        let number: u32 = fields[0]
            .trim()
            .parse()
            .map_err(|_| format!("line {}: bad team number `{}`", idx + 1, fields[0]))?;
        let rating: f64 = fields[2]
            .trim()
            .parse()
            .map_err(|_| format!("line {}: bad rating `{}`", idx + 1, fields[2]))?;
        let mut team = Team::new(number, fields[1].trim());
        team.base_rating = rating;
        if teams.insert(number, team).is_some() {
            return Err(format!("line {}: duplicate team {}", idx + 1, number));
        }
    }
    if teams.is_empty() {
        return Err("no teams in table".to_string());
    }
    Ok(teams)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAMS_JSON: &str = r#"[
        {"team_key": "101", "team": {"team_name_short": "Alpha"}, "opr": 31.5},
        {"team_key": "102", "team": {"team_name_short": "Beta"}, "opr": 18.0},
        {"team_key": "103", "team": {"team_name_short": "Gamma"}},
        {"team_key": "104", "team": {"team_name_short": "Delta"}, "opr": 7.25}
    ]"#;

    #[test]
    fn teams_json_parses() {
        let teams = parse_teams_json(TEAMS_JSON).unwrap();
        assert_eq!(teams.len(), 4);
        assert_eq!(teams[&101].name, "Alpha");
        assert_eq!(teams[&101].base_rating, 31.5);
        assert_eq!(teams[&103].base_rating, 0.0);
    }

    #[test]
    fn bad_team_key_is_rejected() {
        let err = parse_teams_json(r#"[{"team_key": "x1", "team": {"team_name_short": "A"}}]"#)
            .unwrap_err();
        assert!(err.contains("bad team key"));
    }

    #[test]
    fn matches_json_parses_with_scores() {
        let teams = parse_teams_json(TEAMS_JSON).unwrap();
        let text = r#"[
            {"tournament_level": 1,
             "participants": [{"team_key": "101"}, {"team_key": "102"},
                              {"team_key": "103"}, {"team_key": "104"}],
             "red_score": 120, "blue_score": 100, "red_penalty": 10, "blue_penalty": 0},
            {"tournament_level": 2,
             "participants": [{"team_key": "101"}, {"team_key": "102"},
                              {"team_key": "103"}, {"team_key": "104"}],
             "red_score": 1, "blue_score": 2}
        ]"#;

        let records = parse_matches_json(text, &teams, true).unwrap();
        // The elimination-level match is skipped.
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].red, [101, 102]);
        assert_eq!(records[0].blue, [103, 104]);
        assert!(records[0].played);
        assert_eq!(records[0].red_score, 120);
        assert_eq!(records[0].red_penalty, 10);

        let unplayed = parse_matches_json(text, &teams, false).unwrap();
        assert!(!unplayed[0].played);
        assert_eq!(unplayed[0].red_score, 0);
    }

    #[test]
    fn unknown_participant_is_rejected() {
        let teams = parse_teams_json(TEAMS_JSON).unwrap();
        let text = r#"[
            {"tournament_level": 1,
             "participants": [{"team_key": "101"}, {"team_key": "102"},
                              {"team_key": "103"}, {"team_key": "999"}],
             "red_score": 0, "blue_score": 0}
        ]"#;
        let err = parse_matches_json(text, &teams, true).unwrap_err();
        assert!(err.contains("unknown team 999"));
    }

    #[test]
    fn rating_table_parses() {
        let text = "# number\tname\trating\n101\tAlpha\t31.5\n102\tBeta\t18\n\n103\tGamma\t7\n";
        let teams = parse_rating_table(text).unwrap();
        assert_eq!(teams.len(), 3);
        assert_eq!(teams[&101].base_rating, 31.5);
        assert_eq!(teams[&102].name, "Beta");
    }

    #[test]
    fn rating_table_rejects_malformed_lines() {
        assert!(parse_rating_table("101\tAlpha\n").unwrap_err().contains("line 1"));
        assert!(parse_rating_table("x\tAlpha\t3\n").unwrap_err().contains("bad team number"));
        assert!(parse_rating_table("101\tA\t1\n101\tB\t2\n")
            .unwrap_err()
            .contains("duplicate"));
        assert!(parse_rating_table("").is_err());
    }
}

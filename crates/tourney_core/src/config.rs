//! Simulation options: TOML documents plus command-line overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How rounds are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingModel {
    Random,
    Swiss,
}

/// How a ranking group is paired against itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingMethod {
    /// Best against worst: position i prefers position groupSize - i - 1.
    Fold,
    /// Top half against bottom half: position i prefers groupSize/2 + i.
    Slide,
}

/// How tie-break points are accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TbpMethod {
    LosingScore,
    WinningScore,
    OwnScore,
    TotalScore,
    /// `tbp_formula` evaluated per match over the match score bindings.
    Expression,
    /// `tbp_formula` evaluated per team over its full own-score list,
    /// with the `bestOf(OwnScores, k)` aggregate available.
    ScoreList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub title: String,
    /// Key of a cached event to load teams (and optionally results) from.
    pub event_key: String,
    /// Flat team-rating table; used when no event key is set.
    pub team_rating_file: String,
    pub data_dir: String,
    pub scheduling_model: SchedulingModel,
    pub rounds: u32,
    pub trials: u32,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Score noise factor in [0, 1]; 0 disables perturbation.
    pub score_randomness: f64,
    /// Regularization parameter of the rating estimator (lambda).
    pub rating_smoothing: f64,
    pub rating_excludes_penalties: bool,
    pub rp_formula: String,
    pub tbp_method: TbpMethod,
    pub tbp_formula: String,
    pub random: RandomOptions,
    pub swiss: SwissOptions,
    pub output: OutputOptions,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            title: "Tournament simulation".to_string(),
            event_key: String::new(),
            team_rating_file: String::new(),
            data_dir: "data".to_string(),
            scheduling_model: SchedulingModel::Swiss,
            rounds: 0,
            trials: 1,
            seed: None,
            score_randomness: 0.0,
            rating_smoothing: 1.0,
            rating_excludes_penalties: true,
            rp_formula: "if(Win, 2, if(Tie, 1, 0))".to_string(),
            tbp_method: TbpMethod::Expression,
            tbp_formula: "OwnScore + LosingScore".to_string(),
            random: RandomOptions::default(),
            swiss: SwissOptions::default(),
            output: OutputOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RandomOptions {
    /// Use the loaded event schedule instead of generating matchups.
    pub use_event_schedule: bool,
    /// Replay the loaded event results instead of simulating scores.
    pub use_event_results: bool,
}

impl Default for RandomOptions {
    fn default() -> RandomOptions {
        RandomOptions {
            use_event_schedule: false,
            use_event_results: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwissOptions {
    /// Seed day-1 rounds by persistent rating instead of pairing randomly.
    pub seed_first_rounds: bool,
    pub rounds_to_schedule_at_start: u32,
    /// Opponent pairing for the pre-scheduled rounds of day 1.
    pub starting_opponent_pairing: PairingMethod,
    pub opponent_pairing: PairingMethod,
    pub alliance_pairing: PairingMethod,
    /// Honor `breaks_after` as day boundaries.
    pub schedule_at_breaks: bool,
    /// Rounds after which a day ends; the last round is an implicit break.
    pub breaks_after: Vec<u32>,
    /// How many rounds ahead of the one just played may be scheduled.
    pub schedule_rounds_ahead: u32,
    /// Cost multipliers (scaled by team count) and the cross-group adder.
    pub previous_opponent_cost: i64,
    pub previous_partner_cost: i64,
    pub cross_group_cost: i64,
}

impl Default for SwissOptions {
    fn default() -> SwissOptions {
        SwissOptions {
            seed_first_rounds: false,
            rounds_to_schedule_at_start: 1,
            starting_opponent_pairing: PairingMethod::Slide,
            opponent_pairing: PairingMethod::Fold,
            alliance_pairing: PairingMethod::Slide,
            schedule_at_breaks: false,
            breaks_after: vec![2, 7],
            schedule_rounds_ahead: 1,
            previous_opponent_cost: 100,
            previous_partner_cost: 10,
            cross_group_cost: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputOptions {
    pub title: bool,
    pub status: bool,
    pub headings: bool,
    pub matchups: bool,
    pub include_current_rank: bool,
    pub rankings_each_round: bool,
    pub final_rankings: bool,
    pub match_scores: bool,
    pub trial_stats: bool,
    pub batch_stats: bool,
    /// Size of the "top X" slice used by the accuracy statistics.
    pub top_x: u32,
}

impl Default for OutputOptions {
    fn default() -> OutputOptions {
        OutputOptions {
            title: true,
            status: true,
            headings: true,
            matchups: true,
            include_current_rank: true,
            rankings_each_round: false,
            final_rankings: true,
            match_scores: false,
            trial_stats: true,
            batch_stats: true,
            top_x: 6,
        }
    }
}

impl Options {
    pub fn from_file(path: &Path) -> Result<Options> {
        Options::from_file_with_overrides(path, &[])
    }

    /// Load a TOML options document and apply `path=value` overrides.
    pub fn from_file_with_overrides(path: &Path, overrides: &[String]) -> Result<Options> {
        let text =
            fs::read_to_string(path).map_err(|e| Error::data(path, e.to_string()))?;
        Options::from_toml_with_overrides(&text, overrides)
    }

    pub fn from_toml_with_overrides(text: &str, overrides: &[String]) -> Result<Options> {
        let mut doc: toml::Value = text
            .parse()
            .map_err(|e| Error::Config(format!("options document is not valid TOML: {}", e)))?;
        for spec in overrides {
            apply_override(&mut doc, spec)?;
        }
        doc.try_into()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Cross-field checks that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.event_key.is_empty() && self.team_rating_file.is_empty() {
            return Err(Error::Config(
                "either event_key or team_rating_file must be set".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.score_randomness) {
            return Err(Error::Config(format!(
                "score_randomness must be within [0, 1], got {}",
                self.score_randomness
            )));
        }
        if self.rating_smoothing < 0.0 {
            return Err(Error::Config(format!(
                "rating_smoothing must not be negative, got {}",
                self.rating_smoothing
            )));
        }
        if self.trials == 0 {
            return Err(Error::Config("trials must be at least 1".to_string()));
        }
        if self.event_key.is_empty()
            && (self.random.use_event_results || self.random.use_event_schedule)
        {
            return Err(Error::Config(
                "random.use_event_results/use_event_schedule need an event_key".to_string(),
            ));
        }
        let needs_rounds = match self.scheduling_model {
            SchedulingModel::Swiss => true,
            SchedulingModel::Random => {
                !self.random.use_event_results && !self.random.use_event_schedule
            }
        };
        if needs_rounds && self.rounds == 0 {
            return Err(Error::Config(
                "rounds must be set for generated schedules".to_string(),
            ));
        }
        Ok(())
    }
}

/// Apply one `dotted.path=value` override to a parsed TOML document.
fn apply_override(doc: &mut toml::Value, spec: &str) -> Result<()> {
    let (path, raw) = spec
        .split_once('=')
        .ok_or_else(|| Error::Config(format!("override `{}` is not path=value", spec)))?;
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::Config(format!("override `{}` has an empty path segment", spec)));
    }

    let mut current = doc;
    for (i, segment) in segments.iter().enumerate() {
        let table = current.as_table_mut().ok_or_else(|| {
            Error::Config(format!("override path `{}` does not address a table", path))
        })?;
        if i + 1 == segments.len() {
            table.insert(segment.to_string(), parse_override_value(raw));
            return Ok(());
        }
        current = table
            .entry(segment.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    unreachable!("override path has at least one segment");
}

/// Guess the TOML type of an override value: bool, integer, float,
/// comma-separated integer list, else string.
fn parse_override_value(raw: &str) -> toml::Value {
    if let Ok(b) = raw.parse::<bool>() {
        return toml::Value::Boolean(b);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return toml::Value::Float(f);
    }
    if raw.contains(',') {
        let items: Vec<&str> = raw.split(',').map(str::trim).collect();
        if let Ok(ints) = items.iter().map(|s| s.parse::<i64>()).collect::<std::result::Result<Vec<i64>, _>>() {
            return toml::Value::Array(ints.into_iter().map(toml::Value::Integer).collect());
        }
    }
    toml::Value::String(raw.to_string())
}

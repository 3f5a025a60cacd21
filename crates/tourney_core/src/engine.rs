//! Trial orchestration: scheduling models, the Swiss day loop, statistics.

use std::path::Path;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{Options, SchedulingModel};
use crate::data::{self, MatchRecord};
use crate::error::{Error, Result};
use crate::output::Output;
use crate::ranking::{self, StandingsEngine};
use crate::rating::RatingEstimator;
use crate::scheduler;
use crate::sim;
use crate::stats::{self, BatchStats, EventStats};
use crate::types::{MatchSet, Roster};

/// Runs a batch of simulated trials over one roster.
pub struct Engine {
    options: Options,
    output: Output,
    standings: StandingsEngine,
    estimator: RatingEstimator,
    rng: StdRng,
}

impl Engine {
    /// Validate the configuration and compile the formulas; every
    /// configuration defect surfaces here, before any simulation.
    pub fn new(options: Options) -> Result<Engine> {
        options.validate()?;
        let standings = StandingsEngine::from_options(&options)?;
        let estimator = RatingEstimator::from_options(&options);
        let output = Output::new(&options.output);
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Engine {
            options,
            output,
            standings,
            estimator,
            rng,
        })
    }

    /// Load the roster, run the configured number of trials, and emit the
    /// batch statistics.
    pub fn run_trials(&mut self) -> Result<BatchStats> {
        let title = self.options.title.clone();
        self.output.title(&title);
        self.output
            .status(&format!("Running {} trial(s)", self.options.trials));

        let (teams, schedule) = self.prepare_roster()?;
        self.run_trials_with(teams, schedule)
    }

    /// Run the trial batch over an already-loaded roster.
    pub fn run_trials_with(
        &mut self,
        mut teams: Roster,
        schedule: Option<Vec<MatchRecord>>,
    ) -> Result<BatchStats> {
        let mut events: Vec<EventStats> = Vec::new();
        for trial in 1..=self.options.trials {
            self.output.status(&format!("Trial {}", trial));
            let event = self.run_trial(&mut teams, schedule.as_deref())?;
            events.push(event);
        }

        let batch = stats::batch_stats(&events);
        self.output.batch_stats(&batch);
        Ok(batch)
    }

    /// Load teams (and the recorded schedule, when an event is configured)
    /// and fix their persistent ratings.
    fn prepare_roster(&mut self) -> Result<(Roster, Option<Vec<MatchRecord>>)> {
        if !self.options.event_key.is_empty() {
            let dir = Path::new(&self.options.data_dir).to_path_buf();
            let key = self.options.event_key.clone();

            self.output.status(&format!("Loading teams from {}", key));
            let mut teams = data::teams_from_event(&dir, &key)?;
            self.output.status(&format!("{} teams loaded", teams.len()));

            let include_scores = self.options.random.use_event_results;
            let records = data::matches_from_event(&dir, &key, &teams, include_scores)?;
            self.output
                .status(&format!("{} matches loaded", records.len()));

            if include_scores {
                self.set_base_ratings_from_results(&mut teams, &records)?;
            }
            Ok((teams, Some(records)))
        } else {
            let path = Path::new(&self.options.team_rating_file).to_path_buf();
            self.output
                .status(&format!("Loading teams from {}", path.display()));
            let teams = data::teams_from_rating_table(&path)?;
            self.output.status(&format!("{} teams loaded", teams.len()));
            Ok((teams, None))
        }
    }

    /// Persistent ratings estimated from the event's recorded results.
    fn set_base_ratings_from_results(
        &mut self,
        teams: &mut Roster,
        records: &[MatchRecord],
    ) -> Result<()> {
        self.output
            .status("Estimating persistent ratings from recorded results");
        let mut scratch = teams.clone();
        let played = scheduler::materialize_records(&mut scratch, records, true)?;
        let ratings = self.estimator.estimate(&scratch, &played)?;
        for (number, rating) in ratings {
            if let Some(team) = teams.get_mut(&number) {
                team.base_rating = rating;
            }
        }
        Ok(())
    }

    fn run_trial(
        &mut self,
        teams: &mut Roster,
        schedule: Option<&[MatchRecord]>,
    ) -> Result<EventStats> {
        for team in teams.values_mut() {
            team.clear_stats();
        }

        match self.options.scheduling_model {
            SchedulingModel::Random => {
                if self.options.random.use_event_results {
                    let records = schedule.ok_or_else(|| {
                        Error::Config("event results requested but no event loaded".to_string())
                    })?;
                    self.run_replay(teams, records)
                } else if self.options.random.use_event_schedule {
                    let records = schedule.ok_or_else(|| {
                        Error::Config("event schedule requested but no event loaded".to_string())
                    })?;
                    self.run_recorded_schedule(teams, records)
                } else {
                    self.run_random(teams)
                }
            }
            SchedulingModel::Swiss => self.run_swiss(teams),
        }
    }

    /// Replay the recorded schedule with its recorded scores.
    fn run_replay(&mut self, teams: &mut Roster, records: &[MatchRecord]) -> Result<EventStats> {
        self.output
            .heading("Replaying recorded schedule and results");
        let matches = scheduler::materialize_records(teams, records, true)?;
        self.rank_and_rate(teams, &matches)?;
        self.conclude_trial(teams, &matches)
    }

    /// The recorded schedule with simulated scores.
    fn run_recorded_schedule(
        &mut self,
        teams: &mut Roster,
        records: &[MatchRecord],
    ) -> Result<EventStats> {
        self.output
            .status("Simulating scores over the recorded schedule");
        let mut matches = scheduler::materialize_records(teams, records, false)?;
        sim::set_match_results(
            &mut self.rng,
            teams,
            &mut matches,
            None,
            self.options.score_randomness,
        );
        self.rank_and_rate(teams, &matches)?;
        self.conclude_trial(teams, &matches)
    }

    /// Fully random pairings for all configured rounds.
    fn run_random(&mut self, teams: &mut Roster) -> Result<EventStats> {
        let rounds = self.options.rounds;
        self.output
            .status(&format!("Scheduling {} random rounds", rounds));
        let mut matches = MatchSet::new();
        scheduler::add_random_rounds(&mut self.rng, teams, &mut matches, rounds)?;

        self.output.status("Setting match results for all rounds");
        sim::set_match_results(
            &mut self.rng,
            teams,
            &mut matches,
            None,
            self.options.score_randomness,
        );
        self.rank_and_rate(teams, &matches)?;
        self.conclude_trial(teams, &matches)
    }

    /// The Swiss loop: per day, pre-schedule the opening rounds, then play
    /// round by round while scheduling ahead inside the look-ahead window,
    /// clipped to the day's final round.
    fn run_swiss(&mut self, teams: &mut Roster) -> Result<EventStats> {
        self.output.status("Running event with Swiss scheduling");
        let rounds = self.options.rounds;
        let swiss = self.options.swiss.clone();
        let randomness = self.options.score_randomness;
        let mut matches = MatchSet::new();

        // Initial ranks for a seeded start.
        ranking::seed_ranks_by_base_rating(teams);

        let mut breaks_after: Vec<u32> = if swiss.schedule_at_breaks {
            swiss
                .breaks_after
                .iter()
                .copied()
                .filter(|&b| b >= 1 && b < rounds)
                .collect()
        } else {
            Vec::new()
        };
        breaks_after.sort_unstable();
        breaks_after.dedup();
        // The last round of the event is an implicit day break.
        breaks_after.push(rounds);
        info!("day breaks after rounds {:?}", breaks_after);

        let mut scheduling_round: u32 = 1;
        let mut playing_round: u32 = 1;

        for (day_index, &day_end) in breaks_after.iter().enumerate() {
            let day = day_index as u32 + 1;
            let day_start = playing_round;
            let to_schedule = swiss
                .rounds_to_schedule_at_start
                .min(day_end - scheduling_round + 1);

            if day == 1 && !swiss.seed_first_rounds {
                self.output.status(&format!(
                    "Scheduling {} round(s) randomly - day {}",
                    to_schedule, day
                ));
                for _ in 0..to_schedule {
                    scheduler::add_random_rounds(&mut self.rng, teams, &mut matches, 1)?;
                    self.output.matchups(teams, &matches, scheduling_round);
                    scheduling_round += 1;
                }
            } else {
                let method = if day == 1 {
                    swiss.starting_opponent_pairing
                } else {
                    swiss.opponent_pairing
                };
                for _ in 0..to_schedule {
                    self.output.status(&format!(
                        "Scheduling round {} Swiss {:?}",
                        scheduling_round, method
                    ));
                    scheduler::add_swiss_round(teams, &mut matches, scheduling_round, method, &swiss)?;
                    self.output.matchups(teams, &matches, scheduling_round);
                    scheduling_round += 1;
                }
            }

            for playing in day_start..=day_end {
                playing_round = playing;
                self.output
                    .status(&format!("Setting match results for round {}", playing));
                sim::set_match_results(&mut self.rng, teams, &mut matches, Some(playing), randomness);

                self.standings.update(teams, &matches)?;
                self.refresh_ratings(teams, &matches);
                ranking::refresh_rating_ranks(teams);
                let tbp_label = self.options.tbp_formula.clone();
                self.output.rankings(
                    teams,
                    &tbp_label,
                    self.options.output.rankings_each_round,
                );

                // Schedule ahead, never past the day's final round.
                let end_scheduling = (playing + swiss.schedule_rounds_ahead).min(day_end);
                while scheduling_round <= end_scheduling {
                    self.output.status(&format!(
                        "Scheduling round {} Swiss {:?}",
                        scheduling_round, swiss.opponent_pairing
                    ));
                    scheduler::add_swiss_round(
                        teams,
                        &mut matches,
                        scheduling_round,
                        swiss.opponent_pairing,
                        &swiss,
                    )?;
                    self.output.matchups(teams, &matches, scheduling_round);
                    scheduling_round += 1;
                }
            }
            playing_round = day_end + 1;
        }

        // Standings and ratings are already current after the last round.
        self.conclude_trial(teams, &matches)
    }

    /// One ranking/rating pass for the models that resolve all rounds at
    /// once. The Swiss loop updates after every round instead.
    fn rank_and_rate(&mut self, teams: &mut Roster, matches: &MatchSet) -> Result<()> {
        self.standings.update(teams, matches)?;
        self.refresh_ratings(teams, matches);
        ranking::refresh_rating_ranks(teams);
        Ok(())
    }

    /// Final reports and statistics for one trial.
    fn conclude_trial(&mut self, teams: &Roster, matches: &MatchSet) -> Result<EventStats> {
        let tbp_label = self.options.tbp_formula.clone();
        self.output
            .rankings(teams, &tbp_label, self.options.output.final_rankings);
        self.output.match_scores(teams, matches);

        self.output.status("Generating event stats");
        let event = stats::event_stats(teams, matches, self.options.output.top_x);
        self.output.trial_stats(&event);
        Ok(event)
    }

    /// Re-estimate the rolling ratings; on a numerical failure the previous
    /// ratings are retained and the failure logged.
    fn refresh_ratings(&mut self, teams: &mut Roster, matches: &MatchSet) {
        match self.estimator.estimate(teams, matches) {
            Ok(ratings) => {
                for (number, rating) in ratings {
                    if let Some(team) = teams.get_mut(&number) {
                        team.rating = rating;
                    }
                }
            }
            Err(e) => warn!("rolling ratings retained: {}", e),
        }
    }
}

//! Toggle-gated console reporting.
//!
//! Every report section is controlled by its own output toggle, so batch
//! runs can be trimmed down to just the statistics lines.

use crate::config::OutputOptions;
use crate::stats::{BatchStats, EventStats, RatingAccuracy};
use crate::types::{Alliance, MatchSet, Roster, Team};

pub struct Output {
    options: OutputOptions,
}

impl Output {
    pub fn new(options: &OutputOptions) -> Output {
        Output {
            options: options.clone(),
        }
    }

    pub fn title(&self, text: &str) {
        if self.options.title {
            println!("=== {} ===", text);
        }
    }

    pub fn status(&self, text: &str) {
        if self.options.status {
            println!("{}", text);
        }
    }

    pub fn heading(&self, text: &str) {
        if self.options.headings {
            println!("{}", text);
        }
    }

    /// Standings table. `enabled` selects between the per-round and final
    /// rankings toggles at the call site.
    pub fn rankings(&self, teams: &Roster, tbp_label: &str, enabled: bool) {
        if !enabled {
            return;
        }
        self.heading(&format!("Standings with TBP = {}", tbp_label));
        self.heading(&format!(
            "{:>4} {:>6} {:>8} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "Rank", "Team", "Base", "RP", "TBP", "Rating", "RtgRank", "RtgDiff", "BaseRank", "BaseDiff"
        ));
        let mut rows: Vec<&Team> = teams.values().collect();
        rows.sort_by_key(|t| t.rank);
        for t in rows {
            println!(
                "{:>4} {:>6} {:>8.1} {:>6} {:>8.1} {:>8.1} {:>8} {:>8} {:>8} {:>8}",
                t.rank,
                t.number,
                t.base_rating,
                t.rp,
                t.tbp,
                t.rating,
                t.rating_rank,
                t.rating_rank_diff,
                t.base_rating_rank,
                t.base_rating_rank_diff
            );
        }
    }

    /// Matchups of one round, with current ranks when configured.
    pub fn matchups(&self, teams: &Roster, matches: &MatchSet, round: u32) {
        if !self.options.matchups {
            return;
        }
        self.heading(&format!("Matchups for round {}", round));
        self.heading(&format!(
            "{:>5} {:>12} {:>12} {:>12} {:>12}",
            "Match", "Red1", "Red2", "Blue1", "Blue2"
        ));
        for m in matches.values().filter(|m| m.round() == round) {
            let cell = |number: u32| {
                if self.options.include_current_rank {
                    let rank = teams.get(&number).map_or(0, |t| t.rank);
                    let rp = teams.get(&number).map_or(0.0, |t| t.rp);
                    format!("{} #{}({})", number, rank, rp)
                } else {
                    number.to_string()
                }
            };
            println!(
                "{:>5} {:>12} {:>12} {:>12} {:>12}",
                m.number(),
                cell(m.red()[0]),
                cell(m.red()[1]),
                cell(m.blue()[0]),
                cell(m.blue()[1])
            );
        }
    }

    /// Played scores against the persistent-rating expectation.
    pub fn match_scores(&self, teams: &Roster, matches: &MatchSet) {
        if !self.options.match_scores {
            return;
        }
        self.heading(&format!(
            "{:>5} {:>5} {:>6} {:>6} {:>6} {:>8} {:>8}",
            "Match", "Side", "Team1", "Team2", "Score", "Expected", "Delta"
        ));
        for m in matches.values().filter(|m| m.played) {
            for alliance in [Alliance::Red, Alliance::Blue] {
                let [t1, t2] = m.alliance_teams(alliance);
                let expected = teams.get(&t1).map_or(0.0, |t| t.base_rating)
                    + teams.get(&t2).map_or(0.0, |t| t.base_rating);
                let score = m.score(alliance);
                println!(
                    "{:>5} {:>5} {:>6} {:>6} {:>6} {:>8.1} {:>8.1}",
                    m.number(),
                    match alliance {
                        Alliance::Red => "Red",
                        Alliance::Blue => "Blue",
                    },
                    t1,
                    t2,
                    score,
                    expected,
                    score as f64 - expected
                );
            }
        }
    }

    pub fn trial_stats(&self, stats: &EventStats) {
        if !self.options.trial_stats {
            return;
        }
        self.heading(&format!(
            "{:>6} {:>8} {:>6} {:>6} {:>8} {:>6}",
            "Teams", "Matches", "High", "Low", "Avg", "TopX"
        ));
        println!(
            "{:>6} {:>8} {:>6} {:>6} {:>8.2} {:>6}",
            stats.team_count,
            stats.match_count,
            stats.high_score,
            stats.low_score,
            stats.avg_score,
            stats.top_x
        );
        self.accuracy_table(&stats.rolling, &stats.persistent);
    }

    pub fn batch_stats(&self, stats: &BatchStats) {
        if !self.options.batch_stats {
            return;
        }
        self.heading(&format!(
            "{:>6} {:>8} {:>6} {:>6} {:>8} {:>6} {:>7}",
            "Teams", "Matches", "High", "Low", "Avg", "TopX", "Trials"
        ));
        println!(
            "{:>6} {:>8} {:>6} {:>6} {:>8.2} {:>6} {:>7}",
            stats.team_count,
            stats.match_count,
            stats.high_score,
            stats.low_score,
            stats.avg_score,
            stats.top_x,
            stats.event_count
        );
        self.accuracy_table(&stats.rolling, &stats.persistent);
    }

    fn accuracy_table(&self, rolling: &RatingAccuracy, persistent: &RatingAccuracy) {
        self.heading(&format!(
            "{:<10} {:>8} {:>9} {:>7} {:>8} {:>9} {:>7} {:>8}",
            "Rating", "AvgDiff", "TopXDiff", "InTopX", "AvgErr", "TopXErr", "Corr", "TopXCorr"
        ));
        for (label, a) in [("rolling", rolling), ("persistent", persistent)] {
            println!(
                "{:<10} {:>8.2} {:>9.2} {:>7.2} {:>8.2} {:>9.2} {:>7.3} {:>8.3}",
                label,
                a.avg_rank_diff,
                a.avg_top_x_rank_diff,
                a.in_top_x,
                a.avg_rank_err,
                a.avg_top_x_rank_err,
                a.rank_correlation,
                a.top_x_rank_correlation
            );
        }
    }
}

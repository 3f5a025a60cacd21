//! Standings: ranking points, tie-break points, ranks and rating ranks.

use std::collections::BTreeMap;

use crate::config::{Options, TbpMethod};
use crate::error::Result;
use crate::formula::{Formula, MatchScores};
use crate::types::{Alliance, Match, MatchSet, Roster};

/// Awards points and assigns standings from the played matches.
///
/// Ranking points and tie-break points are recomputed from scratch on every
/// update, so a team's totals always derive strictly from the set of played
/// matches.
pub struct StandingsEngine {
    rp_formula: Formula,
    tbp_method: TbpMethod,
    tbp_formula: Formula,
}

impl StandingsEngine {
    /// Compiles both formulas; a malformed formula fails here, before any
    /// simulation starts.
    pub fn from_options(options: &Options) -> Result<StandingsEngine> {
        Ok(StandingsEngine {
            rp_formula: Formula::compile(&options.rp_formula)?,
            tbp_method: options.tbp_method,
            tbp_formula: Formula::compile(&options.tbp_formula)?,
        })
    }

    /// Recompute RP, TBP, played counts and standings ranks, appending the
    /// new rank to each team's history.
    pub fn update(&self, teams: &mut Roster, matches: &MatchSet) -> Result<()> {
        for team in teams.values_mut() {
            team.rp = 0.0;
            team.tbp = 0.0;
            team.played = 0;
            team.rank = 0;
        }

        let mut own_scores: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for m in matches.values().filter(|m| m.played) {
            self.award(m, teams, &mut own_scores)?;
        }

        if self.tbp_method == TbpMethod::ScoreList {
            for (number, scores) in &own_scores {
                let tbp = self.tbp_formula.eval_score_list(scores)?;
                if let Some(team) = teams.get_mut(number) {
                    team.tbp = tbp;
                }
            }
        }

        assign_ranks(teams);
        Ok(())
    }

    fn award(
        &self,
        m: &Match,
        teams: &mut Roster,
        own_scores: &mut BTreeMap<u32, Vec<f64>>,
    ) -> Result<()> {
        let red = m.score(Alliance::Red);
        let blue = m.score(Alliance::Blue);
        let red_pf = m.penalty_free_score(Alliance::Red);
        let blue_pf = m.penalty_free_score(Alliance::Blue);

        // Win and tie are decided on raw scores; tie-break variables use
        // penalty-free scores.
        let (winning, losing) = (red.max(blue), red.min(blue));
        let (winning_pf, losing_pf) = match m.winner() {
            Some(Alliance::Red) => (red_pf, blue_pf),
            Some(Alliance::Blue) => (blue_pf, red_pf),
            None => (red_pf.max(blue_pf), red_pf.min(blue_pf)),
        };

        for number in m.teams() {
            let alliance = match m.alliance_of(number) {
                Some(a) => a,
                None => continue,
            };
            let win = m.winner() == Some(alliance);
            let tie = m.winner().is_none();
            let own = m.score(alliance);
            let own_pf = m.penalty_free_score(alliance);

            let rp = self.rp_formula.eval_match(&MatchScores {
                own: own as f64,
                winning: winning as f64,
                losing: losing as f64,
                total: (red + blue) as f64,
                win,
                tie,
            })?;

            let tbp = match self.tbp_method {
                TbpMethod::LosingScore => losing_pf as f64,
                TbpMethod::WinningScore => winning_pf as f64,
                TbpMethod::OwnScore => own_pf as f64,
                TbpMethod::TotalScore => (red_pf + blue_pf) as f64,
                TbpMethod::Expression => self.tbp_formula.eval_match(&MatchScores {
                    own: own_pf as f64,
                    winning: winning_pf as f64,
                    losing: losing_pf as f64,
                    total: (red_pf + blue_pf) as f64,
                    win,
                    tie,
                })?,
                // Computed over the whole score list after this pass.
                TbpMethod::ScoreList => 0.0,
            };

            own_scores.entry(number).or_default().push(own_pf as f64);

            if let Some(team) = teams.get_mut(&number) {
                team.rp += rp;
                team.tbp += tbp;
                team.played += 1;
            }
        }
        Ok(())
    }
}

/// Sort by RP then TBP, both descending, and assign dense sequential ranks
/// 1..N. Ties beyond TBP resolve by team number so ordering stays
/// deterministic. Each team's new rank is appended to its history.
fn assign_ranks(teams: &mut Roster) {
    let mut order: Vec<u32> = teams.keys().copied().collect();
    order.sort_by(|a, b| {
        let ta = &teams[a];
        let tb = &teams[b];
        tb.rp
            .partial_cmp(&ta.rp)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                tb.tbp
                    .partial_cmp(&ta.tbp)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(a.cmp(b))
    });
    for (i, number) in order.iter().enumerate() {
        if let Some(team) = teams.get_mut(number) {
            team.rank = i as u32 + 1;
            team.rank_history.push(team.rank);
        }
    }
}

/// Rank teams by descending rating value, for the rolling and persistent
/// ratings independently, and record the signed difference from the
/// standings rank.
pub fn refresh_rating_ranks(teams: &mut Roster) {
    let mut order: Vec<u32> = teams.keys().copied().collect();

    order.sort_by(|a, b| {
        teams[b]
            .rating
            .partial_cmp(&teams[a].rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });
    for (i, number) in order.iter().enumerate() {
        if let Some(team) = teams.get_mut(number) {
            team.rating_rank = i as u32 + 1;
            team.rating_rank_diff = team.rating_rank as i64 - team.rank as i64;
        }
    }

    order.sort_by(|a, b| {
        teams[b]
            .base_rating
            .partial_cmp(&teams[a].base_rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });
    for (i, number) in order.iter().enumerate() {
        if let Some(team) = teams.get_mut(number) {
            team.base_rating_rank = i as u32 + 1;
            team.base_rating_rank_diff = team.base_rating_rank as i64 - team.rank as i64;
        }
    }
}

/// Initial seeding: clear per-trial state and rank everyone by persistent
/// rating, so a seeded Swiss start has standings to pair on.
pub fn seed_ranks_by_base_rating(teams: &mut Roster) {
    for team in teams.values_mut() {
        team.clear_stats();
    }
    let mut order: Vec<u32> = teams.keys().copied().collect();
    order.sort_by(|a, b| {
        teams[b]
            .base_rating
            .partial_cmp(&teams[a].base_rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });
    for (i, number) in order.iter().enumerate() {
        if let Some(team) = teams.get_mut(number) {
            team.rank = i as u32 + 1;
            team.base_rating_rank = i as u32 + 1;
        }
    }
}

//! Teams, matches and alliances.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// Roster keyed by team number. BTreeMap keeps iteration deterministic.
pub type Roster = BTreeMap<u32, Team>;

/// Match set keyed by match number.
pub type MatchSet = BTreeMap<u32, Match>;

/// One scoring side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alliance {
    Red,
    Blue,
}

impl Alliance {
    pub fn opposing(self) -> Alliance {
        match self {
            Alliance::Red => Alliance::Blue,
            Alliance::Blue => Alliance::Red,
        }
    }
}

/// A participating team and its per-trial state.
///
/// Everything except `number`, `name` and `base_rating` is recomputed during
/// a trial and wiped by [`Team::clear_stats`] when the next trial starts.
#[derive(Debug, Clone)]
pub struct Team {
    pub number: u32,
    pub name: String,

    /// Ranking points, accumulated by the configured formula.
    pub rp: f64,
    /// Tie-break points, used only to break RP ties.
    pub tbp: f64,
    pub played: u32,
    pub scheduled: u32,

    /// Persistent rating: fixed for the whole run, drives score simulation.
    pub base_rating: f64,
    /// Rolling rating: re-estimated from the matches played so far.
    pub rating: f64,

    /// Standings rank, 1 = best.
    pub rank: u32,
    pub base_rating_rank: u32,
    pub rating_rank: u32,
    /// Rating rank minus standings rank, signed.
    pub base_rating_rank_diff: i64,
    pub rating_rank_diff: i64,

    /// Teams this team has shared an alliance with.
    pub partners: BTreeSet<u32>,
    /// Teams this team has played against.
    pub opponents: BTreeSet<u32>,

    /// Standings rank after each ranking update, in round order.
    pub rank_history: Vec<u32>,
}

impl Team {
    pub fn new(number: u32, name: impl Into<String>) -> Team {
        Team {
            number,
            name: name.into(),
            rp: 0.0,
            tbp: 0.0,
            played: 0,
            scheduled: 0,
            base_rating: 0.0,
            rating: 0.0,
            rank: 0,
            base_rating_rank: 0,
            rating_rank: 0,
            base_rating_rank_diff: 0,
            rating_rank_diff: 0,
            partners: BTreeSet::new(),
            opponents: BTreeSet::new(),
            rank_history: Vec::new(),
        }
    }

    /// Reset all per-trial state. The persistent rating survives.
    pub fn clear_stats(&mut self) {
        self.rp = 0.0;
        self.tbp = 0.0;
        self.played = 0;
        self.scheduled = 0;
        self.rating = 0.0;
        self.rank = 0;
        self.base_rating_rank = 0;
        self.rating_rank = 0;
        self.base_rating_rank_diff = 0;
        self.rating_rank_diff = 0;
        self.partners.clear();
        self.opponents.clear();
        self.rank_history.clear();
    }

    pub fn has_partnered(&self, other: u32) -> bool {
        self.partners.contains(&other)
    }

    pub fn has_opposed(&self, other: u32) -> bool {
        self.opponents.contains(&other)
    }
}

/// A scheduled two-vs-two match.
///
/// The four team slots are fixed at creation; scores and penalties are
/// filled in when the match is played.
#[derive(Debug, Clone)]
pub struct Match {
    number: u32,
    round: u32,
    red: [u32; 2],
    blue: [u32; 2],

    pub played: bool,
    pub red_score: i64,
    pub blue_score: i64,
    pub red_penalty: i64,
    pub blue_penalty: i64,
}

impl Match {
    /// Create a match and record partner/opponent relations and `scheduled`
    /// counts on its four teams. This is the only place relations are
    /// recorded, so it runs exactly once per scheduled match.
    pub fn create(
        teams: &mut Roster,
        number: u32,
        round: u32,
        red: [u32; 2],
        blue: [u32; 2],
    ) -> Result<Match> {
        let slots = [red[0], red[1], blue[0], blue[1]];
        for (i, a) in slots.iter().enumerate() {
            if !teams.contains_key(a) {
                return Err(Error::Scheduling(format!(
                    "match {} references unknown team {}",
                    number, a
                )));
            }
            for b in slots.iter().skip(i + 1) {
                if a == b {
                    return Err(Error::Scheduling(format!(
                        "match {} lists team {} twice",
                        number, a
                    )));
                }
            }
        }

        for (mine, partner, opp) in [
            (red[0], red[1], blue),
            (red[1], red[0], blue),
            (blue[0], blue[1], red),
            (blue[1], blue[0], red),
        ] {
            let team = teams.get_mut(&mine).expect("slot checked above");
            team.partners.insert(partner);
            team.opponents.insert(opp[0]);
            team.opponents.insert(opp[1]);
            team.scheduled += 1;
        }

        Ok(Match {
            number,
            round,
            red,
            blue,
            played: false,
            red_score: 0,
            blue_score: 0,
            red_penalty: 0,
            blue_penalty: 0,
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn red(&self) -> [u32; 2] {
        self.red
    }

    pub fn blue(&self) -> [u32; 2] {
        self.blue
    }

    pub fn teams(&self) -> [u32; 4] {
        [self.red[0], self.red[1], self.blue[0], self.blue[1]]
    }

    pub fn alliance_of(&self, team: u32) -> Option<Alliance> {
        if self.red.contains(&team) {
            Some(Alliance::Red)
        } else if self.blue.contains(&team) {
            Some(Alliance::Blue)
        } else {
            None
        }
    }

    pub fn alliance_teams(&self, alliance: Alliance) -> [u32; 2] {
        match alliance {
            Alliance::Red => self.red,
            Alliance::Blue => self.blue,
        }
    }

    pub fn score(&self, alliance: Alliance) -> i64 {
        match alliance {
            Alliance::Red => self.red_score,
            Alliance::Blue => self.blue_score,
        }
    }

    /// Score with the penalty bonus removed.
    pub fn penalty_free_score(&self, alliance: Alliance) -> i64 {
        match alliance {
            Alliance::Red => self.red_score - self.red_penalty,
            Alliance::Blue => self.blue_score - self.blue_penalty,
        }
    }

    /// Winning alliance, or `None` on a tie. Only meaningful once played.
    pub fn winner(&self) -> Option<Alliance> {
        if self.red_score > self.blue_score {
            Some(Alliance::Red)
        } else if self.blue_score > self.red_score {
            Some(Alliance::Blue)
        } else {
            None
        }
    }

    pub fn set_result(&mut self, red_score: i64, blue_score: i64) {
        self.red_score = red_score;
        self.blue_score = blue_score;
        self.played = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: u32) -> Roster {
        (1..=n).map(|i| (i, Team::new(i, format!("Team {}", i)))).collect()
    }

    #[test]
    fn create_records_relations_symmetrically() {
        let mut teams = roster(4);
        let m = Match::create(&mut teams, 1, 1, [1, 2], [3, 4]).unwrap();
        assert_eq!(m.teams(), [1, 2, 3, 4]);

        assert!(teams[&1].has_partnered(2));
        assert!(teams[&2].has_partnered(1));
        assert!(teams[&3].has_partnered(4));
        assert!(teams[&4].has_partnered(3));

        for (a, b) in [(1, 3), (1, 4), (2, 3), (2, 4)] {
            assert!(teams[&a].has_opposed(b), "{} should oppose {}", a, b);
            assert!(teams[&b].has_opposed(a), "{} should oppose {}", b, a);
        }
        assert!(!teams[&1].has_opposed(2));

        for t in teams.values() {
            assert_eq!(t.scheduled, 1);
        }
    }

    #[test]
    fn create_rejects_duplicate_slot() {
        let mut teams = roster(4);
        assert!(Match::create(&mut teams, 1, 1, [1, 1], [3, 4]).is_err());
    }

    #[test]
    fn create_rejects_unknown_team() {
        let mut teams = roster(4);
        assert!(Match::create(&mut teams, 1, 1, [1, 2], [3, 99]).is_err());
    }

    #[test]
    fn winner_and_scores() {
        let mut teams = roster(4);
        let mut m = Match::create(&mut teams, 1, 1, [1, 2], [3, 4]).unwrap();
        assert!(!m.played);

        m.set_result(120, 100);
        m.red_penalty = 20;
        assert!(m.played);
        assert_eq!(m.winner(), Some(Alliance::Red));
        assert_eq!(m.score(Alliance::Red), 120);
        assert_eq!(m.penalty_free_score(Alliance::Red), 100);
        assert_eq!(m.alliance_of(2), Some(Alliance::Red));
        assert_eq!(m.alliance_of(4), Some(Alliance::Blue));
        assert_eq!(m.alliance_of(9), None);

        m.set_result(90, 90);
        assert_eq!(m.winner(), None);
    }

    #[test]
    fn clear_stats_keeps_identity_and_base_rating() {
        let mut teams = roster(4);
        Match::create(&mut teams, 1, 1, [1, 2], [3, 4]).unwrap();
        let team = teams.get_mut(&1).unwrap();
        team.base_rating = 42.0;
        team.rp = 4.0;
        team.rank_history.push(3);

        team.clear_stats();
        assert_eq!(team.base_rating, 42.0);
        assert_eq!(team.rp, 0.0);
        assert_eq!(team.scheduled, 0);
        assert!(team.partners.is_empty());
        assert!(team.rank_history.is_empty());
    }
}

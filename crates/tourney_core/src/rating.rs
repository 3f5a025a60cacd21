//! Offensive-contribution ratings via regularized least squares.
//!
//! Every played match contributes one design-matrix row per alliance, with
//! ones in the participating teams' columns and the alliance score as the
//! target. Centering the targets by twice the grand per-team mean removes
//! the offset indeterminacy of the model; the smoothing parameter keeps the
//! normal equations invertible while data is sparse. Smoothing 0 reproduces
//! the classical unregularized estimator.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};

use crate::config::Options;
use crate::error::{Error, Result};
use crate::types::{Alliance, Match, MatchSet, Roster};

#[derive(Debug, Clone)]
pub struct RatingEstimator {
    /// Regularization parameter (lambda). 1-3 is the useful range; 0 is
    /// exact least squares and singular until enough matches are played.
    pub smoothing: f64,
    pub exclude_penalties: bool,
}

impl RatingEstimator {
    pub fn from_options(options: &Options) -> RatingEstimator {
        RatingEstimator {
            smoothing: options.rating_smoothing,
            exclude_penalties: options.rating_excludes_penalties,
        }
    }

    /// Estimate a rating for every rostered team from the played subset of
    /// `matches`.
    pub fn estimate(&self, teams: &Roster, matches: &MatchSet) -> Result<BTreeMap<u32, f64>> {
        let numbers: Vec<u32> = teams.keys().copied().collect();
        let column: BTreeMap<u32, usize> =
            numbers.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        let played: Vec<&Match> = matches.values().filter(|m| m.played).collect();

        if played.is_empty() {
            return Err(Error::Numerical("no played matches to rate".to_string()));
        }

        // A single full round is exactly singular: every team appears in
        // one equation, so read the ratings off directly.
        if played.len() == numbers.len() / 4 {
            let mut ratings: BTreeMap<u32, f64> =
                numbers.iter().map(|&n| (n, 0.0)).collect();
            for m in &played {
                for alliance in [Alliance::Red, Alliance::Blue] {
                    let share = self.effective_score(m, alliance) as f64 / 2.0;
                    for t in m.alliance_teams(alliance) {
                        ratings.insert(t, share);
                    }
                }
            }
            return Ok(ratings);
        }

        let n = numbers.len();
        let rows = 2 * played.len();
        let mut a = DMatrix::<f64>::zeros(rows, n);
        let mut y = DVector::<f64>::zeros(rows);
        let mut total = 0.0;

        for (idx, m) in played.iter().enumerate() {
            let red = self.effective_score(m, Alliance::Red) as f64;
            let blue = self.effective_score(m, Alliance::Blue) as f64;
            for t in m.red() {
                a[(idx, column[&t])] = 1.0;
            }
            for t in m.blue() {
                a[(played.len() + idx, column[&t])] = 1.0;
            }
            y[idx] = red;
            y[played.len() + idx] = blue;
            total += red + blue;
        }

        // Grand mean contribution of one team (two teams per alliance).
        let mean = total / (rows as f64 * 2.0);
        for v in y.iter_mut() {
            *v -= 2.0 * mean;
        }

        let at = a.transpose();
        let system = &at * &a + DMatrix::identity(n, n) * self.smoothing;
        let inverse = system.try_inverse().ok_or_else(|| {
            Error::Numerical(
                "normal equations are not invertible; raise rating_smoothing".to_string(),
            )
        })?;
        let solution = inverse * (at * y);

        Ok(numbers
            .iter()
            .enumerate()
            .map(|(i, &number)| (number, solution[i] + mean))
            .collect())
    }

    fn effective_score(&self, m: &Match, alliance: Alliance) -> i64 {
        if self.exclude_penalties {
            m.penalty_free_score(alliance)
        } else {
            m.score(alliance)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Team;

    fn roster(n: u32) -> Roster {
        (1..=n).map(|i| (i, Team::new(i, format!("Team {}", i)))).collect()
    }

    fn played(
        teams: &mut Roster,
        number: u32,
        red: [u32; 2],
        blue: [u32; 2],
        red_score: i64,
        blue_score: i64,
    ) -> Match {
        let mut m = Match::create(teams, number, 1, red, blue).unwrap();
        m.set_result(red_score, blue_score);
        m
    }

    #[test]
    fn recovers_exact_contributions_without_smoothing() {
        // Four teams with true contributions 10/20/30/40 and every alliance
        // split played once: the unregularized estimator is exact.
        let truth = [10.0, 20.0, 30.0, 40.0];
        let mut teams = roster(4);
        let mut matches = MatchSet::new();
        let score = |a: u32, b: u32| (truth[a as usize - 1] + truth[b as usize - 1]) as i64;

        let pairings: [([u32; 2], [u32; 2]); 3] =
            [([1, 2], [3, 4]), ([1, 3], [2, 4]), ([1, 4], [2, 3])];
        for (i, &(red, blue)) in pairings.iter().enumerate() {
            let m = played(
                &mut teams,
                i as u32 + 1,
                red,
                blue,
                score(red[0], red[1]),
                score(blue[0], blue[1]),
            );
            matches.insert(m.number(), m);
        }

        let estimator = RatingEstimator {
            smoothing: 0.0,
            exclude_penalties: true,
        };
        let ratings = estimator.estimate(&teams, &matches).unwrap();
        for (i, want) in truth.iter().enumerate() {
            let got = ratings[&(i as u32 + 1)];
            assert!(
                (got - want).abs() < 1e-6,
                "team {}: got {}, want {}",
                i + 1,
                got,
                want
            );
        }
    }

    #[test]
    fn single_round_reads_scores_directly() {
        let mut teams = roster(8);
        let mut matches = MatchSet::new();
        let m = played(&mut teams, 1, [1, 2], [3, 4], 120, 100);
        matches.insert(1, m);
        let m = played(&mut teams, 2, [5, 6], [7, 8], 80, 90);
        matches.insert(2, m);

        let estimator = RatingEstimator {
            smoothing: 1.0,
            exclude_penalties: true,
        };
        let ratings = estimator.estimate(&teams, &matches).unwrap();
        assert_eq!(ratings[&1], 60.0);
        assert_eq!(ratings[&2], 60.0);
        assert_eq!(ratings[&3], 50.0);
        assert_eq!(ratings[&4], 50.0);
        assert_eq!(ratings[&5], 40.0);
        assert_eq!(ratings[&7], 45.0);
    }

    #[test]
    fn penalties_subtracted_when_configured() {
        let mut teams = roster(8);
        let mut matches = MatchSet::new();
        let mut m = played(&mut teams, 1, [1, 2], [3, 4], 120, 100);
        m.red_penalty = 20;
        matches.insert(1, m);
        let m = played(&mut teams, 2, [5, 6], [7, 8], 80, 90);
        matches.insert(2, m);

        let with = RatingEstimator {
            smoothing: 1.0,
            exclude_penalties: true,
        };
        assert_eq!(with.estimate(&teams, &matches).unwrap()[&1], 50.0);

        let without = RatingEstimator {
            smoothing: 1.0,
            exclude_penalties: false,
        };
        assert_eq!(without.estimate(&teams, &matches).unwrap()[&1], 60.0);
    }

    #[test]
    fn underdetermined_system_is_a_numerical_failure() {
        // Eight rostered teams but matches among only four of them: the
        // unplayed teams contribute all-zero columns, so with smoothing 0
        // the normal equations are singular.
        let mut teams = roster(8);
        let mut matches = MatchSet::new();
        for (i, (red, blue)) in [([1, 2], [3, 4]), ([1, 3], [2, 4]), ([1, 4], [2, 3])]
            .into_iter()
            .enumerate()
        {
            let m = played(&mut teams, i as u32 + 1, red, blue, 100, 90);
            matches.insert(m.number(), m);
        }

        let exact = RatingEstimator {
            smoothing: 0.0,
            exclude_penalties: true,
        };
        assert!(matches!(
            exact.estimate(&teams, &matches),
            Err(Error::Numerical(_))
        ));

        // The same data solves fine with smoothing.
        let smoothed = RatingEstimator {
            smoothing: 1.0,
            exclude_penalties: true,
        };
        assert!(smoothed.estimate(&teams, &matches).is_ok());
    }

    #[test]
    fn no_played_matches_is_a_numerical_failure() {
        let teams = roster(4);
        let matches = MatchSet::new();
        let estimator = RatingEstimator {
            smoothing: 1.0,
            exclude_penalties: true,
        };
        assert!(matches!(
            estimator.estimate(&teams, &matches),
            Err(Error::Numerical(_))
        ));
    }
}

//! Trial and batch statistics.
//!
//! Rating accuracy is computed twice per trial, once for the rolling rating
//! and once for the persistent rating, always against the final standings.
//! Degenerate inputs (empty top-X slice, zero-variance correlations) yield
//! 0 rather than NaN or an error.

use crate::types::{Match, MatchSet, Roster, Team};

/// How well one rating kind predicted the standings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingAccuracy {
    /// Mean |rating rank - standings rank| over all teams.
    pub avg_rank_diff: f64,
    /// Same, restricted to teams ranked within the top X.
    pub avg_top_x_rank_diff: f64,
    /// Teams whose standings rank and rating rank are both within the
    /// top X. Integral per trial; a mean across a batch.
    pub in_top_x: f64,
    /// Mean |rating value at standings rank k - rating value at rating
    /// rank k| over all k.
    pub avg_rank_err: f64,
    pub avg_top_x_rank_err: f64,
    /// Spearman rank correlation between rating order and standings order.
    pub rank_correlation: f64,
    pub top_x_rank_correlation: f64,
}

/// Read-only aggregates for one finished trial.
#[derive(Debug, Clone, Default)]
pub struct EventStats {
    pub team_count: usize,
    pub match_count: usize,
    pub high_score: i64,
    pub low_score: i64,
    pub avg_score: f64,
    pub top_x: u32,
    pub rolling: RatingAccuracy,
    pub persistent: RatingAccuracy,
}

/// Aggregates across a whole batch of trials.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub event_count: usize,
    pub team_count: usize,
    pub match_count: usize,
    pub high_score: i64,
    pub low_score: i64,
    pub avg_score: f64,
    pub top_x: u32,
    pub rolling: RatingAccuracy,
    pub persistent: RatingAccuracy,
}

/// Compute the statistics of a finished trial.
pub fn event_stats(teams: &Roster, matches: &MatchSet, top_x: u32) -> EventStats {
    let played: Vec<&Match> = matches.values().filter(|m| m.played).collect();

    let high_score = played
        .iter()
        .map(|m| m.red_score.max(m.blue_score))
        .max()
        .unwrap_or(0);
    let low_score = played
        .iter()
        .map(|m| m.red_score.min(m.blue_score))
        .min()
        .unwrap_or(0);
    let avg_score = if played.is_empty() {
        0.0
    } else {
        played
            .iter()
            .map(|m| (m.red_score + m.blue_score) as f64)
            .sum::<f64>()
            / (2 * played.len()) as f64
    };

    EventStats {
        team_count: teams.len(),
        match_count: matches.len(),
        high_score,
        low_score,
        avg_score,
        top_x,
        rolling: rating_accuracy(teams, top_x, |t| t.rating, |t| t.rating_rank),
        persistent: rating_accuracy(teams, top_x, |t| t.base_rating, |t| t.base_rating_rank),
    }
}

fn rating_accuracy(
    teams: &Roster,
    top_x: u32,
    value: impl Fn(&Team) -> f64,
    rating_rank: impl Fn(&Team) -> u32,
) -> RatingAccuracy {
    let n = teams.len();
    if n == 0 {
        return RatingAccuracy::default();
    }

    let diffs: Vec<(u32, f64)> = teams
        .values()
        .map(|t| (t.rank, (rating_rank(t) as f64 - t.rank as f64).abs()))
        .collect();

    let avg_rank_diff = diffs.iter().map(|(_, d)| d).sum::<f64>() / n as f64;
    let top: Vec<f64> = diffs
        .iter()
        .filter(|(rank, _)| *rank <= top_x)
        .map(|(_, d)| *d)
        .collect();
    let avg_top_x_rank_diff = if top.is_empty() {
        0.0
    } else {
        top.iter().sum::<f64>() / top.len() as f64
    };

    let in_top_x = teams
        .values()
        .filter(|t| t.rank <= top_x && rating_rank(t) <= top_x)
        .count() as f64;

    // Value gap between the team actually at rank k and the team the
    // rating predicted at rank k.
    let mut by_standing: Vec<&Team> = teams.values().collect();
    by_standing.sort_by_key(|t| t.rank);
    let mut by_rating: Vec<&Team> = teams.values().collect();
    by_rating.sort_by_key(|t| rating_rank(t));

    let errs: Vec<f64> = by_standing
        .iter()
        .zip(by_rating.iter())
        .map(|(s, r)| (value(s) - value(r)).abs())
        .collect();
    let avg_rank_err = errs.iter().sum::<f64>() / n as f64;
    let top_errs = errs.iter().take(top_x as usize);
    let top_len = (top_x as usize).min(n);
    let avg_top_x_rank_err = if top_len == 0 {
        0.0
    } else {
        top_errs.sum::<f64>() / top_len as f64
    };

    let standings_ranks: Vec<f64> = by_standing.iter().map(|t| t.rank as f64).collect();
    let rating_ranks: Vec<f64> = by_standing.iter().map(|t| rating_rank(t) as f64).collect();
    let rank_correlation = spearman(&standings_ranks, &rating_ranks);

    let top_standings: Vec<f64> = by_standing
        .iter()
        .filter(|t| t.rank <= top_x)
        .map(|t| t.rank as f64)
        .collect();
    let top_ratings: Vec<f64> = by_standing
        .iter()
        .filter(|t| t.rank <= top_x)
        .map(|t| rating_rank(t) as f64)
        .collect();
    let top_x_rank_correlation = spearman(&top_standings, &top_ratings);

    RatingAccuracy {
        avg_rank_diff,
        avg_top_x_rank_diff,
        in_top_x,
        avg_rank_err,
        avg_top_x_rank_err,
        rank_correlation,
        top_x_rank_correlation,
    }
}

/// Average the per-trial statistics of a batch. High/low scores take the
/// extremes; team count takes the maximum.
pub fn batch_stats(events: &[EventStats]) -> BatchStats {
    if events.is_empty() {
        return BatchStats::default();
    }
    let n = events.len() as f64;
    let mean = |f: &dyn Fn(&EventStats) -> f64| events.iter().map(|e| f(e)).sum::<f64>() / n;

    let avg_accuracy = |pick: &dyn Fn(&EventStats) -> RatingAccuracy| RatingAccuracy {
        avg_rank_diff: mean(&|e| pick(e).avg_rank_diff),
        avg_top_x_rank_diff: mean(&|e| pick(e).avg_top_x_rank_diff),
        in_top_x: mean(&|e| pick(e).in_top_x),
        avg_rank_err: mean(&|e| pick(e).avg_rank_err),
        avg_top_x_rank_err: mean(&|e| pick(e).avg_top_x_rank_err),
        rank_correlation: mean(&|e| pick(e).rank_correlation),
        top_x_rank_correlation: mean(&|e| pick(e).top_x_rank_correlation),
    };

    BatchStats {
        event_count: events.len(),
        team_count: events.iter().map(|e| e.team_count).max().unwrap_or(0),
        match_count: events.iter().map(|e| e.match_count).sum(),
        high_score: events.iter().map(|e| e.high_score).max().unwrap_or(0),
        low_score: events.iter().map(|e| e.low_score).min().unwrap_or(0),
        avg_score: mean(&|e| e.avg_score),
        top_x: events[0].top_x,
        rolling: avg_accuracy(&|e| e.rolling),
        persistent: avg_accuracy(&|e| e.persistent),
    }
}

/// Spearman rank correlation. Both inputs are rank-transformed (ties get
/// averaged ranks), then Pearson-correlated. Undefined results (fewer than
/// two points, zero variance) are 0.
pub fn spearman(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    let rx = rank_transform(xs);
    let ry = rank_transform(ys);

    let n = rx.len() as f64;
    let mx = rx.iter().sum::<f64>() / n;
    let my = ry.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in rx.iter().zip(ry.iter()) {
        cov += (x - mx) * (y - my);
        vx += (x - mx) * (x - mx);
        vy += (y - my) * (y - my);
    }
    let denominator = (vx * vy).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    let rho = cov / denominator;
    if rho.is_finite() {
        rho
    } else {
        0.0
    }
}

fn rank_transform(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Average rank for the tie run [i, j].
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Match, Team};

    fn roster_with_ranks(n: u32) -> Roster {
        let mut teams = Roster::new();
        for i in 1..=n {
            let mut t = Team::new(i, format!("Team {}", i));
            t.rank = i;
            teams.insert(i, t);
        }
        teams
    }

    #[test]
    fn spearman_perfect_and_reversed() {
        assert!((spearman(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0]) - 1.0).abs() < 1e-12);
        assert!((spearman(&[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn spearman_degenerate_inputs_are_zero() {
        assert_eq!(spearman(&[], &[]), 0.0);
        assert_eq!(spearman(&[1.0], &[1.0]), 0.0);
        assert_eq!(spearman(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn rank_transform_averages_ties() {
        assert_eq!(rank_transform(&[10.0, 20.0, 20.0, 30.0]), vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn accuracy_of_a_perfect_rating() {
        let mut teams = roster_with_ranks(8);
        for t in teams.values_mut() {
            t.rating = 100.0 - t.rank as f64;
            t.rating_rank = t.rank;
            t.base_rating = 100.0 - t.rank as f64;
            t.base_rating_rank = t.rank;
        }
        let stats = event_stats(&teams, &MatchSet::new(), 4);

        assert_eq!(stats.rolling.avg_rank_diff, 0.0);
        assert_eq!(stats.rolling.in_top_x, 4.0);
        assert_eq!(stats.rolling.avg_rank_err, 0.0);
        assert!((stats.rolling.rank_correlation - 1.0).abs() < 1e-12);
        assert!((stats.rolling.top_x_rank_correlation - 1.0).abs() < 1e-12);
    }

    #[test]
    fn top_x_zero_yields_zeroes_not_errors() {
        let mut teams = roster_with_ranks(8);
        for t in teams.values_mut() {
            t.rating_rank = 9 - t.rank;
            t.base_rating_rank = t.rank;
        }
        let stats = event_stats(&teams, &MatchSet::new(), 0);
        assert_eq!(stats.rolling.avg_top_x_rank_diff, 0.0);
        assert_eq!(stats.rolling.avg_top_x_rank_err, 0.0);
        assert_eq!(stats.rolling.in_top_x, 0.0);
        assert_eq!(stats.rolling.top_x_rank_correlation, 0.0);
    }

    #[test]
    fn signed_differences_average_absolutely() {
        let mut teams = roster_with_ranks(4);
        // Rating order exactly reversed: diffs are 3, 1, 1, 3.
        for t in teams.values_mut() {
            t.rating_rank = 5 - t.rank;
        }
        let stats = event_stats(&teams, &MatchSet::new(), 2);
        assert_eq!(stats.rolling.avg_rank_diff, 2.0);
        assert_eq!(stats.rolling.avg_top_x_rank_diff, 2.0);
        assert!((stats.rolling.rank_correlation + 1.0).abs() < 1e-12);
    }

    #[test]
    fn event_scores_and_batch_aggregation() {
        let mut teams = roster_with_ranks(4);
        for t in teams.values_mut() {
            t.rating_rank = t.rank;
            t.base_rating_rank = t.rank;
        }
        let mut matches = MatchSet::new();
        let mut m = Match::create(&mut teams, 1, 1, [1, 2], [3, 4]).unwrap();
        m.set_result(120, 80);
        matches.insert(1, m);
        let mut m = Match::create(&mut teams, 2, 2, [1, 3], [2, 4]).unwrap();
        m.set_result(60, 100);
        matches.insert(2, m);

        let stats = event_stats(&teams, &matches, 2);
        assert_eq!(stats.match_count, 2);
        assert_eq!(stats.high_score, 120);
        assert_eq!(stats.low_score, 60);
        assert_eq!(stats.avg_score, 90.0);

        let batch = batch_stats(&[stats.clone(), stats]);
        assert_eq!(batch.event_count, 2);
        assert_eq!(batch.match_count, 4);
        assert_eq!(batch.high_score, 120);
        assert_eq!(batch.avg_score, 90.0);
        assert_eq!(batch.rolling.in_top_x, 2.0);
    }

    #[test]
    fn empty_batch_is_defined() {
        let batch = batch_stats(&[]);
        assert_eq!(batch.event_count, 0);
        assert_eq!(batch.avg_score, 0.0);
    }
}

//! Simulated match scores.
//!
//! An alliance's expected score is the sum of its two teams' persistent
//! ratings. With a randomness factor r configured, the score is perturbed
//! inside the asymmetric band [score*(1-r), score*(1+0.79r)] by a skewed
//! double-exponential draw, clamped at zero and rounded.

use rand::Rng;

use crate::types::{Alliance, MatchSet, Roster};

const SKEW_EXPONENT: f64 = 0.8;
/// Upside share of the noise band relative to the downside.
const UPSIDE_FACTOR: f64 = 0.79;
const TAIL_MIN: f64 = 0.001;
const TAIL_MAX: f64 = 0.999;

/// Fill in scores for every unplayed match of `round`, or of all rounds
/// when `round` is `None`.
pub fn set_match_results<R: Rng>(
    rng: &mut R,
    teams: &Roster,
    matches: &mut MatchSet,
    round: Option<u32>,
    randomness: f64,
) {
    for m in matches
        .values_mut()
        .filter(|m| !m.played && round.map_or(true, |r| m.round() == r))
    {
        let red = alliance_score(rng, teams, m.alliance_teams(Alliance::Red), randomness);
        let blue = alliance_score(rng, teams, m.alliance_teams(Alliance::Blue), randomness);
        m.set_result(red, blue);
    }
}

/// Score one alliance from its teams' persistent ratings.
pub fn alliance_score<R: Rng>(
    rng: &mut R,
    teams: &Roster,
    pair: [u32; 2],
    randomness: f64,
) -> i64 {
    let expected: f64 = pair
        .iter()
        .map(|n| teams.get(n).map_or(0.0, |t| t.base_rating))
        .sum();
    if randomness <= 0.0 {
        return expected.round().max(0.0) as i64;
    }

    let low = expected * (1.0 - randomness);
    let high = expected * (1.0 + UPSIDE_FACTOR * randomness);
    let score = low + skewed_fraction(rng) * (high - low);
    score.max(0.0).round() as i64
}

/// A noise fraction in (0, 1): a standard Laplace draw is normalized
/// through its CDF, extreme tails are rejected, and the result is raised to
/// the skew exponent.
fn skewed_fraction<R: Rng>(rng: &mut R) -> f64 {
    loop {
        let sample = sample_laplace(rng);
        let normalized = laplace_cdf(sample);
        if normalized > TAIL_MIN && normalized < TAIL_MAX {
            return normalized.powf(SKEW_EXPONENT);
        }
    }
}

/// Standard Laplace sample by inverse CDF.
fn sample_laplace<R: Rng>(rng: &mut R) -> f64 {
    let u: f64 = rng.gen::<f64>() - 0.5;
    -u.signum() * (1.0 - 2.0 * u.abs()).ln()
}

fn laplace_cdf(x: f64) -> f64 {
    if x < 0.0 {
        0.5 * x.exp()
    } else {
        1.0 - 0.5 * (-x).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Match, Team};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rated_roster(ratings: &[f64]) -> Roster {
        ratings
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let mut t = Team::new(i as u32 + 1, format!("Team {}", i + 1));
                t.base_rating = r;
                (i as u32 + 1, t)
            })
            .collect()
    }

    #[test]
    fn zero_randomness_is_exact() {
        let teams = rated_roster(&[30.0, 25.5, 20.0, 10.0]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(alliance_score(&mut rng, &teams, [1, 2], 0.0), 56);
        assert_eq!(alliance_score(&mut rng, &teams, [3, 4], 0.0), 30);
    }

    #[test]
    fn noise_stays_inside_the_band() {
        let teams = rated_roster(&[60.0, 40.0]);
        let mut rng = StdRng::seed_from_u64(2);
        let r = 0.2;
        // Band for expected 100: [80, 115.8], rounded.
        for _ in 0..2000 {
            let score = alliance_score(&mut rng, &teams, [1, 2], r);
            assert!((80..=116).contains(&score), "score {} out of band", score);
        }
    }

    #[test]
    fn scores_clamp_at_zero() {
        let teams = rated_roster(&[0.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(alliance_score(&mut rng, &teams, [1, 2], 0.5), 0);
        }
    }

    #[test]
    fn laplace_cdf_shape() {
        assert!((laplace_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!(laplace_cdf(-10.0) < 1e-4);
        assert!(laplace_cdf(10.0) > 1.0 - 1e-4);
    }

    #[test]
    fn results_only_fill_the_requested_round() {
        let mut teams = rated_roster(&[30.0, 25.0, 20.0, 10.0]);
        let mut matches = MatchSet::new();
        let m = Match::create(&mut teams, 1, 1, [1, 2], [3, 4]).unwrap();
        matches.insert(1, m);
        let m = Match::create(&mut teams, 2, 2, [1, 3], [2, 4]).unwrap();
        matches.insert(2, m);

        let mut rng = StdRng::seed_from_u64(4);
        set_match_results(&mut rng, &teams, &mut matches, Some(1), 0.0);
        assert!(matches[&1].played);
        assert!(!matches[&2].played);
        assert_eq!(matches[&1].red_score, 55);
        assert_eq!(matches[&1].blue_score, 30);

        set_match_results(&mut rng, &teams, &mut matches, None, 0.0);
        assert!(matches[&2].played);
    }

    #[test]
    fn deterministic_per_seed() {
        let teams = rated_roster(&[60.0, 40.0]);
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            assert_eq!(
                alliance_score(&mut a, &teams, [1, 2], 0.3),
                alliance_score(&mut b, &teams, [1, 2], 0.3)
            );
        }
    }
}

//! Schedule construction: random rounds, Swiss rounds, recorded schedules.

use std::collections::BTreeSet;

use log::warn;
use rand::Rng;

use crate::config::{PairingMethod, SwissOptions};
use crate::data::MatchRecord;
use crate::error::{Error, Result};
use crate::pairing;
use crate::types::{Match, MatchSet, Roster};

/// Random draws allowed while hunting for a legal random matchup before the
/// whole batch is restarted.
const MAX_TRIES: u32 = 100_000;
/// Batch restarts allowed before scheduling gives up.
const MAX_RESTARTS: u32 = 25;

pub fn next_round_number(matches: &MatchSet) -> u32 {
    matches.values().map(Match::round).max().unwrap_or(0) + 1
}

pub fn next_match_number(matches: &MatchSet) -> u32 {
    matches.len() as u32 + 1
}

/// Append `rounds_to_add` rounds of rank-independent random matchups.
///
/// Slot picks are staged and committed only when the whole batch succeeds:
/// a retry restart never leaves half-recorded relations or scheduled
/// counts. Returns the last round number scheduled.
pub fn add_random_rounds<R: Rng>(
    rng: &mut R,
    teams: &mut Roster,
    matches: &mut MatchSet,
    rounds_to_add: u32,
) -> Result<u32> {
    if teams.len() % 4 != 0 {
        return Err(Error::Scheduling(format!(
            "team count {} is not divisible by 4",
            teams.len()
        )));
    }
    let first_round = next_round_number(matches);
    let last_round = first_round + rounds_to_add - 1;
    let numbers: Vec<u32> = teams.keys().copied().collect();
    let matches_per_round = numbers.len() / 4;

    'attempt: for restart in 0..MAX_RESTARTS {
        if restart > 0 {
            warn!("random schedule batch restarted (attempt {})", restart + 1);
        }
        let mut staged: Vec<(u32, [u32; 2], [u32; 2])> = Vec::new();
        let mut tries = 0u32;

        for round in first_round..=last_round {
            let mut taken: BTreeSet<u32> = BTreeSet::new();

            // Seat the first red slot of every match, then fill the rest.
            let mut pool = numbers.clone();
            let mut red1s = Vec::with_capacity(matches_per_round);
            for _ in 0..matches_per_round {
                let pick = rng.gen_range(0..pool.len());
                red1s.push(pool.swap_remove(pick));
            }

            for &red1 in &red1s {
                let mut slots = [0u32; 3];
                for slot in slots.iter_mut() {
                    loop {
                        tries += 1;
                        if tries > MAX_TRIES {
                            continue 'attempt;
                        }
                        let candidate = pool[rng.gen_range(0..pool.len())];
                        if taken.contains(&candidate) {
                            continue;
                        }
                        taken.insert(candidate);
                        *slot = candidate;
                        break;
                    }
                }
                staged.push((round, [red1, slots[0]], [slots[1], slots[2]]));
            }
        }

        // Legal batch found: create the matches for real.
        let mut match_number = next_match_number(matches);
        for (round, red, blue) in staged {
            let m = Match::create(teams, match_number, round, red, blue)?;
            matches.insert(match_number, m);
            match_number += 1;
        }
        return Ok(last_round);
    }

    Err(Error::Scheduling(format!(
        "random schedule generation exhausted {} restarts",
        MAX_RESTARTS
    )))
}

/// Schedule one Swiss round from the current standings.
pub fn add_swiss_round(
    teams: &mut Roster,
    matches: &mut MatchSet,
    round: u32,
    opponent_method: PairingMethod,
    swiss: &SwissOptions,
) -> Result<()> {
    let matchups = pairing::swiss_matchups(teams, opponent_method, swiss)?;
    let mut match_number = next_match_number(matches);
    for (red, blue) in matchups {
        let m = Match::create(teams, match_number, round, red, blue)?;
        matches.insert(match_number, m);
        match_number += 1;
    }
    Ok(())
}

/// Materialize recorded match records against a roster, re-recording
/// relations and scheduled counts for this trial.
pub fn materialize_records(
    teams: &mut Roster,
    records: &[MatchRecord],
    with_results: bool,
) -> Result<MatchSet> {
    let mut matches = MatchSet::new();
    for (i, record) in records.iter().enumerate() {
        let number = i as u32 + 1;
        let mut m = Match::create(teams, number, record.round, record.red, record.blue)?;
        if with_results && record.played {
            m.set_result(record.red_score, record.blue_score);
            m.red_penalty = record.red_penalty;
            m.blue_penalty = record.blue_penalty;
        }
        matches.insert(number, m);
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Team;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster(n: u32) -> Roster {
        (1..=n).map(|i| (i, Team::new(i, format!("Team {}", i)))).collect()
    }

    #[test]
    fn random_round_schedules_everyone_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut teams = roster(16);
        let mut matches = MatchSet::new();

        let last = add_random_rounds(&mut rng, &mut teams, &mut matches, 1).unwrap();
        assert_eq!(last, 1);
        assert_eq!(matches.len(), 4);

        let mut seen = BTreeSet::new();
        for m in matches.values() {
            assert_eq!(m.round(), 1);
            for t in m.teams() {
                assert!(seen.insert(t), "team {} scheduled twice", t);
            }
        }
        assert_eq!(seen.len(), 16);
        for t in teams.values() {
            assert_eq!(t.scheduled, 1);
        }
    }

    #[test]
    fn random_rounds_accumulate() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut teams = roster(8);
        let mut matches = MatchSet::new();

        add_random_rounds(&mut rng, &mut teams, &mut matches, 3).unwrap();
        assert_eq!(matches.len(), 6);
        assert_eq!(next_round_number(&matches), 4);
        assert_eq!(next_match_number(&matches), 7);
        for t in teams.values() {
            assert_eq!(t.scheduled, 3);
        }
    }

    #[test]
    fn random_rejects_bad_team_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut teams = roster(6);
        let mut matches = MatchSet::new();
        assert!(add_random_rounds(&mut rng, &mut teams, &mut matches, 1).is_err());
    }

    #[test]
    fn swiss_round_uses_standings() {
        let mut teams = roster(8);
        for (i, t) in teams.values_mut().enumerate() {
            t.rank = i as u32 + 1;
        }
        let mut matches = MatchSet::new();
        let swiss = SwissOptions::default();

        add_swiss_round(&mut teams, &mut matches, 1, PairingMethod::Fold, &swiss).unwrap();
        assert_eq!(matches.len(), 2);
        for m in matches.values() {
            assert_eq!(m.round(), 1);
        }
        for t in teams.values() {
            assert_eq!(t.scheduled, 1);
            assert_eq!(t.opponents.len(), 2);
            assert_eq!(t.partners.len(), 1);
        }
    }

    #[test]
    fn materialize_replays_results() {
        let mut teams = roster(4);
        let records = vec![MatchRecord {
            round: 1,
            red: [1, 2],
            blue: [3, 4],
            played: true,
            red_score: 120,
            blue_score: 100,
            red_penalty: 10,
            blue_penalty: 0,
        }];

        let matches = materialize_records(&mut teams, &records, true).unwrap();
        let m = &matches[&1];
        assert!(m.played);
        assert_eq!(m.red_score, 120);
        assert_eq!(m.red_penalty, 10);
        assert!(teams[&1].has_opposed(3));

        // Without results the schedule stays unplayed.
        let mut teams = roster(4);
        let matches = materialize_records(&mut teams, &records, false).unwrap();
        assert!(!matches[&1].played);
    }
}

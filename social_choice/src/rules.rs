use itertools::Itertools;
use log::{debug, info};

use std::fmt::Display;
use std::str::FromStr;

use crate::config::*;
use crate::profile::{copy_profile, remove_candidate, Profile};
use crate::ranking::{sort_scores, ScoreTable, SortDirection};

/// Anything that maps a profile to a social preference ordering.
///
/// Implemented by [`VotingRule`] and by plain functions and closures with the
/// signature of the rule functions of this module, so the property checks
/// accept user-defined rules as well.
pub trait SocialWelfareFunction {
    fn evaluate(&self, profile: &Profile) -> Result<RuleOutcome, VotingErrors>;
}

impl<F> SocialWelfareFunction for F
where
    F: Fn(&Profile) -> Result<RuleOutcome, VotingErrors>,
{
    fn evaluate(&self, profile: &Profile) -> Result<RuleOutcome, VotingErrors> {
        self(profile)
    }
}

/// The rules of the registry.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VotingRule {
    Plurality,
    Veto,
    Borda,
    Irv,
    Copeland,
}

/// All the rules, in a fixed order.
pub const RULES: [VotingRule; 5] = [
    VotingRule::Plurality,
    VotingRule::Veto,
    VotingRule::Borda,
    VotingRule::Irv,
    VotingRule::Copeland,
];

impl VotingRule {
    pub fn name(&self) -> &'static str {
        match self {
            VotingRule::Plurality => "plurality",
            VotingRule::Veto => "veto",
            VotingRule::Borda => "borda",
            VotingRule::Irv => "irv",
            VotingRule::Copeland => "copeland",
        }
    }

    pub fn apply(&self, profile: &Profile) -> Result<RuleOutcome, VotingErrors> {
        match self {
            VotingRule::Plurality => plurality(profile),
            VotingRule::Veto => veto(profile),
            VotingRule::Borda => borda(profile),
            VotingRule::Irv => irv(profile),
            VotingRule::Copeland => copeland(profile),
        }
    }
}

impl SocialWelfareFunction for VotingRule {
    fn evaluate(&self, profile: &Profile) -> Result<RuleOutcome, VotingErrors> {
        self.apply(profile)
    }
}

impl Display for VotingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for VotingRule {
    type Err = VotingErrors;

    fn from_str(s: &str) -> Result<VotingRule, VotingErrors> {
        let lower = s.trim().to_lowercase();
        RULES
            .iter()
            .find(|r| r.name() == lower)
            .cloned()
            .ok_or_else(|| {
                VotingErrors::InvalidArgument(format!(
                    "unknown voting rule {:?}, expected one of {}",
                    s,
                    RULES.iter().map(|r| r.name()).join(", ")
                ))
            })
    }
}

fn empty_tally(profile: &Profile) -> Result<ScoreTable, VotingErrors> {
    if profile.num_candidates() == 0 {
        return Err(VotingErrors::InvalidArgument(
            "the profile does not rank any candidate".to_string(),
        ));
    }
    Ok(ScoreTable::zeroed(profile.candidates()))
}

fn plurality_tally(profile: &Profile) -> Result<(Vec<Candidate>, ScoreTable), VotingErrors> {
    let mut tally = empty_tally(profile)?;
    for ballot in profile.ballots() {
        if let Some(top) = ballot.first() {
            tally.add(top, 1)?;
        }
    }
    Ok((sort_scores(&tally, SortDirection::Descending), tally))
}

/// Scores each candidate by the number of ballots ranking it first.
pub fn plurality(profile: &Profile) -> Result<RuleOutcome, VotingErrors> {
    let (ordering, tally) = plurality_tally(profile)?;
    debug!("plurality: tally: {:?}", tally);
    Ok(RuleOutcome {
        ordering,
        scores: Scores::Single(tally),
    })
}

/// Scores each candidate by the number of ballots ranking it last.
/// The fewest vetoes win.
pub fn veto(profile: &Profile) -> Result<RuleOutcome, VotingErrors> {
    let mut tally = empty_tally(profile)?;
    for ballot in profile.ballots() {
        if let Some(bottom) = ballot.last() {
            tally.add(bottom, 1)?;
        }
    }
    debug!("veto: tally: {:?}", tally);
    Ok(RuleOutcome {
        ordering: sort_scores(&tally, SortDirection::Ascending),
        scores: Scores::Single(tally),
    })
}

/// Scores each candidate by the sum of its 0-based positions.
/// The lowest total wins.
pub fn borda(profile: &Profile) -> Result<RuleOutcome, VotingErrors> {
    let mut tally = empty_tally(profile)?;
    for ballot in profile.ballots() {
        for (idx, c) in ballot.iter().enumerate() {
            tally.add(c, idx as i64)?;
        }
    }
    debug!("borda: tally: {:?}", tally);
    Ok(RuleOutcome {
        ordering: sort_scores(&tally, SortDirection::Ascending),
        scores: Scores::Single(tally),
    })
}

/// Pairwise majority tally.
///
/// Every pair of candidates is decided by plurality on the profile restricted
/// to the pair. The winner gains one point and the loser loses one. A tied
/// pair leaves both tallies unchanged, so the tallies always sum to zero.
pub fn copeland(profile: &Profile) -> Result<RuleOutcome, VotingErrors> {
    let mut tally = empty_tally(profile)?;
    for (a, b) in profile.candidates().iter().tuple_combinations() {
        let pair = profile.restricted_to(&[a.clone(), b.clone()])?;
        let (pair_ordering, pair_tally) = plurality_tally(&pair)?;
        if pair_tally.get(a) == pair_tally.get(b) {
            debug!("copeland: {} and {} are tied: {:?}", a, b, pair_tally);
            continue;
        }
        match pair_ordering.as_slice() {
            [winner, loser] => {
                debug!("copeland: {} beats {}: {:?}", winner, loser, pair_tally);
                tally.add(winner, 1)?;
                tally.add(loser, -1)?;
            }
            _ => {
                return Err(VotingErrors::InvariantViolation(format!(
                    "pairwise contest between {} and {} produced {:?}",
                    a, b, pair_ordering
                )));
            }
        }
    }
    debug!("copeland: tally: {:?}", tally);
    Ok(RuleOutcome {
        ordering: sort_scores(&tally, SortDirection::Descending),
        scores: Scores::Single(tally),
    })
}

/// Instant-runoff voting.
///
/// Runs plurality on a shrinking copy of the profile and eliminates the last
/// candidate of each round until a single candidate remains. The ordering is
/// the remaining candidate followed by the eliminated candidates, last
/// eliminated first. The scores hold the plurality table of every round:
/// `m - 1` rounds for `m` candidates.
pub fn irv(profile: &Profile) -> Result<RuleOutcome, VotingErrors> {
    let mut current = copy_profile(profile);
    if current.num_candidates() == 0 {
        return Err(VotingErrors::InvalidArgument(
            "the profile does not rank any candidate".to_string(),
        ));
    }

    let mut rounds: Vec<ScoreTable> = Vec::new();
    let mut eliminated: Vec<Candidate> = Vec::new();
    while current.num_candidates() > 1 {
        let before = current.num_candidates();
        let (ordering, tally) = plurality_tally(&current)?;
        let loser = ordering.last().cloned().ok_or_else(|| {
            VotingErrors::InvariantViolation("round produced an empty ordering".to_string())
        })?;
        debug!(
            "irv: round {}: tally: {:?}, eliminating {}",
            rounds.len() + 1,
            tally,
            loser
        );
        remove_candidate(&mut current, &loser)?;
        // Invariant: exactly one candidate leaves per round.
        if current.num_candidates() + 1 != before {
            return Err(VotingErrors::InvariantViolation(format!(
                "round {} went from {} to {} candidates",
                rounds.len() + 1,
                before,
                current.num_candidates()
            )));
        }
        rounds.push(tally);
        eliminated.push(loser);
    }

    let winner = match current.candidates() {
        [w] => w.clone(),
        other => {
            return Err(VotingErrors::InvariantViolation(format!(
                "elimination ended with {} candidates",
                other.len()
            )));
        }
    };
    let mut ordering = vec![winner];
    ordering.extend(eliminated.into_iter().rev());
    if ordering.len() != profile.num_candidates() {
        return Err(VotingErrors::InvariantViolation(format!(
            "ordering has {} candidates, the profile has {}",
            ordering.len(),
            profile.num_candidates()
        )));
    }
    info!("irv: {} rounds, ordering: {:?}", rounds.len(), ordering);
    Ok(RuleOutcome {
        ordering,
        scores: Scores::Rounds(rounds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn sample() -> Profile {
        Profile::from_names(&[
            vec!["a", "b", "c", "d"],
            vec!["a", "b", "d", "c"],
            vec!["a", "b", "d", "c"],
            vec!["a", "b", "d", "c"],
            vec!["a", "d", "c", "b"],
            vec!["a", "d", "c", "b"],
            vec!["a", "b", "c", "d"],
            vec!["b", "c", "d", "a"],
            vec!["a", "b", "c", "d"],
            vec!["a", "b", "c", "d"],
            vec!["b", "a", "c", "d"],
        ])
        .unwrap()
    }

    fn names(ordering: &[Candidate]) -> Vec<&str> {
        ordering.iter().map(|c| c.name()).collect()
    }

    fn score(outcome: &RuleOutcome, name: &str) -> i64 {
        outcome
            .scores
            .final_table()
            .and_then(|t| t.get(&Candidate::from(name)))
            .unwrap()
    }

    #[test]
    fn all_rules_agree_on_sample() {
        init();
        let p = sample();
        for rule in RULES {
            let outcome = rule.apply(&p).unwrap();
            assert_eq!(names(&outcome.ordering), vec!["a", "b", "c", "d"], "{}", rule);
        }
    }

    #[test]
    fn sample_scores() {
        let p = sample();
        let pl = plurality(&p).unwrap();
        assert_eq!(score(&pl, "a"), 9);
        assert_eq!(score(&pl, "b"), 2);
        assert_eq!(score(&pl, "c"), 0);

        let v = veto(&p).unwrap();
        assert_eq!(score(&v, "a"), 1);
        assert_eq!(score(&v, "b"), 2);
        assert_eq!(score(&v, "c"), 3);
        assert_eq!(score(&v, "d"), 5);

        let b = borda(&p).unwrap();
        assert_eq!(score(&b, "a"), 4);
        assert_eq!(score(&b, "b"), 13);
        assert_eq!(score(&b, "c"), 24);
        assert_eq!(score(&b, "d"), 25);

        let c = copeland(&p).unwrap();
        assert_eq!(score(&c, "a"), 3);
        assert_eq!(score(&c, "b"), 1);
        assert_eq!(score(&c, "c"), -1);
        assert_eq!(score(&c, "d"), -3);
    }

    #[test]
    fn orderings_are_permutations_of_the_candidates() {
        let p = Profile::from_names(&[
            vec!["e", "d", "c", "b", "a"],
            vec!["c", "a", "e", "b", "d"],
            vec!["b", "e", "a", "d", "c"],
            vec!["a", "c", "b", "e", "d"],
        ])
        .unwrap();
        let expected: HashSet<&Candidate> = p.candidates().iter().collect();
        for rule in RULES {
            let outcome = rule.apply(&p).unwrap();
            assert_eq!(outcome.ordering.len(), p.num_candidates(), "{}", rule);
            let got: HashSet<&Candidate> = outcome.ordering.iter().collect();
            assert_eq!(got, expected, "{}", rule);
        }
    }

    #[test]
    fn rules_are_idempotent_and_do_not_mutate() {
        let p = sample();
        for rule in RULES {
            let first = rule.apply(&p).unwrap();
            let second = rule.apply(&p).unwrap();
            assert_eq!(first, second, "{}", rule);
        }
        assert_eq!(p, sample());
    }

    #[test]
    fn irv_runs_one_round_per_eliminated_candidate() {
        init();
        let p = Profile::from_names(&[
            vec!["a", "b", "c", "d", "e"],
            vec!["b", "c", "a", "d", "e"],
            vec!["c", "b", "a", "e", "d"],
            vec!["d", "a", "b", "c", "e"],
            vec!["a", "c", "b", "d", "e"],
        ])
        .unwrap();
        let outcome = irv(&p).unwrap();
        let rounds = outcome.scores.rounds();
        assert_eq!(rounds.len(), 4);
        for (idx, round) in rounds.iter().enumerate() {
            assert_eq!(round.len(), 5 - idx);
            assert_eq!(round.total(), 5);
        }
        // Round 1: a=2 b=1 c=1 d=1 e=0, e goes.
        // Round 2: d goes (ties with b and c, last in candidate order).
        // Round 3: a=3 b=1 c=1, c goes. Round 4: a=3 b=2, b goes.
        assert_eq!(names(&outcome.ordering), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn irv_single_candidate() {
        let p = Profile::from_names(&[vec!["solo"], vec!["solo"]]).unwrap();
        let outcome = irv(&p).unwrap();
        assert_eq!(names(&outcome.ordering), vec!["solo"]);
        assert!(outcome.scores.rounds().is_empty());
        assert_eq!(outcome.scores.final_table(), None);
    }

    #[test]
    fn copeland_tallies_sum_to_zero() {
        // a ties with both b and c, b beats c 3-1.
        let p = Profile::from_names(&[
            vec!["a", "b", "c"],
            vec!["b", "a", "c"],
            vec!["c", "a", "b"],
            vec!["b", "c", "a"],
        ])
        .unwrap();
        let outcome = copeland(&p).unwrap();
        let table = outcome.scores.final_table().unwrap();
        assert_eq!(table.total(), 0);
        assert_eq!(table.get(&Candidate::from("b")), Some(1));
        assert_eq!(table.get(&Candidate::from("a")), Some(0));
        assert_eq!(table.get(&Candidate::from("c")), Some(-1));
    }

    #[test]
    fn plurality_ties_go_to_the_first_candidate() {
        let p = Profile::from_names(&[vec!["y", "x"], vec!["x", "y"]]).unwrap();
        assert_eq!(names(&plurality(&p).unwrap().ordering), vec!["x", "y"]);
    }

    #[test]
    fn rules_reject_profiles_without_candidates() {
        let mut p = Profile::from_names(&[vec!["a"]]).unwrap();
        remove_candidate(&mut p, &Candidate::from("a")).unwrap();
        for rule in RULES {
            assert!(
                matches!(rule.apply(&p), Err(VotingErrors::InvalidArgument(_))),
                "{}",
                rule
            );
        }
    }

    #[test]
    fn registry_parses_names() {
        assert_eq!("Borda".parse::<VotingRule>(), Ok(VotingRule::Borda));
        assert_eq!(" irv ".parse::<VotingRule>(), Ok(VotingRule::Irv));
        assert!("range".parse::<VotingRule>().is_err());
        let names: Vec<&str> = RULES.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["plurality", "veto", "borda", "irv", "copeland"]);
    }

    #[test]
    fn closures_are_rules() {
        let p = sample();
        let always_reverse = |profile: &Profile| -> Result<RuleOutcome, VotingErrors> {
            let mut outcome = borda(profile)?;
            outcome.ordering.reverse();
            Ok(outcome)
        };
        let outcome = always_reverse.evaluate(&p).unwrap();
        assert_eq!(names(&outcome.ordering), vec!["d", "c", "b", "a"]);
    }
}

use itertools::Itertools;
use log::{debug, info};
use num::rational::Ratio;

use std::collections::HashMap;

use crate::config::*;
use crate::profile::Profile;
use crate::rules::SocialWelfareFunction;

/// A profile together with its pairwise preference counts.
///
/// `counts[i][j]` is the number of ballots ranking candidate `i` strictly
/// above candidate `j`, with rows and columns in the profile's candidate
/// order. Probabilities are derived from these integer counts, so the
/// unanimity check never depends on floating point equality.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PreferenceProfile {
    profile: Profile,
    counts: Vec<Vec<u64>>,
}

impl PreferenceProfile {
    pub fn new(profile: Profile) -> PreferenceProfile {
        let counts = pairwise_counts(&profile);
        PreferenceProfile { profile, counts }
    }

    /// Replaces the profile and recomputes the matrix.
    pub fn set_profile(&mut self, profile: Profile) {
        self.counts = pairwise_counts(&profile);
        self.profile = profile;
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Number of voters.
    pub fn n(&self) -> usize {
        self.profile.num_voters()
    }

    /// Number of candidates.
    pub fn m(&self) -> usize {
        self.profile.num_candidates()
    }

    pub fn names(&self) -> &[Candidate] {
        self.profile.candidates()
    }

    pub fn index_of(&self, candidate: &Candidate) -> Option<usize> {
        self.names().binary_search(candidate).ok()
    }

    pub fn preference_count(&self, i: usize, j: usize) -> Option<u64> {
        self.counts.get(i).and_then(|row| row.get(j)).cloned()
    }

    /// The exact fraction of ballots ranking `i` above `j`.
    pub fn probability_ratio(&self, i: usize, j: usize) -> Option<Ratio<u64>> {
        let n = self.n() as u64;
        self.preference_count(i, j).map(|c| Ratio::new(c, n))
    }

    pub fn probability(&self, i: usize, j: usize) -> Option<f64> {
        self.preference_count(i, j)
            .map(|c| c as f64 / self.n() as f64)
    }

    pub fn probability_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.n() as f64;
        self.counts
            .iter()
            .map(|row| row.iter().map(|&c| c as f64 / n).collect())
            .collect()
    }

    /// The matrix with a uniform prior of weight `delta` on every entry:
    /// `(delta + count) / (n + delta)`.
    pub fn smoothed_probability_matrix(&self, delta: f64) -> Vec<Vec<f64>> {
        let denom = self.n() as f64 + delta;
        self.counts
            .iter()
            .map(|row| row.iter().map(|&c| (delta + c as f64) / denom).collect())
            .collect()
    }

    /// True iff every ballot ranks `i` above `j`.
    pub fn is_unanimous(&self, i: usize, j: usize) -> bool {
        self.preference_count(i, j) == Some(self.n() as u64)
    }

    /// Checks that the rule respects every unanimous pairwise preference.
    ///
    /// Returns false as soon as the rule's ordering puts a candidate ahead of
    /// another candidate that every voter ranks above it.
    pub fn unanimity<R: SocialWelfareFunction + ?Sized>(
        &self,
        rule: &R,
    ) -> Result<bool, VotingErrors> {
        let outcome = rule.evaluate(&self.profile)?;
        let position = ordering_positions(&outcome.ordering, self.names())?;
        for (i, a) in self.names().iter().enumerate() {
            for (j, b) in self.names().iter().enumerate() {
                if i != j && self.is_unanimous(i, j) && position[a] > position[b] {
                    info!(
                        "unanimity: every voter prefers {} to {} but the rule ranks {} first",
                        a, b, b
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Exhaustive search for a profitable misreport.
    ///
    /// For every voter whose first choice is not the current winner, tries
    /// all the `m!` ballots they could submit instead. The first misreport
    /// that elects a candidate the voter strictly prefers to the current
    /// winner is returned as a witness.
    ///
    /// This runs `O(n * m!)` rule evaluations. It fails with
    /// `InvalidArgument` when the profile has more than `max_candidates`
    /// candidates.
    pub fn strategyproof<R: SocialWelfareFunction + ?Sized>(
        &self,
        rule: &R,
        max_candidates: usize,
    ) -> Result<ManipulationCheck, VotingErrors> {
        if self.m() > max_candidates {
            return Err(VotingErrors::InvalidArgument(format!(
                "exhaustive strategy-proofness check over {} candidates exceeds the limit of {}",
                self.m(),
                max_candidates
            )));
        }
        let sincere = rule.evaluate(&self.profile)?;
        let winner = sincere.winner().cloned().ok_or_else(|| {
            VotingErrors::InvariantViolation("the rule produced an empty ordering".to_string())
        })?;
        debug!("strategyproof: sincere winner: {}", winner);

        for (voter, ballot) in self.profile.ballots().iter().enumerate() {
            if ballot.first() == Some(&winner) {
                continue;
            }
            let sincere_rank = rank_in(ballot, &winner)?;
            for strategy in self.names().iter().cloned().permutations(self.m()) {
                let trial = self.profile.with_ballot(voter, strategy.clone())?;
                let outcome = rule.evaluate(&trial)?;
                let new_winner = outcome.winner().ok_or_else(|| {
                    VotingErrors::InvariantViolation(
                        "the rule produced an empty ordering".to_string(),
                    )
                })?;
                if rank_in(ballot, new_winner)? < sincere_rank {
                    info!(
                        "strategyproof: voter {} elects {} instead of {} by voting {:?}",
                        voter, new_winner, winner, strategy
                    );
                    return Ok(ManipulationCheck::Manipulable(Manipulation {
                        voter,
                        sincere_ballot: ballot.clone(),
                        strategic_ballot: strategy,
                        sincere_winner: winner,
                        strategic_winner: new_winner.clone(),
                    }));
                }
            }
            debug!("strategyproof: voter {} cannot do better than {}", voter, winner);
        }
        Ok(ManipulationCheck::StrategyProof)
    }

    pub fn is_strategyproof<R: SocialWelfareFunction + ?Sized>(
        &self,
        rule: &R,
        max_candidates: usize,
    ) -> Result<bool, VotingErrors> {
        self.strategyproof(rule, max_candidates)
            .map(|check| check.is_strategyproof())
    }
}

fn pairwise_counts(profile: &Profile) -> Vec<Vec<u64>> {
    let m = profile.num_candidates();
    let index: HashMap<&Candidate, usize> = profile
        .candidates()
        .iter()
        .enumerate()
        .map(|(i, c)| (c, i))
        .collect();
    let mut counts = vec![vec![0u64; m]; m];
    for ballot in profile.ballots() {
        // Every candidate ranked before `c` on this ballot beats it.
        for (pos, c) in ballot.iter().enumerate() {
            let j = index[c];
            for above in ballot[..pos].iter() {
                counts[index[above]][j] += 1;
            }
        }
    }
    counts
}

fn ordering_positions<'a>(
    ordering: &'a [Candidate],
    names: &[Candidate],
) -> Result<HashMap<&'a Candidate, usize>, VotingErrors> {
    let position: HashMap<&Candidate, usize> =
        ordering.iter().enumerate().map(|(i, c)| (c, i)).collect();
    if position.len() != ordering.len()
        || ordering.len() != names.len()
        || names.iter().any(|c| !position.contains_key(c))
    {
        return Err(VotingErrors::InvariantViolation(format!(
            "rule ordering {:?} is not a permutation of the candidates",
            ordering
        )));
    }
    Ok(position)
}

fn rank_in(ballot: &[Candidate], candidate: &Candidate) -> Result<usize, VotingErrors> {
    ballot
        .iter()
        .position(|c| c == candidate)
        .ok_or_else(|| VotingErrors::NotFound(candidate.clone()))
}

use log::debug;

use std::collections::HashSet;

use crate::config::*;

/// A collection of ballots over a common set of candidates.
///
/// Invariants, checked at construction:
/// * there is at least one ballot
/// * every ballot ranks exactly the same candidates, each of them once
///
/// The candidates are kept in sorted order; this order defines the rows and
/// columns of the pairwise matrix and breaks ties between equal scores.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Profile {
    candidates: Vec<Candidate>,
    ballots: Vec<Ballot>,
}

impl Profile {
    pub fn new(ballots: Vec<Ballot>) -> Result<Profile, VotingErrors> {
        let first = ballots.first().ok_or_else(|| {
            VotingErrors::InvalidArgument("a profile needs at least one ballot".to_string())
        })?;
        if first.is_empty() {
            return Err(VotingErrors::InvalidArgument(
                "ballots must rank at least one candidate".to_string(),
            ));
        }
        let mut candidates: Vec<Candidate> = first.clone();
        candidates.sort();
        candidates.dedup();
        if candidates.len() != first.len() {
            return Err(VotingErrors::InvalidArgument(format!(
                "ballot 0 ranks a candidate more than once: {:?}",
                first
            )));
        }

        let expected: HashSet<&Candidate> = candidates.iter().collect();
        for (idx, ballot) in ballots.iter().enumerate().skip(1) {
            check_ranking(idx, ballot, &expected)?;
        }
        debug!(
            "Profile::new: {} ballots over {} candidates",
            ballots.len(),
            candidates.len()
        );
        Ok(Profile { candidates, ballots })
    }

    /// Builds a profile from candidate names.
    ///
    /// ```
    /// use social_choice::Profile;
    /// let p = Profile::from_names(&[vec!["a", "b"], vec!["b", "a"]])?;
    /// assert_eq!(p.num_voters(), 2);
    /// # Ok::<(), social_choice::VotingErrors>(())
    /// ```
    pub fn from_names<S: AsRef<str>>(ballots: &[Vec<S>]) -> Result<Profile, VotingErrors> {
        Profile::new(
            ballots
                .iter()
                .map(|b| b.iter().map(|s| Candidate::from(s.as_ref())).collect())
                .collect(),
        )
    }

    /// The candidates, in sorted order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn ballot(&self, voter: usize) -> Option<&Ballot> {
        self.ballots.get(voter)
    }

    pub fn num_voters(&self) -> usize {
        self.ballots.len()
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub fn contains(&self, candidate: &Candidate) -> bool {
        self.candidates.binary_search(candidate).is_ok()
    }

    /// A copy of this profile in which `voter` submitted `ballot` instead.
    pub fn with_ballot(&self, voter: usize, ballot: Ballot) -> Result<Profile, VotingErrors> {
        if voter >= self.ballots.len() {
            return Err(VotingErrors::InvalidArgument(format!(
                "voter {} out of range, the profile has {} voters",
                voter,
                self.ballots.len()
            )));
        }
        let expected: HashSet<&Candidate> = self.candidates.iter().collect();
        check_ranking(voter, &ballot, &expected)?;
        let mut res = self.clone();
        res.ballots[voter] = ballot;
        Ok(res)
    }

    /// A copy of this profile that only ranks the candidates in `keep`.
    /// Relative orders inside each ballot are preserved.
    pub fn restricted_to(&self, keep: &[Candidate]) -> Result<Profile, VotingErrors> {
        if keep.is_empty() {
            return Err(VotingErrors::InvalidArgument(
                "cannot restrict a profile to no candidates".to_string(),
            ));
        }
        let kept: HashSet<&Candidate> = keep.iter().collect();
        if kept.len() != keep.len() {
            return Err(VotingErrors::InvalidArgument(format!(
                "candidate subset contains duplicates: {:?}",
                keep
            )));
        }
        if let Some(missing) = keep.iter().find(|c| !self.contains(c)) {
            return Err(VotingErrors::NotFound(missing.clone()));
        }
        let mut res = copy_profile(self);
        let to_remove: Vec<Candidate> = self
            .candidates
            .iter()
            .filter(|c| !kept.contains(c))
            .cloned()
            .collect();
        for c in to_remove.iter() {
            remove_candidate(&mut res, c)?;
        }
        Ok(res)
    }

    /// A profile made of the given voters (indices may repeat).
    pub fn select_voters(&self, voters: &[usize]) -> Result<Profile, VotingErrors> {
        let mut ballots: Vec<Ballot> = Vec::with_capacity(voters.len());
        for &v in voters {
            let b = self.ballots.get(v).ok_or_else(|| {
                VotingErrors::InvalidArgument(format!(
                    "voter {} out of range, the profile has {} voters",
                    v,
                    self.ballots.len()
                ))
            })?;
            ballots.push(b.clone());
        }
        if ballots.is_empty() {
            return Err(VotingErrors::InvalidArgument(
                "cannot select an empty electorate".to_string(),
            ));
        }
        Ok(Profile {
            candidates: self.candidates.clone(),
            ballots,
        })
    }

    /// A SHA-256 digest of the ballots, in order.
    ///
    /// Two profiles have the same fingerprint iff they hold the same ballots
    /// in the same order.
    pub fn fingerprint(&self) -> String {
        let lines: Vec<String> = self
            .ballots
            .iter()
            .map(|b| {
                b.iter()
                    .map(|c| format!("{}:{}", c.name().len(), c.name()))
                    .collect::<Vec<String>>()
                    .join(",")
            })
            .collect();
        sha256::digest(lines.join("\n"))
    }
}

fn check_ranking(
    idx: usize,
    ballot: &[Candidate],
    expected: &HashSet<&Candidate>,
) -> Result<(), VotingErrors> {
    if ballot.len() != expected.len() {
        return Err(VotingErrors::InvalidArgument(format!(
            "ballot {} ranks {} candidates, expected {}",
            idx,
            ballot.len(),
            expected.len()
        )));
    }
    let mut seen: HashSet<&Candidate> = HashSet::new();
    for c in ballot.iter() {
        if !expected.contains(c) {
            return Err(VotingErrors::InvalidArgument(format!(
                "ballot {} ranks {} which is not ranked by the other ballots",
                idx, c
            )));
        }
        if !seen.insert(c) {
            return Err(VotingErrors::InvalidArgument(format!(
                "ballot {} ranks {} more than once",
                idx, c
            )));
        }
    }
    Ok(())
}

/// Deep copy. Mutating the copy never affects the original.
pub fn copy_profile(profile: &Profile) -> Profile {
    profile.clone()
}

/// Removes a candidate from every ballot of the profile, in place.
///
/// Fails with `NotFound` if the profile does not rank this candidate, in
/// which case the profile is left untouched.
pub fn remove_candidate(profile: &mut Profile, candidate: &Candidate) -> Result<(), VotingErrors> {
    let pos = profile
        .candidates
        .binary_search(candidate)
        .map_err(|_| VotingErrors::NotFound(candidate.clone()))?;
    profile.candidates.remove(pos);
    for ballot in profile.ballots.iter_mut() {
        ballot.retain(|c| c != candidate);
    }
    Ok(())
}

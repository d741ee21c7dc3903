//! Building profiles: uniformly random electorates, profiles derived from a
//! ratings matrix, sampled teams and reduced sub-profiles.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use std::cmp::Ordering;

use crate::config::*;
use crate::preference::PreferenceProfile;
use crate::profile::Profile;
use crate::rules::SocialWelfareFunction;

/// Candidate names for generated profiles: "00", "01", ...
pub fn default_candidate_names(m: usize) -> Vec<Candidate> {
    (0..m).map(|i| Candidate::new(format!("{:02}", i))).collect()
}

/// `n` voters, each ranking `m` candidates in a uniformly random order.
pub fn make_random_profile<R: Rng + ?Sized>(
    n: usize,
    m: usize,
    rng: &mut R,
) -> Result<PreferenceProfile, VotingErrors> {
    if n == 0 || m == 0 {
        return Err(VotingErrors::InvalidArgument(format!(
            "random profile needs voters and candidates, got n={} m={}",
            n, m
        )));
    }
    let names = default_candidate_names(m);
    let profile = Profile::new(random_ballots(&names, n, rng))?;
    debug!("make_random_profile: n={} m={}", n, m);
    Ok(PreferenceProfile::new(profile))
}

fn random_ballots<R: Rng + ?Sized>(names: &[Candidate], n: usize, rng: &mut R) -> Vec<Ballot> {
    (0..n)
        .map(|_| {
            let mut b = names.to_vec();
            b.shuffle(rng);
            b
        })
        .collect()
}

/// Converts a voters × candidates ratings matrix into rankings.
///
/// Candidate `k` is named after its column with [`default_candidate_names`].
/// Each voter ranks the candidates by decreasing rating; equal ratings put
/// the candidate with the larger name first.
pub fn ratings_to_profile(ratings: &[Vec<f64>]) -> Result<Profile, VotingErrors> {
    let m = ratings.first().map(|r| r.len()).unwrap_or(0);
    let names = default_candidate_names(m);
    let mut ballots: Vec<Ballot> = Vec::with_capacity(ratings.len());
    for (voter, row) in ratings.iter().enumerate() {
        if row.len() != m {
            return Err(VotingErrors::InvalidArgument(format!(
                "ratings row {} has {} entries, expected {}",
                voter,
                row.len(),
                m
            )));
        }
        if let Some(bad) = row.iter().find(|x| !x.is_finite()) {
            return Err(VotingErrors::InvalidArgument(format!(
                "ratings row {} contains a non-finite value {}",
                voter, bad
            )));
        }
        let mut rated: Vec<(f64, &Candidate)> = row.iter().cloned().zip(names.iter()).collect();
        rated.sort_by(|(x, cx), (y, cy)| {
            y.partial_cmp(x)
                .unwrap_or(Ordering::Equal)
                .then_with(|| cy.cmp(cx))
        });
        ballots.push(rated.into_iter().map(|(_, c)| c.clone()).collect());
    }
    Profile::new(ballots)
}

/// A profile restricted to a subset of candidates and/or voters, with the
/// pairwise matrix recomputed on the restriction.
///
/// The original profile is kept, so the sub-profile can be reduced again.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SubProfile {
    original: Profile,
    reduced: PreferenceProfile,
}

impl SubProfile {
    /// Starts without any restriction.
    pub fn new(profile: Profile) -> SubProfile {
        SubProfile {
            reduced: PreferenceProfile::new(profile.clone()),
            original: profile,
        }
    }

    pub fn original(&self) -> &Profile {
        &self.original
    }

    pub fn reduced(&self) -> &PreferenceProfile {
        &self.reduced
    }

    pub fn make_reduced_profile(&mut self, candidates: &[Candidate]) -> Result<(), VotingErrors> {
        self.reduce(candidates, None)
    }

    /// Restricts the original profile to `candidates`, and to the ballots of
    /// `voters` (indices into the original, repetitions allowed) if given.
    pub fn reduce(
        &mut self,
        candidates: &[Candidate],
        voters: Option<&[usize]>,
    ) -> Result<(), VotingErrors> {
        let electorate = match voters {
            Some(v) => self.original.select_voters(v)?,
            None => self.original.clone(),
        };
        let restricted = electorate.restricted_to(candidates)?;
        debug!(
            "SubProfile::reduce: {} voters, candidates {:?}",
            restricted.num_voters(),
            restricted.candidates()
        );
        self.reduced = PreferenceProfile::new(restricted);
        Ok(())
    }

    pub fn unanimity<R: SocialWelfareFunction + ?Sized>(
        &self,
        rule: &R,
    ) -> Result<bool, VotingErrors> {
        self.reduced.unanimity(rule)
    }

    pub fn strategyproof<R: SocialWelfareFunction + ?Sized>(
        &self,
        rule: &R,
        max_candidates: usize,
    ) -> Result<ManipulationCheck, VotingErrors> {
        self.reduced.strategyproof(rule, max_candidates)
    }
}

/// A large observed profile from which smaller teams are drawn.
#[derive(Debug, Clone)]
pub struct EmpiricalProfile {
    preferences: PreferenceProfile,
    smoothed: Vec<Vec<f64>>,
}

impl EmpiricalProfile {
    /// `delta` is the weight of the uniform prior in the smoothed matrix.
    pub fn from_profile(profile: Profile, delta: f64) -> EmpiricalProfile {
        let preferences = PreferenceProfile::new(profile);
        let smoothed = preferences.smoothed_probability_matrix(delta);
        EmpiricalProfile {
            preferences,
            smoothed,
        }
    }

    pub fn from_ratings(ratings: &[Vec<f64>], delta: f64) -> Result<EmpiricalProfile, VotingErrors> {
        let profile = ratings_to_profile(ratings)?;
        info!(
            "EmpiricalProfile: {} voters rating {} candidates",
            profile.num_voters(),
            profile.num_candidates()
        );
        Ok(EmpiricalProfile::from_profile(profile, delta))
    }

    pub fn preferences(&self) -> &PreferenceProfile {
        &self.preferences
    }

    pub fn n(&self) -> usize {
        self.preferences.n()
    }

    pub fn m(&self) -> usize {
        self.preferences.m()
    }

    pub fn names(&self) -> &[Candidate] {
        self.preferences.names()
    }

    pub fn smoothed_probabilities(&self) -> &[Vec<f64>] {
        &self.smoothed
    }

    fn sample_candidates<R: Rng + ?Sized>(
        &self,
        n_cand: usize,
        rng: &mut R,
    ) -> Result<Vec<Candidate>, VotingErrors> {
        if n_cand == 0 || n_cand > self.m() {
            return Err(VotingErrors::InvalidArgument(format!(
                "cannot sample {} of {} candidates",
                n_cand,
                self.m()
            )));
        }
        Ok(self.names().choose_multiple(rng, n_cand).cloned().collect())
    }

    /// `n_team` uniformly random voters over the empirical candidates,
    /// reduced to `n_cand` randomly chosen candidates.
    pub fn make_random_team<R: Rng + ?Sized>(
        &self,
        n_team: usize,
        n_cand: usize,
        rng: &mut R,
    ) -> Result<SubProfile, VotingErrors> {
        if n_team == 0 {
            return Err(VotingErrors::InvalidArgument(
                "a team needs at least one voter".to_string(),
            ));
        }
        let ballots = random_ballots(self.names(), n_team, rng);
        let selected = self.sample_candidates(n_cand, rng)?;
        let mut sub = SubProfile::new(Profile::new(ballots)?);
        sub.make_reduced_profile(&selected)?;
        Ok(sub)
    }

    /// `n_team` voters drawn with replacement from the empirical profile,
    /// reduced to `n_cand` randomly chosen candidates.
    pub fn make_empirical_team<R: Rng + ?Sized>(
        &self,
        n_team: usize,
        n_cand: usize,
        rng: &mut R,
    ) -> Result<SubProfile, VotingErrors> {
        if n_team == 0 {
            return Err(VotingErrors::InvalidArgument(
                "a team needs at least one voter".to_string(),
            ));
        }
        let voters: Vec<usize> = (0..n_team).map(|_| rng.gen_range(0..self.n())).collect();
        let team = self.preferences.profile().select_voters(&voters)?;
        let selected = self.sample_candidates(n_cand, rng)?;
        let mut sub = SubProfile::new(team);
        sub.make_reduced_profile(&selected)?;
        Ok(sub)
    }
}

pub use crate::config::*;

use crate::preference::PreferenceProfile;
use crate::profile::Profile;

/// A builder for adding ballots one at a time.
///
/// Declaring the candidates up front is optional. When they are declared,
/// every ballot is checked against them as it is added.
///
/// ```
/// pub use social_choice::builder::ProfileBuilder;
/// # use social_choice::VotingErrors;
///
/// let mut builder = ProfileBuilder::new()
///     .candidates(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_ballot_simple(&["Bob".to_string(), "Anna".to_string()])?;
/// builder.add_ballot(&["Anna".to_string(), "Bob".to_string()], 2)?;
///
/// let profile = builder.build()?;
/// assert_eq!(profile.n(), 3);
/// assert_eq!(profile.m(), 2);
///
/// # Ok::<(), VotingErrors>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    pub(crate) _candidates: Option<Vec<Candidate>>,
    pub(crate) _ballots: Vec<Ballot>,
}

impl ProfileBuilder {
    pub fn new() -> ProfileBuilder {
        ProfileBuilder {
            _candidates: None,
            _ballots: Vec::new(),
        }
    }

    /// Declares the candidates. Ballots added before are discarded.
    pub fn candidates(self, cands: &[String]) -> Result<ProfileBuilder, VotingErrors> {
        let mut sorted: Vec<Candidate> = cands.iter().map(|s| Candidate::from(s.as_str())).collect();
        sorted.sort();
        sorted.dedup();
        if sorted.len() != cands.len() {
            return Err(VotingErrors::InvalidArgument(format!(
                "candidate list contains duplicates: {:?}",
                cands
            )));
        }
        Ok(ProfileBuilder {
            _candidates: Some(sorted),
            _ballots: Vec::new(),
        })
    }

    /// Adds a single ballot.
    pub fn add_ballot_simple(&mut self, ranking: &[String]) -> Result<(), VotingErrors> {
        self.add_ballot(ranking, 1)
    }

    /// Adds `count` identical ballots. A count of 0 is rejected.
    ///
    /// ranking: the candidates, most preferred first.
    pub fn add_ballot(&mut self, ranking: &[String], count: u32) -> Result<(), VotingErrors> {
        if count == 0 {
            return Err(VotingErrors::InvalidArgument(format!(
                "ballot {:?} has a count of 0",
                ranking
            )));
        }
        let ballot: Ballot = ranking.iter().map(|s| Candidate::from(s.as_str())).collect();
        if let Some(declared) = self._candidates.as_deref() {
            if let Some(unknown) = ballot.iter().find(|c| declared.binary_search(c).is_err()) {
                return Err(VotingErrors::NotFound(unknown.clone()));
            }
        }
        for _ in 0..count {
            self._ballots.push(ballot.clone());
        }
        Ok(())
    }

    pub fn num_ballots(&self) -> usize {
        self._ballots.len()
    }

    /// Validates the ballots and computes the pairwise matrix.
    pub fn build(self) -> Result<PreferenceProfile, VotingErrors> {
        let profile = Profile::new(self._ballots)?;
        if let Some(declared) = self._candidates {
            if declared.as_slice() != profile.candidates() {
                return Err(VotingErrors::InvalidArgument(format!(
                    "ballots rank {:?} but the declared candidates are {:?}",
                    profile.candidates(),
                    declared
                )));
            }
        }
        Ok(PreferenceProfile::new(profile))
    }
}

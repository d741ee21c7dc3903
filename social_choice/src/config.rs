// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use crate::ranking::ScoreTable;

/// An opaque candidate identifier.
///
/// Candidates are compared and ordered by name. The lexicographic order is the
/// canonical order of the candidates in a profile, and it is also the order
/// used to break ties between equal scores.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct Candidate(String);

impl Candidate {
    pub fn new(name: impl Into<String>) -> Candidate {
        Candidate(name.into())
    }

    pub fn name(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for Candidate {
    fn from(name: &str) -> Candidate {
        Candidate(name.to_string())
    }
}

impl From<String> for Candidate {
    fn from(name: String) -> Candidate {
        Candidate(name)
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strict ranking of all the candidates, most preferred first.
pub type Ballot = Vec<Candidate>;

// ******** Output data structures *********

/// The scores computed by a rule.
///
/// Single-pass rules produce one table. Instant-runoff produces one table per
/// elimination round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Scores {
    Single(ScoreTable),
    Rounds(Vec<ScoreTable>),
}

impl Scores {
    /// The table of a single-pass rule, or the table of the last round.
    ///
    /// Instant-runoff on a single candidate has no rounds and hence no table.
    pub fn final_table(&self) -> Option<&ScoreTable> {
        match self {
            Scores::Single(table) => Some(table),
            Scores::Rounds(rounds) => rounds.last(),
        }
    }

    pub fn rounds(&self) -> &[ScoreTable] {
        match self {
            Scores::Single(table) => std::slice::from_ref(table),
            Scores::Rounds(rounds) => rounds.as_slice(),
        }
    }
}

/// The social preference ordering (most preferred first) and the scores
/// that produced it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RuleOutcome {
    pub ordering: Vec<Candidate>,
    pub scores: Scores,
}

impl RuleOutcome {
    pub fn winner(&self) -> Option<&Candidate> {
        self.ordering.first()
    }
}

/// A successful misreport: the voter gets a candidate they strictly prefer
/// to the sincere winner by submitting `strategic_ballot`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Manipulation {
    pub voter: usize,
    pub sincere_ballot: Ballot,
    pub strategic_ballot: Ballot,
    pub sincere_winner: Candidate,
    pub strategic_winner: Candidate,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ManipulationCheck {
    StrategyProof,
    Manipulable(Manipulation),
}

impl ManipulationCheck {
    pub fn is_strategyproof(&self) -> bool {
        matches!(self, ManipulationCheck::StrategyProof)
    }

    pub fn witness(&self) -> Option<&Manipulation> {
        match self {
            ManipulationCheck::StrategyProof => None,
            ManipulationCheck::Manipulable(m) => Some(m),
        }
    }
}

/// Errors that prevent a rule or a check from completing.
///
/// `InvalidArgument` and `NotFound` point at bad input, `InvariantViolation`
/// at a broken internal invariant.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingErrors {
    InvalidArgument(String),
    NotFound(Candidate),
    InvariantViolation(String),
}

impl Error for VotingErrors {}

impl Display for VotingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingErrors::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            VotingErrors::NotFound(c) => write!(f, "candidate not found: {}", c),
            VotingErrors::InvariantViolation(msg) => write!(f, "invariant violated: {}", msg),
        }
    }
}

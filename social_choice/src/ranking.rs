use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::*;

/// Which end of the score range wins.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SortDirection {
    /// Lower scores are better (veto, Borda).
    Ascending,
    /// Higher scores are better (plurality, Copeland).
    Descending,
}

impl FromStr for SortDirection {
    type Err = VotingErrors;

    fn from_str(s: &str) -> Result<SortDirection, VotingErrors> {
        match s {
            "ascending" => Ok(SortDirection::Ascending),
            "descending" => Ok(SortDirection::Descending),
            x => Err(VotingErrors::InvalidArgument(format!(
                "unknown sort direction {:?}, expected 'ascending' or 'descending'",
                x
            ))),
        }
    }
}

/// A score for every candidate of a profile.
///
/// The key set is fixed when the table is created: updating a candidate that
/// is not in the table is an invariant violation, not an insertion.
/// Iteration follows the candidate order.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ScoreTable {
    scores: BTreeMap<Candidate, i64>,
}

impl ScoreTable {
    pub fn zeroed(candidates: &[Candidate]) -> ScoreTable {
        ScoreTable {
            scores: candidates.iter().map(|c| (c.clone(), 0)).collect(),
        }
    }

    pub(crate) fn add(&mut self, candidate: &Candidate, delta: i64) -> Result<(), VotingErrors> {
        match self.scores.get_mut(candidate) {
            Some(score) => {
                *score += delta;
                Ok(())
            }
            None => Err(VotingErrors::InvariantViolation(format!(
                "candidate {} is not part of the score table",
                candidate
            ))),
        }
    }

    pub fn get(&self, candidate: &Candidate) -> Option<i64> {
        self.scores.get(candidate).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Candidate, i64)> {
        self.scores.iter().map(|(c, s)| (c, *s))
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.scores.keys()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn total(&self) -> i64 {
        self.scores.values().sum()
    }
}

impl FromIterator<(Candidate, i64)> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = (Candidate, i64)>>(iter: I) -> ScoreTable {
        ScoreTable {
            scores: iter.into_iter().collect(),
        }
    }
}

/// Orders the candidates of a table from best to worst.
///
/// Equal scores keep the table order, so the candidate with the smaller name
/// comes first. This is the same as repeatedly extracting the best remaining
/// candidate and keeping the first one seen on ties.
pub fn sort_scores(scores: &ScoreTable, direction: SortDirection) -> Vec<Candidate> {
    let mut entries: Vec<(&Candidate, i64)> = scores.iter().collect();
    // Both sorts are stable.
    match direction {
        SortDirection::Ascending => entries.sort_by_key(|(_, s)| *s),
        SortDirection::Descending => entries.sort_by_key(|(_, s)| Reverse(*s)),
    }
    entries.into_iter().map(|(c, _)| c.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, i64)]) -> ScoreTable {
        entries
            .iter()
            .map(|(name, score)| (Candidate::from(*name), *score))
            .collect()
    }

    fn names(ordering: &[Candidate]) -> Vec<&str> {
        ordering.iter().map(|c| c.name()).collect()
    }

    #[test]
    fn descending_puts_highest_first() {
        let t = table(&[("a", 1), ("b", 5), ("c", 3)]);
        assert_eq!(names(&sort_scores(&t, SortDirection::Descending)), vec!["b", "c", "a"]);
    }

    #[test]
    fn ascending_puts_lowest_first() {
        let t = table(&[("a", 1), ("b", 5), ("c", 3)]);
        assert_eq!(names(&sort_scores(&t, SortDirection::Ascending)), vec!["a", "c", "b"]);
    }

    #[test]
    fn ties_follow_candidate_order() {
        // Insertion order does not matter, the table is keyed by candidate.
        let t = table(&[("d", 2), ("b", 2), ("c", 7), ("a", 2)]);
        assert_eq!(
            names(&sort_scores(&t, SortDirection::Descending)),
            vec!["c", "a", "b", "d"]
        );
        assert_eq!(
            names(&sort_scores(&t, SortDirection::Ascending)),
            vec!["a", "b", "d", "c"]
        );
    }

    #[test]
    fn unknown_direction_is_rejected() {
        assert_eq!("descending".parse::<SortDirection>(), Ok(SortDirection::Descending));
        assert!(matches!(
            "sideways".parse::<SortDirection>(),
            Err(VotingErrors::InvalidArgument(_))
        ));
    }

    #[test]
    fn updates_outside_the_key_set_fail() {
        let mut t = ScoreTable::zeroed(&[Candidate::from("a")]);
        t.add(&Candidate::from("a"), 3).unwrap();
        assert_eq!(t.get(&Candidate::from("a")), Some(3));
        assert!(matches!(
            t.add(&Candidate::from("z"), 1),
            Err(VotingErrors::InvariantViolation(_))
        ));
        assert_eq!(t.len(), 1);
    }
}

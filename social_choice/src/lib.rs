/*!
Ordinal voting rules and the analysis of their properties.

The crate computes social preference orderings from ranked ballots under
plurality, veto, Borda, instant-runoff and Copeland, and checks on a given
profile whether a rule respects unanimous preferences and whether any voter
could benefit from misreporting their ballot.

```
use social_choice::*;

let profile = Profile::from_names(&[
    vec!["a", "b", "c"],
    vec!["b", "a", "c"],
    vec!["b", "a", "c"],
])?;
let outcome = borda(&profile)?;
assert_eq!(outcome.winner(), Some(&Candidate::from("b")));

let analysis = PreferenceProfile::new(profile);
assert!(analysis.unanimity(&VotingRule::Borda)?);
// The first voter can elect `a` by burying `b`.
assert!(!analysis.is_strategyproof(&VotingRule::Borda, 7)?);
# Ok::<(), VotingErrors>(())
```

See the [manual] for the tie-breaking conventions.
*/

mod config;
mod construction;
mod preference;
mod profile;
mod ranking;
mod rules;

pub mod builder;
pub mod manual;

pub use crate::config::*;
pub use crate::construction::*;
pub use crate::preference::*;
pub use crate::profile::*;
pub use crate::ranking::*;
pub use crate::rules::*;

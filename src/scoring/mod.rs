// URL scoring — fixed rule-list heuristics over a URL string.
//
// `rules` holds the rule table and the scorer itself; `verdict` holds the
// result types. The scorer is pure: no I/O, no shared state.

pub mod rules;
pub mod verdict;

pub use rules::{analyze_url, RuleSet};
pub use verdict::{Status, Verdict};

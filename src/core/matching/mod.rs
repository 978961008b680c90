pub mod selector;
pub mod similarity;

pub use selector::*;

/// A subtitle entry offered by a catalog. `id` is only ever handed back to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub name: String,
    pub id: String,
}

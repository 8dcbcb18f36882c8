mod debounce;
mod dropdown;
mod engine;
mod groups;
mod operators;
mod splice;
mod types;

pub use debounce::{Debouncer, NoResultCache};
pub use dropdown::Dropdown;
pub use engine::{AutocompleteSettings, Autocompleter};
pub use groups::{GroupLimits, create_search_groups};
pub use operators::operator_group;
pub use splice::{Splice, apply_candidate};
pub use types::{AutocompleteGroup, CandidateGroup, CandidateItem, GroupKind, Icon, ItemKind};

use crate::registry::Operator;
use crate::tags::{FieldKind, TagDescriptor, ValueSource};

use super::types::{AutocompleteGroup, CandidateItem, GroupKind, ItemKind};

/// "Operator Helpers" group for a filter key. Unknown keys are treated as strings.
#[must_use]
pub fn operator_group(tag: Option<&TagDescriptor>, tag_name: &str) -> AutocompleteGroup {
    let operators = match tag {
        Some(tag) => tag.valid_operators(),
        None => TagDescriptor::new(tag_name, FieldKind::String, ValueSource::Lookup)
            .valid_operators(),
    };

    AutocompleteGroup {
        items: operators
            .into_iter()
            .map(|op| operator_item(op, tag_name))
            .collect(),
        recent: Vec::new(),
        tag_name: String::new(),
        kind: GroupKind::TagOperator,
    }
}

fn operator_item(op: Operator, tag_name: &str) -> CandidateItem {
    CandidateItem::new(op.spelling(), op.describe(tag_name), ItemKind::TagOperator)
}

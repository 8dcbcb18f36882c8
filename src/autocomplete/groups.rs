use super::types::{AutocompleteGroup, CandidateGroup, CandidateItem, GroupKind, Icon};

/// Limits applied when turning raw groups into dropdown groups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupLimits {
    pub max_items: Option<usize>,
    /// Characters left before the query hits its maximum length
    pub chars_left: Option<usize>,
}

impl GroupLimits {
    #[must_use]
    pub fn for_query(query: &str, max_items: Option<usize>, max_query_length: Option<usize>) -> Self {
        let chars_left = max_query_length
            .filter(|_| !query.is_empty())
            .map(|max| max.saturating_sub(query.chars().count()));
        Self {
            max_items,
            chars_left,
        }
    }

    fn fits(&self, item: &CandidateItem) -> bool {
        self.chars_left
            .is_none_or(|left| item.value.chars().count() <= left)
    }
}

/// Applies the item limit and length limit and splits off recent searches.
///
/// The primary group is dropped when empty, except an invalid-tag group which
/// exists to tell the user the key is unknown.
#[must_use]
pub fn create_search_groups(group: AutocompleteGroup, limits: &GroupLimits) -> Vec<CandidateGroup> {
    let AutocompleteGroup {
        items,
        recent,
        tag_name,
        kind,
    } = group;

    let items: Vec<CandidateItem> = items
        .into_iter()
        .enumerate()
        .filter(|(i, item)| limits.max_items.is_none_or(|max| *i < max) || item.ignore_max_items)
        .map(|(_, item)| item)
        .filter(|item| limits.fits(item))
        .collect();

    let recent: Vec<CandidateItem> = recent.into_iter().filter(|item| limits.fits(item)).collect();

    let mut groups = Vec::new();

    if !items.is_empty() || kind == GroupKind::InvalidTag {
        groups.push(CandidateGroup {
            title: kind.title(),
            kind,
            icon: Icon::for_group(kind, &tag_name),
            tag_name,
            items,
        });
    }

    if !recent.is_empty() {
        groups.push(CandidateGroup {
            title: GroupKind::RecentSearch.title(),
            kind: GroupKind::RecentSearch,
            icon: Icon::Clock,
            tag_name: String::new(),
            items: recent,
        });
    }

    groups
}

use super::types::{CandidateGroup, CandidateItem, ItemKind};

/// Dropdown contents plus the keyboard highlight, addressed as one flat list
/// across all groups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dropdown {
    groups: Vec<CandidateGroup>,
    active: Option<usize>,
}

impl Dropdown {
    #[must_use]
    pub fn new(groups: Vec<CandidateGroup>) -> Self {
        Self {
            groups,
            active: None,
        }
    }

    /// Replaces the groups and drops the highlight.
    pub fn set_groups(&mut self, groups: Vec<CandidateGroup>) {
        self.groups = groups;
        self.active = None;
    }

    #[must_use]
    pub fn groups(&self) -> &[CandidateGroup] {
        &self.groups
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> impl Iterator<Item = &CandidateItem> {
        self.groups.iter().flat_map(|g| g.items.iter())
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<&CandidateItem> {
        self.items().nth(index)
    }

    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    #[must_use]
    pub fn active_item(&self) -> Option<&CandidateItem> {
        self.active.and_then(|i| self.item(i))
    }

    /// Highlighted item if Enter should accept it. Common search terms are
    /// only accepted by picking them directly.
    #[must_use]
    pub fn accept_target(&self) -> Option<&CandidateItem> {
        self.active_item()
            .filter(|item| item.kind != ItemKind::Default)
    }

    pub fn select_next(&mut self) {
        let count = self.len();
        if count == 0 {
            return;
        }
        self.active = Some(match self.active {
            Some(i) if i + 1 < count => i + 1,
            _ => 0,
        });
    }

    pub fn select_prev(&mut self) {
        let count = self.len();
        if count == 0 {
            return;
        }
        self.active = Some(match self.active {
            Some(i) if i > 0 => i - 1,
            _ => count - 1,
        });
    }

    pub fn clear_selection(&mut self) {
        self.active = None;
    }

}

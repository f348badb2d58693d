//! Branch filter for the Stock screen.

use inventory_gateway::models::{Branch, BranchId};

/// `All` is the aggregated, all-branches view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BranchFilter {
    #[default]
    All,
    Branch(BranchId),
}

impl From<Option<BranchId>> for BranchFilter {
    fn from(value: Option<BranchId>) -> Self {
        value.map_or(BranchFilter::All, BranchFilter::Branch)
    }
}

impl From<BranchFilter> for Option<BranchId> {
    fn from(value: BranchFilter) -> Self {
        match value {
            BranchFilter::All => None,
            BranchFilter::Branch(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterState {
    pub filter: BranchFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    ShowAll,
    SelectBranch(BranchId),
    /// What a branch dropdown emits: `None` for its "All branches" entry.
    Set(Option<BranchId>),
}

pub fn reduce(_state: FilterState, action: FilterAction) -> FilterState {
    let filter = match action {
        FilterAction::ShowAll => BranchFilter::All,
        FilterAction::SelectBranch(id) => BranchFilter::Branch(id),
        FilterAction::Set(id) => BranchFilter::from(id),
    };
    FilterState { filter }
}

/// `"name - location"` for the selected branch. `None` when showing all
/// branches or when the id is not among `branches`.
pub fn branch_label(filter: BranchFilter, branches: &[Branch]) -> Option<String> {
    let BranchFilter::Branch(id) = filter else {
        return None;
    };
    branches
        .iter()
        .find(|branch| branch.id == id)
        .map(|branch| format!("{} - {}", branch.name, branch.location))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reducer_transitions() {
        let state = FilterState::default();
        assert_eq!(state.filter, BranchFilter::All);

        let state = reduce(state, FilterAction::SelectBranch(BranchId(2)));
        assert_eq!(state.filter, BranchFilter::Branch(BranchId(2)));

        let state = reduce(state, FilterAction::Set(Some(BranchId(3))));
        assert_eq!(state.filter, BranchFilter::Branch(BranchId(3)));

        assert_eq!(reduce(state, FilterAction::Set(None)).filter, BranchFilter::All);
        assert_eq!(reduce(state, FilterAction::ShowAll).filter, BranchFilter::All);
    }

    #[test]
    fn option_round_trip() {
        assert_eq!(Option::<BranchId>::from(BranchFilter::All), None);
        assert_eq!(
            Option::<BranchId>::from(BranchFilter::from(Some(BranchId(5)))),
            Some(BranchId(5))
        );
    }

    #[test]
    fn label() {
        let branches = vec![Branch {
            id: BranchId(1),
            name: "Main Store".into(),
            location: "High Street".into(),
        }];
        assert_eq!(
            branch_label(BranchFilter::Branch(BranchId(1)), &branches).as_deref(),
            Some("Main Store - High Street")
        );
        assert_eq!(branch_label(BranchFilter::Branch(BranchId(2)), &branches), None);
        assert_eq!(branch_label(BranchFilter::All, &branches), None);
    }
}

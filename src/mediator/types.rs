//! Mediator outcome types

use serde::Serialize;

/// Result of one successful mediator cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediatorOutcome {
    /// The remote has nothing beyond what was just merged
    pub end_of_pagination: bool,
    /// Items fetched and merged in this cycle
    pub fetched: usize,
}

impl MediatorOutcome {
    /// Terminal outcome that did no work
    pub fn end() -> Self {
        Self {
            end_of_pagination: true,
            fetched: 0,
        }
    }

    pub fn merged(fetched: usize) -> Self {
        Self {
            end_of_pagination: fetched == 0,
            fetched,
        }
    }
}

/// Whether a pager should refresh before serving cached rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InitializeAction {
    LaunchInitialRefresh,
    SkipInitialRefresh,
}

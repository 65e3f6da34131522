//! Degradable listing result for read paths that never break the feed.

use studyfinder_core::models::group::GroupDetails;

/// Result of a listing or search read.
///
/// Store failures on these paths degrade to an empty feed instead of an
/// error, but `degraded` lets callers (and tests) tell "no matches" from
/// "backend failure". The failure is also logged at warn level.
#[derive(Debug, Default)]
pub struct Feed {
    pub groups: Vec<GroupDetails>,
    pub degraded: bool,
}

use crate::features::reports::controllers::FeedState;
use crate::features::reports::models::ReportId;

/// Outcome of asking to resolve a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveDecision {
    /// Send `ReportPatch::Resolve` for this id
    Issue(ReportId),
    /// The cached feed already shows it resolved; nothing is written and
    /// `resolvedAt` keeps its first stamp
    AlreadyResolved,
}

/// Decide whether a resolve request goes to the store.
///
/// Ids missing from the cached feed are still sent; the store rejects
/// records that do not exist. Role is not consulted here.
pub fn decide_resolution(feed: &FeedState, id: &str) -> ResolveDecision {
    match feed.find(id) {
        Some(report) if !report.is_pending() => ResolveDecision::AlreadyResolved,
        _ => ResolveDecision::Issue(id.to_string()),
    }
}

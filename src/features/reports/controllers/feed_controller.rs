use crate::features::reports::models::Report;

/// Sort newest first by `createdAt`; reports without a timestamp sink to the
/// bottom. The sort is stable, so ties keep snapshot order.
pub fn sort_by_recency(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Feed controller state: the last snapshot of the collection, live only
/// while a session identity exists.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    reports: Vec<Report>,
    live: bool,
}

impl FeedState {
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn find(&self, id: &str) -> Option<&Report> {
        self.reports.iter().find(|report| report.id == id)
    }

    pub fn open(&mut self) {
        self.live = true;
    }

    /// Tear the feed down and forget the cached list
    pub fn close(&mut self) {
        self.live = false;
        self.reports.clear();
    }

    /// Replace the whole list with a snapshot. Returns false when the feed is
    /// not live and the snapshot was dropped.
    pub fn apply_snapshot(&mut self, mut reports: Vec<Report>) -> bool {
        if !self.live {
            return false;
        }
        sort_by_recency(&mut reports);
        self.reports = reports;
        true
    }
}

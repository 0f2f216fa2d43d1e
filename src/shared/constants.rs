use std::time::Duration;

/// How long the "Report Submitted" confirmation stays up before moving to the feed
pub const SUCCESS_DISPLAY_DURATION: Duration = Duration::from_secs(2);

// =============================================================================
// REPORT CONSTANTS
// =============================================================================

/// Category a fresh draft starts with
pub const DEFAULT_CATEGORY: &str = "Infrastructure";

/// Options offered by the report form's category select.
/// Submission does not enforce membership.
pub const REPORT_CATEGORIES: [&str; 5] = [
    "Infrastructure",
    "Sanitation",
    "Safety",
    "Environment",
    "Other",
];

// =============================================================================
// FIREBASE CONSTANTS
// =============================================================================

/// Page size used when listing the report collection
pub const FIRESTORE_PAGE_SIZE: u32 = 300;

/// Refresh the ID token this long before it expires
pub const ID_TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

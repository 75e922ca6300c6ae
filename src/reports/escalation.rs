//! Report-count escalation rule
//!
//! Once enough distinct users have reported a listing it is forced to
//! `Flagged`. A `Rejected` listing is never touched. There is no automatic
//! way back: clearing `Flagged` is a moderator action.

use crate::db::schemas::ModerationStatus;

/// Report count at which a listing is flagged
pub const REPORT_ESCALATION_THRESHOLD: i32 = 3;

/// Status a listing should hold after its report count became `report_count`
pub fn escalated_status(current: ModerationStatus, report_count: i32) -> ModerationStatus {
    if report_count >= REPORT_ESCALATION_THRESHOLD && current != ModerationStatus::Rejected {
        ModerationStatus::Flagged
    } else {
        current
    }
}

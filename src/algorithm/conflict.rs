// Meeting overlap detection. The single source of truth for time conflicts,
// used by both schedule construction and post-hoc validation.

use crate::models::{Meeting, MeetingTime, Section};

/// True iff the two meetings share a weekday and their [start, end) minute
/// intervals overlap. Online and unschedulable meetings never conflict with
/// anything, including each other. Pure and total.
pub fn conflicts(a: &Meeting, b: &Meeting) -> bool {
    let (
        MeetingTime::Weekly {
            days: days_a,
            start_minutes: start_a,
            end_minutes: end_a,
        },
        MeetingTime::Weekly {
            days: days_b,
            start_minutes: start_b,
            end_minutes: end_b,
        },
    ) = (&a.time, &b.time)
    else {
        return false;
    };

    if !days_a.iter().any(|d| days_b.contains(d)) {
        return false;
    }
    start_a < end_b && start_b < end_a
}

/// True iff any meeting of `section` conflicts with any meeting of `other`.
pub fn sections_conflict(section: &Section, other: &Section) -> bool {
    section
        .meetings
        .iter()
        .any(|a| other.meetings.iter().any(|b| conflicts(a, b)))
}

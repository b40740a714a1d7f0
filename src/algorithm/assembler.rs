// Greedy schedule assembly. Candidates are processed in caller order (the
// primary tie-break), each course gets the best-ranked section that fits the
// meetings already committed, and unplaceable courses are recorded rather
// than aborting the request.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::algorithm::conflict::conflicts;
use crate::algorithm::eligibility::eligible;
use crate::catalog::Catalog;
use crate::models::{
    CoreCode, Course, CourseId, Meeting, MeetingTime, Placement, PreferenceSet, ScheduleCandidate,
    Section, SkipReason, SkippedCourse, StudentContext,
};

/// Total pairwise meeting comparisons allowed per request. The candidate
/// pool is small and finite, so this only trips on pathological input; the
/// assembler then fails closed and returns the best partial schedule.
pub const MAX_MEETING_COMPARISONS: usize = 50_000;

/// Backfill never pushes a schedule past a full-time credit load.
pub const MAX_CREDITS: f32 = 18.0;

/// Result of one assembly run. The schedule satisfies the no-conflict
/// invariant unconditionally; `skipped` is exhaustive over the caller's
/// candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembleOutcome {
    pub schedule: ScheduleCandidate,
    pub skipped: Vec<SkippedCourse>,
    pub covered_cores: Vec<CoreCode>,
    pub missing_cores: Vec<CoreCode>,
    pub total_credits: f32,
}

impl AssembleOutcome {
    pub fn fully_satisfied(&self) -> bool {
        self.skipped.is_empty() && self.missing_cores.is_empty()
    }
}

/// Assemble a schedule from `candidates` in the given order, then backfill
/// outstanding core requirements when `auto_fill` is set. With auto-fill off
/// an empty candidate list yields an empty schedule, never padding.
pub fn assemble(
    catalog: &Catalog,
    candidates: &[CourseId],
    context: &StudentContext,
    auto_fill: bool,
) -> AssembleOutcome {
    let mut search = Search::new();
    let mut schedule = ScheduleCandidate::default();
    let mut skipped: Vec<SkippedCourse> = Vec::new();
    let mut seen: BTreeSet<CourseId> = BTreeSet::new();
    let mut total_credits = 0.0f32;

    for id in candidates {
        if !seen.insert(id.clone()) {
            continue; // duplicate request; the first occurrence decided
        }
        let Some(course) = catalog.course(id) else {
            debug!(course = %id, "requested course not in catalog");
            skipped.push(SkippedCourse {
                course_id: id.clone(),
                reason: SkipReason::Ineligible,
            });
            continue;
        };
        if !eligible(course, context) {
            skipped.push(SkippedCourse {
                course_id: course.id.clone(),
                reason: SkipReason::Ineligible,
            });
            continue;
        }
        if search.exhausted {
            skipped.push(SkippedCourse {
                course_id: course.id.clone(),
                reason: SkipReason::Conflict,
            });
            continue;
        }
        match place(course, &context.preferences, &mut search) {
            PlaceResult::Placed(section) => {
                total_credits += course.credits;
                schedule.placements.push(Placement {
                    course_id: course.id.clone(),
                    section: section.clone(),
                    auto_filled: false,
                });
            }
            PlaceResult::NoSections => skipped.push(SkippedCourse {
                course_id: course.id.clone(),
                reason: SkipReason::NoOpenSection,
            }),
            PlaceResult::AllConflict => skipped.push(SkippedCourse {
                course_id: course.id.clone(),
                reason: SkipReason::Conflict,
            }),
        }
    }

    if search.exhausted {
        warn!(
            comparisons = search.comparisons,
            "comparison budget exhausted, returning partial schedule"
        );
    }

    if auto_fill {
        backfill(catalog, context, &mut schedule, &mut search, &mut total_credits);
    }

    let (covered_cores, missing_cores) = core_coverage(catalog, context, &schedule);
    debug!(
        placed = schedule.placements.len(),
        skipped = skipped.len(),
        comparisons = search.comparisons,
        "assembly finished"
    );

    AssembleOutcome {
        schedule,
        skipped,
        covered_cores,
        missing_cores,
        total_credits,
    }
}

/// Meetings committed so far plus the comparison budget.
struct Search {
    committed: Vec<Meeting>,
    comparisons: usize,
    exhausted: bool,
}

impl Search {
    fn new() -> Search {
        Search {
            committed: Vec::new(),
            comparisons: 0,
            exhausted: false,
        }
    }

    /// Pairwise check against every committed meeting, counting against the
    /// budget.
    fn fits(&mut self, section: &Section) -> bool {
        for meeting in &section.meetings {
            for existing in &self.committed {
                if self.comparisons >= MAX_MEETING_COMPARISONS {
                    self.exhausted = true;
                    return false;
                }
                self.comparisons += 1;
                if conflicts(meeting, existing) {
                    return false;
                }
            }
        }
        true
    }

    fn commit(&mut self, section: &Section) {
        self.committed.extend(section.meetings.iter().cloned());
    }
}

enum PlaceResult<'c> {
    Placed(&'c Section),
    /// Nothing to even try: every section was unschedulable or disqualified
    /// by a hard preference.
    NoSections,
    /// Sections existed but all of them clash with the committed meetings.
    AllConflict,
}

fn place<'c>(
    course: &'c Course,
    preferences: &PreferenceSet,
    search: &mut Search,
) -> PlaceResult<'c> {
    let ranked = ranked_sections(course, preferences);
    if ranked.is_empty() {
        return PlaceResult::NoSections;
    }
    for section in ranked {
        if search.fits(section) {
            search.commit(section);
            return PlaceResult::Placed(section);
        }
        if search.exhausted {
            break;
        }
    }
    PlaceResult::AllConflict
}

/// Sections worth trying, best first: open before closed (closed is still
/// offered when nothing else fits), then fewer soft preference violations,
/// then stable catalog order. Hard violations disqualify a section outright.
fn ranked_sections<'c>(course: &'c Course, preferences: &PreferenceSet) -> Vec<&'c Section> {
    let mut ranked: Vec<(bool, usize, usize)> = Vec::new();
    for (idx, section) in course.sections.iter().enumerate() {
        if !section.is_schedulable() {
            continue;
        }
        if violates_hard(section, preferences) {
            continue;
        }
        ranked.push((!section.is_open, soft_violations(section, preferences), idx));
    }
    ranked.sort();
    ranked
        .into_iter()
        .map(|(_, _, idx)| &course.sections[idx])
        .collect()
}

/// Excluded weekdays and out-of-bounds times disqualify a section entirely;
/// so does an off-campus meeting when the campus preference is strict.
fn violates_hard(section: &Section, preferences: &PreferenceSet) -> bool {
    for meeting in &section.meetings {
        let MeetingTime::Weekly {
            days,
            start_minutes,
            end_minutes,
        } = &meeting.time
        else {
            continue;
        };
        if days.iter().any(|d| preferences.excluded_weekdays.contains(d)) {
            return true;
        }
        if let Some(earliest) = preferences.earliest_start {
            if *start_minutes < earliest {
                return true;
            }
        }
        if let Some(latest) = preferences.latest_end {
            if *end_minutes > latest {
                return true;
            }
        }
        if preferences.strict_campuses && off_preferred_campus(meeting, preferences) {
            return true;
        }
    }
    false
}

fn off_preferred_campus(meeting: &Meeting, preferences: &PreferenceSet) -> bool {
    if preferences.preferred_campuses.is_empty() || meeting.campus.is_empty() {
        return false;
    }
    !preferences
        .preferred_campuses
        .iter()
        .any(|c| c.eq_ignore_ascii_case(&meeting.campus))
}

/// Advisory campus preference: count in-person meetings held off the
/// preferred campuses.
fn soft_violations(section: &Section, preferences: &PreferenceSet) -> usize {
    section
        .meetings
        .iter()
        .filter(|m| matches!(m.time, MeetingTime::Weekly { .. }))
        .filter(|m| off_preferred_campus(m, preferences))
        .count()
}

/// Fill outstanding core requirements from the eligible catalog, smallest
/// tag-count-to-unfulfilled-tags ratio first so tightly targeted courses are
/// tried before broad multi-tag ones, stopping once every requested tag is
/// covered, the pool runs dry, or the credit cap would be exceeded.
fn backfill(
    catalog: &Catalog,
    context: &StudentContext,
    schedule: &mut ScheduleCandidate,
    search: &mut Search,
    total_credits: &mut f32,
) {
    let mut missing: BTreeSet<CoreCode> = context.desired_cores.iter().copied().collect();
    for placement in &schedule.placements {
        if let Some(course) = catalog.course(&placement.course_id) {
            for code in &course.core_codes {
                missing.remove(code);
            }
        }
    }
    if missing.is_empty() {
        return;
    }

    let mut pool: Vec<(usize, usize, &Course)> = Vec::new();
    for course in catalog.courses() {
        if schedule.contains(&course.id) {
            continue;
        }
        let overlap = course
            .core_codes
            .iter()
            .filter(|c| missing.contains(c))
            .count();
        if overlap == 0 {
            continue;
        }
        if !eligible(course, context) {
            continue;
        }
        pool.push((course.core_codes.len(), overlap, course));
    }
    // ratio ordering via cross multiplication keeps the sort in integers
    pool.sort_by(|a, b| {
        (a.0 * b.1)
            .cmp(&(b.0 * a.1))
            .then_with(|| a.2.id.cmp(&b.2.id))
    });

    for (_, _, course) in pool {
        if missing.is_empty() || search.exhausted {
            break;
        }
        if !course.core_codes.iter().any(|c| missing.contains(c)) {
            continue; // already covered by an earlier backfill pick
        }
        if *total_credits + course.credits > MAX_CREDITS {
            continue;
        }
        if let PlaceResult::Placed(section) = place(course, &context.preferences, search) {
            debug!(course = %course.id, "backfilled core requirement");
            *total_credits += course.credits;
            for code in &course.core_codes {
                missing.remove(code);
            }
            schedule.placements.push(Placement {
                course_id: course.id.clone(),
                section: section.clone(),
                auto_filled: true,
            });
        }
    }
}

/// Split the requested core codes into covered and still-missing, preserving
/// request order and dropping duplicates.
fn core_coverage(
    catalog: &Catalog,
    context: &StudentContext,
    schedule: &ScheduleCandidate,
) -> (Vec<CoreCode>, Vec<CoreCode>) {
    let mut satisfied: BTreeSet<CoreCode> = BTreeSet::new();
    for placement in &schedule.placements {
        if let Some(course) = catalog.course(&placement.course_id) {
            satisfied.extend(course.core_codes.iter().copied());
        }
    }

    let mut covered = Vec::new();
    let mut missing = Vec::new();
    let mut seen: BTreeSet<CoreCode> = BTreeSet::new();
    for code in &context.desired_cores {
        if !seen.insert(*code) {
            continue;
        }
        if satisfied.contains(code) {
            covered.push(*code);
        } else {
            missing.push(*code);
        }
    }
    (covered, missing)
}

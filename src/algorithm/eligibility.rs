// Eligibility rules: which courses a student may legally take. Applied once
// per request to narrow the catalog before assembly, never re-run mid-search.

use crate::models::{Course, PrerequisiteRule, Standing, StudentContext};

/// True iff the student may take `course`:
/// - already-completed courses are out;
/// - first-years only get courses marked safe for them (sophomore-or-above
///   lifts this entirely);
/// - at least one prerequisite rule must be satisfied. Prerequisites still
///   apply to sophomores, minus any standing-override rule.
pub fn eligible(course: &Course, context: &StudentContext) -> bool {
    if context.completed.contains(&course.id) {
        return false;
    }
    if context.standing == Standing::FirstYear && !course.first_year_safe {
        return false;
    }
    prerequisites_met(course, context)
}

/// OR-of-rules policy: any single fully-satisfied rule clears the course,
/// and a course with no rules has nothing to satisfy. This is a deliberate
/// simplification of the registrar's full boolean prerequisite trees.
pub fn prerequisites_met(course: &Course, context: &StudentContext) -> bool {
    if course.prerequisites.is_empty() {
        return true;
    }
    course.prerequisites.iter().any(|rule| match rule {
        PrerequisiteRule::RequiredSet(required) => {
            required.iter().all(|id| context.completed.contains(id))
        }
        PrerequisiteRule::StandingOverride => context.standing == Standing::SophomoreOrAbove,
    })
}

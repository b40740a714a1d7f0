// The schedule assembly pipeline: eligibility narrowing, conflict
// detection, and greedy placement with core-requirement backfill.

pub mod assembler;
pub mod conflict;
pub mod eligibility;

pub use assembler::{AssembleOutcome, MAX_CREDITS, MAX_MEETING_COMPARISONS, assemble};
pub use conflict::{conflicts, sections_conflict};
pub use eligibility::{eligible, prerequisites_met};

use crate::catalog::Catalog;
use crate::models::{CoreCode, Course, StudentContext};

/// Optional narrowing for [`eligible_courses`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseFilter {
    /// Subject code prefix, e.g. "220". Zero-padded before matching.
    pub subject: Option<String>,
    pub core: Option<CoreCode>,
}

/// Courses the student may take right now, in stable catalog order,
/// optionally narrowed by subject prefix and/or core code.
pub fn eligible_courses<'c>(
    catalog: &'c Catalog,
    context: &StudentContext,
    filter: &CourseFilter,
) -> Vec<&'c Course> {
    let subject = filter
        .subject
        .as_ref()
        .map(|s| format!("{:0>3}", s.trim()));
    catalog
        .courses()
        .filter(|course| match &subject {
            Some(prefix) => course.id.subject() == prefix,
            None => true,
        })
        .filter(|course| match filter.core {
            Some(code) => course.core_codes.contains(&code),
            None => true,
        })
        .filter(|course| eligible(course, context))
        .collect()
}

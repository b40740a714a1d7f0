// JSON request/response types for the scheduling API. Responses carry both
// 12-hour display strings and machine-parseable 24-hour fields so downstream
// rendering never needs to re-parse time text.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::algorithm::{AssembleOutcome, CourseFilter};
use crate::catalog::Catalog;
use crate::errors::RequestError;
use crate::models::{
    CoreCode, Course, CourseId, Meeting, MeetingTime, PreferenceSet, Section, SkippedCourse,
    Standing, StudentContext,
};
use crate::normalize;

/// Input parameters for `POST /assemble`.
///
/// # Expected JSON shape:
/// ```json
/// {
///   "session_id": "ab12cd",
///   "courses": ["220:102", "220:103"],
///   "standing": "first_year",
///   "completed": ["640:151"],
///   "core_codes": ["WCd", "QQ"],
///   "auto_fill": true,
///   "preferences": {
///     "excluded_days": ["F"],
///     "earliest_start": "10:00",
///     "latest_end": "6:00 PM",
///     "preferred_campuses": ["BUS", "LIV"],
///     "strict_campuses": false
///   }
/// }
/// ```
///
/// `courses` is ordered; earlier entries win ties during assembly.
/// `completed` is merged with any history stored under `session_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembleRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub courses: Vec<String>,
    pub standing: Standing,
    #[serde(default)]
    pub completed: Vec<String>,
    #[serde(default)]
    pub core_codes: Vec<String>,
    #[serde(default)]
    pub auto_fill: bool,
    #[serde(default)]
    pub preferences: RawPreferences,
}

/// Preference fields as the interpretation layer sends them: raw day tokens
/// and time strings, normalized here with typed failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPreferences {
    #[serde(default)]
    pub excluded_days: Vec<String>,
    #[serde(default)]
    pub earliest_start: Option<String>,
    #[serde(default)]
    pub latest_end: Option<String>,
    #[serde(default)]
    pub preferred_campuses: Vec<String>,
    #[serde(default)]
    pub strict_campuses: bool,
}

impl RawPreferences {
    pub fn resolve(&self) -> Result<PreferenceSet, RequestError> {
        let mut excluded_weekdays = BTreeSet::new();
        for token in &self.excluded_days {
            excluded_weekdays.insert(normalize::parse_day_token(token)?);
        }
        let earliest_start = match &self.earliest_start {
            Some(raw) => Some(normalize::parse_time(raw)?),
            None => None,
        };
        let latest_end = match &self.latest_end {
            Some(raw) => Some(normalize::parse_time(raw)?),
            None => None,
        };
        Ok(PreferenceSet {
            excluded_weekdays,
            earliest_start,
            latest_end,
            preferred_campuses: self.preferred_campuses.clone(),
            strict_campuses: self.strict_campuses,
        })
    }
}

impl AssembleRequest {
    /// Build the student context, folding in history accumulated under the
    /// caller's session.
    pub fn context(&self, session_completed: &[CourseId]) -> Result<StudentContext, RequestError> {
        let mut completed: BTreeSet<CourseId> =
            self.completed.iter().map(|s| CourseId::new(s)).collect();
        completed.extend(session_completed.iter().cloned());

        let mut desired_cores = Vec::new();
        for raw in &self.core_codes {
            let code =
                CoreCode::parse(raw).ok_or_else(|| RequestError::UnknownCore(raw.clone()))?;
            if !desired_cores.contains(&code) {
                desired_cores.push(code);
            }
        }

        Ok(StudentContext {
            standing: self.standing,
            completed,
            desired_cores,
            preferences: self.preferences.resolve()?,
        })
    }

    pub fn candidate_ids(&self) -> Vec<CourseId> {
        self.courses.iter().map(|s| CourseId::new(s)).collect()
    }
}

/// Input parameters for `POST /courses/eligible`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibleRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub standing: Standing,
    #[serde(default)]
    pub completed: Vec<String>,
    /// Subject code prefix filter, e.g. "220".
    #[serde(default)]
    pub subject: Option<String>,
    /// Core code filter, e.g. "WCd".
    #[serde(default)]
    pub core: Option<String>,
}

impl EligibleRequest {
    pub fn context(&self, session_completed: &[CourseId]) -> StudentContext {
        let mut completed: BTreeSet<CourseId> =
            self.completed.iter().map(|s| CourseId::new(s)).collect();
        completed.extend(session_completed.iter().cloned());
        StudentContext {
            standing: self.standing,
            completed,
            desired_cores: Vec::new(),
            preferences: PreferenceSet::default(),
        }
    }

    pub fn filter(&self) -> Result<CourseFilter, RequestError> {
        let core = match &self.core {
            Some(raw) => Some(
                CoreCode::parse(raw).ok_or_else(|| RequestError::UnknownCore(raw.clone()))?,
            ),
            None => None,
        };
        Ok(CourseFilter {
            subject: self.subject.clone(),
            core,
        })
    }
}

/// Body for `POST /sessions/{id}/completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUpdateRequest {
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    FullySatisfied,
    PartiallyFilled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingView {
    /// Canonical weekday names, empty for online meetings.
    pub days: Vec<String>,
    /// 24-hour machine-parseable times.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// 12-hour display strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_display: Option<String>,
    pub online: bool,
    pub schedulable: bool,
    /// Why the meeting could not be normalized, when it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    pub building: String,
    pub room: String,
    pub campus: String,
}

impl MeetingView {
    pub fn from_meeting(meeting: &Meeting) -> MeetingView {
        let mut view = MeetingView {
            days: Vec::new(),
            start_time: None,
            end_time: None,
            start_display: None,
            end_display: None,
            online: false,
            schedulable: true,
            issue: None,
            building: meeting.building.clone(),
            room: meeting.room.clone(),
            campus: meeting.campus.clone(),
        };
        match &meeting.time {
            MeetingTime::Weekly {
                days,
                start_minutes,
                end_minutes,
            } => {
                view.days = days.iter().map(|d| d.name().to_string()).collect();
                view.start_time = Some(normalize::display_24h(*start_minutes));
                view.end_time = Some(normalize::display_24h(*end_minutes));
                view.start_display = Some(normalize::display_12h(*start_minutes));
                view.end_display = Some(normalize::display_12h(*end_minutes));
            }
            MeetingTime::Online => view.online = true,
            MeetingTime::Unschedulable { reason } => {
                view.schedulable = false;
                view.issue = Some(reason.clone());
            }
        }
        view
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionView {
    pub number: String,
    pub registration_index: String,
    pub is_open: bool,
    pub instructor: String,
    pub campus: String,
    pub meetings: Vec<MeetingView>,
}

impl SectionView {
    pub fn from_section(section: &Section) -> SectionView {
        SectionView {
            number: section.number.clone(),
            registration_index: section.registration_index.clone(),
            is_open: section.is_open,
            instructor: section.instructor.clone(),
            campus: section.campus.clone(),
            meetings: section.meetings.iter().map(MeetingView::from_meeting).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    pub course_id: CourseId,
    pub title: String,
    pub credits: f32,
    pub core_codes: Vec<CoreCode>,
    pub open_sections: usize,
    pub first_year_safe: bool,
    pub has_prerequisites: bool,
}

impl CourseSummary {
    pub fn from_course(course: &Course) -> CourseSummary {
        CourseSummary {
            course_id: course.id.clone(),
            title: course.title.clone(),
            credits: course.credits,
            core_codes: course.core_codes.clone(),
            open_sections: course.open_section_count(),
            first_year_safe: course.first_year_safe,
            has_prerequisites: !course.prerequisites.is_empty(),
        }
    }
}

/// Full course listing for `GET /courses/{id}`, non-schedulable meetings
/// included and marked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseView {
    #[serde(flatten)]
    pub summary: CourseSummary,
    pub prerequisite_text: String,
    pub sections: Vec<SectionView>,
}

impl CourseView {
    pub fn from_course(course: &Course) -> CourseView {
        CourseView {
            summary: CourseSummary::from_course(course),
            prerequisite_text: course.prerequisite_text.clone(),
            sections: course.sections.iter().map(SectionView::from_section).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementView {
    pub course_id: CourseId,
    pub title: String,
    pub credits: f32,
    pub section_number: String,
    pub registration_index: String,
    pub is_open: bool,
    pub instructor: String,
    pub campus: String,
    pub core_codes: Vec<CoreCode>,
    pub auto_filled: bool,
    pub meetings: Vec<MeetingView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembleResponse {
    pub status: ScheduleStatus,
    pub schedule: Vec<PlacementView>,
    /// Courses added by core backfill rather than requested explicitly.
    pub auto_added: Vec<CourseId>,
    pub skipped: Vec<SkippedCourse>,
    pub covered_cores: Vec<CoreCode>,
    pub missing_cores: Vec<CoreCode>,
    pub total_credits: f32,
}

impl AssembleResponse {
    pub fn build(outcome: &AssembleOutcome, catalog: &Catalog) -> AssembleResponse {
        let mut schedule = Vec::new();
        let mut auto_added = Vec::new();
        for placement in &outcome.schedule.placements {
            let course = catalog.course(&placement.course_id);
            schedule.push(PlacementView {
                course_id: placement.course_id.clone(),
                title: course.map(|c| c.title.clone()).unwrap_or_default(),
                credits: course.map(|c| c.credits).unwrap_or_default(),
                section_number: placement.section.number.clone(),
                registration_index: placement.section.registration_index.clone(),
                is_open: placement.section.is_open,
                instructor: placement.section.instructor.clone(),
                campus: placement.section.campus.clone(),
                core_codes: course.map(|c| c.core_codes.clone()).unwrap_or_default(),
                auto_filled: placement.auto_filled,
                meetings: placement
                    .section
                    .meetings
                    .iter()
                    .map(MeetingView::from_meeting)
                    .collect(),
            });
            if placement.auto_filled {
                auto_added.push(placement.course_id.clone());
            }
        }
        let status = if outcome.fully_satisfied() {
            ScheduleStatus::FullySatisfied
        } else {
            ScheduleStatus::PartiallyFilled
        };
        AssembleResponse {
            status,
            schedule,
            auto_added,
            skipped: outcome.skipped.clone(),
            covered_cores: outcome.covered_cores.clone(),
            missing_cores: outcome.missing_cores.clone(),
            total_credits: outcome.total_credits,
        }
    }
}

// Core data structures for the scheduling engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Course identifier in `subject:number` form, e.g. "220:102".
///
/// Construction zero-pads both components to three digits so that
/// "1:95" and "001:095" name the same course. Strings that do not look
/// like a subject/number pair are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    pub fn new(raw: &str) -> CourseId {
        let trimmed = raw.trim();
        if let Some((subject, number)) = trimmed.split_once(':') {
            if !subject.is_empty()
                && !number.is_empty()
                && subject.chars().all(|c| c.is_ascii_digit())
                && number.chars().all(|c| c.is_ascii_digit())
            {
                return CourseId(format!("{subject:0>3}:{number:0>3}"));
            }
        }
        CourseId(trimmed.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Subject code prefix ("220" for "220:102").
    pub fn subject(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Weekdays a meeting can occupy. No weekend meetings are modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }
}

/// SAS core-requirement codes a course may satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoreCode {
    AHo,
    AHp,
    AHq,
    CCD,
    CCO,
    HST,
    ITR,
    NS,
    QQ,
    QR,
    SCL,
    WCd,
    WCr,
}

impl CoreCode {
    pub const ALL: [CoreCode; 13] = [
        CoreCode::AHo,
        CoreCode::AHp,
        CoreCode::AHq,
        CoreCode::CCD,
        CoreCode::CCO,
        CoreCode::HST,
        CoreCode::ITR,
        CoreCode::NS,
        CoreCode::QQ,
        CoreCode::QR,
        CoreCode::SCL,
        CoreCode::WCd,
        CoreCode::WCr,
    ];

    pub fn code(self) -> &'static str {
        match self {
            CoreCode::AHo => "AHo",
            CoreCode::AHp => "AHp",
            CoreCode::AHq => "AHq",
            CoreCode::CCD => "CCD",
            CoreCode::CCO => "CCO",
            CoreCode::HST => "HST",
            CoreCode::ITR => "ITR",
            CoreCode::NS => "NS",
            CoreCode::QQ => "QQ",
            CoreCode::QR => "QR",
            CoreCode::SCL => "SCL",
            CoreCode::WCd => "WCd",
            CoreCode::WCr => "WCr",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CoreCode::AHo => "Arts & Humanities - Arts",
            CoreCode::AHp => "Arts & Humanities - Literature",
            CoreCode::AHq => "Arts & Humanities - Philosophy",
            CoreCode::CCD => "Contemporary Challenges - Diversity",
            CoreCode::CCO => "Contemporary Challenges - Our Common Future",
            CoreCode::HST => "Historical Analysis",
            CoreCode::ITR => "Information Technology",
            CoreCode::NS => "Natural Sciences",
            CoreCode::QQ => "Quantitative & Formal Reasoning - Math",
            CoreCode::QR => "Quantitative & Formal Reasoning - Reasoning",
            CoreCode::SCL => "Social Analysis",
            CoreCode::WCd => "Writing & Communication - Writing",
            CoreCode::WCr => "Writing & Communication - Revision",
        }
    }

    /// Case-insensitive parse; unknown labels yield `None`.
    pub fn parse(raw: &str) -> Option<CoreCode> {
        let trimmed = raw.trim();
        CoreCode::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(trimmed))
    }
}

/// Canonical time of a meeting after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingTime {
    /// Recurring weekly block: weekday set plus [start, end) minute offsets
    /// from midnight.
    Weekly {
        days: Vec<Weekday>,
        start_minutes: u16,
        end_minutes: u16,
    },
    /// Online/asynchronous: no weekday or time, never conflicts.
    Online,
    /// Raw fields that failed normalization. Retained for listings, never
    /// placed on a schedule.
    Unschedulable { reason: String },
}

/// A single recurring weekly time block belonging to a section.
///
/// Raw day/time strings are retained next to the canonical form so listings
/// can show exactly what the catalog said.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub time: MeetingTime,
    pub day_raw: String,
    pub start_raw: String,
    pub end_raw: String,
    pub building: String,
    pub room: String,
    pub campus: String,
}

impl Meeting {
    pub fn is_schedulable(&self) -> bool {
        !matches!(self.time, MeetingTime::Unschedulable { .. })
    }
}

/// One offered instance of a course. The atomic unit the assembler selects:
/// choosing a course means choosing exactly one of its sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub course_id: CourseId,
    pub number: String,
    /// Registration index students use to sign up.
    pub registration_index: String,
    pub is_open: bool,
    pub instructor: String,
    pub campus: String,
    pub meetings: Vec<Meeting>,
}

impl Section {
    /// A section containing a meeting that failed normalization cannot be
    /// proven conflict-free and is excluded from assembly.
    pub fn is_schedulable(&self) -> bool {
        self.meetings.iter().all(Meeting::is_schedulable)
    }
}

/// A prerequisite alternative. Multiple rules on one course are OR'd: any
/// single satisfied rule clears the course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrerequisiteRule {
    /// Every listed course must appear in the student's completed set.
    RequiredSet(BTreeSet<CourseId>),
    /// Satisfied automatically for students above first-year standing.
    StandingOverride,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub credits: f32,
    pub sections: Vec<Section>,
    pub prerequisites: Vec<PrerequisiteRule>,
    /// Raw prerequisite text from the feed, retained for listings.
    pub prerequisite_text: String,
    pub core_codes: Vec<CoreCode>,
    pub first_year_safe: bool,
}

impl Course {
    pub fn open_section_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_open).count()
    }
}

/// Class year category, collapsed to the two buckets the eligibility rules
/// distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    FirstYear,
    SophomoreOrAbove,
}

/// Recognized scheduling preferences. Absent options mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSet {
    pub excluded_weekdays: BTreeSet<Weekday>,
    /// Earliest acceptable start, minutes from midnight.
    pub earliest_start: Option<u16>,
    /// Latest acceptable end, minutes from midnight.
    pub latest_end: Option<u16>,
    /// Advisory unless `strict_campuses` is set.
    pub preferred_campuses: Vec<String>,
    pub strict_campuses: bool,
}

/// Everything known about the requesting student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentContext {
    pub standing: Standing,
    pub completed: BTreeSet<CourseId>,
    pub desired_cores: Vec<CoreCode>,
    pub preferences: PreferenceSet,
}

/// Why a requested course did not make it into the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Conflict,
    Ineligible,
    NoOpenSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCourse {
    pub course_id: CourseId,
    pub reason: SkipReason,
}

/// A chosen section for a course, with a marker for backfilled picks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub course_id: CourseId,
    pub section: Section,
    pub auto_filled: bool,
}

/// An assembled weekly schedule: at most one section per course, no two
/// meetings overlapping on a shared weekday. Built fresh per request and
/// discarded after being returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCandidate {
    pub placements: Vec<Placement>,
}

impl ScheduleCandidate {
    pub fn contains(&self, id: &CourseId) -> bool {
        self.placements.iter().any(|p| &p.course_id == id)
    }

    /// All meetings across every chosen section.
    pub fn meetings(&self) -> impl Iterator<Item = &Meeting> {
        self.placements
            .iter()
            .flat_map(|p| p.section.meetings.iter())
    }
}

// The normalized record feed from the catalog acquisition collaborator:
// one JSON record per section, raw strings throughout. Everything that
// assumes the raw shape lives here; the rest of the crate only sees the
// typed entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{
    CoreCode, Course, CourseId, Meeting, MeetingTime, PrerequisiteRule, Section,
};
use crate::normalize;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMeetingRecord {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub building: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub campus: String,
    /// Delivery mode, e.g. "ONLINE INSTRUCTION (INTERNET)".
    #[serde(default)]
    pub mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSectionRecord {
    pub course_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub credits: f32,
    #[serde(default)]
    pub section_number: String,
    #[serde(default, rename = "index")]
    pub registration_index: String,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub campus: String,
    /// Free-form prerequisite text, e.g. "(640:151) OR (640:153)".
    #[serde(default)]
    pub prerequisites: String,
    #[serde(default)]
    pub core_codes: Vec<String>,
    #[serde(default)]
    pub meetings: Vec<RawMeetingRecord>,
}

/// Group the per-section feed into courses. Course-level fields come from
/// the first record seen for each id; records without a course id are
/// dropped with a warning.
pub fn build_courses(records: Vec<RawSectionRecord>) -> BTreeMap<CourseId, Course> {
    let mut courses: BTreeMap<CourseId, Course> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        if record.course_id.trim().is_empty() {
            dropped += 1;
            continue;
        }
        let id = CourseId::new(&record.course_id);
        if !courses.contains_key(&id) {
            courses.insert(id.clone(), course_shell(&id, &record));
        }
        let section = translate_section(&id, &record);
        if let Some(course) = courses.get_mut(&id) {
            course.sections.push(section);
        }
    }

    if dropped > 0 {
        warn!(dropped, "feed records without a course id dropped");
    }
    courses
}

fn course_shell(id: &CourseId, record: &RawSectionRecord) -> Course {
    let prerequisites = parse_prerequisite_rules(&record.prerequisites);
    let first_year_safe = derive_first_year_safe(&prerequisites);
    Course {
        id: id.clone(),
        title: record.title.trim().to_string(),
        credits: record.credits,
        sections: Vec::new(),
        prerequisites,
        prerequisite_text: record.prerequisites.trim().to_string(),
        core_codes: parse_core_codes(id, &record.core_codes),
        first_year_safe,
    }
}

fn translate_section(id: &CourseId, record: &RawSectionRecord) -> Section {
    Section {
        course_id: id.clone(),
        number: record.section_number.trim().to_string(),
        registration_index: record.registration_index.trim().to_string(),
        is_open: record.is_open,
        instructor: record.instructor.trim().to_string(),
        campus: record.campus.trim().to_string(),
        meetings: record
            .meetings
            .iter()
            .map(|m| translate_meeting(id, m, &record.campus))
            .collect(),
    }
}

/// Normalize one raw meeting. Online/asynchronous records carry no weekday
/// or time; anything else that fails normalization is retained marked
/// unschedulable rather than dropped, so it still appears in listings.
fn translate_meeting(id: &CourseId, raw: &RawMeetingRecord, section_campus: &str) -> Meeting {
    let campus = if raw.campus.trim().is_empty() {
        section_campus.trim().to_string()
    } else {
        raw.campus.trim().to_string()
    };

    let mode = raw.mode.to_ascii_lowercase();
    let blank = raw.day.trim().is_empty()
        && raw.start_time.trim().is_empty()
        && raw.end_time.trim().is_empty();
    let time = if mode.contains("online") || mode.contains("async") || blank {
        MeetingTime::Online
    } else {
        match normalize::parse_slot(&raw.day, &raw.start_time, &raw.end_time) {
            Ok((days, start_minutes, end_minutes)) => MeetingTime::Weekly {
                days,
                start_minutes,
                end_minutes,
            },
            Err(e) => {
                debug!(course = %id, error = %e, "meeting retained as unschedulable");
                MeetingTime::Unschedulable {
                    reason: e.to_string(),
                }
            }
        }
    };

    Meeting {
        time,
        day_raw: raw.day.trim().to_string(),
        start_raw: raw.start_time.trim().to_string(),
        end_raw: raw.end_time.trim().to_string(),
        building: raw.building.trim().to_string(),
        room: raw.room.trim().to_string(),
        campus,
    }
}

/// Parse the registrar's free-form prerequisite text into OR'd rules: the
/// text splits on "OR" into alternatives, each alternative's course ids form
/// a required set, and an alternative naming class standing instead of
/// courses becomes a standing override. Alternatives naming neither (e.g.
/// "permission of instructor") contribute no rule.
pub fn parse_prerequisite_rules(text: &str) -> Vec<PrerequisiteRule> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let upper = trimmed.to_ascii_uppercase();
    let mut rules: Vec<PrerequisiteRule> = Vec::new();
    for branch in upper.split(" OR ") {
        let ids = scan_course_ids(branch);
        let rule = if !ids.is_empty() {
            PrerequisiteRule::RequiredSet(ids.into_iter().collect())
        } else if ["SOPHOMORE", "JUNIOR", "SENIOR", "STANDING"]
            .iter()
            .any(|kw| branch.contains(kw))
        {
            PrerequisiteRule::StandingOverride
        } else {
            continue;
        };
        if !rules.contains(&rule) {
            rules.push(rule);
        }
    }
    rules
}

/// Scan course identifiers out of free text. Handles both the short
/// "198:111" form and the registrar's long "01:198:111" form (school code
/// prefix, ignored).
fn scan_course_ids(text: &str) -> Vec<CourseId> {
    let mut ids: Vec<CourseId> = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b':') {
            i += 1;
        }
        let run = text[start..i].trim_end_matches(':');
        let parts: Vec<&str> = run.split(':').collect();
        if parts.len() < 2 {
            continue;
        }
        let subject = parts[parts.len() - 2];
        let number = parts[parts.len() - 1];
        if (2..=3).contains(&subject.len()) && number.len() == 3 {
            let id = CourseId::new(&format!("{subject}:{number}"));
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// A course is safe for first-years when it has no prerequisite rules, or
/// when some alternative consists solely of mathematics (640) courses; math
/// prerequisites are routinely taken concurrently by first-years.
fn derive_first_year_safe(rules: &[PrerequisiteRule]) -> bool {
    if rules.is_empty() {
        return true;
    }
    rules.iter().any(|rule| match rule {
        PrerequisiteRule::RequiredSet(ids) => ids.iter().all(|id| id.subject() == "640"),
        PrerequisiteRule::StandingOverride => false,
    })
}

fn parse_core_codes(id: &CourseId, raw: &[String]) -> Vec<CoreCode> {
    let mut codes: Vec<CoreCode> = Vec::new();
    for label in raw {
        match CoreCode::parse(label) {
            Some(code) => {
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
            None => warn!(course = %id, code = %label, "unknown core code dropped"),
        }
    }
    codes
}

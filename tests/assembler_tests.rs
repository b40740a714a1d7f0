// Scenario coverage for the schedule assembler: conflict handling, skip
// reasons, preference enforcement, and core backfill.

use scarletshift::algorithm::{self, conflicts, sections_conflict};
use scarletshift::api_json::RawPreferences;
use scarletshift::catalog::Catalog;
use scarletshift::catalog::raw::{RawMeetingRecord, RawSectionRecord};
use scarletshift::models::{
    CoreCode, CourseId, PreferenceSet, SkipReason, Standing, StudentContext, Weekday,
};

fn meeting(day: &str, start: &str, end: &str) -> RawMeetingRecord {
    RawMeetingRecord {
        day: day.to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        ..RawMeetingRecord::default()
    }
}

fn online_meeting() -> RawMeetingRecord {
    RawMeetingRecord {
        mode: "ONLINE INSTRUCTION (INTERNET)".to_string(),
        ..RawMeetingRecord::default()
    }
}

#[allow(clippy::too_many_arguments)]
fn record(
    course_id: &str,
    title: &str,
    credits: f32,
    section: &str,
    is_open: bool,
    core_codes: &[&str],
    prerequisites: &str,
    meetings: Vec<RawMeetingRecord>,
) -> RawSectionRecord {
    RawSectionRecord {
        course_id: course_id.to_string(),
        title: title.to_string(),
        credits,
        section_number: section.to_string(),
        registration_index: format!("{course_id}-{section}"),
        is_open,
        instructor: String::new(),
        campus: "BUS".to_string(),
        prerequisites: prerequisites.to_string(),
        core_codes: core_codes.iter().map(|s| s.to_string()).collect(),
        meetings,
    }
}

fn context(standing: Standing) -> StudentContext {
    StudentContext {
        standing,
        completed: Default::default(),
        desired_cores: Vec::new(),
        preferences: PreferenceSet::default(),
    }
}

fn ids(raw: &[&str]) -> Vec<CourseId> {
    raw.iter().map(|s| CourseId::new(s)).collect()
}

#[test]
fn overlapping_candidates_place_exactly_one() {
    // both offered only Tuesday 10:00-11:20
    let catalog = Catalog::from_records(vec![
        record(
            "220:102",
            "Intro Microeconomics",
            3.0,
            "01",
            true,
            &[],
            "",
            vec![meeting("T", "10:00", "11:20")],
        ),
        record(
            "220:103",
            "Intro Macroeconomics",
            3.0,
            "01",
            true,
            &[],
            "",
            vec![meeting("T", "10:00", "11:20")],
        ),
    ]);

    let outcome = algorithm::assemble(
        &catalog,
        &ids(&["220:102", "220:103"]),
        &context(Standing::SophomoreOrAbove),
        false,
    );

    assert_eq!(outcome.schedule.placements.len(), 1);
    assert_eq!(
        outcome.schedule.placements[0].course_id,
        CourseId::new("220:102")
    );
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].course_id, CourseId::new("220:103"));
    assert_eq!(outcome.skipped[0].reason, SkipReason::Conflict);
    assert!(!outcome.fully_satisfied());
}

#[test]
fn alternate_section_avoids_the_clash() {
    let catalog = Catalog::from_records(vec![
        record(
            "220:102",
            "Intro Microeconomics",
            3.0,
            "01",
            true,
            &[],
            "",
            vec![meeting("T", "10:00", "11:20")],
        ),
        record(
            "220:103",
            "Intro Macroeconomics",
            3.0,
            "01",
            true,
            &[],
            "",
            vec![meeting("T", "10:00", "11:20")],
        ),
        record(
            "220:103",
            "Intro Macroeconomics",
            3.0,
            "02",
            true,
            &[],
            "",
            vec![meeting("W", "10:00", "11:20")],
        ),
    ]);

    let outcome = algorithm::assemble(
        &catalog,
        &ids(&["220:102", "220:103"]),
        &context(Standing::SophomoreOrAbove),
        false,
    );

    assert_eq!(outcome.schedule.placements.len(), 2);
    assert!(outcome.skipped.is_empty());
    let macro_placement = &outcome.schedule.placements[1];
    assert_eq!(macro_placement.section.number, "02");
}

#[test]
fn empty_candidates_without_autofill_stay_empty() {
    let catalog = Catalog::from_records(vec![record(
        "355:101",
        "Expository Writing",
        3.0,
        "01",
        true,
        &["WCd"],
        "",
        vec![meeting("M", "9:00", "10:20")],
    )]);

    let outcome = algorithm::assemble(&catalog, &[], &context(Standing::FirstYear), false);
    assert!(outcome.schedule.placements.is_empty());
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.total_credits, 0.0);
}

#[test]
fn excluded_friday_never_appears() {
    let catalog = Catalog::from_records(vec![
        record(
            "640:151",
            "Calculus I",
            4.0,
            "01",
            true,
            &["QQ"],
            "",
            vec![meeting("F", "9:00", "10:20")],
        ),
        record(
            "640:151",
            "Calculus I",
            4.0,
            "02",
            true,
            &["QQ"],
            "",
            vec![meeting("T TH", "9:00", "10:20")],
        ),
        record(
            "750:101",
            "Physics for Poets",
            3.0,
            "01",
            true,
            &["NS"],
            "",
            vec![meeting("F", "13:00", "14:20")],
        ),
    ]);

    let mut ctx = context(Standing::SophomoreOrAbove);
    ctx.preferences = RawPreferences {
        excluded_days: vec!["F".to_string()],
        ..RawPreferences::default()
    }
    .resolve()
    .expect("preferences resolve");

    let outcome = algorithm::assemble(
        &catalog,
        &ids(&["640:151", "750:101"]),
        &ctx,
        false,
    );

    assert_eq!(outcome.schedule.placements.len(), 1);
    assert_eq!(outcome.schedule.placements[0].section.number, "02");
    for m in outcome.schedule.meetings() {
        if let scarletshift::models::MeetingTime::Weekly { days, .. } = &m.time {
            assert!(!days.contains(&Weekday::Friday));
        }
    }
    // the Friday-only course has no placeable section at all
    assert_eq!(outcome.skipped[0].reason, SkipReason::NoOpenSection);
}

#[test]
fn first_year_gate_and_sophomore_override() {
    let catalog = Catalog::from_records(vec![record(
        "198:211",
        "Computer Architecture",
        4.0,
        "01",
        true,
        &[],
        "01:198:111 and 01:198:112",
        vec![meeting("M W", "10:00", "11:20")],
    )]);

    let first_year = algorithm::assemble(
        &catalog,
        &ids(&["198:211"]),
        &context(Standing::FirstYear),
        false,
    );
    assert!(first_year.schedule.placements.is_empty());
    assert_eq!(first_year.skipped[0].reason, SkipReason::Ineligible);

    let mut sophomore_ctx = context(Standing::SophomoreOrAbove);
    sophomore_ctx.completed = ids(&["198:111", "198:112"]).into_iter().collect();
    let sophomore = algorithm::assemble(&catalog, &ids(&["198:211"]), &sophomore_ctx, false);
    assert_eq!(sophomore.schedule.placements.len(), 1);
}

#[test]
fn completed_courses_are_never_rescheduled() {
    let catalog = Catalog::from_records(vec![record(
        "220:102",
        "Intro Microeconomics",
        3.0,
        "01",
        true,
        &[],
        "",
        vec![meeting("T", "10:00", "11:20")],
    )]);

    let mut ctx = context(Standing::SophomoreOrAbove);
    ctx.completed = ids(&["220:102"]).into_iter().collect();

    let outcome = algorithm::assemble(&catalog, &ids(&["220:102"]), &ctx, false);
    assert!(!outcome.schedule.contains(&CourseId::new("220:102")));
    assert_eq!(outcome.skipped[0].reason, SkipReason::Ineligible);
}

#[test]
fn unknown_candidates_are_skipped_as_ineligible() {
    let catalog = Catalog::from_records(vec![]);
    let outcome = algorithm::assemble(
        &catalog,
        &ids(&["999:999"]),
        &context(Standing::FirstYear),
        false,
    );
    assert_eq!(outcome.skipped[0].reason, SkipReason::Ineligible);
}

#[test]
fn open_sections_rank_before_closed_but_closed_still_place() {
    // closed section listed first in the catalog; the open one must win
    let catalog = Catalog::from_records(vec![
        record(
            "830:101",
            "General Psychology",
            3.0,
            "01",
            false,
            &["SCL"],
            "",
            vec![meeting("M", "9:00", "10:20")],
        ),
        record(
            "830:101",
            "General Psychology",
            3.0,
            "02",
            true,
            &["SCL"],
            "",
            vec![meeting("W", "9:00", "10:20")],
        ),
        // a course whose only section is closed
        record(
            "920:101",
            "Intro Sociology",
            3.0,
            "01",
            false,
            &["SCL"],
            "",
            vec![meeting("F", "9:00", "10:20")],
        ),
    ]);

    let outcome = algorithm::assemble(
        &catalog,
        &ids(&["830:101", "920:101"]),
        &context(Standing::SophomoreOrAbove),
        false,
    );

    assert_eq!(outcome.schedule.placements.len(), 2);
    assert_eq!(outcome.schedule.placements[0].section.number, "02");
    assert!(outcome.schedule.placements[0].section.is_open);
    assert!(!outcome.schedule.placements[1].section.is_open);
}

#[test]
fn time_bounds_disqualify_sections() {
    let catalog = Catalog::from_records(vec![
        record(
            "510:101",
            "Western Civilization",
            3.0,
            "01",
            true,
            &["HST"],
            "",
            vec![meeting("M", "8:00", "9:20")],
        ),
        record(
            "510:101",
            "Western Civilization",
            3.0,
            "02",
            true,
            &["HST"],
            "",
            vec![meeting("M", "10:30", "11:50")],
        ),
    ]);

    let mut ctx = context(Standing::FirstYear);
    ctx.preferences = RawPreferences {
        earliest_start: Some("10:00".to_string()),
        ..RawPreferences::default()
    }
    .resolve()
    .expect("preferences resolve");

    let outcome = algorithm::assemble(&catalog, &ids(&["510:101"]), &ctx, false);
    assert_eq!(outcome.schedule.placements.len(), 1);
    assert_eq!(outcome.schedule.placements[0].section.number, "02");
}

#[test]
fn online_sections_never_conflict() {
    let catalog = Catalog::from_records(vec![
        record(
            "547:200",
            "Living in the Digital World",
            3.0,
            "90",
            true,
            &["ITR"],
            "",
            vec![online_meeting()],
        ),
        record(
            "220:102",
            "Intro Microeconomics",
            3.0,
            "01",
            true,
            &[],
            "",
            vec![meeting("M T W TH F", "8:00", "20:00")],
        ),
    ]);

    let outcome = algorithm::assemble(
        &catalog,
        &ids(&["220:102", "547:200"]),
        &context(Standing::SophomoreOrAbove),
        false,
    );
    assert_eq!(outcome.schedule.placements.len(), 2);
    assert!(outcome.skipped.is_empty());
}

#[test]
fn assembly_is_idempotent() {
    let catalog = Catalog::from_records(vec![
        record(
            "220:102",
            "Intro Microeconomics",
            3.0,
            "01",
            true,
            &[],
            "",
            vec![meeting("T", "10:00", "11:20")],
        ),
        record(
            "355:101",
            "Expository Writing",
            3.0,
            "01",
            true,
            &["WCd"],
            "",
            vec![meeting("M W", "13:00", "14:20")],
        ),
    ]);

    let mut ctx = context(Standing::FirstYear);
    ctx.desired_cores = vec![CoreCode::WCd];
    let candidates = ids(&["220:102"]);

    let first = algorithm::assemble(&catalog, &candidates, &ctx, true);
    let second = algorithm::assemble(&catalog, &candidates, &ctx, true);
    assert_eq!(first, second);
}

#[test]
fn backfill_covers_requested_cores() {
    let catalog = Catalog::from_records(vec![
        record(
            "220:102",
            "Intro Microeconomics",
            3.0,
            "01",
            true,
            &["SCL"],
            "",
            vec![meeting("T", "10:00", "11:20")],
        ),
        record(
            "355:101",
            "Expository Writing",
            3.0,
            "01",
            true,
            &["WCd"],
            "",
            vec![meeting("M W", "13:00", "14:20")],
        ),
        record(
            "640:103",
            "Topics in Mathematics",
            3.0,
            "01",
            true,
            &["QQ"],
            "",
            vec![meeting("TH", "9:00", "10:20")],
        ),
    ]);

    let mut ctx = context(Standing::FirstYear);
    ctx.desired_cores = vec![CoreCode::WCd, CoreCode::QQ];

    let outcome = algorithm::assemble(&catalog, &ids(&["220:102"]), &ctx, true);

    assert_eq!(outcome.schedule.placements.len(), 3);
    let auto: Vec<&CourseId> = outcome
        .schedule
        .placements
        .iter()
        .filter(|p| p.auto_filled)
        .map(|p| &p.course_id)
        .collect();
    assert_eq!(auto.len(), 2);
    assert_eq!(outcome.covered_cores, vec![CoreCode::WCd, CoreCode::QQ]);
    assert!(outcome.missing_cores.is_empty());
    assert!(outcome.fully_satisfied());
    assert_eq!(outcome.total_credits, 9.0);
}

#[test]
fn backfill_is_suppressed_when_not_requested() {
    let catalog = Catalog::from_records(vec![record(
        "355:101",
        "Expository Writing",
        3.0,
        "01",
        true,
        &["WCd"],
        "",
        vec![meeting("M W", "13:00", "14:20")],
    )]);

    let mut ctx = context(Standing::FirstYear);
    ctx.desired_cores = vec![CoreCode::WCd];

    let outcome = algorithm::assemble(&catalog, &[], &ctx, false);
    assert!(outcome.schedule.placements.is_empty());
    assert_eq!(outcome.missing_cores, vec![CoreCode::WCd]);
    assert!(!outcome.fully_satisfied());
}

#[test]
fn backfill_prefers_tightly_tagged_courses() {
    // both cover QQ, but the single-tag course is the more targeted pick
    let catalog = Catalog::from_records(vec![
        record(
            "512:101",
            "Everything Seminar",
            3.0,
            "01",
            true,
            &["QQ", "NS", "HST"],
            "",
            vec![meeting("M", "9:00", "10:20")],
        ),
        record(
            "960:101",
            "Quantitative Reasoning",
            3.0,
            "01",
            true,
            &["QQ"],
            "",
            vec![meeting("T", "9:00", "10:20")],
        ),
    ]);

    let mut ctx = context(Standing::FirstYear);
    ctx.desired_cores = vec![CoreCode::QQ];

    let outcome = algorithm::assemble(&catalog, &[], &ctx, true);
    assert_eq!(outcome.schedule.placements.len(), 1);
    assert_eq!(
        outcome.schedule.placements[0].course_id,
        CourseId::new("960:101")
    );
}

#[test]
fn backfill_respects_the_credit_cap() {
    let catalog = Catalog::from_records(vec![
        record(
            "440:127",
            "Engineering Design Studio",
            16.0,
            "01",
            true,
            &[],
            "",
            vec![meeting("M T W TH", "9:00", "12:00")],
        ),
        record(
            "355:101",
            "Expository Writing",
            3.0,
            "01",
            true,
            &["WCd"],
            "",
            vec![meeting("F", "13:00", "14:20")],
        ),
    ]);

    let mut ctx = context(Standing::FirstYear);
    ctx.desired_cores = vec![CoreCode::WCd];

    let outcome = algorithm::assemble(&catalog, &ids(&["440:127"]), &ctx, true);
    // 16 + 3 would exceed the 18-credit cap, so the writing course stays out
    assert_eq!(outcome.schedule.placements.len(), 1);
    assert_eq!(outcome.missing_cores, vec![CoreCode::WCd]);
}

/// Core invariant, property-tested over pseudo-random meeting sets: no two
/// meetings in a returned schedule may conflict.
#[test]
fn returned_schedules_never_contain_conflicts() {
    struct XorShift(u64);
    impl XorShift {
        fn next(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }
        fn below(&mut self, n: u64) -> u64 {
            self.next() % n
        }
    }

    let day_tokens = ["M", "T", "W", "TH", "F", "M W", "T TH", "M W F"];
    let mut rng = XorShift(0x5eed_1234_5678_9abc);

    for round in 0..20 {
        let mut records = Vec::new();
        let course_count = 4 + rng.below(8);
        for c in 0..course_count {
            let id = format!("{}:{}", 100 + c, 101 + round);
            let sections = 1 + rng.below(3);
            for s in 0..sections {
                let start = 480 + rng.below(10) * 60; // 8:00 .. 17:00
                let len = 60 + rng.below(3) * 40;
                let end = start + len;
                records.push(record(
                    &id,
                    "Generated",
                    3.0,
                    &format!("{:02}", s + 1),
                    rng.below(4) != 0,
                    &[],
                    "",
                    vec![meeting(
                        day_tokens[rng.below(day_tokens.len() as u64) as usize],
                        &format!("{}:{:02}", start / 60, start % 60),
                        &format!("{}:{:02}", end / 60, end % 60),
                    )],
                ));
            }
        }

        let candidates: Vec<CourseId> = (0..course_count)
            .map(|c| CourseId::new(&format!("{}:{}", 100 + c, 101 + round)))
            .collect();
        let catalog = Catalog::from_records(records);
        let outcome = algorithm::assemble(
            &catalog,
            &candidates,
            &context(Standing::SophomoreOrAbove),
            false,
        );

        let meetings: Vec<_> = outcome.schedule.meetings().collect();
        for (i, a) in meetings.iter().enumerate() {
            for b in meetings.iter().skip(i + 1) {
                assert!(!conflicts(a, b), "round {round}: schedule contains a conflict");
            }
        }
        for (i, a) in outcome.schedule.placements.iter().enumerate() {
            for b in outcome.schedule.placements.iter().skip(i + 1) {
                assert!(!sections_conflict(&a.section, &b.section));
            }
        }
        // every candidate is accounted for
        assert_eq!(
            outcome.schedule.placements.len() + outcome.skipped.len(),
            candidates.len()
        );
    }
}

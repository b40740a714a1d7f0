// Catalog model: the read-only, in-memory view of the course offering.
// Built once from the collaborator's normalized feed, replaced wholesale on
// refresh, never mutated in place.

pub mod raw;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::errors::CatalogError;
use crate::models::{CoreCode, Course, CourseId};
use raw::RawSectionRecord;

/// Fuzzy title matches below this similarity are not trusted.
const MIN_TITLE_SIMILARITY: f64 = 0.88;

#[derive(Debug)]
pub struct Catalog {
    courses: BTreeMap<CourseId, Course>,
    by_core: BTreeMap<CoreCode, Vec<CourseId>>,
    title_index: HashMap<String, CourseId>,
}

impl Catalog {
    pub fn from_records(records: Vec<RawSectionRecord>) -> Catalog {
        let courses = raw::build_courses(records);

        let mut by_core: BTreeMap<CoreCode, Vec<CourseId>> = BTreeMap::new();
        let mut title_index: HashMap<String, CourseId> = HashMap::new();
        for (id, course) in &courses {
            for code in &course.core_codes {
                by_core.entry(*code).or_default().push(id.clone());
            }
            let title = course.title.to_ascii_lowercase();
            if !title.is_empty() {
                title_index.entry(title).or_insert_with(|| id.clone());
            }
        }

        let unschedulable = courses
            .values()
            .flat_map(|c| &c.sections)
            .flat_map(|s| &s.meetings)
            .filter(|m| !m.is_schedulable())
            .count();
        info!(
            courses = courses.len(),
            unschedulable_meetings = unschedulable,
            "catalog built"
        );

        Catalog {
            courses,
            by_core,
            title_index,
        }
    }

    pub fn from_json_str(label: &str, data: &str) -> Result<Catalog, CatalogError> {
        let records: Vec<RawSectionRecord> =
            serde_json::from_str(data).map_err(|source| CatalogError::Parse {
                path: label.to_string(),
                source,
            })?;
        Ok(Catalog::from_records(records))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
        let label = path.as_ref().display().to_string();
        let data = std::fs::read_to_string(path.as_ref()).map_err(|source| CatalogError::Read {
            path: label.clone(),
            source,
        })?;
        Catalog::from_json_str(&label, &data)
    }

    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.courses.get(id)
    }

    /// Lookup by a possibly unpadded identifier string ("1:95").
    pub fn lookup(&self, raw_id: &str) -> Option<&Course> {
        self.courses.get(&CourseId::new(raw_id))
    }

    /// All courses in stable identifier order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Courses under a subject code prefix, zero-padded before matching.
    pub fn by_subject(&self, subject: &str) -> Vec<&Course> {
        let prefix = format!("{:0>3}", subject.trim());
        self.courses
            .values()
            .filter(|c| c.id.subject() == prefix)
            .collect()
    }

    pub fn by_core(&self, code: CoreCode) -> Vec<&Course> {
        self.by_core
            .get(&code)
            .map(|ids| ids.iter().filter_map(|id| self.courses.get(id)).collect())
            .unwrap_or_default()
    }

    /// Name→identifier resolution surface for the interpretation layer:
    /// identifier probes first, then exact (case-insensitive) title, then
    /// the best fuzzy title match above the similarity floor.
    pub fn resolve_name(&self, query: &str) -> Option<&Course> {
        let q = query.trim();
        if q.is_empty() {
            return None;
        }
        if q.contains(':') {
            if let Some(course) = self.lookup(q) {
                return Some(course);
            }
        }
        let lower = q.to_ascii_lowercase();
        if let Some(id) = self.title_index.get(&lower) {
            return self.courses.get(id);
        }
        let mut best: Option<(f64, &CourseId)> = None;
        for (id, course) in &self.courses {
            if course.title.is_empty() {
                continue;
            }
            let score = strsim::jaro_winkler(&lower, &course.title.to_ascii_lowercase());
            if score >= MIN_TITLE_SIMILARITY && best.map_or(true, |(b, _)| score > b) {
                best = Some((score, id));
            }
        }
        best.and_then(|(_, id)| self.courses.get(id))
    }
}

/// Shared handle to the active catalog. Refresh builds a new catalog and
/// swaps the `Arc` wholesale, so concurrent readers see either the old
/// catalog or the new one, never a partially-updated state.
pub struct CatalogHandle {
    inner: RwLock<Option<Arc<Catalog>>>,
}

impl CatalogHandle {
    pub fn empty() -> CatalogHandle {
        CatalogHandle {
            inner: RwLock::new(None),
        }
    }

    pub fn new(catalog: Catalog) -> CatalogHandle {
        CatalogHandle {
            inner: RwLock::new(Some(Arc::new(catalog))),
        }
    }

    pub fn current(&self) -> Result<Arc<Catalog>, CatalogError> {
        self.inner
            .read()
            .expect("catalog handle poisoned")
            .clone()
            .ok_or(CatalogError::NotLoaded)
    }

    pub fn replace(&self, catalog: Catalog) {
        *self.inner.write().expect("catalog handle poisoned") = Some(Arc::new(catalog));
    }

    pub fn is_loaded(&self) -> bool {
        self.inner
            .read()
            .expect("catalog handle poisoned")
            .is_some()
    }
}

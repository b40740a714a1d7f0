// Per-session course history: an injected key-value service, never ambient
// state. Distinct sessions must not block each other; same-session writers
// are serialized through a per-key lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

use crate::models::CourseId;

/// Session-scoped "already taken" history keyed by an opaque session id.
pub trait SessionStore: Send + Sync {
    /// Completed courses in first-recorded order. Unknown sessions are empty.
    fn completed(&self, session: &str) -> Vec<CourseId>;

    /// Append courses to a session's history, deduplicating while preserving
    /// first-seen order. Returns the updated list.
    fn add_completed(&self, session: &str, courses: &[CourseId]) -> Vec<CourseId>;

    /// When the session was last written, if it exists.
    fn updated_at(&self, session: &str) -> Option<DateTime<Utc>>;

    fn clear(&self, session: &str);
}

struct SessionRecord {
    completed: Vec<CourseId>,
    updated_at: DateTime<Utc>,
}

/// In-memory store: an outer read-mostly map of per-session records, each
/// behind its own mutex.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionRecord>>>>,
}

impl MemorySessionStore {
    pub fn new() -> MemorySessionStore {
        MemorySessionStore::default()
    }

    fn record(&self, session: &str) -> Option<Arc<Mutex<SessionRecord>>> {
        self.sessions
            .read()
            .expect("session map poisoned")
            .get(session)
            .cloned()
    }

    fn record_or_insert(&self, session: &str) -> Arc<Mutex<SessionRecord>> {
        if let Some(record) = self.record(session) {
            return record;
        }
        let mut map = self.sessions.write().expect("session map poisoned");
        map.entry(session.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(SessionRecord {
                    completed: Vec::new(),
                    updated_at: Utc::now(),
                }))
            })
            .clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn completed(&self, session: &str) -> Vec<CourseId> {
        match self.record(session) {
            Some(record) => record.lock().expect("session record poisoned").completed.clone(),
            None => Vec::new(),
        }
    }

    fn add_completed(&self, session: &str, courses: &[CourseId]) -> Vec<CourseId> {
        let record = self.record_or_insert(session);
        let mut guard = record.lock().expect("session record poisoned");
        for id in courses {
            if !guard.completed.contains(id) {
                guard.completed.push(id.clone());
            }
        }
        guard.updated_at = Utc::now();
        guard.completed.clone()
    }

    fn updated_at(&self, session: &str) -> Option<DateTime<Utc>> {
        self.record(session)
            .map(|record| record.lock().expect("session record poisoned").updated_at)
    }

    fn clear(&self, session: &str) {
        self.sessions
            .write()
            .expect("session map poisoned")
            .remove(session);
    }
}

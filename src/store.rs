//! In-memory student storage.
//!
//! [`StudentStore`] owns the ID → record map behind a single mutex. Every operation holds the
//! lock for its full duration, so concurrent callers observe the operations in some total order
//! and never see a half-applied write. The lock is only ever held for map work, never across an
//! `.await`.

use crate::config::{Config, IdAllocation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Identifier type used for student records.
pub type StudentId = i64;

/// A single student record as stored and served over HTTP.
///
/// Missing fields decode to their zero value and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Student {
    /// Store-assigned identifier.
    pub id: StudentId,
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Contact email address.
    pub email: String,
}

/// Errors returned by store lookups and updates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No record exists under the requested ID.
    #[error("Student {0} not found")]
    NotFound(StudentId),
}

struct StoreInner {
    students: HashMap<StudentId, Student>,
    next_sequential_id: StudentId,
}

/// Thread-safe in-memory student registry.
pub struct StudentStore {
    inner: Mutex<StoreInner>,
    allocation: IdAllocation,
    max_random_id: StudentId,
}

impl StudentStore {
    /// Create an empty store with the given ID allocation policy.
    ///
    /// `max_random_id` is the inclusive upper bound used by [`IdAllocation::Random`]; negative
    /// values are clamped to zero.
    pub fn new(allocation: IdAllocation, max_random_id: StudentId) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                students: HashMap::new(),
                next_sequential_id: 1,
            }),
            allocation,
            max_random_id: max_random_id.max(0),
        }
    }

    /// Create an empty store configured from the runtime settings.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.id_allocation, config.student_id_max)
    }

    /// Insert a new record under a freshly assigned ID and return the stored value.
    ///
    /// Any `id` on the input is discarded. With random allocation an existing record that
    /// happens to share the drawn ID is replaced.
    pub fn create(&self, mut student: Student) -> Student {
        let mut inner = self.lock();
        let id = match self.allocation {
            IdAllocation::Random => rand::thread_rng().gen_range(0..=self.max_random_id),
            IdAllocation::Sequential => {
                let id = inner.next_sequential_id;
                inner.next_sequential_id += 1;
                id
            }
        };
        student.id = id;
        if inner.students.insert(id, student.clone()).is_some() {
            tracing::debug!(id, "Random ID collided; previous record replaced");
        }
        student
    }

    /// Return every stored record, ordered by ascending ID.
    pub fn get_all(&self) -> Vec<Student> {
        let inner = self.lock();
        let mut students: Vec<Student> = inner.students.values().cloned().collect();
        students.sort_by_key(|student| student.id);
        students
    }

    /// Look up a single record.
    pub fn get(&self, id: StudentId) -> Result<Student, StoreError> {
        self.lock()
            .students
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Replace the record stored under `id` in full, forcing its `id` field to match.
    pub fn update(&self, id: StudentId, mut student: Student) -> Result<Student, StoreError> {
        let mut inner = self.lock();
        let slot = inner.students.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        student.id = id;
        *slot = student.clone();
        Ok(student)
    }

    /// Remove the record under `id`; absent IDs are ignored.
    ///
    /// Returns whether a record was actually removed.
    pub fn delete(&self, id: StudentId) -> bool {
        self.lock().students.remove(&id).is_some()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().students.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Each critical section is a single map operation, so a poisoned guard still wraps a
    // consistent map.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StudentStore {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

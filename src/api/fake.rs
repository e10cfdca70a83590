use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{ListQuery, SortField, SortOrder, StudentPage};
use super::StudentApi;
use crate::error::{ApiError, Result};
use crate::id::RecordId;
use crate::marks::model::{Mark, MarkInput, MarkUpdate};
use crate::students::model::{Student, StudentInput};

const DEFAULT_LIMIT: u32 = 10;

/// Names the endpoints so tests can inject failures and count calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListStudents,
    GetStudent,
    CreateStudent,
    UpdateStudent,
    DeleteStudent,
    ListMarks,
    CreateMark,
    UpdateMark,
    DeleteMark,
}

struct Store {
    students: Vec<Student>,
    marks: Vec<Mark>,
    failing: HashSet<Endpoint>,
    delays: HashMap<Endpoint, Duration>,
    calls: Vec<Endpoint>,
    clock: OffsetDateTime,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            students: Vec::new(),
            marks: Vec::new(),
            failing: HashSet::new(),
            delays: HashMap::new(),
            calls: Vec::new(),
            clock: time::macros::datetime!(2024-01-01 09:00 UTC),
        }
    }
}

impl Store {
    // Strictly increasing so createdAt ordering is deterministic.
    fn tick(&mut self) -> OffsetDateTime {
        self.clock += time::Duration::seconds(1);
        self.clock
    }

    fn insert_student(&mut self, input: &StudentInput) -> Student {
        let now = self.tick();
        let student = Student {
            id: RecordId::new(Uuid::new_v4().to_string()),
            name: input.name.clone(),
            roll_number: input.roll_number,
            standard: input.standard,
            student_card_id: input.student_card_id.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.students.push(student.clone());
        student
    }

    fn insert_mark(&mut self, input: &MarkInput) -> Result<Mark> {
        if !self.students.iter().any(|s| s.id == input.student_id) {
            return Err(ApiError::NotFound(format!("student {}", input.student_id)));
        }
        let now = self.tick();
        let mark = Mark {
            id: RecordId::new(Uuid::new_v4().to_string()),
            student_id: input.student_id.clone(),
            subject_name: input.subject_name.clone(),
            subject_mark: input.subject_mark,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.marks.push(mark.clone());
        Ok(mark)
    }
}

/// In-memory stand-in for the REST backend.
///
/// Implements the server side of the contract (search, filter, sort, paging,
/// cascading deletes) so views can be exercised without a network.
#[derive(Default)]
pub struct FakeApi {
    store: Mutex<Store>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed_student(&self, input: StudentInput) -> Student {
        self.store().insert_student(&input)
    }

    pub fn seed_mark(&self, student_id: &RecordId, subject: &str, score: i32) -> Result<Mark> {
        self.store().insert_mark(&MarkInput {
            student_id: student_id.clone(),
            subject_name: subject.to_string(),
            subject_mark: score,
        })
    }

    /// Makes every later call to `endpoint` fail with a 500.
    pub fn fail(&self, endpoint: Endpoint) {
        self.store().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.store().failing.remove(&endpoint);
    }

    pub fn delay(&self, endpoint: Endpoint, by: Duration) {
        self.store().delays.insert(endpoint, by);
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.store().calls.clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.store().calls.iter().filter(|c| **c == endpoint).count()
    }

    pub fn students(&self) -> Vec<Student> {
        self.store().students.clone()
    }

    pub fn marks(&self) -> Vec<Mark> {
        self.store().marks.clone()
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<()> {
        let (failing, delay) = {
            let mut store = self.store();
            store.calls.push(endpoint);
            (
                store.failing.contains(&endpoint),
                store.delays.get(&endpoint).copied(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(ApiError::Server {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                payload: Some(serde_json::json!({
                    "success": false,
                    "message": "injected failure",
                })),
            });
        }
        Ok(())
    }
}

fn matches_search(student: &Student, needle: &str) -> bool {
    student.name.to_lowercase().contains(needle)
        || student.roll_number.to_string().contains(needle)
        || student.student_card_id.to_lowercase().contains(needle)
}

fn compare(a: &Student, b: &Student, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::RollNumber => a.roll_number.cmp(&b.roll_number),
        SortField::Standard => a.standard.cmp(&b.standard),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl StudentApi for FakeApi {
    async fn list_students(&self, query: &ListQuery) -> Result<StudentPage> {
        self.enter(Endpoint::ListStudents).await?;
        let store = self.store();

        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let mut rows: Vec<Student> = store
            .students
            .iter()
            .filter(|s| query.standard.map_or(true, |wanted| s.standard == wanted))
            .filter(|s| needle.as_deref().map_or(true, |n| matches_search(s, n)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            let ord = compare(a, b, query.sort_by);
            match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let limit = if query.limit == 0 { DEFAULT_LIMIT } else { query.limit };
        let total_records = rows.len() as u64;
        let total_pages = rows.len().div_ceil(limit as usize) as u32;
        let skip = (query.page.max(1) as usize - 1) * limit as usize;
        let rows = rows.into_iter().skip(skip).take(limit as usize).collect();

        Ok(StudentPage {
            rows,
            total_records,
            total_pages,
        })
    }

    async fn get_student(&self, id: &RecordId) -> Result<Student> {
        self.enter(Endpoint::GetStudent).await?;
        self.store()
            .students
            .iter()
            .find(|s| &s.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("student {id}")))
    }

    async fn create_student(&self, input: &StudentInput) -> Result<Student> {
        self.enter(Endpoint::CreateStudent).await?;
        Ok(self.store().insert_student(input))
    }

    async fn update_student(&self, id: &RecordId, input: &StudentInput) -> Result<Student> {
        self.enter(Endpoint::UpdateStudent).await?;
        let mut store = self.store();
        let now = store.tick();
        let student = store
            .students
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("student {id}")))?;
        student.name = input.name.clone();
        student.roll_number = input.roll_number;
        student.standard = input.standard;
        student.student_card_id = input.student_card_id.clone();
        student.email = input.email.clone();
        student.phone = input.phone.clone();
        student.updated_at = Some(now);
        Ok(student.clone())
    }

    async fn delete_student(&self, id: &RecordId) -> Result<()> {
        self.enter(Endpoint::DeleteStudent).await?;
        let mut store = self.store();
        let before = store.students.len();
        store.students.retain(|s| &s.id != id);
        if store.students.len() == before {
            return Err(ApiError::NotFound(format!("student {id}")));
        }
        store.marks.retain(|m| &m.student_id != id);
        Ok(())
    }

    async fn list_marks(&self, student_id: &RecordId) -> Result<Vec<Mark>> {
        self.enter(Endpoint::ListMarks).await?;
        Ok(self
            .store()
            .marks
            .iter()
            .filter(|m| &m.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn create_mark(&self, input: &MarkInput) -> Result<Mark> {
        self.enter(Endpoint::CreateMark).await?;
        self.store().insert_mark(input)
    }

    async fn update_mark(&self, id: &RecordId, input: &MarkUpdate) -> Result<Mark> {
        self.enter(Endpoint::UpdateMark).await?;
        let mut store = self.store();
        let now = store.tick();
        let mark = store
            .marks
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("mark {id}")))?;
        mark.subject_name = input.subject_name.clone();
        mark.subject_mark = input.subject_mark;
        mark.updated_at = Some(now);
        Ok(mark.clone())
    }

    async fn delete_mark(&self, id: &RecordId) -> Result<()> {
        self.enter(Endpoint::DeleteMark).await?;
        let mut store = self.store();
        let before = store.marks.len();
        store.marks.retain(|m| &m.id != id);
        if store.marks.len() == before {
            return Err(ApiError::NotFound(format!("mark {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn student_input(name: &str, standard: u8, roll_number: u32) -> StudentInput {
    StudentInput {
        name: name.to_string(),
        roll_number,
        standard,
        student_card_id: crate::students::model::student_card_id(standard, roll_number)
            .unwrap_or_default(),
        email: format!("{}@school.in", name.to_lowercase().replace(' ', ".")),
        phone: "9876543210".to_string(),
    }
}

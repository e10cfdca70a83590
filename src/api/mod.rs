use async_trait::async_trait;

use crate::error::Result;
use crate::id::RecordId;
use crate::marks::model::{Mark, MarkInput, MarkUpdate};
use crate::students::model::{Student, StudentInput};

mod client;
pub mod dto;
pub(crate) mod fake;
#[cfg(test)]
pub(crate) mod test_server;

pub use client::HttpApi;
pub use dto::{ListQuery, SortField, SortOrder, StudentPage};
pub use fake::{Endpoint, FakeApi};

/// The student and marks endpoints the views consume.
///
/// Every call is a single independent request; no retries happen here.
#[async_trait]
pub trait StudentApi: Send + Sync {
    async fn list_students(&self, query: &ListQuery) -> Result<StudentPage>;
    async fn get_student(&self, id: &RecordId) -> Result<Student>;
    async fn create_student(&self, input: &StudentInput) -> Result<Student>;
    async fn update_student(&self, id: &RecordId, input: &StudentInput) -> Result<Student>;
    async fn delete_student(&self, id: &RecordId) -> Result<()>;

    async fn list_marks(&self, student_id: &RecordId) -> Result<Vec<Mark>>;
    async fn create_mark(&self, input: &MarkInput) -> Result<Mark>;
    async fn update_mark(&self, id: &RecordId, input: &MarkUpdate) -> Result<Mark>;
    async fn delete_mark(&self, id: &RecordId) -> Result<()>;
}

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};

use super::dto::{Envelope, ListQuery, StudentPage};
use super::StudentApi;
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::id::RecordId;
use crate::marks::model::{Mark, MarkInput, MarkUpdate};
use crate::students::model::{Student, StudentInput, StudentUpdate};

/// `StudentApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    config: ApiConfig,
    client: Client,
}

impl HttpApi {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: ApiConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Envelope<T>> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "transport failure");
            ApiError::from(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let payload = serde_json::from_slice::<serde_json::Value>(&body).ok();
            warn!(%status, has_payload = payload.is_some(), "server error response");
            return Err(ApiError::Server { status, payload });
        }

        let envelope: Envelope<T> = serde_json::from_slice(&body).map_err(|e| {
            error!(error = %e, "undecodable response body");
            ApiError::from(e)
        })?;
        if !envelope.success {
            warn!(message = ?envelope.message, "request rejected");
            return Err(ApiError::Rejected {
                message: envelope.message,
            });
        }
        debug!(%status, "request ok");
        Ok(envelope)
    }

    async fn send_data<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send::<T>(request)
            .await?
            .data
            .ok_or_else(|| ApiError::Rejected {
                message: Some("response carried no data".into()),
            })
    }

    async fn send_unit(&self, request: RequestBuilder) -> Result<()> {
        self.send::<serde_json::Value>(request).await.map(|_| ())
    }
}

#[async_trait]
impl StudentApi for HttpApi {
    #[instrument(skip(self))]
    async fn list_students(&self, query: &ListQuery) -> Result<StudentPage> {
        let url = self.config.endpoint("student/getStudents");
        let envelope = self
            .send::<Vec<Student>>(self.client.get(url).query(query))
            .await?;
        let rows = envelope.data.unwrap_or_default();
        Ok(StudentPage {
            total_records: envelope.total_records.unwrap_or(rows.len() as u64),
            total_pages: envelope.total_pages.unwrap_or(1),
            rows,
        })
    }

    #[instrument(skip(self))]
    async fn get_student(&self, id: &RecordId) -> Result<Student> {
        let url = self.config.endpoint(&format!("student/getStudent/{id}"));
        self.send_data(self.client.get(url)).await
    }

    #[instrument(skip(self, input), fields(card_id = %input.student_card_id))]
    async fn create_student(&self, input: &StudentInput) -> Result<Student> {
        let url = self.config.endpoint("student/setStudentInfo");
        self.send_data(self.client.post(url).json(input)).await
    }

    #[instrument(skip(self, input))]
    async fn update_student(&self, id: &RecordId, input: &StudentInput) -> Result<Student> {
        let url = self.config.endpoint("student/updateStudentInfo");
        let body = StudentUpdate {
            id: id.clone(),
            input: input.clone(),
        };
        self.send_data(self.client.put(url).query(&[("id", id.as_str())]).json(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_student(&self, id: &RecordId) -> Result<()> {
        let url = self.config.endpoint(&format!("student/deleteStudentById/{id}"));
        self.send_unit(self.client.delete(url)).await
    }

    #[instrument(skip(self))]
    async fn list_marks(&self, student_id: &RecordId) -> Result<Vec<Mark>> {
        let url = self.config.endpoint(&format!("mark/studentMarks/{student_id}"));
        Ok(self
            .send::<Vec<Mark>>(self.client.get(url))
            .await?
            .data
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn create_mark(&self, input: &MarkInput) -> Result<Mark> {
        let url = self.config.endpoint("mark/setStudentMarks");
        self.send_data(self.client.post(url).json(input)).await
    }

    #[instrument(skip(self))]
    async fn update_mark(&self, id: &RecordId, input: &MarkUpdate) -> Result<Mark> {
        let url = self.config.endpoint(&format!("mark/studentMarks/{id}"));
        self.send_data(self.client.put(url).json(input)).await
    }

    #[instrument(skip(self))]
    async fn delete_mark(&self, id: &RecordId) -> Result<()> {
        let url = self.config.endpoint(&format!("mark/studentMarks/{id}"));
        self.send_unit(self.client.delete(url)).await
    }
}

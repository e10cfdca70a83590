//! In-process HTTP backend for tests: the REST contract served over `FakeApi`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use super::dto::{Envelope, IdParam, ListQuery};
use super::{FakeApi, StudentApi};
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::id::RecordId;
use crate::marks::model::{MarkInput, MarkUpdate};
use crate::students::model::{StudentInput, StudentUpdate};

type Shared = Arc<FakeApi>;

fn reply<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(data) => Json(Envelope::ok(data)).into_response(),
        Err(ApiError::NotFound(what)) => (
            StatusCode::NOT_FOUND,
            Json(Envelope::<()>::failed(format!("{what} not found"))),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Envelope::<()>::failed(e.to_string())),
        )
            .into_response(),
    }
}

async fn list_students(State(api): State<Shared>, Query(q): Query<ListQuery>) -> Response {
    match api.list_students(&q).await {
        Ok(page) => Json(Envelope {
            success: true,
            data: Some(page.rows),
            message: None,
            total_records: Some(page.total_records),
            total_pages: Some(page.total_pages),
        })
        .into_response(),
        Err(e) => reply::<()>(Err(e)),
    }
}

async fn get_student(State(api): State<Shared>, Path(id): Path<String>) -> Response {
    reply(api.get_student(&RecordId::from(id)).await)
}

async fn create_student(State(api): State<Shared>, Json(input): Json<StudentInput>) -> Response {
    reply(api.create_student(&input).await)
}

async fn update_student(
    State(api): State<Shared>,
    Query(param): Query<IdParam>,
    Json(body): Json<StudentUpdate>,
) -> Response {
    if param.id != body.id {
        return (
            StatusCode::BAD_REQUEST,
            Json(Envelope::<()>::failed("id mismatch")),
        )
            .into_response();
    }
    reply(api.update_student(&param.id, &body.input).await)
}

async fn delete_student(State(api): State<Shared>, Path(id): Path<String>) -> Response {
    reply(api.delete_student(&RecordId::from(id)).await)
}

async fn list_marks(State(api): State<Shared>, Path(id): Path<String>) -> Response {
    reply(api.list_marks(&RecordId::from(id)).await)
}

async fn create_mark(State(api): State<Shared>, Json(input): Json<MarkInput>) -> Response {
    reply(api.create_mark(&input).await)
}

async fn update_mark(
    State(api): State<Shared>,
    Path(id): Path<String>,
    Json(input): Json<MarkUpdate>,
) -> Response {
    reply(api.update_mark(&RecordId::from(id), &input).await)
}

async fn delete_mark(State(api): State<Shared>, Path(id): Path<String>) -> Response {
    reply(api.delete_mark(&RecordId::from(id)).await)
}

pub(crate) fn backend(api: Shared) -> Router {
    Router::new()
        .route("/student/getStudents", get(list_students))
        .route("/student/getStudent/:id", get(get_student))
        .route("/student/setStudentInfo", post(create_student))
        .route("/student/updateStudentInfo", put(update_student))
        .route(
            "/student/deleteStudentById/:id",
            axum::routing::delete(delete_student),
        )
        .route("/mark/setStudentMarks", post(create_mark))
        .route(
            "/mark/studentMarks/:id",
            get(list_marks).put(update_mark).delete(delete_mark),
        )
        .with_state(api)
}

/// Serves `router` on an ephemeral port and returns the matching config.
pub(crate) async fn serve(router: Router) -> ApiConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router.layer(TraceLayer::new_for_http()))
            .await
            .expect("test server");
    });
    ApiConfig::new(format!("http://{addr}"))
}

/// The full contract under `/api`, so base-path joining is exercised too.
pub(crate) async fn spawn(api: Shared) -> ApiConfig {
    let config = serve(Router::new().nest("/api", backend(api))).await;
    ApiConfig::new(format!("{}/api", config.base_url))
}

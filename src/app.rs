use std::sync::Arc;

use crate::api::{HttpApi, StudentApi};
use crate::config::ApiConfig;
use crate::feedback::{Confirmer, Notifier, Outcome};
use crate::marks::{MarksSnapshot, MarksView};
use crate::routes::Route;
use crate::students::{DirectorySnapshot, DirectoryView};

/// What a navigation ended up showing.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Directory(DirectorySnapshot),
    Marks(MarksSnapshot),
    NotFound,
}

/// Both views wired to one backend and one pair of feedback seams.
#[derive(Clone)]
pub struct App {
    directory: DirectoryView,
    marks: MarksView,
}

impl App {
    /// Talks HTTP to `API_BASE_URL` from the environment.
    pub fn init(notifier: Arc<dyn Notifier>, confirmer: Arc<dyn Confirmer>) -> anyhow::Result<Self> {
        let config = ApiConfig::from_env()?;
        tracing::info!(base_url = %config.base_url, "using student API");
        let api = Arc::new(HttpApi::new(config)) as Arc<dyn StudentApi>;
        Ok(Self::from_parts(api, notifier, confirmer))
    }

    pub fn from_parts(
        api: Arc<dyn StudentApi>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            directory: DirectoryView::new(api.clone(), notifier.clone(), confirmer.clone()),
            marks: MarksView::new(api, notifier, confirmer),
        }
    }

    pub fn directory(&self) -> &DirectoryView {
        &self.directory
    }

    pub fn marks(&self) -> &MarksView {
        &self.marks
    }

    /// Shows the view for `path`, loading its data first.
    pub async fn navigate(&self, path: &str) -> (View, Outcome) {
        let route = Route::parse(path);
        tracing::debug!(%path, ?route, "navigate");
        match route {
            Route::Directory => {
                self.marks.leave().await;
                let outcome = self.directory.mount().await;
                (View::Directory(self.directory.snapshot().await), outcome)
            }
            Route::StudentMarks { student_id } => {
                let outcome = self.marks.open(student_id).await;
                (View::Marks(self.marks.snapshot().await), outcome)
            }
            Route::NotFound => {
                self.marks.leave().await;
                (View::NotFound, Outcome::Invalid)
            }
        }
    }
}

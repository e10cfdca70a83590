use std::ops::RangeInclusive;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::editor::StudentEditor;
use super::model::Student;
use super::pagination::PageControls;
use crate::api::{ListQuery, SortField, SortOrder, StudentApi};
use crate::feedback::{ConfirmPrompt, Confirmer, Decision, Notice, Notifier, Outcome};
use crate::id::RecordId;
use crate::routes::Route;

/// Standards offered by the directory's filter dropdown.
pub const FILTER_STANDARDS: RangeInclusive<u8> = 1..=12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::Ten,
        PageSize::Twenty,
        PageSize::Fifty,
        PageSize::Hundred,
    ];

    pub fn get(self) -> u32 {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = u32;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        PageSize::ALL.into_iter().find(|p| p.get() == n).ok_or(n)
    }
}

/// What the directory asks the server for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryQuery {
    pub page: u32,
    pub page_size: PageSize,
    pub search: String,
    pub standard: Option<u8>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for DirectoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::Ten,
            search: String::new(),
            standard: None,
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

impl DirectoryQuery {
    pub fn to_list_query(&self) -> ListQuery {
        let search = self.search.trim();
        ListQuery {
            page: self.page,
            limit: self.page_size.get(),
            search: (!search.is_empty()).then(|| search.to_string()),
            standard: self.standard,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }

    /// Same column flips the order; a new column starts descending.
    /// The page is left alone.
    pub fn change_sort(&mut self, field: SortField) {
        if self.sort_by == field {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_by = field;
            self.sort_order = SortOrder::Desc;
        }
    }

    /// Back to defaults, keeping the page size.
    pub fn clear_filters(&mut self) {
        *self = Self {
            page_size: self.page_size,
            ..Self::default()
        };
    }
}

#[derive(Debug, Default)]
struct DirectoryState {
    query: DirectoryQuery,
    rows: Vec<Student>,
    total_records: u64,
    total_pages: u32,
    loading: bool,
    expanded: Option<RecordId>,
    editor: Option<StudentEditor>,
    // bumped whenever an editor is opened or closed
    editor_epoch: u64,
    // bumped per list request; only the latest response is applied
    seq: u64,
}

impl DirectoryState {
    fn set_editor(&mut self, editor: Option<StudentEditor>) {
        self.editor_epoch += 1;
        self.editor = editor;
    }
}

/// Render-ready copy of the directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySnapshot {
    pub query: DirectoryQuery,
    pub rows: Vec<Student>,
    pub total_records: u64,
    pub total_pages: u32,
    pub loading: bool,
    pub expanded: Option<RecordId>,
    pub editor: Option<StudentEditor>,
    pub pages: PageControls,
}

/// The student list with its search, filter, sort and paging state, and
/// the create/edit/delete actions hosted on it.
#[derive(Clone)]
pub struct DirectoryView {
    api: Arc<dyn StudentApi>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    state: Arc<Mutex<DirectoryState>>,
}

impl DirectoryView {
    pub fn new(
        api: Arc<dyn StudentApi>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            api,
            notifier,
            confirmer,
            state: Arc::new(Mutex::new(DirectoryState::default())),
        }
    }

    pub async fn snapshot(&self) -> DirectorySnapshot {
        let st = self.state.lock().await;
        DirectorySnapshot {
            query: st.query.clone(),
            rows: st.rows.clone(),
            total_records: st.total_records,
            total_pages: st.total_pages,
            loading: st.loading,
            expanded: st.expanded.clone(),
            editor: st.editor.clone(),
            pages: PageControls::new(st.query.page, st.total_pages),
        }
    }

    pub async fn mount(&self) -> Outcome {
        self.refresh().await
    }

    /// Fetches the page for the current query. On failure the rows already
    /// on screen stay.
    pub async fn refresh(&self) -> Outcome {
        let (seq, query) = {
            let mut st = self.state.lock().await;
            st.seq += 1;
            st.loading = true;
            (st.seq, st.query.to_list_query())
        };

        let result = self.api.list_students(&query).await;

        {
            let mut st = self.state.lock().await;
            if st.seq != seq {
                debug!(seq, latest = st.seq, "dropping superseded student page");
                return Outcome::Superseded;
            }
            st.loading = false;
            if let Ok(page) = &result {
                st.rows = page.rows.clone();
                st.total_records = page.total_records;
                st.total_pages = page.total_pages;
            }
        }

        match result {
            Ok(page) => {
                debug!(rows = page.rows.len(), total = page.total_records, "student page loaded");
                Outcome::Done
            }
            Err(e) => {
                error!(error = %e, "fetching students failed");
                self.notifier.notify(Notice::error("Failed to fetch students"));
                Outcome::Failed
            }
        }
    }

    /// Updates the search box without querying; see [`Self::submit_search`].
    pub async fn set_search_term(&self, term: impl Into<String>) {
        self.state.lock().await.query.search = term.into();
    }

    pub async fn submit_search(&self) -> Outcome {
        self.state.lock().await.query.page = 1;
        self.refresh().await
    }

    pub async fn set_standard_filter(&self, standard: Option<u8>) -> Outcome {
        if let Some(s) = standard {
            if !FILTER_STANDARDS.contains(&s) {
                warn!(standard = s, "standard filter out of range");
                return Outcome::Invalid;
            }
        }
        {
            let mut st = self.state.lock().await;
            st.query.standard = standard;
            st.query.page = 1;
        }
        self.refresh().await
    }

    pub async fn set_page_size(&self, size: PageSize) -> Outcome {
        {
            let mut st = self.state.lock().await;
            st.query.page_size = size;
            st.query.page = 1;
        }
        self.refresh().await
    }

    pub async fn go_to_page(&self, page: u32) -> Outcome {
        {
            let mut st = self.state.lock().await;
            if page < 1 || page > st.total_pages.max(1) {
                return Outcome::Invalid;
            }
            st.query.page = page;
        }
        self.refresh().await
    }

    pub async fn next_page(&self) -> Outcome {
        let page = self.state.lock().await.query.page;
        self.go_to_page(page + 1).await
    }

    pub async fn prev_page(&self) -> Outcome {
        let page = self.state.lock().await.query.page;
        if page <= 1 {
            return Outcome::Invalid;
        }
        self.go_to_page(page - 1).await
    }

    pub async fn change_sort(&self, field: SortField) -> Outcome {
        self.state.lock().await.query.change_sort(field);
        self.refresh().await
    }

    pub async fn clear_filters(&self) -> Outcome {
        self.state.lock().await.query.clear_filters();
        self.refresh().await
    }

    /// Shows one row's details; toggling the open row closes it.
    pub async fn toggle_expanded(&self, id: &RecordId) {
        let mut st = self.state.lock().await;
        st.expanded = match st.expanded.take() {
            Some(open) if &open == id => None,
            _ => Some(id.clone()),
        };
    }

    /// Asks for confirmation naming the student, then deletes and refetches.
    pub async fn delete(&self, id: &RecordId) -> Outcome {
        let name = {
            let st = self.state.lock().await;
            st.rows.iter().find(|s| &s.id == id).map(|s| s.name.clone())
        };
        let who = name.as_deref().unwrap_or("this student");
        let prompt =
            ConfirmPrompt::destructive(format!("Delete {who}? This action cannot be undone."));

        if self.confirmer.confirm(prompt).await != Decision::Confirmed {
            debug!(%id, "delete cancelled");
            return Outcome::Cancelled;
        }

        match self.api.delete_student(id).await {
            Ok(()) => {
                info!(%id, "student deleted");
                self.notifier
                    .notify(Notice::success("Deleted!", "Student has been deleted."));
                self.refresh().await;
                Outcome::Done
            }
            Err(e) => {
                error!(error = %e, %id, "delete student failed");
                self.notifier.notify(Notice::error("Failed to delete student"));
                Outcome::Failed
            }
        }
    }

    pub async fn open_create(&self) {
        self.state.lock().await.set_editor(Some(StudentEditor::create()));
    }

    /// Opens the editor on a row of the current page.
    pub async fn open_edit(&self, id: &RecordId) -> bool {
        let mut st = self.state.lock().await;
        let Some(student) = st.rows.iter().find(|s| &s.id == id) else {
            warn!(%id, "edit requested for a student not on this page");
            return false;
        };
        let editor = StudentEditor::edit(student);
        st.set_editor(Some(editor));
        true
    }

    pub async fn close_editor(&self) {
        self.state.lock().await.set_editor(None);
    }

    /// Runs `f` against the open editor, if any.
    pub async fn edit_draft<R>(&self, f: impl FnOnce(&mut StudentEditor) -> R) -> Option<R> {
        self.state.lock().await.editor.as_mut().map(f)
    }

    /// Validates, then creates or updates. Success closes the editor and
    /// refreshes the list; failure leaves the draft as it was. An editor
    /// opened while the request was in flight stays open.
    pub async fn submit_editor(&self) -> Outcome {
        let (epoch, target, input) = {
            let mut st = self.state.lock().await;
            let epoch = st.editor_epoch;
            let Some(editor) = st.editor.as_mut() else {
                return Outcome::Invalid;
            };
            match editor.validate() {
                Ok(input) => (epoch, editor.target().cloned(), input),
                Err(errors) => {
                    let fields: Vec<_> = errors.fields().collect();
                    warn!(?fields, "student draft rejected");
                    return Outcome::Invalid;
                }
            }
        };

        let (result, done, failed) = match &target {
            Some(id) => (
                self.api.update_student(id, &input).await,
                Notice::success("Updated!", "Student information updated successfully."),
                "Failed to update student",
            ),
            None => (
                self.api.create_student(&input).await,
                Notice::success("Created!", "New student created successfully."),
                "Failed to create student",
            ),
        };

        match result {
            Ok(student) => {
                info!(id = %student.id, card_id = %student.student_card_id, "student saved");
                self.notifier.notify(done);
                {
                    let mut st = self.state.lock().await;
                    if st.editor_epoch == epoch {
                        st.set_editor(None);
                    } else {
                        debug!("keeping the editor opened during the save");
                    }
                }
                self.refresh().await;
                Outcome::Done
            }
            Err(e) => {
                error!(error = %e, "saving student failed");
                self.notifier.notify(Notice::error(failed));
                Outcome::Failed
            }
        }
    }

    pub fn marks_route(&self, id: &RecordId) -> Route {
        Route::StudentMarks {
            student_id: id.clone(),
        }
    }
}

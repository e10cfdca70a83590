use std::sync::Arc;

use thiserror::Error;
use time::Date;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::model::{format_average, Grade, Mark, MarkInput, MarkUpdate, MAX_MARK};
use crate::api::StudentApi;
use crate::feedback::{ConfirmPrompt, Confirmer, Decision, Notice, Notifier, Outcome};
use crate::id::RecordId;
use crate::students::model::Student;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MarkDraftError {
    #[error("Subject name is required.")]
    MissingSubject,
    #[error("Marks must be a whole number.")]
    NotANumber,
    #[error("Marks must be between 0 and 100.")]
    OutOfRange,
}

/// The add/edit mark form as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkDraft {
    pub subject_name: String,
    pub subject_mark: String,
}

impl MarkDraft {
    fn from_mark(mark: &Mark) -> Self {
        Self {
            subject_name: mark.subject_name.clone(),
            subject_mark: mark.subject_mark.to_string(),
        }
    }

    /// Subject and integer score, or the first problem found.
    pub fn parse(&self) -> Result<(String, i32), MarkDraftError> {
        let subject = self.subject_name.trim();
        if subject.is_empty() {
            return Err(MarkDraftError::MissingSubject);
        }
        let score: i32 = self
            .subject_mark
            .trim()
            .parse()
            .map_err(|_| MarkDraftError::NotANumber)?;
        if !(0..=MAX_MARK).contains(&score) {
            return Err(MarkDraftError::OutOfRange);
        }
        Ok((subject.to_string(), score))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkRow {
    pub mark: Mark,
    pub grade: Grade,
    pub updated_on: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarksSummary {
    pub student_name: String,
    pub roll_number: u32,
    pub standard: u8,
    pub total_subjects: usize,
    pub average: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarksSnapshot {
    pub student_id: Option<RecordId>,
    pub loading: bool,
    pub student: Option<Student>,
    pub rows: Vec<MarkRow>,
    pub summary: Option<MarksSummary>,
    pub form_open: bool,
    pub editing: Option<RecordId>,
    pub draft: MarkDraft,
    pub draft_error: Option<MarkDraftError>,
}

#[derive(Debug, Default)]
struct MarksState {
    active: Option<RecordId>,
    // bumped by every load and by leave()
    seq: u64,
    // bumped whenever the form is opened, closed or the student changes
    form_epoch: u64,
    loading: bool,
    student: Option<Student>,
    marks: Vec<Mark>,
    form_open: bool,
    editing: Option<RecordId>,
    draft: MarkDraft,
    draft_error: Option<MarkDraftError>,
}

impl MarksState {
    // Fresh state for `active`, keeping the counters moving forward.
    fn reset(&mut self, active: Option<RecordId>, seq: u64) {
        let form_epoch = self.form_epoch + 1;
        *self = MarksState {
            active,
            seq,
            form_epoch,
            ..MarksState::default()
        };
    }

    fn close_form(&mut self) {
        self.form_epoch += 1;
        self.form_open = false;
        self.editing = None;
        self.draft = MarkDraft::default();
        self.draft_error = None;
    }
}

/// One student's marks with the add/edit/delete flows.
#[derive(Clone)]
pub struct MarksView {
    api: Arc<dyn StudentApi>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    state: Arc<Mutex<MarksState>>,
}

impl MarksView {
    pub fn new(
        api: Arc<dyn StudentApi>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            api,
            notifier,
            confirmer,
            state: Arc::new(Mutex::new(MarksState::default())),
        }
    }

    /// Switches to `student_id`, dropping whatever the previous student
    /// had on screen, and loads it.
    pub async fn open(&self, student_id: RecordId) -> Outcome {
        {
            let mut st = self.state.lock().await;
            let seq = st.seq;
            st.reset(Some(student_id), seq);
        }
        self.load().await
    }

    /// Stops caring about the current student; loads still in flight are
    /// discarded when they land.
    pub async fn leave(&self) {
        let mut st = self.state.lock().await;
        let seq = st.seq + 1;
        st.reset(None, seq);
    }

    /// Fetches the student and their marks together. Nothing is applied
    /// unless both succeed.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Outcome {
        let (seq, student_id) = {
            let mut st = self.state.lock().await;
            let Some(id) = st.active.clone() else {
                return Outcome::Invalid;
            };
            st.seq += 1;
            st.loading = true;
            (st.seq, id)
        };

        let (student, marks) = tokio::join!(
            self.api.get_student(&student_id),
            self.api.list_marks(&student_id)
        );

        let mut st = self.state.lock().await;
        if st.seq != seq || st.active.as_ref() != Some(&student_id) {
            debug!(%student_id, "dropping superseded marks load");
            return Outcome::Superseded;
        }
        st.loading = false;
        match (student, marks) {
            (Ok(student), Ok(marks)) => {
                debug!(%student_id, marks = marks.len(), "marks loaded");
                st.student = Some(student);
                st.marks = marks;
                Outcome::Done
            }
            (student, marks) => {
                if let Err(e) = &student {
                    error!(error = %e, %student_id, "fetching student failed");
                }
                if let Err(e) = &marks {
                    error!(error = %e, %student_id, "fetching marks failed");
                }
                drop(st);
                self.notifier.notify(Notice::error("Failed to fetch data"));
                Outcome::Failed
            }
        }
    }

    pub async fn begin_add(&self) {
        let mut st = self.state.lock().await;
        st.close_form();
        st.form_open = true;
    }

    /// Opens the form on a loaded mark.
    pub async fn begin_edit(&self, mark_id: &RecordId) -> bool {
        let mut st = self.state.lock().await;
        let Some(draft) = st.marks.iter().find(|m| &m.id == mark_id).map(MarkDraft::from_mark)
        else {
            warn!(%mark_id, "edit requested for an unknown mark");
            return false;
        };
        st.close_form();
        st.draft = draft;
        st.editing = Some(mark_id.clone());
        st.form_open = true;
        true
    }

    pub async fn cancel_form(&self) {
        self.state.lock().await.close_form();
    }

    pub async fn set_subject_name(&self, name: impl Into<String>) {
        self.state.lock().await.draft.subject_name = name.into();
    }

    pub async fn set_subject_mark(&self, score: impl Into<String>) {
        self.state.lock().await.draft.subject_mark = score.into();
    }

    /// Checks the draft, asks for confirmation, then adds or updates.
    ///
    /// A save that lands after the operator moved to another student or
    /// reopened the form leaves the newer form alone.
    pub async fn submit_mark(&self) -> Outcome {
        let (student_id, form_epoch, editing, subject_name, subject_mark) = {
            let mut st = self.state.lock().await;
            let Some(student_id) = st.active.clone() else {
                return Outcome::Invalid;
            };
            if !st.form_open {
                return Outcome::Invalid;
            }
            match st.draft.parse() {
                Ok((subject, score)) => {
                    st.draft_error = None;
                    (student_id, st.form_epoch, st.editing.clone(), subject, score)
                }
                Err(e) => {
                    warn!(error = %e, "mark draft rejected");
                    st.draft_error = Some(e);
                    return Outcome::Invalid;
                }
            }
        };

        let question = if editing.is_some() {
            "Update Mark?"
        } else {
            "Add New Mark?"
        };
        if self.confirmer.confirm(ConfirmPrompt::question(question)).await != Decision::Confirmed {
            debug!(%student_id, "mark submit cancelled");
            return Outcome::Cancelled;
        }

        let (result, title, done, failed) = match &editing {
            Some(id) => (
                self.api
                    .update_mark(
                        id,
                        &MarkUpdate {
                            subject_name,
                            subject_mark,
                        },
                    )
                    .await,
                "Updated!",
                "Mark updated successfully",
                "Failed to update mark",
            ),
            None => (
                self.api
                    .create_mark(&MarkInput {
                        student_id: student_id.clone(),
                        subject_name,
                        subject_mark,
                    })
                    .await,
                "Created!",
                "Mark added successfully",
                "Failed to add mark",
            ),
        };

        match result {
            Ok(mark) => {
                info!(id = %mark.id, %student_id, score = mark.subject_mark, "mark saved");
                self.notifier.notify(Notice::success(title, done));
                let still_here = {
                    let mut st = self.state.lock().await;
                    if st.form_epoch == form_epoch {
                        st.close_form();
                    }
                    st.active.as_ref() == Some(&student_id)
                };
                if still_here {
                    self.load().await;
                } else {
                    debug!(%student_id, "mark saved after leaving the student");
                }
                Outcome::Done
            }
            Err(e) => {
                error!(error = %e, %student_id, "saving mark failed");
                self.notifier.notify(Notice::error(failed));
                Outcome::Failed
            }
        }
    }

    /// Deletes after confirmation. The row disappears only once the
    /// refetch confirms it.
    pub async fn delete_mark(&self, mark_id: &RecordId) -> Outcome {
        let student_id = self.state.lock().await.active.clone();
        let prompt =
            ConfirmPrompt::destructive("Delete this mark record? This action cannot be undone.");
        if self.confirmer.confirm(prompt).await != Decision::Confirmed {
            return Outcome::Cancelled;
        }

        match self.api.delete_mark(mark_id).await {
            Ok(()) => {
                info!(%mark_id, "mark deleted");
                self.notifier
                    .notify(Notice::success("Deleted!", "Mark deleted successfully"));
                if self.state.lock().await.active == student_id {
                    self.load().await;
                }
                Outcome::Done
            }
            Err(e) => {
                error!(error = %e, %mark_id, "delete mark failed");
                self.notifier.notify(Notice::error("Failed to delete mark"));
                Outcome::Failed
            }
        }
    }

    pub async fn snapshot(&self) -> MarksSnapshot {
        let st = self.state.lock().await;
        let rows = st
            .marks
            .iter()
            .map(|m| MarkRow {
                mark: m.clone(),
                grade: m.grade(),
                updated_on: m.updated_on(),
            })
            .collect();
        let summary = st.student.as_ref().map(|s| MarksSummary {
            student_name: s.name.clone(),
            roll_number: s.roll_number,
            standard: s.standard,
            total_subjects: st.marks.len(),
            average: format_average(&st.marks),
        });
        MarksSnapshot {
            student_id: st.active.clone(),
            loading: st.loading,
            student: st.student.clone(),
            rows,
            summary,
            form_open: st.form_open,
            editing: st.editing.clone(),
            draft: st.draft.clone(),
            draft_error: st.draft_error,
        }
    }
}

//! Toasts and confirmation dialogs, seen from the views.
//!
//! Presentation is somebody else's job: views raise a [`Notice`] through a
//! [`Notifier`] and ask a [`Confirmer`] before anything destructive.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub text: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error!".into(),
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// What the operator is asked before a request goes out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub text: Option<String>,
    pub confirm_label: String,
    pub destructive: bool,
}

impl ConfirmPrompt {
    pub fn destructive(text: impl Into<String>) -> Self {
        Self {
            title: "Are you sure?".into(),
            text: Some(text.into()),
            confirm_label: "Yes, delete it!".into(),
            destructive: true,
        }
    }

    pub fn question(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: None,
            confirm_label: "Yes".into(),
            destructive: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Cancelled,
}

/// Suspends the initiating flow until the operator decides.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: ConfirmPrompt) -> Decision;
}

/// How a view operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The operator declined the confirmation; nothing was sent.
    Cancelled,
    /// Client-side checks failed; nothing was sent.
    Invalid,
    /// The request failed; previous state is untouched.
    Failed,
    /// A newer request or navigation made this response irrelevant.
    Superseded,
}

/// Writes notices to the log instead of a screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(title = %notice.title, "{}", notice.text),
            NoticeLevel::Error => error!(title = %notice.title, "{}", notice.text),
        }
    }
}

/// Answers every prompt the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub Decision);

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm(&self, _prompt: ConfirmPrompt) -> Decision {
        self.0
    }
}

/// Keeps every notice it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices().pop()
    }

    pub fn errors(&self) -> usize {
        self.notices().iter().filter(|n| n.is_error()).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

/// Replays queued decisions in order and remembers the prompts it saw.
/// Once the queue is empty every prompt is cancelled.
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<Decision>>,
    prompts: Mutex<Vec<ConfirmPrompt>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            prompts: Mutex::default(),
        }
    }

    pub fn push(&self, decision: Decision) {
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(decision);
    }

    pub fn prompts(&self) -> Vec<ConfirmPrompt> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: ConfirmPrompt) -> Decision {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt);
        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Decision::Cancelled)
    }
}

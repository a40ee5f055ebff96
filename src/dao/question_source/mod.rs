mod catalog;

pub use catalog::{CatalogError, MovieCatalogSource};

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use futures::future::BoxFuture;
use thiserror::Error;

use crate::state::game::Question;

/// Reason a question source could not be prepared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct LoadError {
    /// Human readable cause, forwarded to the presenter.
    pub reason: String,
}

impl LoadError {
    /// Wrap a failure reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Supplier of quiz questions.
pub trait QuestionSource: Send + Sync {
    /// Prepare the source. Called again on every retry after a failure.
    fn load(&self) -> BoxFuture<'static, Result<(), LoadError>>;

    /// Hand out the next question, or `None` when nothing is available right now.
    fn next_question(&self) -> BoxFuture<'static, Option<Question>>;
}

/// Deterministic source serving a fixed queue of questions.
#[derive(Clone, Default)]
pub struct ScriptedQuestionSource {
    questions: Arc<Mutex<VecDeque<Question>>>,
    load_failure: Arc<Mutex<Option<String>>>,
    load_calls: Arc<AtomicUsize>,
}

impl ScriptedQuestionSource {
    /// Serve `questions` in order, then report `None`.
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions.into_iter().collect())),
            ..Self::default()
        }
    }

    /// Source whose `load` fails with `reason` until cleared.
    pub fn failing(reason: impl Into<String>) -> Self {
        let source = Self::default();
        source.set_load_failure(Some(reason.into()));
        source
    }

    /// Make subsequent `load` calls fail with the given reason, or succeed with `None`.
    pub fn set_load_failure(&self, reason: Option<String>) {
        *self
            .load_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = reason;
    }

    /// Append questions to the queue.
    pub fn push(&self, questions: impl IntoIterator<Item = Question>) {
        self.questions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(questions);
    }

    /// How many times `load` has been called.
    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

impl QuestionSource for ScriptedQuestionSource {
    fn load(&self) -> BoxFuture<'static, Result<(), LoadError>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        let failure = self
            .load_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Box::pin(async move {
            match failure {
                Some(reason) => Err(LoadError::new(reason)),
                None => Ok(()),
            }
        })
    }

    fn next_question(&self) -> BoxFuture<'static, Option<Question>> {
        let question = self
            .questions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        Box::pin(async move { question })
    }
}

//! Quiz round flow: questions, answers, feedback and the end-of-round result.
//!
//! [`QuizSession`] is driven by events (`start`, question delivery, answers,
//! `advance`, `restart`) and reports everything the player should see through a
//! [`Presenter`]. Events that do not fit the current phase are ignored.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    clock::Clock,
    dao::question_source::QuestionSource,
    dto::presenter::{ErrorSignal, FeedbackSignal, QuestionViewModel, ResultViewModel},
    error::ServiceError,
    services::{
        presenter::{Presenter, PresenterSignal},
        statistics_service::StatisticsService,
    },
    state::{
        game::{AggregateStatistics, GameResult, Question},
        state_machine::{QuizEvent, QuizPhase, QuizStateMachine},
    },
};

/// Read-only view of a [`QuizSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Identifier of the current round. Changes on every start.
    pub round_id: Uuid,
    /// Where the round stands.
    pub phase: QuizPhase,
    /// Zero-based index of the question being asked.
    pub current_index: u32,
    /// Correct answers so far in this round.
    pub correct_count: u32,
    /// Questions per round; zero before the first start.
    pub total_questions: u32,
    /// Reason of the last load failure, cleared on the next start.
    pub last_error: Option<String>,
}

/// One player's quiz, one round at a time.
pub struct QuizSession {
    machine: QuizStateMachine,
    round_id: Uuid,
    total_questions: u32,
    current_index: u32,
    correct_count: u32,
    current_question: Option<Question>,
    last_error: Option<String>,
    questions: Arc<dyn QuestionSource>,
    statistics: Arc<StatisticsService>,
    presenter: Arc<dyn Presenter>,
    clock: Clock,
}

impl QuizSession {
    /// Create an idle session. Nothing is loaded until [`QuizSession::start`].
    pub fn new(
        questions: Arc<dyn QuestionSource>,
        statistics: Arc<StatisticsService>,
        presenter: Arc<dyn Presenter>,
        clock: Clock,
    ) -> Self {
        Self {
            machine: QuizStateMachine::new(),
            round_id: Uuid::new_v4(),
            total_questions: 0,
            current_index: 0,
            correct_count: 0,
            current_question: None,
            last_error: None,
            questions,
            statistics,
            presenter,
            clock,
        }
    }

    /// Begin a new round of `total_questions` questions.
    ///
    /// Non-positive totals are rejected before any state changes. A load failure
    /// leaves the session idle and shows an error the player can retry from.
    pub async fn start(&mut self, total_questions: i64) -> Result<(), ServiceError> {
        let total = validate_total(total_questions)?;

        self.reset(total);
        info!(round_id = %self.round_id, total_questions = total, "starting round");

        if let Err(err) = self.questions.load().await {
            warn!(round_id = %self.round_id, reason = %err, "question source failed to load");
            self.last_error = Some(err.reason.clone());
            self.present(PresenterSignal::Error(ErrorSignal::new(err.reason.clone())));
            return Err(ServiceError::LoadFailed(err.reason));
        }

        if let Err(err) = self.machine.apply(QuizEvent::SourceLoaded) {
            debug!(error = %err, "round already loaded");
        }
        self.request_question().await;
        Ok(())
    }

    /// Poll the question source when a question is due.
    ///
    /// Useful after a previous poll returned nothing.
    pub async fn request_question(&mut self) {
        if !self.machine.can_apply(QuizEvent::QuestionReceived) {
            debug!(phase = ?self.machine.phase(), "no question due, skipping request");
            return;
        }

        let question = self.questions.next_question().await;
        self.on_question_received(question);
    }

    /// Deliver a question from the source. `None` means nothing is available yet.
    pub fn on_question_received(&mut self, question: Option<Question>) {
        let Some(question) = question else {
            debug!(round_id = %self.round_id, "question source had nothing to offer");
            return;
        };

        if let Err(err) = self.machine.apply(QuizEvent::QuestionReceived) {
            debug!(error = %err, "ignoring question");
            return;
        }

        let view = QuestionViewModel::new(&question, self.current_index, self.total_questions);
        self.current_question = Some(question);
        self.present(PresenterSignal::Question(view));
    }

    /// Score the player's answer to the current question.
    ///
    /// Returns whether the answer was correct, or `None` when no answer is expected.
    pub fn submit_answer(&mut self, user_says_yes: bool) -> Option<bool> {
        let correct_answer = self.current_question.as_ref()?.correct_answer;

        if let Err(err) = self.machine.apply(QuizEvent::AnswerSubmitted) {
            debug!(error = %err, "ignoring answer");
            return None;
        }

        let is_correct = user_says_yes == correct_answer;
        if is_correct {
            self.correct_count += 1;
        }
        debug!(
            round_id = %self.round_id,
            index = self.current_index,
            is_correct,
            "answer scored"
        );

        self.present(PresenterSignal::Feedback(FeedbackSignal { is_correct }));
        Some(is_correct)
    }

    /// Move past the feedback: next question, or the result after the last one.
    pub async fn advance(&mut self) {
        if self.machine.phase() != QuizPhase::ShowingFeedback {
            debug!(phase = ?self.machine.phase(), "ignoring advance");
            return;
        }

        if self.current_index + 1 >= self.total_questions {
            self.finish_round().await;
            return;
        }

        if let Err(err) = self.machine.apply(QuizEvent::NextQuestionRequested) {
            debug!(error = %err, "ignoring advance");
            return;
        }
        self.current_index += 1;
        self.current_question = None;
        self.request_question().await;
    }

    /// Start a fresh round with the same length.
    ///
    /// Only after a finished round, a load failure, or while the first question
    /// has not arrived yet.
    pub async fn restart(&mut self) -> Result<(), ServiceError> {
        match self.machine.phase() {
            QuizPhase::RoundComplete | QuizPhase::Idle | QuizPhase::AwaitingFirstQuestion => {
                self.start(i64::from(self.total_questions)).await
            }
            phase => {
                debug!(?phase, "ignoring restart while a round is running");
                Ok(())
            }
        }
    }

    /// Copy of the observable session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            round_id: self.round_id,
            phase: self.machine.phase(),
            current_index: self.current_index,
            correct_count: self.correct_count,
            total_questions: self.total_questions,
            last_error: self.last_error.clone(),
        }
    }

    /// Identifier of the current round.
    pub fn round_id(&self) -> Uuid {
        self.round_id
    }

    /// Current phase of the round.
    pub fn phase(&self) -> QuizPhase {
        self.machine.phase()
    }

    /// Zero-based index of the current question.
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    fn reset(&mut self, total: u32) {
        // Reset is accepted from every phase.
        let _ = self.machine.apply(QuizEvent::Reset);
        self.round_id = Uuid::new_v4();
        self.total_questions = total;
        self.current_index = 0;
        self.correct_count = 0;
        self.current_question = None;
        self.last_error = None;
    }

    async fn finish_round(&mut self) {
        if let Err(err) = self.machine.apply(QuizEvent::RoundFinished) {
            debug!(error = %err, "ignoring round end");
            return;
        }
        self.current_question = None;

        let result = GameResult::new(self.correct_count, self.total_questions, self.clock.now());
        let statistics = match self.statistics.record(result).await {
            Ok(statistics) => statistics,
            Err(err) => {
                warn!(round_id = %self.round_id, error = %err, "failed to record round");
                self.fallback_statistics().await
            }
        };

        info!(
            round_id = %self.round_id,
            correct = result.correct,
            total = result.total,
            "round complete"
        );
        self.present(PresenterSignal::Result(ResultViewModel::new(
            &result,
            &statistics,
        )));
    }

    async fn fallback_statistics(&self) -> AggregateStatistics {
        match self.statistics.current_statistics().await {
            Ok(statistics) => statistics,
            Err(err) => {
                warn!(error = %err, "statistics unreadable, showing empty aggregate");
                AggregateStatistics::empty(self.clock.now())
            }
        }
    }

    fn present(&self, signal: PresenterSignal) {
        self.presenter.present(self.round_id, signal);
    }
}

fn validate_total(total_questions: i64) -> Result<u32, ServiceError> {
    if total_questions <= 0 {
        return Err(ServiceError::InvalidConfiguration(format!(
            "total questions must be positive, got {total_questions}"
        )));
    }
    u32::try_from(total_questions).map_err(|_| {
        ServiceError::InvalidConfiguration(format!(
            "total questions must fit in 32 bits, got {total_questions}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::fixed_clock,
        dao::{question_source::ScriptedQuestionSource, statistics_store::InMemoryStatisticsStore},
        services::presenter::RecordingPresenter,
    };

    fn question(correct_answer: bool) -> Question {
        Question {
            image_data: vec![0x89, 0x50],
            text: "Is the rating of this movie greater than 6?".into(),
            correct_answer,
        }
    }

    struct Harness {
        session: QuizSession,
        source: ScriptedQuestionSource,
        presenter: Arc<RecordingPresenter>,
    }

    fn harness(questions: impl IntoIterator<Item = Question>) -> Harness {
        let source = ScriptedQuestionSource::new(questions);
        let presenter = Arc::new(RecordingPresenter::new());
        let statistics = Arc::new(StatisticsService::new(
            Arc::new(InMemoryStatisticsStore::new()),
            fixed_clock(),
        ));
        let session = QuizSession::new(
            Arc::new(source.clone()),
            statistics,
            presenter.clone(),
            fixed_clock(),
        );
        Harness {
            session,
            source,
            presenter,
        }
    }

    #[tokio::test]
    async fn non_positive_total_is_rejected_without_loading() {
        let mut h = harness([]);
        for total in [0, -3] {
            let err = h.session.start(total).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidConfiguration(_)));
        }
        assert_eq!(h.source.load_calls(), 0);
        assert!(h.presenter.signals().is_empty());
    }

    #[tokio::test]
    async fn start_shows_first_question() {
        let mut h = harness([question(true)]);
        h.session.start(3).await.unwrap();

        assert_eq!(h.session.phase(), QuizPhase::AwaitingAnswer);
        assert_eq!(h.presenter.questions()[0].progress_label, "1 / 3");
    }

    #[tokio::test]
    async fn empty_poll_keeps_waiting_until_requested_again() {
        let mut h = harness([]);
        h.session.start(2).await.unwrap();
        assert_eq!(h.session.phase(), QuizPhase::AwaitingFirstQuestion);
        assert!(h.presenter.signals().is_empty());

        h.source.push([question(false)]);
        h.session.request_question().await;
        assert_eq!(h.session.phase(), QuizPhase::AwaitingAnswer);
    }

    #[tokio::test]
    async fn answer_without_question_is_ignored() {
        let mut h = harness([]);
        h.session.start(2).await.unwrap();
        assert_eq!(h.session.submit_answer(true), None);
        assert!(h.presenter.feedback().is_empty());
    }

    #[tokio::test]
    async fn second_answer_is_ignored() {
        let mut h = harness([question(true)]);
        h.session.start(1).await.unwrap();

        assert_eq!(h.session.submit_answer(true), Some(true));
        assert_eq!(h.session.submit_answer(true), None);
        assert_eq!(h.session.snapshot().correct_count, 1);
        assert_eq!(h.presenter.feedback().len(), 1);
    }

    #[tokio::test]
    async fn question_while_answering_is_ignored() {
        let mut h = harness([question(true)]);
        h.session.start(2).await.unwrap();
        h.session.on_question_received(Some(question(false)));

        assert_eq!(h.presenter.questions().len(), 1);
        assert_eq!(h.session.submit_answer(true), Some(true));
    }

    #[tokio::test]
    async fn advance_outside_feedback_is_ignored() {
        let mut h = harness([question(true)]);
        h.session.start(2).await.unwrap();
        h.session.advance().await;

        assert_eq!(h.session.current_index(), 0);
        assert_eq!(h.session.phase(), QuizPhase::AwaitingAnswer);
    }

    #[tokio::test]
    async fn restart_mid_round_is_ignored() {
        let mut h = harness([question(true)]);
        h.session.start(2).await.unwrap();
        let round = h.session.round_id();

        h.session.restart().await.unwrap();
        assert_eq!(h.session.round_id(), round);
        assert_eq!(h.source.load_calls(), 1);
    }

    #[tokio::test]
    async fn single_question_round_completes() {
        let mut h = harness([question(false)]);
        h.session.start(1).await.unwrap();
        h.session.submit_answer(false);
        h.session.advance().await;

        assert_eq!(h.session.phase(), QuizPhase::RoundComplete);
        let result = &h.presenter.results()[0];
        assert_eq!(result.score_text, "1/1");
        assert_eq!(result.title, "This round is over!");
        assert_eq!(result.games_played, 1);
    }

    #[tokio::test]
    async fn question_before_start_is_ignored() {
        let mut h = harness([question(true)]);
        h.session.on_question_received(Some(question(true)));

        assert_eq!(h.session.phase(), QuizPhase::Idle);
        assert!(h.presenter.signals().is_empty());
        assert_eq!(h.session.submit_answer(true), None);

        h.session.request_question().await;
        assert_eq!(h.session.phase(), QuizPhase::Idle);
        assert!(h.presenter.signals().is_empty());
    }

    #[tokio::test]
    async fn questions_after_load_failure_are_ignored() {
        let mut h = harness([question(true)]);
        h.source.set_load_failure(Some("catalog offline".into()));
        h.session.start(2).await.unwrap_err();

        h.session.on_question_received(Some(question(true)));
        h.session.request_question().await;

        assert_eq!(h.session.phase(), QuizPhase::Idle);
        assert!(h.presenter.questions().is_empty());
        assert_eq!(h.presenter.errors().len(), 1);
        assert_eq!(h.session.submit_answer(true), None);
        assert!(h.presenter.results().is_empty());
    }
}

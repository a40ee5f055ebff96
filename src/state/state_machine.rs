use thiserror::Error;

/// Phases a quiz round moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// No round loaded: before the first start, or after a load failure.
    Idle,
    /// The question source loaded; the first question of the round is pending.
    AwaitingFirstQuestion,
    /// An answer was scored and the next question has been requested.
    AwaitingQuestion,
    /// A question is shown and answers are accepted.
    AwaitingAnswer,
    /// The answer is locked in and its correctness is displayed.
    ShowingFeedback,
    /// The last question was answered and the result was recorded.
    RoundComplete,
}

/// Events that can be applied to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    /// Start over with a fresh round.
    Reset,
    /// The question source loaded successfully for the current round.
    SourceLoaded,
    /// A question arrived from the question source.
    QuestionReceived,
    /// The player answered the current question.
    AnswerSubmitted,
    /// Feedback elapsed and another question is due.
    NextQuestionRequested,
    /// Feedback elapsed on the last question.
    RoundFinished,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: QuizPhase,
    /// The event that cannot be applied from this phase.
    pub event: QuizEvent,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: QuizPhase,
    /// Number of transitions applied so far.
    pub version: usize,
}

/// State machine implementing the quiz round flow.
#[derive(Debug, Clone)]
pub struct QuizStateMachine {
    phase: QuizPhase,
    version: usize,
}

impl Default for QuizStateMachine {
    fn default() -> Self {
        Self {
            phase: QuizPhase::Idle,
            version: 0,
        }
    }
}

impl QuizStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
        }
    }

    /// Whether `event` would be accepted from the current phase.
    pub fn can_apply(&self, event: QuizEvent) -> bool {
        self.compute_transition(event).is_ok()
    }

    /// Apply `event`, returning the new phase.
    pub fn apply(&mut self, event: QuizEvent) -> Result<QuizPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: QuizEvent) -> Result<QuizPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (_, QuizEvent::Reset) => QuizPhase::Idle,
            (QuizPhase::Idle, QuizEvent::SourceLoaded) => QuizPhase::AwaitingFirstQuestion,
            (
                QuizPhase::AwaitingFirstQuestion | QuizPhase::AwaitingQuestion,
                QuizEvent::QuestionReceived,
            ) => QuizPhase::AwaitingAnswer,
            (QuizPhase::AwaitingAnswer, QuizEvent::AnswerSubmitted) => QuizPhase::ShowingFeedback,
            (QuizPhase::ShowingFeedback, QuizEvent::NextQuestionRequested) => {
                QuizPhase::AwaitingQuestion
            }
            (QuizPhase::ShowingFeedback, QuizEvent::RoundFinished) => QuizPhase::RoundComplete,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

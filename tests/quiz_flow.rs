use std::{sync::Arc, time::Duration};

use movie_quiz_back::{
    clock::fixed_clock,
    dao::{
        question_source::ScriptedQuestionSource,
        statistics_store::{FileStatisticsStore, InMemoryStatisticsStore, StatisticsStore},
    },
    services::{
        presenter::{PresenterSignal, RecordingPresenter},
        quiz_service::{QuizOrchestrator, QuizSettings},
        quiz_session::QuizSession,
        statistics_service::StatisticsService,
    },
    state::{game::Question, state_machine::QuizPhase},
};
use uuid::Uuid;

fn question(correct_answer: bool) -> Question {
    Question {
        image_data: vec![0x89, b'P', b'N', b'G'],
        text: "Is the rating of this movie greater than 7?".into(),
        correct_answer,
    }
}

fn questions(count: usize) -> Vec<Question> {
    (0..count).map(|i| question(i % 2 == 0)).collect()
}

struct Quiz {
    session: QuizSession,
    source: ScriptedQuestionSource,
    presenter: Arc<RecordingPresenter>,
    statistics: Arc<StatisticsService>,
}

fn quiz_with_store(store: Arc<dyn StatisticsStore>, source: ScriptedQuestionSource) -> Quiz {
    let presenter = Arc::new(RecordingPresenter::new());
    let statistics = Arc::new(StatisticsService::new(store, fixed_clock()));
    let session = QuizSession::new(
        Arc::new(source.clone()),
        statistics.clone(),
        presenter.clone(),
        fixed_clock(),
    );
    Quiz {
        session,
        source,
        presenter,
        statistics,
    }
}

fn quiz(source: ScriptedQuestionSource) -> Quiz {
    quiz_with_store(Arc::new(InMemoryStatisticsStore::new()), source)
}

/// Play a full round of `total` questions, answering the first `correct` right.
async fn play_round(quiz: &mut Quiz, total: usize, correct: usize) {
    quiz.source.push(questions(total));
    quiz.session.restart().await.unwrap();
    for i in 0..total {
        let expected = i % 2 == 0;
        let answer = if i < correct { expected } else { !expected };
        quiz.session.submit_answer(answer).unwrap();
        quiz.session.advance().await;
    }
}

#[tokio::test]
async fn seven_out_of_ten_is_recorded_as_best_game() {
    let mut quiz = quiz(ScriptedQuestionSource::new(questions(10)));
    quiz.session.start(10).await.unwrap();
    for i in 0..10 {
        let expected = i % 2 == 0;
        let answer = if i < 7 { expected } else { !expected };
        assert_eq!(quiz.session.submit_answer(answer), Some(i < 7));
        quiz.session.advance().await;
    }

    assert_eq!(quiz.session.phase(), QuizPhase::RoundComplete);
    let result = quiz.presenter.results().pop().unwrap();
    assert_eq!(result.score_text, "7/10");
    assert_eq!(result.games_played, 1);
    assert_eq!(result.best_game.correct, 7);
    assert_eq!(result.button_text, "Play again");
}

#[tokio::test]
async fn worse_second_round_keeps_best_game() {
    let mut quiz = quiz(ScriptedQuestionSource::new(questions(10)));
    quiz.session.start(10).await.unwrap();
    for i in 0..10 {
        let expected = i % 2 == 0;
        quiz.session.submit_answer(if i < 7 { expected } else { !expected });
        quiz.session.advance().await;
    }

    play_round(&mut quiz, 10, 5).await;

    let result = quiz.presenter.results().pop().unwrap();
    assert_eq!(result.score_text, "5/10");
    assert_eq!(result.games_played, 2);
    assert_eq!(result.best_game.correct, 7);
    assert_eq!(result.accuracy_percent, 60.0);

    let stats = quiz.statistics.current_statistics().await.unwrap();
    assert_eq!(stats.total_questions, 20);
    assert_eq!(quiz.statistics.accuracy_percent().await.unwrap(), 60.0);
}

#[tokio::test]
async fn load_failure_shows_error_and_records_nothing() {
    let mut quiz = quiz(ScriptedQuestionSource::failing("catalog offline"));

    let err = quiz.session.start(10).await.unwrap_err();
    assert!(err.to_string().contains("catalog offline"));

    let snapshot = quiz.session.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::Idle);
    assert_eq!(snapshot.last_error.as_deref(), Some("catalog offline"));

    let errors = quiz.presenter.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "catalog offline");
    assert!(quiz.presenter.questions().is_empty());

    let stats = quiz.statistics.current_statistics().await.unwrap();
    assert_eq!(stats.games_played, 0);
}

#[tokio::test]
async fn retry_after_load_failure_starts_the_round() {
    let mut quiz = quiz(ScriptedQuestionSource::failing("catalog offline"));
    assert!(quiz.session.start(3).await.is_err());

    quiz.source.set_load_failure(None);
    quiz.source.push(questions(3));
    quiz.session.restart().await.unwrap();

    let snapshot = quiz.session.snapshot();
    assert_eq!(snapshot.phase, QuizPhase::AwaitingAnswer);
    assert_eq!(snapshot.last_error, None);
    assert_eq!(quiz.source.load_calls(), 2);
}

#[tokio::test]
async fn empty_question_is_a_silent_no_op() {
    let mut quiz = quiz(ScriptedQuestionSource::new(questions(1)));
    quiz.session.start(2).await.unwrap();
    quiz.session.submit_answer(true);
    quiz.session.advance().await;

    // The source ran dry: the session waits without emitting anything.
    let before = quiz.presenter.signals().len();
    assert_eq!(quiz.session.phase(), QuizPhase::AwaitingQuestion);
    quiz.session.on_question_received(None);
    quiz.session.request_question().await;

    assert_eq!(quiz.session.phase(), QuizPhase::AwaitingQuestion);
    assert_eq!(quiz.presenter.signals().len(), before);
    assert_eq!(quiz.session.current_index(), 1);

    quiz.session.on_question_received(Some(question(false)));
    assert_eq!(quiz.session.phase(), QuizPhase::AwaitingAnswer);
    assert_eq!(quiz.presenter.questions()[1].progress_label, "2 / 2");
}

#[tokio::test]
async fn index_advances_once_per_answered_question() {
    let mut quiz = quiz(ScriptedQuestionSource::new(questions(4)));
    quiz.session.start(4).await.unwrap();

    for expected_index in 0..4 {
        assert_eq!(quiz.session.current_index(), expected_index);
        quiz.session.submit_answer(true);
        quiz.session.submit_answer(true);
        quiz.session.advance().await;
        quiz.session.advance().await;
    }

    let labels: Vec<_> = quiz
        .presenter
        .questions()
        .into_iter()
        .map(|view| view.progress_label)
        .collect();
    assert_eq!(labels, ["1 / 4", "2 / 4", "3 / 4", "4 / 4"]);
    assert_eq!(quiz.presenter.feedback().len(), 4);
    assert_eq!(quiz.presenter.results().len(), 1);
}

#[tokio::test]
async fn failing_store_still_completes_the_round() {
    let store = InMemoryStatisticsStore::new();
    store.set_fail_writes(true);
    let mut quiz = quiz_with_store(Arc::new(store), ScriptedQuestionSource::new(questions(1)));

    quiz.session.start(1).await.unwrap();
    quiz.session.submit_answer(true);
    quiz.session.advance().await;

    assert_eq!(quiz.session.phase(), QuizPhase::RoundComplete);
    let result = quiz.presenter.results().pop().unwrap();
    assert_eq!(result.score_text, "1/1");
    assert_eq!(result.games_played, 0);
}

#[tokio::test]
async fn every_signal_carries_the_current_round() {
    let mut quiz = quiz(ScriptedQuestionSource::new(questions(2)));
    quiz.session.start(1).await.unwrap();
    let first_round = quiz.session.round_id();
    quiz.session.submit_answer(true);
    quiz.session.advance().await;

    quiz.session.restart().await.unwrap();
    let second_round = quiz.session.round_id();
    assert_ne!(first_round, second_round);

    let rounds: Vec<Uuid> = quiz
        .presenter
        .signals_with_rounds()
        .into_iter()
        .map(|(round, _)| round)
        .collect();
    assert_eq!(rounds, [first_round, first_round, first_round, second_round]);
    assert!(matches!(
        quiz.presenter.last(),
        Some(PresenterSignal::Question(_))
    ));
}

#[tokio::test]
async fn statistics_survive_a_new_file_store() {
    let path = std::env::temp_dir()
        .join(format!("movie-quiz-{}", Uuid::new_v4().simple()))
        .join("statistics.json");

    let mut quiz = quiz_with_store(
        Arc::new(FileStatisticsStore::new(path.clone())),
        ScriptedQuestionSource::new(questions(2)),
    );
    quiz.session.start(2).await.unwrap();
    for _ in 0..2 {
        quiz.session.submit_answer(true);
        quiz.session.advance().await;
    }

    let reopened = StatisticsService::new(Arc::new(FileStatisticsStore::new(path)), fixed_clock());
    let stats = reopened.current_statistics().await.unwrap();
    assert_eq!(stats.games_played, 1);
    assert_eq!(stats.total_questions, 2);
    assert_eq!(stats.best_game.correct, 1);
}

#[tokio::test(start_paused = true)]
async fn start_during_feedback_keeps_the_pending_advance() {
    let presenter = Arc::new(RecordingPresenter::new());
    let source = ScriptedQuestionSource::new(questions(4));
    let session = QuizSession::new(
        Arc::new(source.clone()),
        Arc::new(StatisticsService::new(
            Arc::new(InMemoryStatisticsStore::new()),
            fixed_clock(),
        )),
        presenter.clone(),
        fixed_clock(),
    );
    let delay = Duration::from_millis(800);
    let quiz = QuizOrchestrator::new(
        session,
        QuizSettings {
            total_questions: 1,
            feedback_delay: delay,
        },
    );

    quiz.start().await.unwrap();
    quiz.answer(true).await.unwrap();
    tokio::time::sleep(delay * 2).await;
    tokio::task::yield_now().await;
    assert_eq!(quiz.snapshot().await.phase, QuizPhase::RoundComplete);

    let second = quiz.start().await.unwrap();
    quiz.answer(false).await.unwrap();
    let third = quiz.start().await.unwrap();
    assert_eq!(second.round_id, third.round_id);

    tokio::time::sleep(delay * 2).await;
    tokio::task::yield_now().await;
    let snapshot = quiz.snapshot().await;
    assert_eq!(snapshot.round_id, second.round_id);
    assert_eq!(snapshot.phase, QuizPhase::RoundComplete);
    assert_eq!(presenter.results().len(), 2);
}

#[tokio::test]
async fn questions_reach_the_player_only_after_a_successful_load() {
    let mut quiz = quiz(ScriptedQuestionSource::failing("catalog offline"));

    quiz.session.on_question_received(Some(question(true)));
    assert_eq!(quiz.session.phase(), QuizPhase::Idle);
    assert_eq!(quiz.session.submit_answer(true), None);

    assert!(quiz.session.start(2).await.is_err());
    quiz.source.push(questions(2));
    quiz.session.request_question().await;
    quiz.session.on_question_received(Some(question(true)));
    quiz.session.submit_answer(true);
    quiz.session.advance().await;

    assert_eq!(quiz.session.phase(), QuizPhase::Idle);
    assert!(quiz.presenter.questions().is_empty());
    assert!(quiz.presenter.feedback().is_empty());
    let stats = quiz.statistics.current_statistics().await.unwrap();
    assert_eq!(stats.games_played, 0);

    quiz.source.set_load_failure(None);
    quiz.session.restart().await.unwrap();
    assert_eq!(quiz.session.phase(), QuizPhase::AwaitingAnswer);
    assert_eq!(quiz.presenter.questions()[0].progress_label, "1 / 2");
}

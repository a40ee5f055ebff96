use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Movie Quiz Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::quiz_stream,
        crate::routes::quiz::start_round,
        crate::routes::quiz::submit_answer,
        crate::routes::quiz::advance,
        crate::routes::quiz::request_question,
        crate::routes::quiz::get_state,
        crate::routes::statistics::get_statistics,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::VisibleQuizPhase,
            crate::dto::quiz::AnswerRequest,
            crate::dto::quiz::AnswerResponse,
            crate::dto::quiz::SessionStateResponse,
            crate::dto::quiz::StatisticsResponse,
            crate::dto::presenter::QuestionViewModel,
            crate::dto::presenter::FeedbackSignal,
            crate::dto::presenter::ResultViewModel,
            crate::dto::presenter::BestGameSummary,
            crate::dto::presenter::ErrorSignal,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "quiz", description = "Player actions on the running quiz"),
        (name = "statistics", description = "Aggregate statistics across rounds"),
    )
)]
/// OpenAPI document of every route.
pub struct ApiDoc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::error::RankingError;
use crate::models::{ApiResponse, GameRecord, PreferenceMethod, RankingRow, Team};
use crate::report::merge_rankings;
use crate::services::{NonlinearOptions, RankingEngine};

/// Upper bound on the nonlinear iteration budget a request may ask for.
pub const MAX_REQUEST_ITERATIONS: usize = 10_000;

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let port = config.port;
    let app = create_router().with_state(config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Keener ranking API listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router() -> Router<Config> {
    Router::new()
        .route("/health", get(health_check))
        .route("/rankings", post(rankings_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Keener ranking API is running"))
}

// POST /rankings - Rank a season supplied in the request body
#[derive(Debug, Deserialize)]
pub struct RankingRequest {
    pub teams: Vec<Team>,
    pub games: Vec<GameRecord>,
    /// "all" or "distribute"; server default when absent.
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub max_iter: Option<usize>,
    #[serde(default)]
    pub tol: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    pub method: PreferenceMethod,
    pub eigenvalue: f64,
    pub direct: Vec<RankingRow>,
    pub nonlinear: Vec<RankingRow>,
    pub converged: bool,
    pub iterations: usize,
}

type ErrorReply = (StatusCode, Json<ApiResponse<RankingResponse>>);

async fn rankings_handler(
    State(config): State<Config>,
    Json(request): Json<RankingRequest>,
) -> Result<Json<ApiResponse<RankingResponse>>, ErrorReply> {
    // Ranking is CPU-bound; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || compute_rankings(&config, &request))
        .await
        .map_err(|e| {
            tracing::error!("Ranking task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Ranking task failed".to_string())),
            )
        })?;

    match outcome {
        Ok(response) => Ok(Json(ApiResponse::success(response))),
        Err(e) => {
            tracing::error!("Failed to rank season ({}): {}", e.kind(), e);
            Err((status_for(&e), Json(ApiResponse::error(e.to_string()))))
        }
    }
}

fn compute_rankings(
    config: &Config,
    request: &RankingRequest,
) -> Result<RankingResponse, RankingError> {
    let method = match request.method.as_deref() {
        Some(raw) => raw.parse::<PreferenceMethod>()?,
        None => config.method,
    };
    let options = NonlinearOptions {
        max_iter: request
            .max_iter
            .unwrap_or(config.nonlinear.max_iter)
            .min(MAX_REQUEST_ITERATIONS),
        tol: request.tol.unwrap_or(config.nonlinear.tol),
    };

    let engine = RankingEngine::new(method, options);
    let ranking = engine.rank_season(&request.teams, &request.games)?;

    let direct = merge_rankings(&request.teams, &ranking.matrices, &ranking.direct)?;
    let nonlinear = merge_rankings(
        &request.teams,
        &ranking.matrices,
        &ranking.nonlinear.ranking,
    )?;

    Ok(RankingResponse {
        method,
        eigenvalue: ranking.eigenvalue.re,
        direct,
        nonlinear,
        converged: ranking.nonlinear.converged,
        iterations: ranking.nonlinear.iterations,
    })
}

fn status_for(error: &RankingError) -> StatusCode {
    match error {
        RankingError::Configuration(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

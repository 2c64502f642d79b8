use axum::{
    extract::rejection::JsonRejection,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use connect4::{GameState, Player, PlayerId, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{debug, info, warn};

mod config;

use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    init_tracing(&config);
    let app = app_router(&config);

    let listener = TcpListener::bind(config.addr).await?;
    info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &ServerConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(config.log_filter.as_str())
        .try_init();
}

fn app_router(config: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/games", post(handle_new_game))
        .route("/drop", post(handle_drop));
    let spa = Router::new().nest_service(
        "/",
        ServeDir::new(&config.static_dir).append_index_html_on_directories(true),
    );
    Router::new()
        .nest("/api", api)
        .merge(spa)
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_origin(axum::http::HeaderValue::from_static("*"))
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
struct PlayerSpec {
    color: String,
}

#[derive(Debug, Default, Deserialize)]
struct NewGameRequest {
    height: Option<usize>,
    width: Option<usize>,
    player1: Option<PlayerSpec>,
    player2: Option<PlayerSpec>,
}

#[derive(Debug, Deserialize)]
struct DropRequest {
    state: GameState,
    column: usize,
}

fn seat(id: PlayerId, spec: Option<PlayerSpec>) -> Result<Player, connect4::GameError> {
    match spec {
        Some(spec) => Player::new(id, spec.color),
        None => Ok(Player::default_for(id)),
    }
}

async fn handle_new_game(
    payload: Result<Json<NewGameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let state = GameState::initialize(
        req.height.unwrap_or(DEFAULT_HEIGHT),
        req.width.unwrap_or(DEFAULT_WIDTH),
        seat(PlayerId::One, req.player1)?,
        seat(PlayerId::Two, req.player2)?,
    )?;
    info!(
        height = state.height(),
        width = state.width(),
        "new game"
    );
    let headers = [(header::CACHE_CONTROL, "no-store")];
    Ok((headers, Json(state)))
}

async fn handle_drop(
    payload: Result<Json<DropRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let result = req.state.drop_piece(req.column)?;
    if let Some(rejection) = result.rejection {
        debug!(column = req.column, ?rejection, "drop rejected");
    }
    let headers = [(header::CACHE_CONTROL, "no-store")];
    Ok((headers, Json(result)))
}

#[derive(Debug)]
struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        let body = format!("{}", self.0);
        warn!(error = %body, "bad request");
        (status, body).into_response()
    }
}

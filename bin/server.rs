// Auction Ledger - Web Server
// REST API with Axum over one shared auction session

use anyhow::Context;
use auction_ledger::{
    import_file, logging, AuctionError, AuctionSession, AuditEntry, Command, DashboardSummary,
    Outcome, Player, SaleQuote, Settings, Team, TeamStats,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

/// Shared application state. The mutex is the single writer lock for the auction.
/// Each successful login gets its own bearer token; the session's login flag is unused.
#[derive(Clone)]
struct AppState {
    session: Arc<Mutex<AuctionSession>>,
    tokens: Arc<Mutex<HashSet<Uuid>>>,
    /// Saved auction rules are written back here
    settings_path: Option<PathBuf>,
}

impl AppState {
    fn new(session: AuctionSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            tokens: Arc::new(Mutex::new(HashSet::new())),
            settings_path: None,
        }
    }

    fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    fn session(&self) -> MutexGuard<'_, AuctionSession> {
        // a panicked handler cannot leave the ledger half-written: commands mutate after validation
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn tokens(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// True when the request carries a live `Authorization: Bearer <token>`
    fn is_operator(&self, headers: &HeaderMap) -> bool {
        bearer_token(headers).is_some_and(|token| self.tokens().contains(&token))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }
}

fn error_response(err: AuctionError) -> Response {
    let status = match &err {
        AuctionError::NotAuthenticated | AuctionError::AuthenticationFailed => StatusCode::UNAUTHORIZED,
        AuctionError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
        AuctionError::Import(_) | AuctionError::Csv(_) => StatusCode::BAD_REQUEST,
        AuctionError::Io(_) | AuctionError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };

    let body = ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(err.to_string()),
        kind: Some(err.kind()),
    };
    (status, Json(body)).into_response()
}

fn bad_request(message: String) -> Response {
    let body = ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(message),
        kind: Some("bad_request"),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

#[derive(Deserialize)]
struct PlayersQuery {
    search: Option<String>,
    status: Option<String>,
}

#[derive(Deserialize)]
struct QuoteQuery {
    team: String,
    bid: u32,
}

#[derive(Deserialize)]
struct LoginRequest {
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: Uuid,
}

#[derive(Serialize)]
struct TeamRosterResponse {
    stats: TeamStats,
    players: Vec<Player>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/players?search=&status=sold|unsold
async fn get_players(State(state): State<AppState>, Query(query): Query<PlayersQuery>) -> Response {
    let session = state.session();
    let search = query.search.unwrap_or_default();

    let players: Vec<Player> = match query.status.as_deref() {
        None | Some("all") => session
            .players()
            .iter()
            .filter(|p| p.matches_name(&search))
            .cloned()
            .collect(),
        Some("sold") => session.sold_players(&search).into_iter().cloned().collect(),
        Some("unsold") => session.unsold_players(&search).into_iter().cloned().collect(),
        Some(other) => return bad_request(format!("unknown status '{}'", other)),
    };

    Json(ApiResponse::ok(players)).into_response()
}

/// GET /api/teams - Stats for every team
async fn get_teams(State(state): State<AppState>) -> Json<ApiResponse<Vec<TeamStats>>> {
    Json(ApiResponse::ok(state.session().team_stats()))
}

/// GET /api/teams/:team/roster
async fn get_roster(State(state): State<AppState>, Path(team): Path<String>) -> Response {
    let team = match team.parse::<Team>() {
        Ok(team) => team,
        Err(e) => return bad_request(e),
    };

    let session = state.session();
    let response = TeamRosterResponse {
        stats: session.stats_for(team),
        players: session.roster(team).into_iter().cloned().collect(),
    };
    Json(ApiResponse::ok(response)).into_response()
}

/// GET /api/dashboard
async fn get_dashboard(State(state): State<AppState>) -> Json<ApiResponse<DashboardSummary>> {
    Json(ApiResponse::ok(state.session().dashboard()))
}

/// GET /api/audit - Newest first
async fn get_audit(State(state): State<AppState>) -> Json<ApiResponse<Vec<AuditEntry>>> {
    let entries = state.session().audit().entries().cloned().collect();
    Json(ApiResponse::ok(entries))
}

/// GET /api/quote?team=&bid= - Preview a sale without committing it
async fn get_quote(State(state): State<AppState>, Query(query): Query<QuoteQuery>) -> Response {
    let team = match query.team.parse::<Team>() {
        Ok(team) => team,
        Err(e) => return bad_request(e),
    };
    let quote: SaleQuote = state.session().quote(team, query.bid);
    Json(ApiResponse::ok(quote)).into_response()
}

/// GET /api/export - Player table as CSV
async fn export_csv(State(state): State<AppState>) -> Response {
    match state.session().apply(Command::Export) {
        Ok(Outcome::Exported { csv }) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"auction_data.csv\""),
            ],
            csv,
        )
            .into_response(),
        Ok(_) => bad_request("unexpected export outcome".to_string()),
        Err(e) => error_response(e),
    }
}

/// POST /api/login - Issue a bearer token for this client
async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Response {
    if let Err(e) = state.session().verify_password(&request.password) {
        return error_response(e);
    }

    let token = Uuid::new_v4();
    state.tokens().insert(token);
    tracing::info!("operator token issued");
    Json(ApiResponse::ok(LoginResponse { token })).into_response()
}

/// POST /api/logout - Revoke the caller's token
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = bearer_token(&headers) {
        state.tokens().remove(&token);
    }
    Json(ApiResponse::ok("logged out"))
}

/// POST /api/commands - Apply one ledger command
async fn apply_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(command): Json<Command>,
) -> Response {
    let authorized = state.is_operator(&headers);
    let result = state.session().apply_authorized(command, authorized);

    match result {
        Ok(outcome) => {
            if let (Outcome::ConfigSaved { config }, Some(path)) = (&outcome, &state.settings_path) {
                if let Err(e) = Settings::store_auction(path, *config) {
                    tracing::error!("failed to persist auction rules: {:#}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ApiResponse::<()> {
                            success: false,
                            data: None,
                            error: Some(format!("Rules applied but not saved: {:#}", e)),
                            kind: Some("io"),
                        }),
                    )
                        .into_response();
                }
            }
            Json(ApiResponse::ok(outcome)).into_response()
        }
        Err(e) => error_response(e),
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/players", get(get_players))
        .route("/teams", get(get_teams))
        .route("/teams/:team/roster", get(get_roster))
        .route("/dashboard", get(get_dashboard))
        .route("/audit", get(get_audit))
        .route("/quote", get(get_quote))
        .route("/export", get(export_csv))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/commands", post(apply_command))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(std::env::var("AUCTION_VERBOSE").is_ok(), std::env::var("AUCTION_LOG_JSON").is_ok());

    let settings_path = std::env::var("AUCTION_SETTINGS").unwrap_or_else(|_| "auction.json".to_string());
    let settings = Settings::load_or_default(&settings_path)?;

    let players = match &settings.players_csv {
        Some(path) => Some(import_file(path)?),
        None => None,
    };
    let session = AuctionSession::from_settings(&settings, players);
    tracing::info!(players = session.players().len(), "session ready");

    let state = AppState::new(session).with_settings_path(&settings_path);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.server_addr))?;

    tracing::info!(addr = %settings.server_addr, "🚀 Server running");
    println!("\n🚀 Server running on http://{}", settings.server_addr);
    println!("   API: http://{}/api/teams", settings.server_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_ledger::{PlayerId, DEFAULT_PASSWORD};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = request.body(Body::from(body.to_string())).unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    async fn login_token(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/api/login", None, serde_json::json!({ "password": DEFAULT_PASSWORD })).await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    fn sell(player: u32) -> serde_json::Value {
        serde_json::json!({ "type": "sell", "player_id": player, "team": "Alfen Royals", "bid": 50 })
    }

    #[tokio::test]
    async fn test_login_grants_only_the_token_holder() {
        let state = AppState::new(AuctionSession::default());
        let app = router(state.clone());
        let token = login_token(&app).await;

        // a second client without the token is still locked out
        let (status, body) = send(&app, "POST", "/api/commands", None, sell(1)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["kind"], "not_authenticated");
        assert!(!state.session().player(PlayerId(1)).unwrap().is_sold());

        let (status, _) = send(&app, "POST", "/api/commands", Some(&Uuid::new_v4().to_string()), sell(1)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, "POST", "/api/commands", Some(&token), sell(1)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["type"], "sold");
        assert!(!state.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let app = router(AppState::new(AuctionSession::default()));
        let token = login_token(&app).await;

        let (status, _) = send(&app, "POST", "/api/logout", Some(&token), serde_json::Value::Null).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "POST", "/api/commands", Some(&token), sell(2)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_password_issues_no_token() {
        let state = AppState::new(AuctionSession::default());
        let app = router(state.clone());

        let (status, body) = send(&app, "POST", "/api/login", None, serde_json::json!({ "password": "guess" })).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert!(state.tokens().is_empty());
    }

    #[tokio::test]
    async fn test_saved_rules_written_to_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auction.json");
        let state = AppState::new(AuctionSession::default()).with_settings_path(&path);
        let app = router(state.clone());
        let token = login_token(&app).await;

        let command = serde_json::json!({
            "type": "save_config",
            "config": { "purseLimit": 5000, "maxSquadSize": 30, "basePrice": 20 }
        });
        let (status, _) = send(&app, "POST", "/api/commands", Some(&token), command).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(state.session().config().purse_limit, 5000);
        assert_eq!(Settings::from_file(&path).unwrap().auction.purse_limit, 5000);
    }

    #[tokio::test]
    async fn test_export_command_needs_no_token() {
        let app = router(AppState::new(AuctionSession::default()));
        let (status, body) = send(&app, "POST", "/api/commands", None, serde_json::json!({ "type": "export" })).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["csv"].as_str().unwrap().starts_with("ID,Name"));
    }
}

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::loops::decode::decode_gif_bytes;
use crate::server::config::ServerConfig;
use crate::server::error::ApiError;
use crate::session::state::AppState;

type ApiResult = Result<Json<Value>, ApiError>;

struct LatestExport {
    file_name: String,
    bytes: Bytes,
}

struct Session {
    app: AppState,
    last_tick: Instant,
    latest_export: Option<LatestExport>,
}

/// Shared handler state. The mutex is never held across an `.await`.
#[derive(Clone)]
struct ApiState {
    session: Arc<Mutex<Session>>,
    // Tap timestamps are measured from here.
    epoch: Instant,
}

impl ApiState {
    fn lock(&self) -> Result<MutexGuard<'_, Session>, ApiError> {
        self.session
            .lock()
            .map_err(|_| ApiError::internal("session state poisoned"))
    }
}

/// Build the API router with a fresh session.
pub fn router(cfg: &ServerConfig) -> Router {
    let now = Instant::now();
    let state = ApiState {
        session: Arc::new(Mutex::new(Session {
            app: AppState::new(cfg.session),
            last_tick: now,
            latest_export: None,
        })),
        epoch: now,
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/state", get(get_state))
        .route("/api/bpm", post(set_bpm))
        .route("/api/bpm/halve", post(halve_bpm))
        .route("/api/bpm/double", post(double_bpm))
        .route("/api/bpm/nudge", post(nudge_bpm))
        .route("/api/beats", post(set_beats))
        .route("/api/slot", post(set_slot))
        .route("/api/pause", post(toggle_pause))
        .route("/api/upload", post(upload))
        .route("/api/export", post(export))
        .route("/api/export/latest", get(latest_export))
        .route("/api/tap", post(tap))
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
        .with_state(state)
}

// ═══════════════════════════════════════════════════════════════
// Request bodies
// ═══════════════════════════════════════════════════════════════

/// A JSON number, or a string holding one (form fields often arrive as text).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn value(&self, field: &str) -> Result<f64, ApiError> {
        let v = match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        };
        v.filter(|v| v.is_finite())
            .ok_or_else(|| ApiError::bad_request(format!("'{field}' must be a number")))
    }
}

#[derive(Debug, Deserialize)]
struct BpmRequest {
    bpm: Numeric,
}

#[derive(Debug, Deserialize)]
struct BeatsRequest {
    beats: Numeric,
}

#[derive(Debug, Deserialize)]
struct SlotRequest {
    slot: Numeric,
}

#[derive(Debug, Deserialize)]
struct NudgeRequest {
    delta: Numeric,
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))
}

// ═══════════════════════════════════════════════════════════════
// GET /health, GET /api/state
// ═══════════════════════════════════════════════════════════════

async fn health() -> impl IntoResponse {
    Json(json!({"status": "healthy", "message": "gifbeat is running"}))
}

async fn get_state(State(st): State<ApiState>) -> ApiResult {
    let mut s = st.lock()?;
    let now = Instant::now();
    let dt_ms = now.duration_since(s.last_tick).as_secs_f64() * 1000.0;
    s.last_tick = now;
    s.app.tick(dt_ms);

    let mut body = serde_json::to_value(s.app.snapshot())
        .map_err(|e| ApiError::internal(format!("serialize state: {e}")))?;
    if let Value::Object(map) = &mut body {
        map.insert("success".to_owned(), Value::Bool(true));
    }
    Ok(Json(body))
}

// ═══════════════════════════════════════════════════════════════
// Tempo
// ═══════════════════════════════════════════════════════════════

async fn set_bpm(State(st): State<ApiState>, body: Bytes) -> ApiResult {
    let req: BpmRequest = parse_body(&body)?;
    let v = req.bpm.value("bpm")?;
    let bpm = st.lock()?.app.set_bpm_value(v)?;
    Ok(Json(json!({"success": true, "bpm": bpm})))
}

async fn halve_bpm(State(st): State<ApiState>) -> ApiResult {
    let bpm = st.lock()?.app.halve_bpm();
    Ok(Json(json!({"success": true, "bpm": bpm})))
}

async fn double_bpm(State(st): State<ApiState>) -> ApiResult {
    let bpm = st.lock()?.app.double_bpm();
    Ok(Json(json!({"success": true, "bpm": bpm})))
}

async fn nudge_bpm(State(st): State<ApiState>, body: Bytes) -> ApiResult {
    let req: NudgeRequest = parse_body(&body)?;
    let delta = req.delta.value("delta")?.round() as i64;
    let bpm = st.lock()?.app.nudge_bpm(delta);
    Ok(Json(json!({"success": true, "bpm": bpm})))
}

async fn tap(State(st): State<ApiState>) -> ApiResult {
    let mut s = st.lock()?;
    // Read the clock under the lock so taps reach the estimator in order.
    s.app.tap(st.epoch.elapsed());
    Ok(Json(json!({
        "success": true,
        "bpm": s.app.bpm(),
        "tap_count": s.app.tap_count(),
    })))
}

// ═══════════════════════════════════════════════════════════════
// Slots and playback
// ═══════════════════════════════════════════════════════════════

async fn set_beats(State(st): State<ApiState>, body: Bytes) -> ApiResult {
    let req: BeatsRequest = parse_body(&body)?;
    let v = req.beats.value("beats")?;
    let beats = st.lock()?.app.set_beats(v)?;
    Ok(Json(json!({"success": true, "beats": beats})))
}

async fn set_slot(State(st): State<ApiState>, body: Bytes) -> ApiResult {
    let req: SlotRequest = parse_body(&body)?;
    let slot = req.slot.value("slot")?.trunc() as i64;
    let active = st.lock()?.app.select_slot(slot);
    Ok(Json(json!({"success": true, "active_slot": active})))
}

async fn toggle_pause(State(st): State<ApiState>) -> ApiResult {
    let paused = st.lock()?.app.toggle_pause();
    Ok(Json(json!({"success": true, "paused": paused})))
}

// ═══════════════════════════════════════════════════════════════
// POST /api/upload
// ═══════════════════════════════════════════════════════════════

async fn upload(
    State(st): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    let mut multipart =
        multipart.map_err(|e| ApiError::bad_request(format!("expected a multipart upload: {e}")))?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_owned();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;
        file = Some((name, data));
        break;
    }

    let (name, data) = file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    if name.is_empty() {
        return Err(ApiError::bad_request("No file selected"));
    }

    let decoded = tokio::task::spawn_blocking(move || decode_gif_bytes(&name, &data))
        .await
        .map_err(|e| ApiError::internal(format!("decode task failed: {e}")))??;

    let mut s = st.lock()?;
    let l = s.app.load_loop(decoded);
    Ok(Json(json!({
        "success": true,
        "filename": l.name(),
        "frame_count": l.frame_count(),
        "original_duration": l.native_total_ms(),
        "beats": l.beats,
    })))
}

// ═══════════════════════════════════════════════════════════════
// Export
// ═══════════════════════════════════════════════════════════════

async fn export(State(st): State<ApiState>) -> ApiResult {
    let job = st.lock()?.app.export_job()?;

    let (plan, bytes) = tokio::task::spawn_blocking(move || job.run())
        .await
        .map_err(|e| ApiError::internal(format!("export task failed: {e}")))??;

    let file_name = plan.export_file_name();
    let size_bytes = bytes.len();
    st.lock()?.latest_export = Some(LatestExport {
        file_name: file_name.clone(),
        bytes: Bytes::from(bytes),
    });

    Ok(Json(json!({
        "success": true,
        "export_info": {
            "bpm": plan.bpm,
            "beats": plan.beats,
            "speed_multiplier": plan.speed_multiplier,
            "target_duration": plan.target_duration_ms,
            "frame_durations_ms": plan.frame_durations_ms,
            "filename": file_name,
            "size_bytes": size_bytes,
            "download_url": "/api/export/latest",
        },
    })))
}

async fn latest_export(State(st): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let s = st.lock()?;
    let latest = s
        .latest_export
        .as_ref()
        .ok_or_else(|| ApiError::not_found("Nothing exported yet"))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/gif".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", latest.file_name),
            ),
        ],
        latest.bytes.clone(),
    ))
}

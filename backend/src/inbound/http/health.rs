//! Liveness and readiness probes.
//!
//! Readiness flips once adapters are wired and the listener is bound;
//! liveness flips off when shutdown starts so orchestrators stop routing
//! traffic while embedded consumers drain.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

/// The two probes served under `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Probe {
    Ready,
    Live,
}

/// Body returned by both probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeBody {
    probe: Probe,
    ok: bool,
}

/// Process-wide probe state shared with the HTTP workers.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Not ready, live.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Start draining: liveness reports 503 from now on.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Current outcome of `probe`.
    pub fn check(&self, probe: Probe) -> bool {
        match probe {
            Probe::Ready => self.is_ready(),
            Probe::Live => self.is_alive(),
        }
    }

    fn respond(&self, probe: Probe) -> HttpResponse {
        let ok = self.check(probe);
        let mut response = if ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(ProbeBody { probe, ok })
    }
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Adapters wired and listener bound", body = ProbeBody),
        (status = 503, description = "Still starting", body = ProbeBody)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.respond(Probe::Ready)
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Serving", body = ProbeBody),
        (status = 503, description = "Draining", body = ProbeBody)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.respond(Probe::Live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn probe(state: &web::Data<HealthState>, uri: &str) -> (StatusCode, Option<String>, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(state.clone())
                .service(ready)
                .service(live),
        )
        .await;
        let response =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request())
                .await;
        let status = response.status();
        let cache = response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        (status, cache, actix_test::read_body_json(response).await)
    }

    #[rstest]
    #[case::starting(false, StatusCode::SERVICE_UNAVAILABLE)]
    #[case::wired(true, StatusCode::OK)]
    #[actix_web::test]
    async fn readiness_tracks_wiring(#[case] wired: bool, #[case] expected: StatusCode) {
        let state = web::Data::new(HealthState::new());
        if wired {
            state.mark_ready();
        }

        let (status, cache, body) = probe(&state, "/health/ready").await;

        assert_eq!(status, expected);
        assert_eq!(cache.as_deref(), Some("no-store"));
        assert_eq!(body, json!({"probe": "ready", "ok": wired}));
    }

    #[actix_web::test]
    async fn liveness_turns_off_when_draining() {
        let state = web::Data::new(HealthState::new());

        let (before, _, _) = probe(&state, "/health/live").await;
        state.mark_unhealthy();
        let (after, _, body) = probe(&state, "/health/live").await;

        assert_eq!(before, StatusCode::OK);
        assert_eq!(after, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ok"], false);
    }

    #[test]
    fn draining_does_not_affect_readiness() {
        let state = HealthState::new();
        state.mark_ready();
        state.mark_unhealthy();

        assert!(state.check(Probe::Ready));
        assert!(!state.check(Probe::Live));
    }
}

//! VeriScript Gateway: newsroom dashboard and JSON API on 127.0.0.1.
//!
//! Headless modes:
//! - `--verify`: config load, credential presence, port availability; exit 0/1.
//! - `--generate <f1> <f2> <f3>`: one generation from files; `BlogData` JSON on stdout.

mod handlers;
mod views;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use veriscript_core::{
    Credential, GenerationClient, GenerationError, GenerationSession, LlmMode, Stage, VeriScriptConfig,
    CREDENTIAL_ENV_VARS, SCRIPT_COUNT,
};

/// Stand-in credential for mock mode, so the dashboard works without a real key.
const MOCK_CREDENTIAL: &str = "mock-local";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<VeriScriptConfig>,
    pub(crate) session: GenerationSession,
    pub(crate) client: GenerationClient,
    pub(crate) credential: Option<Credential>,
}

impl AppState {
    fn new(config: VeriScriptConfig, credential: Option<Credential>) -> Self {
        let client = config.build_client();
        Self {
            config: Arc::new(config),
            session: GenerationSession::new(),
            client,
            credential,
        }
    }
}

/// The configured credential (normally [`Credential::from_env`]); mock mode falls back to a placeholder.
fn resolve_credential(config: &VeriScriptConfig, configured: Option<Credential>) -> Option<Credential> {
    configured.or_else(|| match config.llm_mode {
        LlmMode::Mock => Credential::new(MOCK_CREDENTIAL),
        LlmMode::Live => None,
    })
}

fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard::index))
        .route("/generate", post(handlers::dashboard::generate))
        .route("/reset", post(handlers::dashboard::reset))
        .route("/api/v1/health", get(handlers::api::health))
        .route("/api/v1/state", get(handlers::api::get_state))
        .route("/api/v1/state/stream", get(handlers::api::state_stream))
        .route(
            "/api/v1/inputs",
            get(handlers::api::get_inputs).put(handlers::api::put_inputs),
        )
        .route("/api/v1/generate", post(handlers::api::generate))
        .route("/api/v1/reset", post(handlers::api::reset))
        .route("/api/v1/article/:edition", get(handlers::api::article))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Pre-flight: config, credential, port. Prints a checklist; `Err` names the first failure.
fn run_verify() -> Result<(), String> {
    println!("VeriScript pre-flight\n");

    print!("Loading configuration... ");
    let config = VeriScriptConfig::load().map_err(|e| e.to_string())?;
    println!("OK ({} mode, model {})", config.llm_mode.as_str(), config.model);

    print!("Checking API key... ");
    match (Credential::from_env(), config.llm_mode) {
        (Some(_), _) => println!("OK (set)"),
        (None, LlmMode::Mock) => println!("not set (mock mode, placeholder used)"),
        (None, LlmMode::Live) => {
            return Err(format!("API key missing: set one of {}", CREDENTIAL_ENV_VARS.join(", ")));
        }
    }

    print!("Checking port {}... ", config.port);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.port));
    match std::net::TcpListener::bind(addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => return Err(format!("Port {} BLOCKED: {}", config.port, e)),
    }

    println!("\nAll checks passed. Ready to start the gateway.");
    Ok(())
}

/// One generation from three transcript files; progress goes to the log, JSON to stdout.
async fn run_generate(paths: &[String]) -> Result<(), String> {
    if paths.len() != SCRIPT_COUNT {
        return Err(format!("--generate needs exactly {} files, got {}", SCRIPT_COUNT, paths.len()));
    }
    let mut scripts: Vec<String> = Vec::with_capacity(SCRIPT_COUNT);
    for path in paths {
        let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
        scripts.push(text);
    }

    let config = VeriScriptConfig::load().map_err(|e| e.to_string())?;
    let credential = match resolve_credential(&config, Credential::from_env()) {
        Some(c) => c,
        None => {
            let err = GenerationError::Configuration(format!(
                "API key missing; set one of {}",
                CREDENTIAL_ENV_VARS.join(", ")
            ));
            return Err(err.user_message());
        }
    };
    let client = config.build_client();

    let progress = |stage: Stage| {
        tracing::info!(target: "veriscript::gateway", stage = %stage, percent = stage.progress_percent(), "{}", stage.headline());
    };
    let data = client
        .generate([scripts[0].as_str(), scripts[1].as_str(), scripts[2].as_str()], &credential, &progress)
        .await
        .map_err(|e| {
            if let Some(raw) = e.raw_response() {
                tracing::error!(target: "veriscript::gateway", raw = %raw, "Unparseable response");
            }
            e.user_message()
        })?;

    let json = serde_json::to_string_pretty(&data).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[veriscript-gateway] .env not loaded: {} (using system environment)", e);
    }

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    init_tracing();

    if let Some(pos) = args.iter().position(|a| a == "--generate") {
        match run_generate(&args[pos + 1..]).await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("GENERATION FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    let config = match VeriScriptConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[veriscript-gateway] {}", e);
            std::process::exit(1);
        }
    };
    let credential = resolve_credential(&config, Credential::from_env());
    if credential.is_none() {
        tracing::warn!(
            target: "veriscript::gateway",
            "API key missing; set one of {} to enable generation",
            CREDENTIAL_ENV_VARS.join(", ")
        );
    }

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!(
        target: "veriscript::gateway",
        llm_mode = config.llm_mode.as_str(),
        model = %config.model,
        "{} listening on {}",
        config.app_name,
        addr
    );

    let app = build_app(AppState::new(config, credential));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(target: "veriscript::gateway", "Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                tracing::error!(target: "veriscript::gateway", "Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target: "veriscript::gateway", "Shutdown requested (Ctrl+C received)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;
    use veriscript_core::{GenerationState, MockCapability, MockReply};

    fn test_config() -> VeriScriptConfig {
        VeriScriptConfig {
            app_name: "Test Newsroom".to_string(),
            llm_mode: LlmMode::Mock,
            mock_latency_ms: 0,
            ..VeriScriptConfig::default()
        }
    }

    fn test_state(reply: MockReply, latency_ms: u64, credential: bool) -> AppState {
        let mock = MockCapability::new(reply).with_latency(Duration::from_millis(latency_ms));
        AppState {
            config: Arc::new(test_config()),
            session: GenerationSession::new(),
            client: GenerationClient::new(Arc::new(mock)),
            credential: credential.then(|| Credential::new("test-key")).flatten(),
        }
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(res: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    async fn wait_until_settled(state: &AppState) -> GenerationState {
        for _ in 0..200 {
            let s = state.session.state();
            if !s.is_generating {
                return s;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("generation did not settle");
    }

    #[tokio::test]
    async fn health_reports_mode_and_credential() {
        let app = build_app(test_state(MockReply::Sample, 0, false));
        let res = app.oneshot(get("/api/v1/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["app_name"], "Test Newsroom");
        assert_eq!(json["llm_mode"], "mock");
        assert_eq!(json["credential_configured"], false);
    }

    #[tokio::test]
    async fn generate_without_credential_is_412_and_stays_idle() {
        let state = test_state(MockReply::Sample, 0, false);
        let app = build_app(state.clone());
        let res = app.oneshot(post("/api/v1/generate")).await.unwrap();
        assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(body_json(res).await["kind"], "configuration");
        assert_eq!(state.session.state(), GenerationState::idle());
    }

    #[tokio::test]
    async fn generate_runs_to_complete_and_exports_article() {
        let state = test_state(MockReply::Sample, 0, true);
        let app = build_app(state.clone());

        let put = Request::builder()
            .method("PUT")
            .uri("/api/v1/inputs")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"script1":"A","script2":"","script3":""}"#))
            .unwrap();
        assert_eq!(app.clone().oneshot(put).await.unwrap().status(), StatusCode::OK);

        let res = app.clone().oneshot(post("/api/v1/generate")).await.unwrap();
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(body_json(res).await["isGenerating"], true);

        let settled = wait_until_settled(&state).await;
        assert_eq!(settled.stage, Stage::Complete);

        let res = app.clone().oneshot(get("/api/v1/state")).await.unwrap();
        let json = body_json(res).await;
        assert_eq!(json["stage"], "complete");
        assert_eq!(json["data"]["verificationReport"].as_array().unwrap().len(), 3);

        let res = app.clone().oneshot(get("/api/v1/article/urdu")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(body_text(res).await.starts_with("## "));

        let res = app.oneshot(post("/api/v1/generate")).await.unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn inputs_are_frozen_while_generating() {
        let state = test_state(MockReply::Sample, 200, true);
        let app = build_app(state.clone());

        let res = app.clone().oneshot(post("/api/v1/generate")).await.unwrap();
        assert_eq!(res.status(), StatusCode::ACCEPTED);

        let put = Request::builder()
            .method("PUT")
            .uri("/api/v1/inputs")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"script1":"late"}"#))
            .unwrap();
        let res = app.clone().oneshot(put).await.unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(res).await["kind"], "inputs_frozen");

        let res = app.oneshot(post("/api/v1/generate")).await.unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(res).await["kind"], "already_generating");
    }

    #[tokio::test]
    async fn failed_run_reports_error_and_reset_returns_idle() {
        let state = test_state(MockReply::Empty, 0, true);
        let app = build_app(state.clone());

        app.clone().oneshot(post("/api/v1/generate")).await.unwrap();
        let settled = wait_until_settled(&state).await;
        assert_eq!(settled.stage, Stage::Error);
        assert!(settled.data.is_none());

        let res = app.clone().oneshot(get("/api/v1/article/english")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app.oneshot(post("/api/v1/reset")).await.unwrap();
        assert_eq!(body_json(res).await["stage"], "idle");
    }

    #[tokio::test]
    async fn unknown_edition_is_400() {
        let app = build_app(test_state(MockReply::Sample, 0, true));
        let res = app.oneshot(get("/api/v1/article/french")).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn form_submit_redirects_and_dashboard_renders() {
        let state = test_state(MockReply::Sample, 0, true);
        let app = build_app(state.clone());

        let form = Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("script1=Council+vote&script2=&script3="))
            .unwrap();
        let res = app.clone().oneshot(form).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/");
        assert_eq!(state.session.inputs().script1, "Council vote");

        wait_until_settled(&state).await;
        let res = app.oneshot(get("/?edition=urdu")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let html = body_text(res).await;
        assert!(html.contains("Start New Project"));
        assert!(html.contains(r#"dir="rtl""#));
    }

    #[tokio::test]
    async fn form_submit_without_credential_redirects_with_notice() {
        let app = build_app(test_state(MockReply::Sample, 0, false));
        let form = Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("script1=A&script2=&script3="))
            .unwrap();
        let res = app.oneshot(form).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/?notice=configuration");
    }

    #[test]
    fn mock_mode_gets_placeholder_credential() {
        let mock = resolve_credential(&test_config(), None).expect("mock placeholder");
        assert_eq!(mock.expose(), MOCK_CREDENTIAL);
        assert!(resolve_credential(&VeriScriptConfig::default(), None).is_none());
    }

    #[test]
    fn configured_credential_wins_in_both_modes() {
        let key = Credential::new("real-key");
        let mock = resolve_credential(&test_config(), key.clone()).unwrap();
        assert_eq!(mock.expose(), "real-key");
        let live = resolve_credential(&VeriScriptConfig::default(), key).unwrap();
        assert_eq!(live.expose(), "real-key");
    }

    #[tokio::test]
    async fn form_submit_with_blank_first_script_does_not_start() {
        let state = test_state(MockReply::Sample, 0, true);
        let app = build_app(state.clone());
        let form = Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("script1=++&script2=second&script3="))
            .unwrap();
        let res = app.clone().oneshot(form).await.unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/?notice=empty_script");
        assert_eq!(state.session.state(), GenerationState::idle());
        assert_eq!(state.session.inputs().script2, "second");

        let res = app.oneshot(get("/?notice=empty_script")).await.unwrap();
        assert!(body_text(res).await.contains("Paste at least the first script"));
    }
}

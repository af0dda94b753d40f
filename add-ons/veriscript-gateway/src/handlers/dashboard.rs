//! Dashboard routes: render the page, accept the script form, reset.

use crate::views::{dashboard_page, DashboardView};
use crate::AppState;
use axum::{
    extract::{Form, Query, State},
    response::{Html, Redirect},
};
use serde::Deserialize;
use veriscript_core::{Edition, ScriptInputs};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    edition: Option<String>,
    #[serde(default)]
    notice: Option<String>,
}

/// Form fields are named like the JSON keys, so the inputs type deserializes directly.
pub type ScriptForm = ScriptInputs;

/// GET / – input form, progress view, or the finished report.
pub async fn index(State(state): State<AppState>, Query(q): Query<DashboardQuery>) -> Html<String> {
    let edition = q
        .edition
        .as_deref()
        .and_then(|e| e.parse::<Edition>().ok())
        .unwrap_or_default();
    let inputs = state.session.inputs();
    let current = state.session.state();

    Html(dashboard_page(&DashboardView {
        app_name: &state.config.app_name,
        llm_mode: state.config.llm_mode,
        credential_configured: state.credential.is_some(),
        inputs: &inputs,
        state: &current,
        edition,
        notice: q.notice.as_deref(),
    }))
}

/// POST /generate – store the submitted scripts and start a run in the background.
pub async fn generate(State(state): State<AppState>, Form(form): Form<ScriptForm>) -> Redirect {
    let ready = form.is_ready();
    if let Err(e) = state.session.set_inputs(form) {
        tracing::warn!(target: "veriscript::gateway", error = %e, "Script form rejected");
        return Redirect::to(&format!("/?notice={}", e.kind()));
    }
    if !ready {
        return Redirect::to("/?notice=empty_script");
    }
    match state.session.spawn(state.client.clone(), state.credential.clone()) {
        Ok(_) => Redirect::to("/"),
        Err(e) => Redirect::to(&format!("/?notice={}", e.kind())),
    }
}

/// POST /reset – back to the input form. An in-flight result is discarded when it arrives.
pub async fn reset(State(state): State<AppState>) -> Redirect {
    state.session.reset();
    Redirect::to("/")
}

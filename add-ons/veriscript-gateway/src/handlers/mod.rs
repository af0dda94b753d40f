//! HTTP handlers: the HTML dashboard and the JSON/SSE API.

pub mod api;
pub mod dashboard;

//! Integration tests for the presentation core.
//!
//! The feed and chart flows run headless against recording doubles; the
//! gateway-backed price feed runs against a local mock server.

mod activity_flow;
mod chart_flow;
mod support;

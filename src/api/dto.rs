//! Data Transfer Objects
//!
//! Response types for the API endpoints.

use crate::refresh::RefreshStats;
use serde::Serialize;
use std::collections::BTreeMap;

/// Current panel contents
#[derive(Debug, Serialize)]
pub struct PanelResponse {
    /// Container id mapped to its inner HTML
    pub containers: BTreeMap<String, String>,
    pub stats: RefreshStats,
}

/// Result of a manual refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: String,
    pub stats: RefreshStats,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded, starting
    pub status: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
    pub refresh: RefreshStats,
}

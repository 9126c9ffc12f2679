//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: &'static str,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Open event streams.
    pub connections: usize,
}

/// Build a health response from live counters.
pub fn health_check(start_time: Instant, connections: usize) -> HealthResponse {
    HealthResponse {
        status: "ok",
        uptime_secs: start_time.elapsed().as_secs(),
        connections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_server_is_ok() {
        let resp = health_check(Instant::now(), 0);
        assert_eq!(resp.status, "ok");
        assert!(resp.uptime_secs < 2);
    }

    #[test]
    fn uptime_increases() {
        let start = Instant::now()
            .checked_sub(std::time::Duration::from_secs(60))
            .unwrap();
        assert!(health_check(start, 0).uptime_secs >= 59);
    }

    #[test]
    fn serialization() {
        let json = serde_json::to_value(health_check(Instant::now(), 2)).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["connections"], 2);
        assert!(json["uptime_secs"].is_number());
    }
}

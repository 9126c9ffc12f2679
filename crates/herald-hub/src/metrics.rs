//! Metric names recorded by the hub.
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed (the server installs a Prometheus one).

/// Clients registered (counter).
pub const CLIENTS_CONNECTED_TOTAL: &str = "herald_clients_connected_total";
/// Clients removed for any reason (counter).
pub const CLIENTS_DISCONNECTED_TOTAL: &str = "herald_clients_disconnected_total";
/// Currently registered clients (gauge).
pub const CLIENTS_ACTIVE: &str = "herald_clients_active";
/// Broadcast events processed (counter).
pub const BROADCASTS_TOTAL: &str = "herald_broadcasts_total";
/// Notifications queued onto client channels (counter).
pub const DELIVERIES_TOTAL: &str = "herald_deliveries_total";
/// Clients evicted during a broadcast (counter, labels: reason).
pub const EVICTIONS_TOTAL: &str = "herald_evictions_total";

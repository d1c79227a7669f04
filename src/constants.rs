/// Ports that Foscam-style cameras are commonly re-exposed on.
/// Probed on every confirmed host when common-port crawling is enabled.
pub const FOSCAM_COMMON_PORTS: &[u16] = &[
    80, 81, 82, 83, 84, 85, 86, 87, 88, 89, 3000, 3001, 8008, 8080, 8081, 8090, 8091, 9090, 9091,
];

/// Base timeout for the first probe attempt, in milliseconds.
/// Each subsequent attempt doubles the previous timeout.
pub const DEFAULT_BASE_TIMEOUT_MS: u64 = 2500;

/// Maximum connection attempts per probe phase
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Default number of concurrent scan workers
pub const DEFAULT_WORKERS: usize = 5;

/// Path that no real camera serves. A device answering 200 for this is a
/// catch-all server, not a camera.
pub const NEGATIVE_PROBE_PATH: &str = "nonexistent-resource-check.html";

/// Base URL of the Shodan REST API
pub const SHODAN_API_BASE: &str = "https://api.shodan.io";

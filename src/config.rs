use crate::constants::{DEFAULT_BASE_TIMEOUT_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_WORKERS};
use crate::errors::ScanError;
use std::path::PathBuf;

/// How the initial candidate list is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Query the upstream search provider
    Search,
    /// Read a line-oriented export file
    Import,
}

/// Configuration settings for a scan run
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Candidate source: search the provider or import from a file
    pub mode: ScanMode,

    /// Name of the camera type to scan for
    pub camera_type: String,

    /// Search provider API key (search mode)
    pub api_key: Option<String>,

    /// Two-letter country code to restrict the search to
    pub country: Option<String>,

    /// Explicit ports to search; pages multiply across ports
    pub ports: Option<Vec<u16>>,

    /// Number of result pages to request per search query
    pub pages: u32,

    /// Export file to read candidates from (import mode)
    pub input_file: Option<PathBuf>,

    /// Optional flat text log of confirmed cameras
    pub log_file: Option<PathBuf>,

    /// Number of concurrent probing workers
    pub workers: usize,

    /// Ports on either side of a hit to additionally probe
    pub adjacent_depth: u16,

    /// Probe the type's well-known common ports on every hit
    pub common_ports: bool,

    /// Expand every raw candidate before probing instead of expanding
    /// only around confirmed hits
    pub optimistic: bool,

    /// Timeout for the first probe attempt, in milliseconds
    pub base_timeout_ms: u64,

    /// Maximum attempts per probe phase
    pub max_attempts: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::Search,
            camera_type: "foscam".to_string(),
            api_key: None,
            country: None,
            ports: None,
            pages: 1,
            input_file: None,
            log_file: None,
            workers: DEFAULT_WORKERS,
            adjacent_depth: 0,
            common_ports: false,
            optimistic: false,
            base_timeout_ms: DEFAULT_BASE_TIMEOUT_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ScanConfig {
    /// Validate the configuration before any scanning begins.
    /// Violations here are fatal; everything past this point degrades
    /// gracefully instead of aborting the run.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.workers < 1 {
            return Err(ScanError::Config(
                "worker count cannot be less than 1".to_string(),
            ));
        }

        if self.camera_type.trim().is_empty() {
            return Err(ScanError::Config(
                "camera type must be specified".to_string(),
            ));
        }

        if self.max_attempts < 1 {
            return Err(ScanError::Config(
                "probe attempts cannot be less than 1".to_string(),
            ));
        }

        match self.mode {
            ScanMode::Search => {
                if let Some(country) = &self.country {
                    if country.len() != 2 {
                        return Err(ScanError::Config(format!(
                            "country must be a 2 letter country code, got '{}'",
                            country
                        )));
                    }
                }
                if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                    return Err(ScanError::Config(
                        "search mode requires an API key".to_string(),
                    ));
                }
            }
            ScanMode::Import => match &self.input_file {
                Some(path) if path.exists() => {}
                Some(path) => {
                    return Err(ScanError::Config(format!(
                        "input file does not exist or cannot be read: {}",
                        path.display()
                    )));
                }
                None => {
                    return Err(ScanError::Config(
                        "import mode requires an input file".to_string(),
                    ));
                }
            },
        }

        Ok(())
    }
}

// ── Runtime configuration ──
//
// Describes how to reach the clinic server and how the query cache
// behaves. Built by the CLI from a profile; core never reads files.

use std::time::Duration;

use clinic_api::{TlsMode, TransportConfig};
use url::Url;

use crate::query::{CacheConfig, DEFAULT_GC_TIME};

#[derive(Debug, Clone)]
pub struct ClinicConfig {
    /// Server URL (e.g. `https://clinic.example.com`); `/api/` is appended.
    pub url: Url,
    pub tls: TlsMode,
    /// Request timeout.
    pub timeout: Duration,
    /// Default staleness window for cached queries.
    pub stale_time: Duration,
    /// Retention of unobserved cache entries.
    pub gc_time: Duration,
}

impl ClinicConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            stale_time: Duration::ZERO,
            gc_time: DEFAULT_GC_TIME,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }

    pub fn cache(&self) -> CacheConfig {
        CacheConfig {
            stale_time: self.stale_time,
            gc_time: self.gc_time,
        }
    }
}

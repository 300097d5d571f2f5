use crate::domain::money::CommissionRate;
use crate::domain::query::{DEFAULT_MAX_PAGE_LIMIT, Pagination};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Runtime settings. Every field can come from a flag or the environment.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Commission percentage assigned to newly registered vendors
    #[arg(long, env = "VENDOR_COMMISSION_RATE", default_value = "15.0")]
    pub commission_rate: CommissionRate,

    /// Lifetime of cached vendor records, in seconds
    #[arg(long, env = "VENDOR_CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Upper bound applied to the `limit` of listing queries
    #[arg(long, env = "VENDOR_MAX_PAGE_LIMIT", default_value_t = DEFAULT_MAX_PAGE_LIMIT)]
    pub max_page_limit: u32,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "VENDOR_DB_PATH")]
    pub db_path: Option<PathBuf>,
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn pagination(&self, page: i64, limit: i64) -> Pagination {
        Pagination::new(page, limit, self.max_page_limit)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commission_rate: CommissionRate::DEFAULT,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_page_limit: DEFAULT_MAX_PAGE_LIMIT,
            db_path: None,
        }
    }
}

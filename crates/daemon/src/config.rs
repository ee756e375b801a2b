//! Daemon configuration, resolved once from the environment

use waitlist_api_rpc::server::{
    RpcServerConfig, DEFAULT_ADMIN_TOKEN, DEFAULT_RATE_LIMIT_BURST, DEFAULT_RATE_LIMIT_RATE,
    DEFAULT_RETENTION_DAYS, DEFAULT_RPC_HOST, DEFAULT_RPC_PORT,
};
use waitlist_core::port::MAX_RETENTION_DAYS;

pub const DEFAULT_DB_PATH: &str = "~/.waitlist/waitlist.db";
pub const DEFAULT_MAINTENANCE_INTERVAL_HOURS: u64 = 24;
const MAX_MAINTENANCE_INTERVAL_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub db_path: String,
    pub log_format: LogFormat,
    pub rpc: RpcServerConfig,
    pub maintenance_interval_hours: u64,
    pub retention_days: i64,
}

impl DaemonConfig {
    /// Read `WAITLIST_*` variables
    ///
    /// Logging is not up yet at this point, so problems are returned as
    /// warnings for the caller to emit once the subscriber is installed.
    pub fn from_env() -> (Self, Vec<String>) {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();

        let db_path = lookup("WAITLIST_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let db_path = shellexpand::tilde(&db_path).into_owned();

        let log_format = match lookup("WAITLIST_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                warnings.push(format!(
                    "Unknown WAITLIST_LOG_FORMAT {:?}, using pretty",
                    other
                ));
                LogFormat::Pretty
            }
        };

        let mut retention_days = parse_or(
            &lookup,
            "WAITLIST_RETENTION_DAYS",
            DEFAULT_RETENTION_DAYS,
            &mut warnings,
        );
        if !(0..=MAX_RETENTION_DAYS).contains(&retention_days) {
            warnings.push(format!(
                "WAITLIST_RETENTION_DAYS={} outside 0..={}, using default {}",
                retention_days, MAX_RETENTION_DAYS, DEFAULT_RETENTION_DAYS
            ));
            retention_days = DEFAULT_RETENTION_DAYS;
        }

        let rpc = RpcServerConfig {
            host: lookup("WAITLIST_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            port: parse_or(&lookup, "WAITLIST_RPC_PORT", DEFAULT_RPC_PORT, &mut warnings),
            admin_token: lookup("WAITLIST_ADMIN_TOKEN")
                .unwrap_or_else(|| DEFAULT_ADMIN_TOKEN.to_string()),
            rate_limit_burst: parse_or(
                &lookup,
                "WAITLIST_RATE_LIMIT_BURST",
                DEFAULT_RATE_LIMIT_BURST,
                &mut warnings,
            ),
            rate_limit_rate: parse_or(
                &lookup,
                "WAITLIST_RATE_LIMIT_RATE",
                DEFAULT_RATE_LIMIT_RATE,
                &mut warnings,
            ),
            retention_days,
        };

        let mut maintenance_interval_hours = parse_or(
            &lookup,
            "WAITLIST_MAINTENANCE_INTERVAL_HOURS",
            DEFAULT_MAINTENANCE_INTERVAL_HOURS,
            &mut warnings,
        );
        if !(1..=MAX_MAINTENANCE_INTERVAL_HOURS).contains(&maintenance_interval_hours) {
            warnings.push(format!(
                "WAITLIST_MAINTENANCE_INTERVAL_HOURS={} outside 1..={}, using default {}",
                maintenance_interval_hours,
                MAX_MAINTENANCE_INTERVAL_HOURS,
                DEFAULT_MAINTENANCE_INTERVAL_HOURS
            ));
            maintenance_interval_hours = DEFAULT_MAINTENANCE_INTERVAL_HOURS;
        }

        let config = Self {
            db_path,
            log_format,
            rpc,
            maintenance_interval_hours,
            retention_days,
        };
        (config, warnings)
    }

    pub fn uses_default_admin_token(&self) -> bool {
        self.rpc.admin_token == DEFAULT_ADMIN_TOKEN
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    warnings: &mut Vec<String>,
) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warnings.push(format!(
                    "Invalid {}={:?}, using default {}",
                    key, raw, default
                ));
                default
            }
        },
    }
}

//! Mock backend collaborator.
//!
//! Stands in for the real metrics service: a fixed user database for
//! login, freshly generated random series for every fetch, simulated
//! latency on both calls, and a configurable transport-failure rate on
//! fetches (login never fails at the transport level here, but callers
//! must still handle it for a real backend).

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Days, Local, NaiveDate};
use rand::Rng;

use pulse_core::auth::{Credentials, UserIdentity};
use pulse_core::backend::DashboardBackend;
use pulse_core::config::EngineConfig;
use pulse_core::error::{PulseError, Result};
use pulse_core::metrics::{DataPoint, DateRange, Series};

/// Message for a rejected login, word-for-word what the UI shows inline.
const INVALID_CREDENTIALS: &str = "Invalid credentials. Please check your email and try again.";

/// Message for a simulated transport failure on fetch.
const FETCH_FAILED: &str = "API Error: Failed to fetch data";

/// The mock [`DashboardBackend`].
pub struct MockBackend {
    users: Vec<UserIdentity>,
    login_latency: Duration,
    fetch_latency: Duration,
    failure_rate: f64,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a backend with latency and flakiness from the runtime
    /// configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            users: fixture_users(),
            login_latency: config.login_latency(),
            fetch_latency: config.fetch_latency(),
            failure_rate: config.fetch_failure_rate,
        }
    }

    /// Overrides the transport-failure probability (0.0 disables it;
    /// tests use this for determinism).
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate;
        self
    }

    /// Removes the simulated latency on both calls.
    pub fn without_latency(mut self) -> Self {
        self.login_latency = Duration::ZERO;
        self.fetch_latency = Duration::ZERO;
        self
    }

    fn roll_failure(&self) -> bool {
        self.failure_rate > 0.0 && rand::thread_rng().r#gen::<f64>() < self.failure_rate
    }

    /// Generates `days` points ending today, chronological ascending.
    fn generate_series(&self, days: usize) -> Series {
        let today = Local::now().date_naive();
        let mut rng = rand::thread_rng();

        (0..days)
            .map(|i| {
                let offset = (days - 1 - i) as u64;
                let date = today.checked_sub_days(Days::new(offset)).unwrap_or(today);
                DataPoint {
                    date: format_label(date),
                    sales: rng.gen_range(0..10_000),
                    users: rng.gen_range(0..1_000),
                    page_views: rng.gen_range(0..50_000),
                    active_users: rng.gen_range(0..500),
                    new_signups: rng.gen_range(0..50),
                }
            })
            .collect()
    }
}

/// M/D/YYYY display label, no zero padding.
///
/// This mirrors a browser's locale date formatting; it is NOT a sort
/// key. Series order is generation order.
fn format_label(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

fn fixture_users() -> Vec<UserIdentity> {
    vec![
        UserIdentity {
            id: "1".to_string(),
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            token: "mock-jwt-token-johndoe".to_string(),
        },
        UserIdentity {
            id: "2".to_string(),
            name: "Jane Smith".to_string(),
            email: "jane.smith@example.com".to_string(),
            token: "mock-jwt-token-janesmith".to_string(),
        },
    ]
}

#[async_trait]
impl DashboardBackend for MockBackend {
    async fn login(&self, credentials: &Credentials) -> Result<UserIdentity> {
        tokio::time::sleep(self.login_latency).await;

        self.users
            .iter()
            .find(|user| user.email == credentials.email)
            .cloned()
            .ok_or_else(|| PulseError::credentials(INVALID_CREDENTIALS))
    }

    async fn fetch_series(&self, range: DateRange) -> Result<Series> {
        tokio::time::sleep(self.fetch_latency).await;

        if self.roll_failure() {
            tracing::debug!(%range, "simulated transport failure");
            return Err(PulseError::transport(FETCH_FAILED));
        }

        let series = self.generate_series(range.days());
        tracing::debug!(%range, points = series.len(), "series generated");
        Ok(series)
    }
}

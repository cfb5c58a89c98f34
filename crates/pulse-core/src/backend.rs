//! Backend collaborator trait.

use async_trait::async_trait;

use crate::auth::{Credentials, UserIdentity};
use crate::error::Result;
use crate::metrics::{DateRange, Series};

/// The remote collaborator the engine fetches identities and metrics
/// from.
///
/// The mock implementation lives in the infrastructure crate; a real
/// service client implements the same seam. Implementations fail with
/// [`PulseError::Credentials`] / [`PulseError::NotFound`] for unknown
/// identities and [`PulseError::Transport`] for transport-level
/// failures; callers fold every failure into observable state rather
/// than propagating it.
///
/// [`PulseError::Credentials`]: crate::error::PulseError::Credentials
/// [`PulseError::NotFound`]: crate::error::PulseError::NotFound
/// [`PulseError::Transport`]: crate::error::PulseError::Transport
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    /// Resolves credentials to an identity.
    async fn login(&self, credentials: &Credentials) -> Result<UserIdentity>;

    /// Fetches a freshly generated series covering the given range,
    /// one point per day, chronological ascending.
    async fn fetch_series(&self, range: DateRange) -> Result<Series>;
}

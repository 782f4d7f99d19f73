use crate::types::HealthRes;

/// Health check shared by every surface that serves the directory.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Report that the service is up. There are no downstream checks; the registry is only
    /// contacted on demand.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Provider directory is alive".into(),
        }
    }
}

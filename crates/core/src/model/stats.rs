use serde::{Deserialize, Serialize};

/// Per-user aggregate shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_attempts: u32,
    pub completed_attempts: u32,
    pub passed_attempts: u32,
    pub average_percentage: Option<f64>,
}

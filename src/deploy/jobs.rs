//! Periodic backend jobs of the sandbox account platform

use serde::Serialize;

/// A backend function run on a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledJob {
    pub name: String,
    pub function_name: String,
    pub schedule_expression: String,
    /// Jitter window for the scheduler mechanism; ignored by event rules
    pub flexible_window_minutes: Option<u32>,
}

impl ScheduledJob {
    fn new(name: &str, function_name: &str, expression: &str, window: Option<u32>) -> Self {
        Self {
            name: name.to_string(),
            function_name: function_name.to_string(),
            schedule_expression: expression.to_string(),
            flexible_window_minutes: window,
        }
    }
}

/// Jobs every deployment schedules
pub fn platform_jobs() -> Vec<ScheduledJob> {
    vec![
        ScheduledJob::new("lease-monitoring", "LeaseMonitoring", "rate(1 hour)", Some(5)),
        ScheduledJob::new(
            "account-drift-monitoring",
            "AccountDriftMonitoring",
            "rate(6 hours)",
            Some(15),
        ),
        ScheduledJob::new(
            "cleanup-status-check",
            "AccountCleanupStatusCheck",
            "rate(15 minutes)",
            None,
        ),
        ScheduledJob::new("cost-reporting", "CostReporting", "cron(0 0 1 * ? *)", Some(60)),
    ]
}

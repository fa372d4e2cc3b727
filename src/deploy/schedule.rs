//! Periodic job triggers
//!
//! Two mechanisms express "run this job on schedule X with retry policy Y":
//!
//! - `EventRule`: rule-based triggers, available in every partition. Accepts
//!   `rate()` expressions and exactly one cron pattern (first of the month),
//!   approximated as a 30-day rate.
//! - `Scheduler`: the scheduler service. Accepts any native expression and a
//!   flexible time window, but is not offered in every partition.
//!
//! Both produce the same retry bounds and an invoke grant scoped to exactly
//! the triggered function.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use super::jobs::ScheduledJob;
use super::DeploymentTarget;

/// The only cron expression event rules accept
pub const MONTHLY_CRON: &str = "cron(0 0 1 * ? *)";

/// Days used to approximate one calendar month
pub const MONTHLY_APPROXIMATION_DAYS: u32 = 30;

pub const MAX_RETRY_ATTEMPTS: u32 = 3;
pub const MAX_EVENT_AGE_SECONDS: u32 = 3600;

#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("schedule expression for job '{0}' is empty")]
    Empty(String),

    #[error("invalid rate expression '{expression}': {reason}")]
    InvalidRate { expression: String, reason: String },

    #[error(
        "cron expression '{0}' is not supported by event rule triggers; only 'cron(0 0 1 * ? *)' \
         is recognised. Deploy with the scheduler mechanism or use a rate() expression"
    )]
    UnsupportedCron(String),

    #[error("unrecognised schedule expression '{0}'; expected rate(...) or cron(...)")]
    Unrecognised(String),
}

/// Trigger mechanism chosen for a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMechanism {
    EventRule,
    Scheduler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateUnit {
    Minute,
    Hour,
    Day,
}

impl RateUnit {
    fn parse(unit: &str) -> Option<Self> {
        match unit {
            "minute" | "minutes" => Some(Self::Minute),
            "hour" | "hours" => Some(Self::Hour),
            "day" | "days" => Some(Self::Day),
            _ => None,
        }
    }

    fn seconds(self) -> u64 {
        match self {
            Self::Minute => 60,
            Self::Hour => 3600,
            Self::Day => 86_400,
        }
    }

    fn name(self, amount: u32) -> &'static str {
        match (self, amount == 1) {
            (Self::Minute, true) => "minute",
            (Self::Minute, false) => "minutes",
            (Self::Hour, true) => "hour",
            (Self::Hour, false) => "hours",
            (Self::Day, true) => "day",
            (Self::Day, false) => "days",
        }
    }
}

/// Fixed-period schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rate {
    pub amount: u32,
    pub unit: RateUnit,
}

impl Rate {
    /// Parse `rate(N unit)`
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        let invalid = |reason: &str| ScheduleError::InvalidRate {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let inner = expression
            .trim()
            .strip_prefix("rate(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| invalid("expected the form rate(<amount> <unit>)"))?;

        let mut parts = inner.split_whitespace();
        let (amount, unit) = match (parts.next(), parts.next(), parts.next()) {
            (Some(amount), Some(unit), None) => (amount, unit),
            _ => return Err(invalid("expected exactly an amount and a unit")),
        };

        let amount: u32 = amount
            .parse()
            .map_err(|_| invalid("amount must be a positive integer"))?;
        if amount == 0 {
            return Err(invalid("amount must be a positive integer"));
        }

        let unit = RateUnit::parse(&unit.to_ascii_lowercase())
            .ok_or_else(|| invalid("unit must be minute(s), hour(s) or day(s)"))?;

        Ok(Self { amount, unit })
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(u64::from(self.amount) * self.unit.seconds())
    }

    pub fn expression(&self) -> String {
        format!("rate({} {})", self.amount, self.unit.name(self.amount))
    }
}

/// Bounded retries shared by both mechanisms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub maximum_retry_attempts: u32,
    pub maximum_event_age_seconds: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            maximum_retry_attempts: MAX_RETRY_ATTEMPTS,
            maximum_event_age_seconds: MAX_EVENT_AGE_SECONDS,
        }
    }
}

/// Principal allowed to invoke the job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Principal {
    /// Service principal limited to one rule
    ServiceForRule { service: String, source_arn: String },
    /// Role created for this schedule alone
    ScheduleRole { role_name: String, assumed_by: String },
}

/// Least-privilege invoke permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvokeGrant {
    pub principal: Principal,
    pub action: &'static str,
    pub resource: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "UPPERCASE")]
pub enum FlexibleTimeWindow {
    Off,
    Flexible {
        #[serde(rename = "maximumWindowInMinutes")]
        maximum_window_minutes: u32,
    },
}

/// Mechanism-specific part of a trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mechanism", rename_all = "snake_case")]
pub enum TriggerSpec {
    EventRule {
        rule_name: String,
        schedule_expression: String,
        period_seconds: u64,
        /// Set when the schedule only approximates the requested one
        approximated_from: Option<String>,
    },
    Scheduler {
        schedule_name: String,
        schedule_expression: String,
        flexible_time_window: FlexibleTimeWindow,
    },
}

/// Everything needed to deploy one periodic trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleTrigger {
    pub job: String,
    pub target_function_arn: String,
    pub trigger: TriggerSpec,
    pub retry_policy: RetryPolicy,
    pub grant: InvokeGrant,
}

impl ScheduleMechanism {
    /// Build the trigger for a job. Fails for expressions this mechanism
    /// cannot express; callers treat that as a deployment failure.
    pub fn build(
        &self,
        job: &ScheduledJob,
        target: &DeploymentTarget,
    ) -> Result<ScheduleTrigger, ScheduleError> {
        let expression = job.schedule_expression.trim();
        if expression.is_empty() {
            return Err(ScheduleError::Empty(job.name.clone()));
        }

        let function_arn = target.function_arn(&job.function_name);
        let trigger_name = format!("{}-{}", target.namespace, job.name);

        let (trigger, principal) = match self {
            ScheduleMechanism::EventRule => {
                let (rate, approximated_from) = rule_rate(expression)?;
                let rule_arn = target.arn("events", &format!("rule/{}", trigger_name));
                (
                    TriggerSpec::EventRule {
                        rule_name: trigger_name,
                        schedule_expression: rate.expression(),
                        period_seconds: rate.period().as_secs(),
                        approximated_from,
                    },
                    Principal::ServiceForRule {
                        service: "events.amazonaws.com".to_string(),
                        source_arn: rule_arn,
                    },
                )
            }
            ScheduleMechanism::Scheduler => (
                TriggerSpec::Scheduler {
                    schedule_name: trigger_name.clone(),
                    schedule_expression: expression.to_string(),
                    flexible_time_window: match job.flexible_window_minutes {
                        Some(minutes) if minutes > 0 => FlexibleTimeWindow::Flexible {
                            maximum_window_minutes: minutes,
                        },
                        _ => FlexibleTimeWindow::Off,
                    },
                },
                Principal::ScheduleRole {
                    role_name: format!("{}-invoke-role", trigger_name),
                    assumed_by: "scheduler.amazonaws.com".to_string(),
                },
            ),
        };

        Ok(ScheduleTrigger {
            job: job.name.clone(),
            target_function_arn: function_arn.clone(),
            trigger,
            retry_policy: RetryPolicy::default(),
            grant: InvokeGrant {
                principal,
                action: "lambda:InvokeFunction",
                resource: function_arn,
            },
        })
    }
}

/// Map an expression onto an event rule rate
fn rule_rate(expression: &str) -> Result<(Rate, Option<String>), ScheduleError> {
    if expression.starts_with("rate(") {
        return Ok((Rate::parse(expression)?, None));
    }

    if expression.starts_with("cron(") {
        let normalized = expression.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized == MONTHLY_CRON {
            warn!(
                expression = %expression,
                days = MONTHLY_APPROXIMATION_DAYS,
                "Monthly cron approximated as a fixed rate; runs will drift from calendar months"
            );
            let rate = Rate {
                amount: MONTHLY_APPROXIMATION_DAYS,
                unit: RateUnit::Day,
            };
            return Ok((rate, Some(expression.to_string())));
        }
        return Err(ScheduleError::UnsupportedCron(expression.to_string()));
    }

    Err(ScheduleError::Unrecognised(expression.to_string()))
}

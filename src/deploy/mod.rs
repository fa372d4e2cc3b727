//! Deployment planning
//!
//! Resolves the architecture flag once, selects the serving topology and the
//! periodic trigger mechanism from it, and validates every scheduled job.
//! Schedule errors surface here, at deployment time, never at runtime.

pub mod context;
pub mod jobs;
pub mod schedule;
pub mod topology;

use serde::Serialize;
use thiserror::Error;

pub use context::{ArchitectureFlag, ContextError, DeploymentContext};
pub use jobs::ScheduledJob;
pub use schedule::{ScheduleError, ScheduleMechanism, ScheduleTrigger};
pub use topology::{Topology, TopologyInputs, TopologyKind};

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("job '{job}': {source}")]
    Schedule {
        job: String,
        #[source]
        source: ScheduleError,
    },
}

/// Account and region the platform deploys into
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentTarget {
    pub partition: String,
    pub region: String,
    pub account_id: String,
    /// Prefix for every named resource
    pub namespace: String,
}

impl DeploymentTarget {
    pub fn new(region: &str, account_id: &str, namespace: &str) -> Self {
        Self {
            partition: partition_for(region).to_string(),
            region: region.to_string(),
            account_id: account_id.to_string(),
            namespace: namespace.to_string(),
        }
    }

    pub fn arn(&self, service: &str, resource: &str) -> String {
        format!(
            "arn:{}:{}:{}:{}:{}",
            self.partition, service, self.region, self.account_id, resource
        )
    }

    pub fn function_arn(&self, function_name: &str) -> String {
        self.arn("lambda", &format!("function:{}-{}", self.namespace, function_name))
    }
}

fn partition_for(region: &str) -> &'static str {
    if region.starts_with("us-gov-") {
        "aws-us-gov"
    } else if region.starts_with("cn-") {
        "aws-cn"
    } else {
        "aws"
    }
}

/// Complete plan for one deployment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentPlan {
    pub target: DeploymentTarget,
    pub architecture: ArchitectureFlag,
    pub topology: Topology,
    pub schedule_mechanism: ScheduleMechanism,
    pub schedules: Vec<ScheduleTrigger>,
}

impl DeploymentPlan {
    /// Resolve the architecture flag from `context` (falling back to `env`)
    /// and compose the plan
    pub fn from_context<F>(
        context: &DeploymentContext,
        env: F,
        target: DeploymentTarget,
        inputs: &TopologyInputs,
        jobs: &[ScheduledJob],
    ) -> Result<Self, PlanError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = context.resolve_architecture(env)?;
        Self::build(flag, target, inputs, jobs)
    }

    /// Compose the plan. The flag is consumed here and nowhere else.
    pub fn build(
        flag: ArchitectureFlag,
        target: DeploymentTarget,
        inputs: &TopologyInputs,
        jobs: &[ScheduledJob],
    ) -> Result<Self, PlanError> {
        let topology = Topology::build(TopologyKind::from(flag), inputs);
        let mechanism = topology.schedule_mechanism();

        let schedules = jobs
            .iter()
            .map(|job| {
                mechanism.build(job, &target).map_err(|source| PlanError::Schedule {
                    job: job.name.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            target,
            architecture: flag,
            topology,
            schedule_mechanism: mechanism,
            schedules,
        })
    }
}

//! Serving topologies
//!
//! The same logical service deploys onto either a CDN in front of object
//! storage or a load balancer in front of the proxy container. The variant is
//! chosen once from the architecture flag; each variant has its own builder
//! that renders the shared edge rules into its own configuration.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::context::ArchitectureFlag;
use super::schedule::ScheduleMechanism;
use crate::edge::{EdgeRouter, EdgeTarget, HEALTH_PATH, SPA_ENTRY};
use crate::proxy::BackendOrigin;

/// Target group every load balancer rule forwards to
pub const PROXY_TARGET_GROUP: &str = "proxy-service";

/// Port the proxy container listens on
pub const CONTAINER_PORT: u16 = 8080;

/// Values a topology needs from the rest of the deployment
#[derive(Debug, Clone, Default)]
pub struct TopologyInputs {
    /// Backend API origin, when known at plan time
    pub api_origin: Option<BackendOrigin>,
    /// Certificate for the public listener
    pub certificate_arn: Option<String>,
    /// Value for the container's `ENVIRONMENT`
    pub environment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyKind {
    CloudfrontS3,
    AlbContainer,
}

impl From<ArchitectureFlag> for TopologyKind {
    fn from(flag: ArchitectureFlag) -> Self {
        if flag.use_alb {
            TopologyKind::AlbContainer
        } else {
            TopologyKind::CloudfrontS3
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CdnOrigin {
    StaticBucket,
    Api {
        domain: Option<String>,
        origin_path: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    CachingOptimized,
    CachingDisabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CdnBehavior {
    pub path_pattern: &'static str,
    pub origin: CdnOrigin,
    pub cache_policy: CachePolicy,
    /// Forward every viewer header except Host
    pub forward_viewer_headers: bool,
}

/// Error response rewrite that keeps client-side routes working
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaErrorResponse {
    pub http_status: u16,
    pub response_page_path: &'static str,
    pub response_status: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudfrontS3Plan {
    pub default_behavior: CdnBehavior,
    pub behaviors: Vec<CdnBehavior>,
    pub error_responses: Vec<SpaErrorResponse>,
    pub default_root_object: &'static str,
    pub warnings: Vec<String>,
}

pub struct CloudfrontS3Builder;

impl CloudfrontS3Builder {
    pub fn build(&self, inputs: &TopologyInputs, router: &EdgeRouter) -> CloudfrontS3Plan {
        let mut warnings = Vec::new();
        let default_behavior = CdnBehavior {
            path_pattern: "*",
            origin: CdnOrigin::StaticBucket,
            cache_policy: CachePolicy::CachingOptimized,
            forward_viewer_headers: false,
        };

        let mut behaviors = Vec::new();
        for rule in router.rules() {
            match rule.target {
                EdgeTarget::Api => behaviors.push(CdnBehavior {
                    path_pattern: rule.path_pattern,
                    origin: CdnOrigin::Api {
                        domain: inputs.api_origin.as_ref().map(|o| o.domain.clone()),
                        origin_path: inputs.api_origin.as_ref().and_then(|o| o.stage_path.clone()),
                    },
                    cache_policy: CachePolicy::CachingDisabled,
                    forward_viewer_headers: true,
                }),
                // No load balancer probes this topology
                EdgeTarget::Liveness => {
                    debug!(path = rule.path_pattern, "Liveness rule not rendered for CDN topology");
                }
                EdgeTarget::Asset => {}
            }
        }

        if inputs.api_origin.is_none() {
            let message = "API origin unknown at plan time; the /api/* behavior has no origin domain";
            warn!("{}", message);
            warnings.push(message.to_string());
        }

        let spa_fallback = |status| SpaErrorResponse {
            http_status: status,
            response_page_path: SPA_ENTRY,
            response_status: 200,
        };

        CloudfrontS3Plan {
            default_behavior,
            behaviors,
            error_responses: vec![spa_fallback(403), spa_fallback(404)],
            default_root_object: "index.html",
            warnings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListenerProtocol {
    Http,
    Https,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListenerAction {
    Forward { target_group: &'static str },
    RedirectToHttps,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listener {
    pub port: u16,
    pub protocol: ListenerProtocol,
    pub certificate_arn: Option<String>,
    pub default_action: ListenerAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerRule {
    pub priority: u32,
    pub path_pattern: &'static str,
    pub action: ListenerAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbContainerPlan {
    pub listeners: Vec<Listener>,
    pub rules: Vec<ListenerRule>,
    pub health_check_path: &'static str,
    pub container_port: u16,
    pub container_environment: BTreeMap<String, String>,
    pub warnings: Vec<String>,
}

pub struct AlbContainerBuilder;

impl AlbContainerBuilder {
    pub fn build(&self, inputs: &TopologyInputs, router: &EdgeRouter) -> AlbContainerPlan {
        let mut warnings = Vec::new();
        let forward = ListenerAction::Forward {
            target_group: PROXY_TARGET_GROUP,
        };

        let listeners = match &inputs.certificate_arn {
            Some(arn) => vec![
                Listener {
                    port: 443,
                    protocol: ListenerProtocol::Https,
                    certificate_arn: Some(arn.clone()),
                    default_action: forward.clone(),
                },
                Listener {
                    port: 80,
                    protocol: ListenerProtocol::Http,
                    certificate_arn: None,
                    default_action: ListenerAction::RedirectToHttps,
                },
            ],
            None => {
                let message = "No certificate configured; load balancer listener is HTTP only";
                warn!("{}", message);
                warnings.push(message.to_string());
                vec![Listener {
                    port: 80,
                    protocol: ListenerProtocol::Http,
                    certificate_arn: None,
                    default_action: forward.clone(),
                }]
            }
        };

        // The default action covers assets; explicit rules for the rest
        let rules = router
            .rules()
            .into_iter()
            .filter(|rule| rule.target != EdgeTarget::Asset)
            .map(|rule| ListenerRule {
                priority: rule.priority,
                path_pattern: rule.path_pattern,
                action: forward.clone(),
            })
            .collect();

        let mut container_environment = BTreeMap::new();
        container_environment.insert("PORT".to_string(), CONTAINER_PORT.to_string());
        container_environment.insert("STATIC_DIR".to_string(), "/app/public".to_string());
        container_environment.insert("ENVIRONMENT".to_string(), inputs.environment.clone());
        match &inputs.api_origin {
            Some(origin) => {
                container_environment.insert("API_ENDPOINT".to_string(), origin.url_for("", None));
            }
            None => {
                let message =
                    "API origin unknown at plan time; the proxy answers /api with 500 until API_ENDPOINT is set";
                warn!("{}", message);
                warnings.push(message.to_string());
            }
        }

        AlbContainerPlan {
            listeners,
            rules,
            health_check_path: HEALTH_PATH,
            container_port: CONTAINER_PORT,
            container_environment,
            warnings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    CloudfrontS3(CloudfrontS3Plan),
    AlbContainer(AlbContainerPlan),
}

impl Topology {
    /// Build the topology variant for `kind`
    pub fn build(kind: TopologyKind, inputs: &TopologyInputs) -> Self {
        let router = EdgeRouter;
        match kind {
            TopologyKind::CloudfrontS3 => Topology::CloudfrontS3(CloudfrontS3Builder.build(inputs, &router)),
            TopologyKind::AlbContainer => Topology::AlbContainer(AlbContainerBuilder.build(inputs, &router)),
        }
    }

    pub fn kind(&self) -> TopologyKind {
        match self {
            Topology::CloudfrontS3(_) => TopologyKind::CloudfrontS3,
            Topology::AlbContainer(_) => TopologyKind::AlbContainer,
        }
    }

    /// Periodic trigger mechanism paired with this topology. The container
    /// topology targets partitions without the scheduler service.
    pub fn schedule_mechanism(&self) -> ScheduleMechanism {
        match self {
            Topology::CloudfrontS3(_) => ScheduleMechanism::Scheduler,
            Topology::AlbContainer(_) => ScheduleMechanism::EventRule,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            Topology::CloudfrontS3(plan) => &plan.warnings,
            Topology::AlbContainer(plan) => &plan.warnings,
        }
    }
}

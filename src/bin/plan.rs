//! Deployment plan tool
//!
//! Resolves the deployment context, selects the serving topology and the
//! periodic trigger mechanism, validates every scheduled job and prints the
//! plan as JSON. Exits non-zero when a schedule cannot be deployed.
//!
//! Usage: sandbox-edge-plan -c useAlbArchitecture=true --region us-gov-west-1

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use sandbox_edge::{
    deploy::{jobs::platform_jobs, DeploymentContext, DeploymentPlan, DeploymentTarget, TopologyInputs},
    BackendOrigin,
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Deployment context entry (repeatable), e.g. useAlbArchitecture=true
    #[clap(short = 'c', long = "context", value_name = "KEY=VALUE")]
    context: Vec<String>,

    /// Target region
    #[clap(long, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,

    /// Target account id
    #[clap(long, env = "CDK_DEFAULT_ACCOUNT", default_value = "000000000000")]
    account: String,

    /// Prefix for named resources
    #[clap(long, default_value = "isb")]
    namespace: String,

    /// Backend API endpoint (domain or URL), if already known
    #[clap(long)]
    api_endpoint: Option<String>,

    /// Certificate for the public listener
    #[clap(long)]
    certificate_arn: Option<String>,

    /// Value for the container ENVIRONMENT variable
    #[clap(long, default_value = "production")]
    environment: String,

    /// Pretty-print the JSON output
    #[clap(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sandbox_edge=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let context = DeploymentContext::from_pairs(&args.context)?;
    let api_origin = args
        .api_endpoint
        .as_deref()
        .map(|raw| BackendOrigin::parse(raw, None))
        .transpose()
        .context("Invalid --api-endpoint")?;

    let inputs = TopologyInputs {
        api_origin,
        certificate_arn: args.certificate_arn,
        environment: args.environment,
    };
    let target = DeploymentTarget::new(&args.region, &args.account, &args.namespace);

    let plan = DeploymentPlan::from_context(
        &context,
        |key| std::env::var(key).ok(),
        target,
        &inputs,
        &platform_jobs(),
    )
    .context("Deployment plan failed")?;

    info!(
        warnings = plan.topology.warnings().len(),
        topology = ?plan.topology.kind(),
        flag_source = ?plan.architecture.source,
        mechanism = ?plan.schedule_mechanism,
        schedules = plan.schedules.len(),
        "Deployment plan ready"
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&plan)?
    } else {
        serde_json::to_string(&plan)?
    };
    println!("{}", json);

    Ok(())
}

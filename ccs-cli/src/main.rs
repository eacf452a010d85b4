use anyhow::Result;
use ccs_core::{param_tree, DynamicsOverrides, RewardOverride};
use ccs_suite::{load, Domain, TaskConfig};
use clap::Parser;
use log::info;

/// Loads a task with reward and dynamics overrides and prints what it resolves to.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Domain name (cartpole, cheetah, finger, hopper, pendulum, quadruped, reacher, walker)
    #[arg(long, default_value = "cheetah")]
    domain: String,

    /// Task name
    #[arg(long, default_value = "run")]
    task: String,

    /// Task configuration in YAML
    #[arg(long)]
    config: Option<String>,

    /// Reward override in JSON, e.g. '{"ALL": {"sigmoid": "linear", "margin": 10}}'
    #[arg(long)]
    reward: Option<String>,

    /// Dynamics override in JSON, e.g. '{"length": 0.5}'
    #[arg(long)]
    dynamics: Option<String>,

    /// Print the body description
    #[arg(long, default_value_t = false)]
    print_model: bool,
}

fn task_config(args: &Args) -> Result<TaskConfig> {
    let mut config = match &args.config {
        Some(path) => TaskConfig::load(path)?,
        None => TaskConfig::default(),
    };

    match &args.reward {
        Some(json) => config.reward = Some(serde_json::from_str(json)?),
        None if config.reward.is_none() => {
            config.reward = Some(RewardOverride::all(
                param_tree! { "sigmoid" => "linear", "margin" => 10.0 },
            ));
        }
        None => {}
    }

    let templated = args.domain.parse::<Domain>()?.is_templated();
    match &args.dynamics {
        Some(json) => config.dynamics = Some(serde_json::from_str(json)?),
        None if config.dynamics.is_none() && templated => {
            config.dynamics = Some(DynamicsOverrides::default().length(0.5));
        }
        None => {}
    }

    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = task_config(&args)?;
    let env = load(&args.domain, &args.task, &config)?;

    info!(
        "{}/{}: time limit {}s, control timestep {:?}",
        env.domain, env.task, env.time_limit, env.control_timestep
    );
    println!("{}", serde_yaml::to_string(env.reward.reward_parameters())?);

    if args.print_model {
        match &env.model {
            Some(model) => println!("{}", model),
            None => info!("No body description available for {}", env.domain),
        }
    }

    Ok(())
}

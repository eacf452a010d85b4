use anyhow::Result;
use ccs_core::{param_tree, DynamicsOverrides, ParamError, RewardOverride};
use ccs_suite::{load, Domain, SuiteError, TaskConfig};
use std::io::Write;
use tempdir::TempDir;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_default_config() -> Result<()> {
    init();
    let env = load("walker", "walk", &TaskConfig::default())?;
    assert_eq!(env.domain, Domain::Walker);
    assert_eq!(env.time_limit, 25.0);
    assert_eq!(env.control_timestep, Some(0.025));
    assert_eq!(
        env.reward.reward_parameters(),
        &param_tree! {
            "horizontal_velocity" => param_tree! {
                "sigmoid" => "linear",
                "margin" => 0.5,
                "value_at_margin" => 0.5,
                "bounds" => vec![0.5, f64::INFINITY],
            },
        }
    );
    assert_eq!(env.model.as_deref(), Domain::Walker.embedded_template());
    Ok(())
}

#[test]
fn test_wildcard_reward_and_length() -> Result<()> {
    init();
    let config = TaskConfig::default()
        .reward(RewardOverride::all(
            param_tree! { "sigmoid" => "linear", "margin" => 10.0 },
        ))
        .dynamics(DynamicsOverrides::default().length(0.5));
    let env = load("cheetah", "run", &config)?;

    let speed = env.reward.reward_parameters().get_map("speed")?;
    assert_eq!(speed.get_text("sigmoid")?, "linear");
    assert_eq!(speed.get_number("margin")?, 10.0);
    assert!(!speed.contains_key("value_at_margin"));

    let model = env.model.unwrap();
    assert!(model.contains(r#"fromto="-0.5 0 0 0.5 0 0""#));
    assert!(model.contains(r#"pos="0.6 0 0.1""#));
    Ok(())
}

#[test]
fn test_walker_torso_length() -> Result<()> {
    init();
    let config = TaskConfig::default().dynamics(DynamicsOverrides::default().length(0.9));
    let env = load("walker", "stand", &config)?;
    let model = env.model.unwrap();
    assert!(model.contains(r#"<geom name="torso" size="0.07 0.9"/>"#));
    assert_eq!(model.len(), Domain::Walker.embedded_template().unwrap().len());
    Ok(())
}

#[test]
fn test_unknown_group_is_rejected() {
    init();
    let config = TaskConfig::default().reward(RewardOverride::group(
        "unknown_group",
        param_tree! { "x" => 1.0 },
    ));
    let err = load("cheetah", "run", &config).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ParamError>(),
        Some(&ParamError::InvalidParameterKey {
            keys: vec!["unknown_group".to_string()]
        })
    );
}

#[test]
fn test_unknown_names() {
    init();
    let err = load("humanoid", "walk", &TaskConfig::default()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<SuiteError>(),
        Some(&SuiteError::UnknownDomain("humanoid".to_string()))
    );

    let err = load("cheetah", "walk", &TaskConfig::default()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<SuiteError>(),
        Some(&SuiteError::UnknownTask {
            domain: "cheetah".to_string(),
            task: "walk".to_string()
        })
    );
}

#[test]
fn test_dynamics_ignored_for_untemplated_body() -> Result<()> {
    init();
    let config = TaskConfig::default().dynamics(DynamicsOverrides::default().length(0.5));
    let env = load("pendulum", "swingup", &config)?;
    assert!(env.model.is_none());
    assert_eq!(env.time_limit, 20.0);
    Ok(())
}

#[test]
fn test_unrecognized_dynamics_key_passes_template_through() -> Result<()> {
    init();
    let config = TaskConfig::default().dynamics(DynamicsOverrides::default().set("friction", 2.0));
    let env = load("finger", "spin", &config)?;
    assert_eq!(env.model.as_deref(), Domain::Finger.embedded_template());
    Ok(())
}

#[test]
fn test_yaml_config_with_model_dir() -> Result<()> {
    init();
    let dir = TempDir::new("test_load")?;
    let mut file = std::fs::File::create(dir.path().join("walker.xml"))?;
    file.write_all(br#"<mujoco><worldbody><body name="torso"><geom name="torso" size="0.07 0.3"/></body></worldbody></mujoco>"#)?;

    let config_path = dir.path().join("config.yaml");
    let yaml = format!(
        "time_limit: 5.0\nreward:\n  horizontal_velocity:\n    margin: -2\ndynamics:\n  length: 0.4\nmodel_dir: {}\n",
        dir.path().display()
    );
    std::fs::write(&config_path, yaml)?;

    let config = TaskConfig::load(&config_path)?;
    let env = load("walker", "run", &config)?;
    assert_eq!(env.time_limit, 5.0);
    assert_eq!(
        env.model.as_deref(),
        Some(r#"<mujoco><worldbody><body name="torso"><geom name="torso" size="0.07 0.4"/></body></worldbody></mujoco>"#)
    );
    let hv = env.reward.reward_parameters().get_map("horizontal_velocity")?;
    assert_eq!(hv.get_numbers("bounds")?, vec![2.0, f64::INFINITY]);
    Ok(())
}

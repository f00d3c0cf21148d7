// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates stackline.yml template files.

use std::path::Path;

use crate::error::{Error, Result};

use super::deserialize::validate_segment;
use super::{CONFIG_FILENAME, Config, EnvValue};

pub fn init_config(
    dir: &Path,
    app: Option<&str>,
    environment: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(a) = app {
        validate_segment("app", a).map_err(Error::InvalidConfig)?;
        config.app = a.to_string();
    }

    if let Some(e) = environment {
        validate_segment("environment", e).map_err(Error::InvalidConfig)?;
        config.environment = Some(EnvValue::literal(e));
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let environment = match config.environment {
        Some(EnvValue::Literal(ref name)) => name.as_str(),
        _ => "stg",
    };
    format!(
        r#"app: {}
environment: {}
account: "{}"
region: {}

# Optional units
managed_database: false
bastion: false

store:
  dir: {}

# Per-environment overrides
# environments:
#   prod:
#     account: "123456789012"
#     managed_database: true
"#,
        config.app,
        environment,
        config.account,
        config.region,
        config.store.dir.display()
    )
}

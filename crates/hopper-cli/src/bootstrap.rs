use std::path::Path;

use anyhow::Context;
use hopper_config::HopperConfig;

/// Load `.env`, then the layered config for `project_root`, and validate it.
pub fn load_config(project_root: &Path) -> anyhow::Result<HopperConfig> {
    load_project_dotenv(project_root)?;

    let config = HopperConfig::load_from(project_root).context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn load_project_dotenv(project_root: &Path) -> anyhow::Result<()> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
        return Ok(());
    }

    dotenvy::dotenv().ok();
    Ok(())
}

use anyhow::{bail, Result};
use std::path::Path;

use crate::config::Config;

pub fn cmd_config_path(path: &Path) {
    println!("{}", path.display());
}

pub fn cmd_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

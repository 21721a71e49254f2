//! `refetch config` – print config location and effective values.

use anyhow::Result;
use refetch_core::config::{self, RefetchConfig};

pub fn run_show_config(cfg: &RefetchConfig) -> Result<()> {
    let path = config::config_path()?;
    let policy = cfg.retry_policy()?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    println!(
        "# effective retry: max_attempts={} base_delay={:?} max_delay={:?} mode={:?}",
        policy.max_attempts, policy.base_delay, policy.max_delay, policy.mode
    );
    Ok(())
}

use anyhow::Result;

use glint_core::GlintConfig;

pub fn run(config: &GlintConfig, init: bool) -> Result<()> {
    if init {
        let path = GlintConfig::config_path();
        if path.exists() {
            println!("Config already exists at {}", path.display());
            return Ok(());
        }
        GlintConfig::default().save()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    println!("# {}", GlintConfig::config_path().display());
    print!("{}", config.to_toml_string()?);
    Ok(())
}

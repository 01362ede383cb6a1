//! Show or write the application configuration.

use viewfinder_common::config::AppConfig;

pub fn run(write: bool) -> anyhow::Result<()> {
    let config = AppConfig::load();

    let json = serde_json::to_string_pretty(&config)?;
    println!("{json}");

    if write {
        config.save()?;
        println!();
        println!(
            "Configuration written to {}",
            viewfinder_common::config::config_file_path().display()
        );
    }

    Ok(())
}

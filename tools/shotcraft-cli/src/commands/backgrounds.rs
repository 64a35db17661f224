//! List the background catalog.

use shotcraft_common::config::AppConfig;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = super::load_catalog(config);
    let selected = catalog.initial_selection(&config.style.background_id);

    println!("Backgrounds ({}):", catalog.len());
    for entry in catalog.entries() {
        let marker = if entry.id == selected { "*" } else { " " };
        println!(
            " {marker} {:<28} {:<10} {}",
            entry.id,
            format!("{:?}", entry.kind()).to_lowercase(),
            entry.name
        );
    }
    Ok(())
}

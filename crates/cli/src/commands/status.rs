//! `zalo status` — Show configuration and store status.

use zalo_agent::Assistant;
use zalo_config::AppConfig;

pub fn run(config: &AppConfig, ephemeral: bool) -> Result<(), Box<dyn std::error::Error>> {
    let assistant = Assistant::from_config(config, ephemeral);
    let kb = assistant.knowledge();

    println!("{} Status", assistant.name());
    println!("==================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Data dir:     {}", config.data_dir().display());
    println!(
        "  Knowledge:    {} ({} topics, {} storage)",
        kb.storage_path()
            .map_or_else(|| "(in memory)".to_string(), |p| p.display().to_string()),
        kb.len(),
        kb.storage_name()
    );
    println!("  Threshold:    {}", kb.threshold());
    println!(
        "  Context bias: {}",
        if config.knowledge.context_sensitive { "enabled" } else { "disabled" }
    );
    println!(
        "  Auto-learn:   {}",
        if config.knowledge.auto_learn { "enabled" } else { "disabled" }
    );
    println!(
        "  Notes:        {} ({} notes)",
        assistant.notes().path().display(),
        assistant.notes().len()
    );
    println!(
        "  Tasks:        {} ({} active, {} due within {}h)",
        assistant.tasks().path().display(),
        assistant.active_tasks(),
        assistant.due_soon(),
        config.tasks.reminder_window_hours
    );

    if AppConfig::config_path().exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file, using defaults (run `zalo onboard` to create one)");
    }

    Ok(())
}

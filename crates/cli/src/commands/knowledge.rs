//! `zalo learn|forget|topics|export|import` — knowledge base management.

use std::path::Path;
use zalo_agent::open_knowledge;
use zalo_config::AppConfig;
use zalo_core::Result;

pub fn learn(
    config: &AppConfig,
    ephemeral: bool,
    topic: &str,
    info: &str,
    context: Option<&str>,
) -> Result<()> {
    let mut kb = open_knowledge(config, ephemeral);
    let learned = kb.learn(topic, info, context)?;
    if learned.added {
        println!("{learned}");
    } else {
        println!("{learned} (already known)");
    }
    Ok(())
}

pub fn forget(
    config: &AppConfig,
    ephemeral: bool,
    topic: &str,
    response: Option<&str>,
) -> Result<()> {
    let mut kb = open_knowledge(config, ephemeral);
    println!("{}", kb.forget(topic, response)?);
    Ok(())
}

pub fn topics(config: &AppConfig, ephemeral: bool) -> Result<()> {
    let kb = open_knowledge(config, ephemeral);

    println!("Known topics ({})", kb.len());
    println!("==================");
    if kb.is_empty() {
        println!("  (none yet; teach one with `zalo learn <topic> <info>`)");
        return Ok(());
    }
    for topic in kb.topics() {
        let count = kb.records(topic).map_or(0, <[_]>::len);
        println!("  {topic:<30} {count} response(s)");
    }
    Ok(())
}

pub fn export(config: &AppConfig, ephemeral: bool, path: Option<&Path>) -> Result<()> {
    let kb = open_knowledge(config, ephemeral);
    let written = kb.export(path)?;
    println!("Exported {} topics to {}", kb.len(), written.display());
    Ok(())
}

pub fn import(config: &AppConfig, ephemeral: bool, path: &Path) -> Result<()> {
    let mut kb = open_knowledge(config, ephemeral);
    let count = kb.import(path)?;
    println!("Imported {count} topics from {}", path.display());
    println!("Knowledge base now holds {} topics", kb.len());
    Ok(())
}

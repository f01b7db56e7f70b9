//! `zalo chat` / `zalo ask` — interactive or single-line conversation.

use std::io::Write;
use tracing::debug;
use zalo_agent::Assistant;
use zalo_channels::CliChannel;
use zalo_config::AppConfig;
use zalo_core::channel::Channel;

pub async fn run(config: &AppConfig, ephemeral: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut assistant = Assistant::from_config(config, ephemeral);
    let name = assistant.name().to_string();
    debug!(
        topics = assistant.knowledge().len(),
        notes = assistant.notes().len(),
        ephemeral,
        "Chat session started"
    );

    println!("(Type 'help' to see available commands, 'bye' to leave)");
    if ephemeral {
        println!("(Ephemeral session: nothing learned now will be kept)");
    }
    println!("{name}: {}", assistant.greeting());
    if assistant.due_soon() > 0 {
        println!("{name}: {}", assistant.respond("reminders"));
    }

    let channel = CliChannel::new(&config.user_name);
    let mut rx = channel
        .start()
        .await
        .map_err(|e| format!("Channel error: {e}"))?;

    prompt()?;
    while let Some(result) = rx.recv().await {
        match result {
            Ok(msg) => {
                let reply = assistant.respond(&msg.content);
                channel.send(&format!("{name}: {reply}")).await?;
                prompt()?;
            }
            Err(e) => {
                eprintln!("[Channel Error] {e}");
                break;
            }
        }
    }

    println!();
    println!("{name}: Goodbye!");
    Ok(())
}

pub fn ask(
    config: &AppConfig,
    ephemeral: bool,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut assistant = Assistant::from_config(config, ephemeral);
    println!("{}", assistant.respond(message));
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("You: ");
    std::io::stdout().flush()
}

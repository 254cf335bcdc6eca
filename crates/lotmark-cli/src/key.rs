//! Credential subcommands.

use clap::Subcommand;

use lotmark_core::{AppConfig, KeyUpdate};

use crate::context;

const CALLER_IDENTITY: &str = "cli";

#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Validate, rate-limit, and persist a new provider key.
    Set { value: String },
    /// Show whether a key is configured (the value itself stays redacted).
    Show,
}

pub fn run(config: &AppConfig, command: &KeyCommand) -> anyhow::Result<()> {
    let manager = context::build_manager(config)?;
    match command {
        KeyCommand::Set { value } => match manager.set_key(CALLER_IDENTITY, value)? {
            KeyUpdate::Applied => println!("key updated"),
            KeyUpdate::ReloadRequired => {
                println!("key updated — restart running sessions for it to take effect");
            }
        },
        KeyCommand::Show => match manager.key()? {
            Some(key) => println!("configured key: {key}"),
            None => println!("no key configured"),
        },
    }
    Ok(())
}

use std::path::Path;

use color_eyre::eyre::Result;
use onepass_agent::{default_socket_path, Agent, AgentClient, AgentError};
use onepass_crypto::gen_password;
use onepass_interchange::{export_items, import_into};
use onepass_vault::Vault;

use crate::commands::find_items;

pub fn export(vault: &Vault, path: &Path, pattern: Option<&str>) -> Result<()> {
    let items = match pattern {
        Some(pattern) => find_items(vault, pattern)?,
        None => vault.list_items()?,
    };
    export_items(vault, &items, path)?;
    println!("Exported {} item(s) to {}", items.len(), path.display());
    Ok(())
}

pub fn import(vault: &Vault, path: &Path) -> Result<()> {
    let added = import_into(vault, path)?;
    println!("Imported {} item(s)", added.len());
    Ok(())
}

pub fn generate_password(length: usize) -> Result<()> {
    println!("{}", gen_password(length)?);
    Ok(())
}

/// Drop this vault's keys from the agent. A missing agent already means
/// everything is locked.
pub fn lock(vault: &Vault) -> Result<()> {
    match AgentClient::connect(&default_socket_path(), vault.path()) {
        Ok(client) => {
            client.lock_vault()?;
            println!("Vault locked");
            Ok(())
        }
        Err(AgentError::Unavailable(_)) => {
            println!("Vault locked");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Run the agent daemon in the foreground on the default socket. Clients
/// start this with the hidden `agent` subcommand when the socket is dead.
pub fn run_agent() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(Agent::new().serve(&default_socket_path()))?;
    Ok(())
}

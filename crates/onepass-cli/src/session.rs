//! Opening and unlocking vault handles for a single command invocation.

use std::path::Path;

use color_eyre::eyre::{eyre, Result};
use onepass_agent::{connect_or_start, default_socket_path, AgentError, DEFAULT_UNLOCK_DELAY};
use onepass_vault::{Vault, VaultError};

use crate::command::VAULT_ENV;

pub fn open_vault(path: Option<&Path>) -> Result<Vault> {
    let path = path.ok_or_else(|| {
        eyre!("no vault specified; pass --vault or set {VAULT_ENV}")
    })?;
    Ok(Vault::open(path)?)
}

/// Make the vault ready for content operations.
///
/// By default the key agent mediates: it is started if needed, asked whether
/// the vault is unlocked, and only then is the master password prompted for.
/// With `no_agent` the keys are decrypted into this process instead.
pub fn unlock(vault: &mut Vault, no_agent: bool) -> Result<()> {
    if no_agent {
        let master_pwd = prompt_master_password()?;
        return match vault.unlock(&master_pwd) {
            Err(err @ VaultError::BadMasterPassword) => {
                print_hint(vault);
                Err(err.into())
            }
            other => Ok(other?),
        };
    }

    let client = connect_or_start(&default_socket_path(), vault.path())?;
    if client.vault_is_locked()? {
        let master_pwd = prompt_master_password()?;
        if let Err(err) = client.unlock(&master_pwd, DEFAULT_UNLOCK_DELAY) {
            if matches!(err, AgentError::BadMasterPassword) {
                print_hint(vault);
            }
            return Err(err.into());
        }
    }
    client.refresh_access(DEFAULT_UNLOCK_DELAY)?;
    vault.attach_agent(Box::new(client));
    Ok(())
}

pub fn prompt_master_password() -> Result<String> {
    Ok(inquire::Password::new("Master password:")
        .without_confirmation()
        .prompt()?)
}

fn print_hint(vault: &Vault) {
    if let Ok(hint) = vault.password_hint() {
        let hint = hint.trim();
        if !hint.is_empty() {
            eprintln!("Hint: {hint}");
        }
    }
}

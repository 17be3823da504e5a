use std::path::Path;

use color_eyre::eyre::Result;
use inquire::Password;
use onepass_vault::{Vault, VaultSecurity};

use crate::session::prompt_master_password;

pub fn new_vault(path: &Path, iterations: Option<u32>, hint: Option<&str>) -> Result<()> {
    println!("Creating new vault in {}", path.display());
    let master_password = Password::new("Master password:").prompt()?;

    let vault = Vault::create(
        path,
        &VaultSecurity {
            master_password,
            iterations: iterations.unwrap_or(0),
        },
    )?;
    if let Some(hint) = hint {
        vault.set_password_hint(hint)?;
    }
    println!("Vault created");
    Ok(())
}

pub fn set_password(vault: &Vault) -> Result<()> {
    let current = prompt_master_password()?;
    let new = Password::new("New master password:").prompt()?;
    vault.set_master_password(&current, &new)?;
    println!("Master password updated");
    Ok(())
}

pub fn hint(vault: &Vault) -> Result<()> {
    let hint = vault.password_hint()?;
    let hint = hint.trim();
    if hint.is_empty() {
        println!("No password hint is set");
    } else {
        println!("{hint}");
    }
    Ok(())
}

pub fn set_hint(vault: &Vault, hint: &str) -> Result<()> {
    vault.set_password_hint(hint)?;
    Ok(())
}

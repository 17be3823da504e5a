use color_eyre::eyre::{bail, Result};
use inquire::{Confirm, Password, Text};
use onepass_vault::{
    field_value_from_string, standard_template, type_code_for_alias, ItemContent, Vault,
    VaultError, FOLDER_TYPE_NAME,
};

use crate::commands::{find_items, find_one_item};
use crate::render;

pub fn list(vault: &Vault, pattern: Option<&str>) -> Result<()> {
    let mut items = match pattern {
        Some(pattern) => find_items(vault, pattern)?,
        None => vault.list_items()?,
    };
    items.sort_by(|a, b| a.title.cmp(&b.title));
    for item in &items {
        println!("{}", render::item_line(item));
    }
    Ok(())
}

pub fn show(vault: &Vault, pattern: &str, as_json: bool) -> Result<()> {
    for item in find_items(vault, pattern)? {
        println!("{}: {}", item.title, item.uuid);
        if as_json {
            let value: serde_json::Value = serde_json::from_str(&vault.content_json(&item)?)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            print!("{}", render::content_text(&vault.content(&item)?));
        }
        println!();
    }
    Ok(())
}

pub fn add(vault: &Vault, type_alias: &str, title: &str) -> Result<()> {
    let Some(type_code) = type_code_for_alias(type_alias) else {
        return Err(VaultError::UnknownItemType(type_alias.to_owned()).into());
    };
    let mut content = if type_code == FOLDER_TYPE_NAME {
        ItemContent::default()
    } else {
        standard_template(type_code)
            .ok_or_else(|| VaultError::UnknownItemType(type_alias.to_owned()))?
    };

    for field in &mut content.form_fields {
        let label = if field.designation.is_empty() {
            &field.name
        } else {
            &field.designation
        };
        field.value = if field.r#type == "P" {
            Password::new(&format!("{label}:"))
                .without_confirmation()
                .prompt()?
        } else {
            Text::new(&format!("{label}:")).prompt()?
        };
    }

    for url in &mut content.urls {
        url.url = Text::new(&format!("{}:", url.label)).prompt()?;
    }

    for section in &mut content.sections {
        for field in &mut section.fields {
            let input = if field.kind.is_concealed() {
                Password::new(&format!("{}:", field.title))
                    .without_confirmation()
                    .prompt()?
            } else {
                Text::new(&format!("{}:", field.title)).prompt()?
            };
            if input.is_empty() {
                continue;
            }
            field.value = field_value_from_string(&field.kind, &input)?;
        }
    }

    if content.sections.is_empty()
        && content.form_fields.is_empty()
        && type_code != FOLDER_TYPE_NAME
    {
        content.notes = Text::new("notes:").prompt()?;
    }

    let item = vault.add_item(title, type_code, &content)?;
    println!("Added '{}' ({})", item.title, item.uuid);
    Ok(())
}

pub fn types() -> Result<()> {
    for (_, item_type) in onepass_vault::all_item_types() {
        println!("{:<14}{}", item_type.short_alias, item_type.name);
    }
    Ok(())
}

pub fn remove(vault: &Vault, pattern: &str, yes: bool) -> Result<()> {
    for mut item in find_items(vault, pattern)? {
        let confirmed = yes
            || Confirm::new(&format!("Remove '{}' from the vault?", item.title))
                .with_default(false)
                .prompt()?;
        if confirmed {
            vault.remove_item(&mut item)?;
            println!("Removed '{}'", item.title);
        }
    }
    Ok(())
}

pub fn trash(vault: &Vault, pattern: &str) -> Result<()> {
    for mut item in find_items(vault, pattern)? {
        vault.trash_item(&mut item)?;
        println!("Trashed '{}'", item.title);
    }
    Ok(())
}

pub fn restore(vault: &Vault, pattern: &str) -> Result<()> {
    for mut item in find_items(vault, pattern)? {
        vault.restore_item(&mut item)?;
        println!("Restored '{}'", item.title);
    }
    Ok(())
}

pub fn rename(vault: &Vault, pattern: &str, new_title: &str) -> Result<()> {
    let mut item = find_one_item(vault, pattern)?;
    vault.rename_item(&mut item, new_title)?;
    println!("Renamed to '{new_title}'");
    Ok(())
}

pub fn tag(vault: &Vault, pattern: &str, tag: &str) -> Result<()> {
    for mut item in find_items(vault, pattern)? {
        vault.tag_item(&mut item, tag)?;
    }
    Ok(())
}

pub fn untag(vault: &Vault, pattern: &str, tag: &str) -> Result<()> {
    for mut item in find_items(vault, pattern)? {
        vault.untag_item(&mut item, tag)?;
    }
    Ok(())
}

pub fn tags(vault: &Vault) -> Result<()> {
    for tag in vault.list_tags()? {
        println!("{tag}");
    }
    Ok(())
}

pub fn move_to_folder(vault: &Vault, pattern: &str, folder: Option<&str>) -> Result<()> {
    let mut item = find_one_item(vault, pattern)?;
    let folder_uuid = match folder {
        None => String::new(),
        Some(folder) => {
            let folders = vault.list_folders()?;
            folders
                .iter()
                .find(|f| f.title == folder || f.uuid == folder)
                .map(|f| f.uuid.clone())
                .ok_or_else(|| VaultError::ItemNotFound(folder.to_owned()))?
        }
    };
    vault.move_to_folder(&mut item, &folder_uuid)?;
    Ok(())
}

pub fn folders(vault: &Vault) -> Result<()> {
    let mut folders = vault.list_folders()?;
    folders.sort_by(|a, b| a.title.cmp(&b.title));
    for folder in &folders {
        let count = vault.items_in_folder(&folder.uuid)?.len();
        println!("{} ({count})", folder.title);
    }
    Ok(())
}

pub fn field(vault: &Vault, pattern: &str, field_pattern: &str) -> Result<()> {
    let item = find_one_item(vault, pattern)?;
    let content = vault.content(&item)?;

    if let Some(field) = content.field_by_pattern(field_pattern) {
        println!("{}", field.value_string());
        return Ok(());
    }
    if let Some(form_field) = content.form_field_by_pattern(field_pattern) {
        println!("{}", form_field.value);
        return Ok(());
    }
    if let Some(url) = content.url_by_pattern(field_pattern) {
        println!("{}", url.url);
        return Ok(());
    }
    bail!("no field in '{}' matches '{field_pattern}'", item.title);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_alias_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut vault = onepass_vault::Vault::create(
            &dir.path().join("v.agilekeychain"),
            &onepass_vault::VaultSecurity {
                master_password: "pwd".to_owned(),
                iterations: 100,
            },
        )
        .unwrap();
        vault.unlock("pwd").unwrap();
        let err = add(&vault, "bogus", "Title").unwrap_err();
        assert!(err.to_string().contains("unknown item type"));
    }

    #[test]
    fn folder_moves_resolve_titles() {
        let dir = tempfile::tempdir().unwrap();
        let mut vault = onepass_vault::Vault::create(
            &dir.path().join("v.agilekeychain"),
            &onepass_vault::VaultSecurity {
                master_password: "pwd".to_owned(),
                iterations: 100,
            },
        )
        .unwrap();
        vault.unlock("pwd").unwrap();
        let folder = vault
            .add_item("Work", "system.folder.Regular", &ItemContent::default())
            .unwrap();
        vault
            .add_item("Note", "securenotes.SecureNote", &ItemContent::default())
            .unwrap();

        move_to_folder(&vault, "Note", Some("Work")).unwrap();
        assert_eq!(vault.items_in_folder(&folder.uuid).unwrap().len(), 1);

        move_to_folder(&vault, "Note", None).unwrap();
        assert_eq!(vault.items_in_folder(&folder.uuid).unwrap().len(), 0);
    }
}

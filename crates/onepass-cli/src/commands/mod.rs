pub mod items;
pub mod tools;
pub mod vault;

use color_eyre::eyre::{bail, Result};
use onepass_vault::{Item, ItemPattern, Vault};

/// Resolve a pattern to at least one live item.
pub fn find_items(vault: &Vault, pattern: &str) -> Result<Vec<Item>> {
    let items = vault.find_items(&ItemPattern::parse(pattern))?;
    if items.is_empty() {
        bail!("no items match '{pattern}'");
    }
    Ok(items)
}

/// Resolve a pattern to exactly one item.
pub fn find_one_item(vault: &Vault, pattern: &str) -> Result<Item> {
    let mut items = find_items(vault, pattern)?;
    if items.len() > 1 {
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        bail!(
            "'{pattern}' matches more than one item: {}",
            titles.join(", ")
        );
    }
    Ok(items.remove(0))
}

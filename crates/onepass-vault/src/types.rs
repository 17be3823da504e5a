//! Registry of the standard Agile Keychain item type codes.
//!
//! The set is open: items with codes outside this table are preserved as-is
//! and simply display as "Unknown".

use std::collections::HashMap;
use std::sync::LazyLock;

/// Display metadata for a standard item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemType {
    /// Human readable name, e.g. "Credit Card".
    pub name: &'static str,
    /// Short alias used in CLI arguments and search patterns, e.g. "card".
    pub short_alias: &'static str,
}

static ITEM_TYPES: LazyLock<HashMap<&'static str, ItemType>> = LazyLock::new(|| {
    HashMap::from([
        (
            "webforms.WebForm",
            ItemType {
                name: "Login",
                short_alias: "login",
            },
        ),
        (
            "wallet.financial.CreditCard",
            ItemType {
                name: "Credit Card",
                short_alias: "card",
            },
        ),
        (
            "wallet.computer.Router",
            ItemType {
                name: "Wireless Router",
                short_alias: "router",
            },
        ),
        (
            "securenotes.SecureNote",
            ItemType {
                name: "Secure Note",
                short_alias: "note",
            },
        ),
        (
            "passwords.Password",
            ItemType {
                name: "Password",
                short_alias: "pass",
            },
        ),
        (
            "wallet.onlineservices.Email.v2",
            ItemType {
                name: "Email Account",
                short_alias: "email",
            },
        ),
        (
            "system.folder.Regular",
            ItemType {
                name: "Folder",
                short_alias: "folder",
            },
        ),
        (
            "system.folder.SavedSearch",
            ItemType {
                name: "Smart Folder",
                short_alias: "smart-folder",
            },
        ),
        (
            "wallet.financial.BankAccountUS",
            ItemType {
                name: "Bank Account",
                short_alias: "bank",
            },
        ),
        (
            "wallet.computer.Database",
            ItemType {
                name: "Database",
                short_alias: "db",
            },
        ),
        (
            "wallet.government.DriversLicense",
            ItemType {
                name: "Driver's License",
                short_alias: "driver",
            },
        ),
        (
            "wallet.membership.Membership",
            ItemType {
                name: "Membership",
                short_alias: "membership",
            },
        ),
        (
            "wallet.government.HuntingLicense",
            ItemType {
                name: "Outdoor License",
                short_alias: "outdoor",
            },
        ),
        (
            "wallet.government.Passport",
            ItemType {
                name: "Passport",
                short_alias: "passport",
            },
        ),
        (
            "wallet.membership.RewardProgram",
            ItemType {
                name: "Reward Program",
                short_alias: "reward",
            },
        ),
        (
            "wallet.computer.UnixServer",
            ItemType {
                name: "Unix Server",
                short_alias: "server",
            },
        ),
        (
            "wallet.government.SsnUS",
            ItemType {
                name: "Social Security Number",
                short_alias: "social",
            },
        ),
        (
            "wallet.computer.License",
            ItemType {
                name: "Software License",
                short_alias: "software",
            },
        ),
        (
            "identities.Identity",
            ItemType {
                name: "Identity",
                short_alias: "id",
            },
        ),
        // internal type for items removed from the trash
        (
            "system.Tombstone",
            ItemType {
                name: "Tombstone",
                short_alias: "tombstone",
            },
        ),
    ])
});

/// Look up a standard type by its full code.
pub fn item_type(code: &str) -> Option<&'static ItemType> {
    ITEM_TYPES.get(code)
}

/// All standard types as `(code, type)` pairs, ordered by short alias.
pub fn all_item_types() -> Vec<(&'static str, &'static ItemType)> {
    let mut types: Vec<_> = ITEM_TYPES.iter().map(|(code, t)| (*code, t)).collect();
    types.sort_by_key(|(_, t)| t.short_alias);
    types
}

/// Resolve a short alias (`login`, `card`, ...) back to its type code.
pub fn type_code_for_alias(alias: &str) -> Option<&'static str> {
    ITEM_TYPES
        .iter()
        .find(|(_, t)| t.short_alias == alias)
        .map(|(code, _)| *code)
}

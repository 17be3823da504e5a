//! End-to-end tests of the vault lifecycle over scratch directories.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use onepass_vault::{
    FieldKind, FieldValue, Item, ItemAddress, ItemContent, ItemField, ItemPattern, ItemSection,
    ItemUrl, Vault, VaultError, VaultSecurity, WebFormField,
};

const MASTER_PWD: &str = "test-pwd";

fn new_vault(dir: &Path) -> (Vault, PathBuf) {
    let path = dir.join("vault.agilekeychain");
    let security = VaultSecurity {
        master_password: MASTER_PWD.to_owned(),
        iterations: 100,
    };
    let mut vault = Vault::create(&path, &security).unwrap();
    vault.unlock(MASTER_PWD).unwrap();
    (vault, path)
}

fn note_content(text: &str) -> ItemContent {
    ItemContent {
        notes: text.to_owned(),
        ..ItemContent::default()
    }
}

#[test]
fn create_add_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, path) = new_vault(dir.path());

    let item = vault
        .add_item("Test Item", "securenotes.SecureNote", &note_content("hello"))
        .unwrap();
    assert!(item.created_at > 0);
    assert!(item.created_at <= item.updated_at);

    // a freshly opened handle sees the same data after its own unlock
    let mut reopened = Vault::open(&path).unwrap();
    assert!(reopened.is_locked());
    reopened.unlock(MASTER_PWD).unwrap();
    let loaded = reopened.load_item(&item.uuid).unwrap();
    assert_eq!(loaded.title, "Test Item");
    assert_eq!(reopened.content(&loaded).unwrap().notes, "hello");
}

#[test]
fn wrong_password_leaves_the_vault_locked() {
    let dir = tempfile::tempdir().unwrap();
    let (_, path) = new_vault(dir.path());

    let mut vault = Vault::open(&path).unwrap();
    assert!(matches!(
        vault.unlock("wrong"),
        Err(VaultError::BadMasterPassword)
    ));
    assert!(vault.is_locked());
}

#[test]
fn master_password_change_preserves_content() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, path) = new_vault(dir.path());
    let item = vault
        .add_item("Note", "securenotes.SecureNote", &note_content("hello"))
        .unwrap();

    vault.set_master_password(MASTER_PWD, "new-pwd").unwrap();

    let mut reopened = Vault::open(&path).unwrap();
    assert!(matches!(
        reopened.unlock(MASTER_PWD),
        Err(VaultError::BadMasterPassword)
    ));
    reopened.unlock("new-pwd").unwrap();
    let loaded = reopened.load_item(&item.uuid).unwrap();
    assert_eq!(reopened.content(&loaded).unwrap().notes, "hello");
}

#[test]
fn trash_restore_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, _) = new_vault(dir.path());
    let mut item = vault
        .add_item("Disposable", "securenotes.SecureNote", &note_content("x"))
        .unwrap();

    vault.trash_item(&mut item).unwrap();
    let listed = vault.list_items().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].trashed);

    vault.restore_item(&mut item).unwrap();
    let listed = vault.list_items().unwrap();
    assert!(!listed[0].trashed);

    vault.remove_item(&mut item).unwrap();
    assert!(vault.list_items().unwrap().is_empty());

    // the tombstone is still there under the same UUID
    let tombstone = vault.load_item(&item.uuid).unwrap();
    assert_eq!(tombstone.type_name, "system.Tombstone");
    assert_eq!(tombstone.title, "Unnamed");
    assert!(tombstone.trashed);
}

#[test]
fn website_url_mirrors_into_location() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, _) = new_vault(dir.path());

    let content = ItemContent {
        urls: vec![ItemUrl {
            label: "website".to_owned(),
            url: "https://example.com".to_owned(),
        }],
        ..ItemContent::default()
    };
    let item = vault
        .add_item("Example", "webforms.WebForm", &content)
        .unwrap();
    assert_eq!(item.location, "https://example.com");

    // a content without a website entry leaves location untouched
    let mut item = item;
    vault.set_content(&mut item, &note_content("no urls")).unwrap();
    assert_eq!(item.location, "https://example.com");
}

#[test]
fn typed_content_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, _) = new_vault(dir.path());

    let content = ItemContent {
        sections: vec![ItemSection {
            name: "details".to_owned(),
            title: "Details".to_owned(),
            fields: vec![
                ItemField {
                    kind: FieldKind::Date,
                    name: "issued".to_owned(),
                    title: "Issued".to_owned(),
                    value: FieldValue::Number(1_384_905_600),
                },
                ItemField {
                    kind: FieldKind::MonthYear,
                    name: "expiry".to_owned(),
                    title: "Expires".to_owned(),
                    value: FieldValue::Number(202_311),
                },
                ItemField {
                    kind: FieldKind::Address,
                    name: "addr".to_owned(),
                    title: "Address".to_owned(),
                    value: FieldValue::Address(ItemAddress {
                        street: "1 Main St".to_owned(),
                        city: "Springfield".to_owned(),
                        ..ItemAddress::default()
                    }),
                },
                ItemField {
                    kind: FieldKind::Concealed,
                    name: "pin".to_owned(),
                    title: "PIN".to_owned(),
                    value: FieldValue::Text("0000".to_owned()),
                },
            ],
        }],
        form_fields: vec![WebFormField {
            value: "jsmith".to_owned(),
            id: "user-field".to_owned(),
            name: "username".to_owned(),
            r#type: "T".to_owned(),
            designation: "username".to_owned(),
        }],
        notes: "some notes".to_owned(),
        ..ItemContent::default()
    };

    let item = vault
        .add_item("Typed", "wallet.government.Passport", &content)
        .unwrap();
    assert_eq!(vault.content(&item).unwrap(), content);
}

#[test]
fn saving_twice_changes_only_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, path) = new_vault(dir.path());
    let mut item = vault
        .add_item("Stable", "securenotes.SecureNote", &note_content("x"))
        .unwrap();

    let file = path
        .join("data/default")
        .join(format!("{}.1password", item.uuid));
    let first: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&file).unwrap()).unwrap();

    vault.save_item(&mut item).unwrap();
    let second: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&file).unwrap()).unwrap();

    let strip = |mut v: serde_json::Value| {
        v.as_object_mut().unwrap().remove("updatedAt");
        v
    };
    assert_eq!(strip(first), strip(second));
}

#[test]
fn index_and_files_stay_bijective() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, path) = new_vault(dir.path());

    let mut a = vault
        .add_item("A", "securenotes.SecureNote", &note_content("a"))
        .unwrap();
    let mut b = vault
        .add_item("B", "webforms.WebForm", &note_content("b"))
        .unwrap();
    vault.trash_item(&mut a).unwrap();
    vault.restore_item(&mut a).unwrap();
    vault.save_item(&mut b).unwrap();
    vault.remove_item(&mut b).unwrap();

    let data_dir = path.join("data/default");
    let index: Vec<serde_json::Value> =
        serde_json::from_slice(&std::fs::read(data_dir.join("contents.js")).unwrap()).unwrap();
    let index_uuids: BTreeSet<String> = index
        .iter()
        .map(|row| row[0].as_str().unwrap().to_owned())
        .collect();

    let file_uuids: BTreeSet<String> = std::fs::read_dir(&data_dir)
        .unwrap()
        .filter_map(|entry| {
            let path = entry.unwrap().path();
            (path.extension()?.to_str()? == "1password")
                .then(|| path.file_stem().unwrap().to_str().unwrap().to_owned())
        })
        .collect();

    assert_eq!(index_uuids, file_uuids);
    assert_eq!(index_uuids.len(), 2);
}

#[test]
fn list_items_hides_tombstones() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, _) = new_vault(dir.path());

    let _keep = vault
        .add_item("Keep", "securenotes.SecureNote", &note_content("k"))
        .unwrap();
    let mut gone = vault
        .add_item("Gone", "securenotes.SecureNote", &note_content("g"))
        .unwrap();
    vault.remove_item(&mut gone).unwrap();

    let titles: Vec<String> = vault
        .list_items()
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["Keep"]);
}

#[test]
fn tags_accumulate_and_aggregate() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, _) = new_vault(dir.path());

    let mut a = vault
        .add_item("A", "securenotes.SecureNote", &note_content("a"))
        .unwrap();
    let mut b = vault
        .add_item("B", "securenotes.SecureNote", &note_content("b"))
        .unwrap();

    vault.tag_item(&mut a, "work").unwrap();
    vault.tag_item(&mut a, "banking").unwrap();
    vault.tag_item(&mut a, "work").unwrap();
    vault.tag_item(&mut b, "work").unwrap();

    assert_eq!(vault.list_tags().unwrap(), vec!["banking", "work"]);

    vault.untag_item(&mut a, "banking").unwrap();
    assert_eq!(vault.list_tags().unwrap(), vec!["work"]);

    let reloaded = vault.load_item(&a.uuid).unwrap();
    assert_eq!(reloaded.open_contents.tags, vec!["work"]);
}

#[test]
fn folders_group_items() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, _) = new_vault(dir.path());

    let folder = vault
        .add_item("Personal", "system.folder.Regular", &ItemContent::default())
        .unwrap();
    let mut note = vault
        .add_item("Inside", "securenotes.SecureNote", &note_content("i"))
        .unwrap();
    let _outside = vault
        .add_item("Outside", "securenotes.SecureNote", &note_content("o"))
        .unwrap();

    vault.move_to_folder(&mut note, &folder.uuid).unwrap();

    let folders = vault.list_folders().unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].title, "Personal");

    let inside = vault.items_in_folder(&folder.uuid).unwrap();
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].title, "Inside");
}

#[test]
fn rename_persists() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, _) = new_vault(dir.path());
    let mut item = vault
        .add_item("Old Name", "securenotes.SecureNote", &note_content("n"))
        .unwrap();
    vault.rename_item(&mut item, "New Name").unwrap();
    assert_eq!(vault.load_item(&item.uuid).unwrap().title, "New Name");
}

#[test]
fn find_items_by_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, _) = new_vault(dir.path());
    let login = vault
        .add_item("GitHub", "webforms.WebForm", &note_content(""))
        .unwrap();
    let _note = vault
        .add_item("GitHub backup codes", "securenotes.SecureNote", &note_content(""))
        .unwrap();

    assert_eq!(
        vault.find_items(&ItemPattern::parse("github")).unwrap().len(),
        2
    );
    let only_logins = vault.find_items(&ItemPattern::parse("login:github")).unwrap();
    assert_eq!(only_logins.len(), 1);
    assert_eq!(only_logins[0].uuid, login.uuid);

    let by_uuid = vault
        .find_items(&ItemPattern::parse(&login.uuid[..6].to_lowercase()))
        .unwrap();
    assert_eq!(by_uuid.len(), 1);
}

#[test]
fn saving_without_content_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, _) = new_vault(dir.path());
    let mut empty = Item::new("No Content", "securenotes.SecureNote", "SL5");
    assert!(matches!(
        vault.save_item(&mut empty),
        Err(VaultError::ItemContentMissing)
    ));
}

#[test]
fn load_item_reports_missing_uuids() {
    let dir = tempfile::tempdir().unwrap();
    let (vault, _) = new_vault(dir.path());
    assert!(matches!(
        vault.load_item("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF"),
        Err(VaultError::ItemNotFound(_))
    ));
}

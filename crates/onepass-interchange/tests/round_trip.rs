use std::path::Path;

use onepass_interchange::{export_items, import_into, import_items};
use onepass_vault::{ItemContent, ItemUrl, Vault, VaultSecurity, WebFormField};

const MASTER_PWD: &str = "test-pwd";

fn new_vault(path: &Path) -> Vault {
    let mut vault = Vault::create(
        &path.join("vault.agilekeychain"),
        &VaultSecurity {
            master_password: MASTER_PWD.to_owned(),
            iterations: 100,
        },
    )
    .unwrap();
    vault.unlock(MASTER_PWD).unwrap();
    vault
}

fn login_content(username: &str, url: &str) -> ItemContent {
    ItemContent {
        form_fields: vec![WebFormField {
            value: username.to_owned(),
            name: "username".to_owned(),
            r#type: "T".to_owned(),
            designation: "username".to_owned(),
            ..WebFormField::default()
        }],
        urls: vec![ItemUrl {
            label: "website".to_owned(),
            url: url.to_owned(),
        }],
        ..ItemContent::default()
    }
}

#[test]
fn export_strips_the_encrypted_blob() {
    let src_dir = tempfile::tempdir().unwrap();
    let vault = new_vault(src_dir.path());
    let item = vault
        .add_item("Login A", "webforms.WebForm", &login_content("a", "https://a.example"))
        .unwrap();

    let bundle = src_dir.path().join("export.1pif");
    export_items(&vault, &[item], &bundle).unwrap();

    let data = std::fs::read_to_string(bundle.join("data.1pif")).unwrap();
    assert!(!data.contains("\"encrypted\""));
    assert!(data.contains("\"secureContents\""));
    // one record, one separator line
    assert_eq!(data.matches("***").count(), 2);
}

#[test]
fn three_items_survive_an_export_import_cycle() {
    let src_dir = tempfile::tempdir().unwrap();
    let vault = new_vault(src_dir.path());

    let names = ["Login A", "Login B", "Login C"];
    let mut items = Vec::new();
    for (i, name) in names.iter().enumerate() {
        items.push(
            vault
                .add_item(
                    name,
                    "webforms.WebForm",
                    &login_content(&format!("user-{i}"), "https://example.com"),
                )
                .unwrap(),
        );
    }

    let bundle = src_dir.path().join("export.1pif");
    export_items(&vault, &items, &bundle).unwrap();

    let parsed = import_items(&bundle).unwrap();
    assert_eq!(parsed.len(), 3);

    let dst_dir = tempfile::tempdir().unwrap();
    let dst = new_vault(dst_dir.path());
    let added = import_into(&dst, &bundle).unwrap();
    assert_eq!(added.len(), 3);

    let mut titles: Vec<String> = dst
        .list_items()
        .unwrap()
        .into_iter()
        .map(|item| item.title)
        .collect();
    titles.sort();
    assert_eq!(titles, names);

    for (i, item) in added.iter().enumerate() {
        let content = dst.content(item).unwrap();
        assert_eq!(content.form_fields[0].value, format!("user-{i}"));
        assert_eq!(content.website(), Some("https://example.com"));
        // imported items get fresh ids in the destination vault
        assert!(items.iter().all(|src| src.uuid != item.uuid));
    }
}

#[test]
fn a_bundle_directory_or_its_data_file_both_import() {
    let src_dir = tempfile::tempdir().unwrap();
    let vault = new_vault(src_dir.path());
    let item = vault
        .add_item("Only", "webforms.WebForm", &login_content("u", "https://x.example"))
        .unwrap();

    let bundle = src_dir.path().join("export.1pif");
    export_items(&vault, &[item], &bundle).unwrap();

    assert_eq!(import_items(&bundle).unwrap().len(), 1);
    assert_eq!(import_items(&bundle.join("data.1pif")).unwrap().len(), 1);
}

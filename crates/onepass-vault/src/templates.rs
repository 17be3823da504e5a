//! Skeleton contents for newly added items of the standard types. Each
//! template carries the sections, fields and URL slots a fresh item of that
//! type should offer, with empty values for the caller to fill in.

use crate::content::{
    FieldKind, FieldValue, ItemContent, ItemField, ItemSection, ItemUrl, WebFormField,
    WEBSITE_URL_LABEL,
};

/// Return the content skeleton for a standard item type, or `None` for types
/// without a template (including tombstones and folders).
pub fn standard_template(type_name: &str) -> Option<ItemContent> {
    let template = match type_name {
        "webforms.WebForm" => ItemContent {
            form_fields: vec![
                form_field("username", "T", "username"),
                form_field("password", "P", "password"),
            ],
            urls: vec![ItemUrl {
                label: WEBSITE_URL_LABEL.to_owned(),
                url: String::new(),
            }],
            ..ItemContent::default()
        },
        "securenotes.SecureNote" => ItemContent::default(),
        "passwords.Password" => ItemContent {
            sections: vec![section(
                "",
                "",
                vec![field(FieldKind::Concealed, "password", "password")],
            )],
            ..ItemContent::default()
        },
        "wallet.financial.CreditCard" => ItemContent {
            sections: vec![section(
                "details",
                "Card Details",
                vec![
                    field(FieldKind::String, "cardholder", "cardholder name"),
                    field(FieldKind::CcType, "type", "type"),
                    field(FieldKind::String, "ccnum", "number"),
                    field(FieldKind::Concealed, "cvv", "verification number"),
                    field(FieldKind::MonthYear, "expiry", "expiry date"),
                ],
            )],
            ..ItemContent::default()
        },
        "wallet.computer.Router" => ItemContent {
            sections: vec![section(
                "",
                "",
                vec![
                    field(FieldKind::String, "name", "base station name"),
                    field(FieldKind::Concealed, "password", "base station password"),
                    field(FieldKind::String, "network_name", "network name"),
                    field(FieldKind::Menu, "wireless_security", "wireless security"),
                    field(FieldKind::Concealed, "wireless_password", "wireless network password"),
                ],
            )],
            ..ItemContent::default()
        },
        "wallet.onlineservices.Email.v2" => ItemContent {
            sections: vec![
                section(
                    "pop",
                    "Incoming Mail Server",
                    vec![
                        field(FieldKind::String, "pop_username", "username"),
                        field(FieldKind::String, "pop_server", "server"),
                        field(FieldKind::Concealed, "pop_password", "password"),
                    ],
                ),
                section(
                    "smtp",
                    "Outgoing Mail Server",
                    vec![
                        field(FieldKind::String, "smtp_server", "SMTP server"),
                        field(FieldKind::String, "smtp_username", "username"),
                        field(FieldKind::Concealed, "smtp_password", "password"),
                    ],
                ),
            ],
            ..ItemContent::default()
        },
        "wallet.financial.BankAccountUS" => ItemContent {
            sections: vec![section(
                "",
                "",
                vec![
                    field(FieldKind::String, "bankName", "bank name"),
                    field(FieldKind::String, "owner", "name on account"),
                    field(FieldKind::Menu, "accountType", "type"),
                    field(FieldKind::String, "routingNo", "routing number"),
                    field(FieldKind::String, "accountNo", "account number"),
                    field(FieldKind::Concealed, "telephonePin", "PIN"),
                ],
            )],
            ..ItemContent::default()
        },
        "wallet.computer.Database" => ItemContent {
            sections: vec![section(
                "",
                "",
                vec![
                    field(FieldKind::Menu, "database_type", "type"),
                    field(FieldKind::String, "hostname", "server"),
                    field(FieldKind::String, "port", "port"),
                    field(FieldKind::String, "database", "database"),
                    field(FieldKind::String, "username", "username"),
                    field(FieldKind::Concealed, "password", "password"),
                ],
            )],
            ..ItemContent::default()
        },
        "wallet.computer.UnixServer" => ItemContent {
            sections: vec![section(
                "",
                "",
                vec![
                    field(FieldKind::Url, "url", "URL"),
                    field(FieldKind::String, "username", "username"),
                    field(FieldKind::Concealed, "password", "password"),
                ],
            )],
            ..ItemContent::default()
        },
        "identities.Identity" => ItemContent {
            sections: vec![
                section(
                    "name",
                    "Identification",
                    vec![
                        field(FieldKind::String, "firstname", "first name"),
                        field(FieldKind::String, "lastname", "last name"),
                        field(FieldKind::Date, "birthdate", "birth date"),
                        field(FieldKind::Gender, "sex", "sex"),
                    ],
                ),
                section(
                    "address",
                    "Address",
                    vec![
                        field(FieldKind::Address, "address", "address"),
                        field(FieldKind::Phone, "defphone", "default phone"),
                    ],
                ),
                section(
                    "internet",
                    "Internet Details",
                    vec![field(FieldKind::Email, "email", "email")],
                ),
            ],
            ..ItemContent::default()
        },
        _ => return None,
    };
    Some(template)
}

fn section(name: &str, title: &str, fields: Vec<ItemField>) -> ItemSection {
    ItemSection {
        name: name.to_owned(),
        title: title.to_owned(),
        fields,
    }
}

fn field(kind: FieldKind, name: &str, title: &str) -> ItemField {
    ItemField {
        kind,
        name: name.to_owned(),
        title: title.to_owned(),
        value: FieldValue::Empty,
    }
}

fn form_field(name: &str, input_type: &str, designation: &str) -> WebFormField {
    WebFormField {
        name: name.to_owned(),
        r#type: input_type.to_owned(),
        designation: designation.to_owned(),
        ..WebFormField::default()
    }
}

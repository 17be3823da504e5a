//! Decrypted item content: named sections of typed fields, web-form fields,
//! URLs and free-form notes. This is the JSON structure inside an item's
//! `encrypted` envelope.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::VaultError;

/// URL label that mirrors into `Item::location` (see the save path).
pub const WEBSITE_URL_LABEL: &str = "website";

/// Decrypted contents of an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemContent {
    pub sections: Vec<ItemSection>,

    #[serde(rename = "URLs")]
    pub urls: Vec<ItemUrl>,

    #[serde(rename = "notesPlain")]
    pub notes: String,

    /// Saved web-form inputs; only used by login-type items.
    #[serde(rename = "fields")]
    pub form_fields: Vec<WebFormField>,

    #[serde(rename = "htmlMethod")]
    pub html_method: String,

    #[serde(rename = "htmlAction")]
    pub html_action: String,

    #[serde(rename = "htmlID", skip_serializing_if = "String::is_empty")]
    pub html_id: String,
}

/// A titled group of fields within an item's contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemSection {
    /// Internal name of the section.
    pub name: String,
    /// User-visible title.
    pub title: String,
    pub fields: Vec<ItemField>,
}

/// A single typed field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemField {
    pub kind: FieldKind,
    /// Internal name of the field.
    pub name: String,
    /// User-visible title.
    pub title: String,
    pub value: FieldValue,
}

/// The set of field content types used by the format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldKind {
    #[default]
    String,
    Email,
    Url,
    Date,
    MonthYear,
    Address,
    CcType,
    Phone,
    Gender,
    Menu,
    Concealed,
    /// Kind codes outside the standard set round-trip untouched.
    Other(String),
}

impl FieldKind {
    pub fn from_code(code: &str) -> FieldKind {
        match code {
            "string" => FieldKind::String,
            "email" => FieldKind::Email,
            "URL" => FieldKind::Url,
            "date" => FieldKind::Date,
            "monthYear" => FieldKind::MonthYear,
            "address" => FieldKind::Address,
            "cctype" => FieldKind::CcType,
            "phone" => FieldKind::Phone,
            "gender" => FieldKind::Gender,
            "menu" => FieldKind::Menu,
            "concealed" => FieldKind::Concealed,
            other => FieldKind::Other(other.to_owned()),
        }
    }

    pub fn as_code(&self) -> &str {
        match self {
            FieldKind::String => "string",
            FieldKind::Email => "email",
            FieldKind::Url => "URL",
            FieldKind::Date => "date",
            FieldKind::MonthYear => "monthYear",
            FieldKind::Address => "address",
            FieldKind::CcType => "cctype",
            FieldKind::Phone => "phone",
            FieldKind::Gender => "gender",
            FieldKind::Menu => "menu",
            FieldKind::Concealed => "concealed",
            FieldKind::Other(code) => code,
        }
    }

    /// Whether the field holds a secret (not shown in plain listings).
    pub fn is_concealed(&self) -> bool {
        matches!(self, FieldKind::Concealed)
    }
}

/// A field's value, mirroring the scalar-or-record wire forms: text for most
/// kinds, an integer for `date` (Unix seconds) and `monthYear` (`YYYYMM`),
/// and a sub-record for `address`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Number(i64),
    Address(ItemAddress),
}

impl FieldValue {
    fn from_wire(value: Option<Value>) -> FieldValue {
        match value {
            None | Some(Value::Null) => FieldValue::Empty,
            Some(Value::String(s)) => FieldValue::Text(s),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Empty),
            Some(Value::Object(map)) => {
                match serde_json::from_value(Value::Object(map.clone())) {
                    Ok(addr) => FieldValue::Address(addr),
                    Err(_) => FieldValue::Text(Value::Object(map).to_string()),
                }
            }
            Some(other) => FieldValue::Text(other.to_string()),
        }
    }

    fn to_wire(&self) -> Option<Value> {
        match self {
            FieldValue::Empty => None,
            FieldValue::Text(s) => Some(Value::String(s.clone())),
            FieldValue::Number(n) => Some(Value::from(*n)),
            FieldValue::Address(addr) => serde_json::to_value(addr).ok(),
        }
    }
}

/// The sub-record of an `address` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemAddress {
    pub street: String,
    pub country: String,
    pub city: String,
    pub zip: String,
    pub state: String,
}

/// Stored value for one input of a saved web form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebFormField {
    pub value: String,

    /// `id` attribute of the `<input>` element.
    pub id: String,

    /// `name` attribute of the `<input>` element.
    pub name: String,

    /// Single char code for the input type: (T)ext, (P)assword, (E)mail,
    /// (C)heckbox, (I)nput.
    pub r#type: String,

    /// Purpose of the field; the interesting values are `username` and
    /// `password`.
    pub designation: String,
}

/// Entry in the websites list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemUrl {
    pub label: String,
    pub url: String,
}

#[derive(Serialize, Deserialize)]
struct WireField {
    #[serde(default)]
    k: String,
    #[serde(default)]
    n: String,
    #[serde(default)]
    t: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    v: Option<Value>,
}

impl Serialize for ItemField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireField {
            k: self.kind.as_code().to_owned(),
            n: self.name.clone(),
            t: self.title.clone(),
            v: self.value.to_wire(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ItemField {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<ItemField, D::Error> {
        let wire = WireField::deserialize(deserializer)?;
        Ok(ItemField {
            kind: FieldKind::from_code(&wire.k),
            name: wire.n,
            title: wire.t,
            value: FieldValue::from_wire(wire.v),
        })
    }
}

impl ItemField {
    /// Render the value for display, decoding dates and month/year integers
    /// and flattening addresses onto one line.
    pub fn value_string(&self) -> String {
        match (&self.kind, &self.value) {
            (_, FieldValue::Empty) => String::new(),
            (FieldKind::Date, FieldValue::Number(secs)) => DateTime::from_timestamp(*secs, 0)
                .map(|d| d.format("%d/%m/%y").to_string())
                .unwrap_or_else(|| secs.to_string()),
            (FieldKind::MonthYear, FieldValue::Number(packed)) => {
                let month = packed % 100;
                let year = packed / 100;
                format!("{month:02}/{year:04}")
            }
            (_, FieldValue::Address(addr)) => format!(
                "Street: {}, City: {}, Zip: {}, State: {}, Country: {}",
                addr.street, addr.city, addr.zip, addr.state, addr.country
            ),
            (_, FieldValue::Text(s)) => s.clone(),
            (_, FieldValue::Number(n)) => n.to_string(),
        }
    }
}

/// Parse user input into a field value for the given kind: `DD/MM/YY` for
/// dates, `MM/YY` for month/year fields, pass-through text otherwise.
/// (Address fields are collected by the interactive prompt instead.)
pub fn field_value_from_string(kind: &FieldKind, input: &str) -> Result<FieldValue, VaultError> {
    match kind {
        FieldKind::Date => {
            let date = NaiveDate::parse_from_str(input, "%d/%m/%y").map_err(|_| {
                VaultError::InvalidFieldValue {
                    kind: kind.as_code().to_owned(),
                    message: format!("{input} is not in the format DD/MM/YY"),
                }
            })?;
            let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
                VaultError::InvalidFieldValue {
                    kind: kind.as_code().to_owned(),
                    message: format!("{input} is out of range"),
                }
            })?;
            Ok(FieldValue::Number(midnight.and_utc().timestamp()))
        }
        FieldKind::MonthYear => {
            let parsed = input
                .split_once('/')
                .and_then(|(m, y)| Some((m.parse::<i64>().ok()?, y.parse::<i64>().ok()?)))
                .filter(|(month, year)| (1..=12).contains(month) && (0..=99).contains(year));
            let Some((month, year)) = parsed else {
                return Err(VaultError::InvalidFieldValue {
                    kind: kind.as_code().to_owned(),
                    message: format!("{input} is not in the format MM/YY"),
                });
            };
            // two-digit years pivot the same way chrono's %y does
            let year = if year < 69 { 2000 + year } else { 1900 + year };
            Ok(FieldValue::Number(year * 100 + month))
        }
        _ => Ok(FieldValue::Text(input.to_owned())),
    }
}

impl ItemContent {
    /// Find the first section field whose name or title contains `pattern`,
    /// ignoring case.
    pub fn field_by_pattern(&self, pattern: &str) -> Option<&ItemField> {
        let pattern = pattern.to_lowercase();
        self.sections.iter().flat_map(|s| s.fields.iter()).find(|f| {
            f.name.to_lowercase().contains(&pattern) || f.title.to_lowercase().contains(&pattern)
        })
    }

    /// Find the first web-form field whose name or designation contains
    /// `pattern`, ignoring case.
    pub fn form_field_by_pattern(&self, pattern: &str) -> Option<&WebFormField> {
        let pattern = pattern.to_lowercase();
        self.form_fields.iter().find(|f| {
            f.name.to_lowercase().contains(&pattern)
                || f.designation.to_lowercase().contains(&pattern)
        })
    }

    /// Find the first URL whose label contains `pattern`, ignoring case.
    pub fn url_by_pattern(&self, pattern: &str) -> Option<&ItemUrl> {
        let pattern = pattern.to_lowercase();
        self.urls
            .iter()
            .find(|u| u.label.to_lowercase().contains(&pattern))
    }

    /// The URL labelled `website`, if any.
    pub fn website(&self) -> Option<&str> {
        self.urls
            .iter()
            .find(|u| u.label == WEBSITE_URL_LABEL)
            .map(|u| u.url.as_str())
    }
}

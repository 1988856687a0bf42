use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// One contact data row as supplied by a row source.
///
/// A contact with several phone numbers shows up as several rows sharing the
/// same `contact_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRow {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub contact_id: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub display_name: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub photo_thumb_uri: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub data1: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub data2: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub data3: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub lookup: String,
    #[serde(default, rename = "_id", deserialize_with = "deserialize_row_id")]
    pub row_id: i64,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub sort_key: String,
}

impl ContactRow {
    /// Builds a row column by column. Absent columns and null values become
    /// empty strings (or `0` for `_id`); this never fails.
    pub fn from_fields<F>(mut fetch: F) -> Self
    where
        F: FnMut(ContactColumn) -> Option<FieldValue>,
    {
        let mut text = |column| {
            fetch(column)
                .map(FieldValue::into_text)
                .unwrap_or_default()
        };
        let contact_id = text(ContactColumn::ContactId);
        let display_name = text(ContactColumn::DisplayName);
        let photo_thumb_uri = text(ContactColumn::PhotoThumbUri);
        let data1 = text(ContactColumn::Data1);
        let data2 = text(ContactColumn::Data2);
        let data3 = text(ContactColumn::Data3);
        let lookup = text(ContactColumn::Lookup);
        let sort_key = text(ContactColumn::SortKey);
        let row_id = fetch(ContactColumn::RowId)
            .map(|value| value.as_integer())
            .unwrap_or_default();

        Self {
            contact_id,
            display_name,
            photo_thumb_uri,
            data1,
            data2,
            data3,
            lookup,
            row_id,
            sort_key,
        }
    }

    pub fn field(&self, column: ContactColumn) -> Cow<'_, str> {
        match column {
            ContactColumn::ContactId => Cow::Borrowed(&self.contact_id),
            ContactColumn::DisplayName => Cow::Borrowed(&self.display_name),
            ContactColumn::PhotoThumbUri => Cow::Borrowed(&self.photo_thumb_uri),
            ContactColumn::Data1 => Cow::Borrowed(&self.data1),
            ContactColumn::Data2 => Cow::Borrowed(&self.data2),
            ContactColumn::Data3 => Cow::Borrowed(&self.data3),
            ContactColumn::Lookup => Cow::Borrowed(&self.lookup),
            ContactColumn::RowId => Cow::Owned(self.row_id.to_string()),
            ContactColumn::SortKey => Cow::Borrowed(&self.sort_key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactColumn {
    ContactId,
    DisplayName,
    PhotoThumbUri,
    Data1,
    Data2,
    Data3,
    Lookup,
    RowId,
    SortKey,
}

impl ContactColumn {
    pub const ALL: [ContactColumn; 9] = [
        ContactColumn::ContactId,
        ContactColumn::DisplayName,
        ContactColumn::PhotoThumbUri,
        ContactColumn::Data1,
        ContactColumn::Data2,
        ContactColumn::Data3,
        ContactColumn::Lookup,
        ContactColumn::RowId,
        ContactColumn::SortKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactColumn::ContactId => "contact_id",
            ContactColumn::DisplayName => "display_name",
            ContactColumn::PhotoThumbUri => "photo_thumb_uri",
            ContactColumn::Data1 => "data1",
            ContactColumn::Data2 => "data2",
            ContactColumn::Data3 => "data3",
            ContactColumn::Lookup => "lookup",
            ContactColumn::RowId => "_id",
            ContactColumn::SortKey => "sort_key",
        }
    }
}

impl fmt::Display for ContactColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactColumn {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase();
        ContactColumn::ALL
            .into_iter()
            .find(|column| column.as_str() == normalized)
            .ok_or_else(|| format!("Unknown column: {normalized}"))
    }
}

/// A typed cell value as read from a row source.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl FieldValue {
    pub fn into_text(self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Integer(value) => value.to_string(),
            FieldValue::Real(value) => value.to_string(),
            FieldValue::Text(value) => value,
            FieldValue::Blob(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Unparsable text and blobs read as `0`.
    pub fn as_integer(&self) -> i64 {
        match self {
            FieldValue::Integer(value) => *value,
            FieldValue::Real(value) => *value as i64,
            FieldValue::Text(value) => value.trim().parse().unwrap_or_default(),
            FieldValue::Null | FieldValue::Blob(_) => 0,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Supplies an ordered batch of contact rows. `Ok(None)` means the source has
/// nothing to offer, which consumers treat the same as an empty batch.
pub trait RowSource {
    type Error;

    fn fetch_rows(&self) -> Result<Option<Vec<ContactRow>>, Self::Error>;
}

impl RowSource for [ContactRow] {
    type Error = Infallible;

    fn fetch_rows(&self) -> Result<Option<Vec<ContactRow>>, Self::Error> {
        Ok(Some(self.to_vec()))
    }
}

impl RowSource for Vec<ContactRow> {
    type Error = Infallible;

    fn fetch_rows(&self) -> Result<Option<Vec<ContactRow>>, Self::Error> {
        self.as_slice().fetch_rows()
    }
}

impl<S: RowSource + ?Sized> RowSource for &S {
    type Error = S::Error;

    fn fetch_rows(&self) -> Result<Option<Vec<ContactRow>>, Self::Error> {
        (**self).fetch_rows()
    }
}

/// Accept a string, number, bool or null for a text column.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    Ok(match val {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

fn deserialize_row_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    let value = match val {
        Value::Number(n) => FieldValue::Integer(
            n.as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or_default(),
        ),
        Value::String(s) => FieldValue::Text(s),
        _ => FieldValue::Null,
    };
    Ok(value.as_integer())
}

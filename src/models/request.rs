//! Request bodies for the write handlers.
//!
//! Bodies are read leniently: field names match case-insensitively with the
//! last occurrence winning, missing fields take their defaults, text fields
//! accept numbers, and integer fields accept numeric strings. Validation runs
//! afterwards, one field at a time in a fixed order.

use crate::db::Param;
use crate::error::{AppError, Result};
use serde::de::{DeserializeOwned, Deserializer, Error as _, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// A JSON request body with a fixed set of fields.
pub trait RequestBody: DeserializeOwned {
    /// Field names as serialized, used to resolve keys regardless of case.
    const FIELDS: &'static [&'static str];
}

/// Body of `POST /createasset`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateAssetRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub asset_name: String,

    #[serde(deserialize_with = "lenient_i32")]
    pub level_require: i32,
}

impl RequestBody for CreateAssetRequest {
    const FIELDS: &'static [&'static str] = &["AssetName", "LevelRequire"];
}

impl CreateAssetRequest {
    /// Checks required fields, stopping at the first failure.
    pub fn validate(&self) -> Result<()> {
        require_text("AssetName", &self.asset_name)?;
        if self.level_require < 0 {
            return Err(AppError::bad_request("LevelRequire must be at least 0"));
        }
        Ok(())
    }

    /// Parameters for `sp_CreateAsset`, in declared order.
    pub fn params(&self) -> Vec<Param> {
        vec![
            Param::new("p_AssetName", self.asset_name.as_str()),
            Param::new("p_LevelRequire", self.level_require),
        ]
    }
}

/// Body of `POST /registerplayer`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RegisterPlayerRequest {
    #[serde(deserialize_with = "lenient_string")]
    pub player_name: String,

    #[serde(deserialize_with = "lenient_string")]
    pub full_name: String,

    #[serde(deserialize_with = "lenient_string")]
    pub age: String,

    #[serde(deserialize_with = "lenient_i32")]
    pub level: i32,

    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
}

impl Default for RegisterPlayerRequest {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            full_name: String::new(),
            age: String::new(),
            level: 1,
            email: String::new(),
        }
    }
}

impl RequestBody for RegisterPlayerRequest {
    const FIELDS: &'static [&'static str] = &["PlayerName", "FullName", "Age", "Level", "Email"];
}

impl RegisterPlayerRequest {
    /// Checks required fields, stopping at the first failure.
    pub fn validate(&self) -> Result<()> {
        require_text("PlayerName", &self.player_name)?;
        require_text("FullName", &self.full_name)?;
        require_text("Age", &self.age)?;
        require_text("Email", &self.email)?;
        if self.level < 1 {
            return Err(AppError::bad_request("Level must be at least 1"));
        }
        Ok(())
    }

    /// Parameters for `sp_RegisterPlayer`, in declared order.
    pub fn params(&self) -> Vec<Param> {
        vec![
            Param::new("p_PlayerName", self.player_name.as_str()),
            Param::new("p_FullName", self.full_name.as_str()),
            Param::new("p_Age", self.age.as_str()),
            Param::new("p_Level", self.level),
            Param::new("p_Email", self.email.as_str()),
        ]
    }
}

/// Parses a JSON object body. Empty, `null`, non-object and malformed bodies
/// are all rejected alike.
///
/// Keys are resolved against `T::FIELDS` ignoring ASCII case, in document
/// order, so a later `assetname` replaces an earlier `AssetName`. Unknown
/// keys are dropped.
pub fn parse_body<T: RequestBody>(body: &[u8]) -> Result<T> {
    let invalid = || AppError::bad_request("Invalid request body");

    let Entries(entries) = serde_json::from_slice(body).map_err(|_| invalid())?;
    let mut fields = Map::new();
    for (key, value) in entries {
        if let Some(field) = T::FIELDS.iter().find(|f| f.eq_ignore_ascii_case(&key)) {
            fields.insert((*field).to_string(), value);
        }
    }
    serde_json::from_value(JsonValue::Object(fields)).map_err(|_| invalid())
}

/// The members of a JSON object in document order, duplicates included.
struct Entries(Vec<(String, JsonValue)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Entries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, JsonValue>()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("{field} is required")));
    }
    Ok(())
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(String::new()),
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected text, found {other}"))),
    }
}

fn lenient_i32<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    let wide = match &value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    wide.and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| D::Error::custom(format!("expected a 32-bit integer, found {value}")))
}

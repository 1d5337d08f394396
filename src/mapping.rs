//! Row-to-record mapping.
//!
//! Copies the columns of a loosely-typed [`Row`] into a statically-shaped
//! record. Each record type lists its columns explicitly in a [`MapRow`]
//! implementation; values are coerced through [`FromValue`].
//!
//! Mapping is best-effort and never fails: unknown columns, NULLs and values
//! that cannot be coerced leave the target field at its default. Every such
//! column is reported in [`Mapped::skipped`] so callers can observe partial
//! results.
//!
//! Column names are matched exactly, including case.

use crate::db::{Row, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

/// A value could not be coerced into the target field type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot convert {from} value to {to}")]
pub struct ConversionError {
    /// Variant name of the source value.
    pub from: &'static str,

    /// Name of the target type.
    pub to: &'static str,
}

impl ConversionError {
    fn new(value: &Value, to: &'static str) -> Self {
        Self {
            from: value.type_name(),
            to,
        }
    }
}

/// Conversion from a database value into a field type.
pub trait FromValue: Sized {
    /// Converts `value`, or reports why it cannot be converted.
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Err(ConversionError::new(value, "string")),
            other => Ok(other.to_display_string()),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let fail = || ConversionError::new(value, "int64");
        match value {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Float(f) => {
                let rounded = f.round_ties_even();
                if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64
                {
                    Ok(rounded as i64)
                } else {
                    Err(fail())
                }
            }
            Value::String(s) => s.trim().parse().map_err(|_| fail()),
            _ => Err(fail()),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let wide = i64::from_value(value).map_err(|_| ConversionError::new(value, "int32"))?;
        i32::try_from(wide).map_err(|_| ConversionError::new(value, "int32"))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let fail = || ConversionError::new(value, "float");
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s.trim().parse().map_err(|_| fail()),
            _ => Err(fail()),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::Float(f) => Ok(*f != 0.0),
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(ConversionError::new(value, "bool")),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Uuid(id) => Ok(*id),
            Value::String(s) => {
                Uuid::parse_str(s.trim()).map_err(|_| ConversionError::new(value, "uuid"))
            }
            _ => Err(ConversionError::new(value, "uuid")),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => {
                parse_datetime(s.trim()).ok_or_else(|| ConversionError::new(value, "datetime"))
            }
            _ => Err(ConversionError::new(value, "datetime")),
        }
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Outcome of assigning one column to a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Assign {
    /// The field was set.
    Set,
    /// The value was NULL; the field keeps its default.
    Null,
    /// No field has this column's name.
    Unmatched,
    /// The value could not be coerced; the field keeps its default.
    Failed(ConversionError),
}

/// Coerces `value` into `slot`, leaving the slot untouched on NULL or failure.
pub fn assign<T: FromValue>(slot: &mut T, value: &Value) -> Assign {
    if value.is_null() {
        return Assign::Null;
    }
    match T::from_value(value) {
        Ok(v) => {
            *slot = v;
            Assign::Set
        }
        Err(e) => Assign::Failed(e),
    }
}

/// A record that can be populated column by column.
///
/// Implementations match the column name exactly and delegate to [`assign`]:
///
/// ```ignore
/// fn assign(&mut self, column: &str, value: &Value) -> Assign {
///     match column {
///         "AssetName" => assign(&mut self.asset_name, value),
///         _ => Assign::Unmatched,
///     }
/// }
/// ```
pub trait MapRow: Default {
    /// Assigns one column to the matching field.
    fn assign(&mut self, column: &str, value: &Value) -> Assign;
}

/// Why a column did not populate a field.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// No field has this column's name.
    Unmatched,
    /// The value was NULL.
    Null,
    /// The value could not be coerced.
    Conversion(ConversionError),
}

/// A column that did not populate a field.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedColumn {
    /// Column name as returned by the procedure.
    pub column: String,

    /// Why it was skipped.
    pub reason: SkipReason,
}

/// A possibly partial record plus the columns that did not populate it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<T> {
    /// The populated record.
    pub record: T,

    /// Columns that were ignored, NULL, or failed conversion.
    pub skipped: Vec<SkippedColumn>,
}

impl<T> Mapped<T> {
    /// Returns true if every column populated a field.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Discards the diagnostics and returns the record.
    pub fn into_record(self) -> T {
        self.record
    }
}

/// Maps one row onto a fresh `T`.
pub fn map_row<T: MapRow>(row: &Row) -> Mapped<T> {
    let mut record = T::default();
    let mut skipped = Vec::new();

    for (column, value) in row.iter() {
        let reason = match record.assign(column, value) {
            Assign::Set => continue,
            Assign::Null => SkipReason::Null,
            Assign::Unmatched => SkipReason::Unmatched,
            Assign::Failed(e) => SkipReason::Conversion(e),
        };
        skipped.push(SkippedColumn {
            column: column.to_string(),
            reason,
        });
    }

    Mapped { record, skipped }
}

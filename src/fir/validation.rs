//! Schema validation for incoming FIR records.
//!
//! Validation walks the raw JSON payload in a fixed field order and stops at
//! the first violation, so a record with several defects always reports the
//! same one. On success the record comes back normalized: strings trimmed,
//! ages coerced to integers and the incident date parsed.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use super::models::{Accused, Charge, ChargeCode, Complainant, Incident, IncidentRecord};

pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 120;

lazy_static! {
    static ref PHONE_PATTERN: Regex = Regex::new(r"^[0-9]{10}$").expect("phone pattern compiles");
}

/// What was wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    Required,
    Empty,
    NotAString,
    NotANumber,
    NotAnObject,
    NotAnArray,
    NotAnInteger,
    TooSmall { min: i64 },
    TooLarge { max: i64 },
    InvalidPhone,
    InvalidDate,
    NotAllowed { allowed: Vec<&'static str> },
    TooFewItems { min: usize },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "is required"),
            Self::Empty => write!(f, "is not allowed to be empty"),
            Self::NotAString => write!(f, "must be a string"),
            Self::NotANumber => write!(f, "must be a number"),
            Self::NotAnObject => write!(f, "must be of type object"),
            Self::NotAnArray => write!(f, "must be an array"),
            Self::NotAnInteger => write!(f, "must be an integer"),
            Self::TooSmall { min } => write!(f, "must be greater than or equal to {min}"),
            Self::TooLarge { max } => write!(f, "must be less than or equal to {max}"),
            Self::InvalidPhone => write!(f, "must be exactly 10 digits"),
            Self::InvalidDate => write!(f, "must be a valid date"),
            Self::NotAllowed { allowed } => write!(f, "must be one of [{}]", allowed.join(", ")),
            Self::TooFewItems { min } => write!(f, "must contain at least {min} items"),
        }
    }
}

/// First validation failure found in a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{field}\" {kind}")]
pub struct ValidationError {
    /// Dotted path of the failing field, e.g. `complainant.phone`.
    pub field: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

/// Validate a raw payload and return the normalized record.
pub fn validate(raw: &Value) -> Result<IncidentRecord, ValidationError> {
    let root = Fields::root(raw)?;

    let case_number = root.required_str("caseNumber")?;
    let police_station = root.required_str("policeStation")?;
    let district = root.required_str("district")?;

    let c = root.object("complainant")?;
    let complainant = Complainant {
        name: c.required_str("name")?,
        father_name: c.required_str("fatherName")?,
        age: c.age("age")?,
        address: c.required_str("address")?,
        phone: c.phone("phone")?,
    };

    let i = root.object("incident")?;
    let incident = Incident {
        date: i.date("date")?,
        time: i.required_str("time")?,
        place: i.required_str("place")?,
        description: i.required_str("description")?,
    };

    let accused = match root.optional_object("accused")? {
        Some(a) => Accused {
            name: a.optional_str("name")?,
            age: a.optional_age_text("age")?,
            address: a.optional_str("address")?,
        },
        None => Accused::default(),
    };

    let charges = root.charges("charges")?;

    Ok(IncidentRecord {
        case_number,
        police_station,
        district,
        complainant,
        incident,
        accused,
        charges,
    })
}

/// Cursor over one JSON object, remembering its path for error messages.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    prefix: String,
}

impl<'a> Fields<'a> {
    fn root(value: &'a Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(object) => Ok(Self {
                object,
                prefix: String::new(),
            }),
            _ => Err(ValidationError::new("value", ValidationErrorKind::NotAnObject)),
        }
    }

    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn fail<T>(&self, key: &str, kind: ValidationErrorKind) -> Result<T, ValidationError> {
        Err(ValidationError::new(self.path(key), kind))
    }

    fn get(&self, key: &str) -> Result<&'a Value, ValidationError> {
        self.object
            .get(key)
            .ok_or_else(|| ValidationError::new(self.path(key), ValidationErrorKind::Required))
    }

    fn object(&self, key: &str) -> Result<Fields<'a>, ValidationError> {
        match self.get(key)? {
            Value::Object(object) => Ok(Fields {
                object,
                prefix: self.path(key),
            }),
            _ => self.fail(key, ValidationErrorKind::NotAnObject),
        }
    }

    fn optional_object(&self, key: &str) -> Result<Option<Fields<'a>>, ValidationError> {
        match self.object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(object)) => Ok(Some(Fields {
                object,
                prefix: self.path(key),
            })),
            Some(_) => self.fail(key, ValidationErrorKind::NotAnObject),
        }
    }

    fn required_str(&self, key: &str) -> Result<String, ValidationError> {
        match self.get(key)? {
            Value::String(s) if s.trim().is_empty() => self.fail(key, ValidationErrorKind::Empty),
            Value::String(s) => Ok(s.trim().to_string()),
            _ => self.fail(key, ValidationErrorKind::NotAString),
        }
    }

    fn optional_str(&self, key: &str) -> Result<String, ValidationError> {
        match self.object.get(key) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.trim().to_string()),
            Some(_) => self.fail(key, ValidationErrorKind::NotAString),
        }
    }

    fn age(&self, key: &str) -> Result<u8, ValidationError> {
        let number = match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        let Some(number) = number.filter(|n| n.is_finite()) else {
            return self.fail(key, ValidationErrorKind::NotANumber);
        };

        if number < MIN_AGE as f64 {
            return self.fail(key, ValidationErrorKind::TooSmall { min: MIN_AGE });
        }
        if number > MAX_AGE as f64 {
            return self.fail(key, ValidationErrorKind::TooLarge { max: MAX_AGE });
        }
        if number.fract() != 0.0 {
            return self.fail(key, ValidationErrorKind::NotAnInteger);
        }

        Ok(number as u8)
    }

    /// Accused age is free text on the form; whole numbers are accepted too.
    fn optional_age_text(&self, key: &str) -> Result<String, ValidationError> {
        match self.object.get(key) {
            Some(Value::Number(n)) => match n.as_u64() {
                Some(age) => Ok(age.to_string()),
                None => self.fail(key, ValidationErrorKind::NotAnInteger),
            },
            _ => self.optional_str(key),
        }
    }

    fn phone(&self, key: &str) -> Result<String, ValidationError> {
        let phone = self.required_str(key)?;
        if !PHONE_PATTERN.is_match(&phone) {
            return self.fail(key, ValidationErrorKind::InvalidPhone);
        }
        Ok(phone)
    }

    fn date(&self, key: &str) -> Result<NaiveDate, ValidationError> {
        let parsed = match self.get(key)? {
            Value::String(s) if s.trim().is_empty() => {
                return self.fail(key, ValidationErrorKind::Empty)
            }
            Value::String(s) => parse_date(s.trim()),
            Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.date_naive()),
            _ => None,
        };
        match parsed {
            Some(date) => Ok(date),
            None => self.fail(key, ValidationErrorKind::InvalidDate),
        }
    }

    fn charges(&self, key: &str) -> Result<Vec<Charge>, ValidationError> {
        let items = match self.get(key)? {
            Value::Array(items) => items,
            _ => return self.fail(key, ValidationErrorKind::NotAnArray),
        };
        if items.is_empty() {
            return self.fail(key, ValidationErrorKind::TooFewItems { min: 1 });
        }

        let allowed: Vec<&'static str> = ChargeCode::ALL.iter().map(|c| c.label()).collect();
        let mut charges = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{}[{}]", self.path(key), index);
            let Value::Object(object) = item else {
                return Err(ValidationError::new(item_path, ValidationErrorKind::NotAnObject));
            };
            let charge = Fields {
                object,
                prefix: item_path,
            };

            let section = charge.required_str("section")?;
            let description = charge.required_str("description")?;
            let label = charge.required_str("type")?;
            let Some(code) = ChargeCode::from_label(&label) else {
                return charge.fail(
                    "type",
                    ValidationErrorKind::NotAllowed {
                        allowed: allowed.clone(),
                    },
                );
            };

            charges.push(Charge {
                section,
                description,
                code,
            });
        }
        Ok(charges)
    }
}

/// Parse the date formats a browser form or API client is likely to send.
fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

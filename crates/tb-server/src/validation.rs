//! Ordered parameter checks run before dispatch.
//!
//! Pure functions of schema and raw parameters; no I/O, no provider access.
//! The first failing check wins and short-circuits the rest, so a command
//! with several problems reports the earliest one deterministically:
//! unknown-parameter policy, required presence, type coercion, then format
//! constraints.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tb_config::UnknownParams;
use tb_types::{BridgeError, BridgeResult};

use crate::registry::{CommandSpec, Constraint, ParamSpec, ParamType};

static ISSUE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]+-[0-9]+$").expect("valid pattern"));
static UPPER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]*$").expect("valid pattern"));
static PAGE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid pattern"));

/// The ordered validation checks, configured once at startup.
#[derive(Debug, Clone, Copy)]
pub struct ValidationChain {
    unknown_params: UnknownParams,
}

impl ValidationChain {
    pub fn new(unknown_params: UnknownParams) -> Self {
        Self { unknown_params }
    }

    /// Validate `raw` against `spec`.
    ///
    /// On success returns the validated parameter map: coerced values plus
    /// materialized defaults. Parameters outside the schema are rejected or
    /// dropped according to the configured policy.
    ///
    /// # Errors
    ///
    /// A `ValidationError` naming the first offending field.
    pub fn validate(
        &self,
        spec: &CommandSpec,
        raw: &Map<String, Value>,
    ) -> BridgeResult<Map<String, Value>> {
        if self.unknown_params == UnknownParams::Reject {
            for name in raw.keys() {
                if !spec.params.iter().any(|param| param.name == name) {
                    return Err(BridgeError::validation(name, "unknown parameter"));
                }
            }
        }

        for param in &spec.params {
            if param.required && !raw.contains_key(param.name) {
                return Err(BridgeError::validation(
                    param.name,
                    "required field is missing",
                ));
            }
        }

        if !spec.requires_any.is_empty()
            && !spec.requires_any.iter().any(|name| raw.contains_key(*name))
        {
            return Err(BridgeError::validation(
                "fields",
                format!(
                    "at least one of {} must be provided",
                    spec.requires_any.join(", ")
                ),
            ));
        }

        let mut validated = Map::new();
        for param in &spec.params {
            let value = match raw.get(param.name) {
                Some(value) => coerce(param, value)?,
                None => match &param.default {
                    Some(default) => default.clone(),
                    None => continue,
                },
            };
            check_constraint(param, &value)?;
            validated.insert(param.name.to_string(), value);
        }
        Ok(validated)
    }
}

fn coerce(param: &ParamSpec, value: &Value) -> BridgeResult<Value> {
    match param.param_type {
        ParamType::String => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(BridgeError::validation(param.name, "expected a string")),
        },
        ParamType::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(raw) => raw
                .trim()
                .parse::<i64>()
                .map(|number| Value::Number(number.into()))
                .map_err(|_| BridgeError::validation(param.name, "expected a number")),
            _ => Err(BridgeError::validation(param.name, "expected a number")),
        },
        ParamType::StringArray => match value {
            Value::Array(items) if items.iter().all(Value::is_string) => Ok(value.clone()),
            _ => Err(BridgeError::validation(
                param.name,
                "expected an array of strings",
            )),
        },
        ParamType::Enum(allowed) => match value {
            Value::String(raw) if allowed.contains(&raw.as_str()) => Ok(value.clone()),
            _ => Err(BridgeError::validation(
                param.name,
                format!("expected one of: {}", allowed.join(", ")),
            )),
        },
    }
}

fn check_constraint(param: &ParamSpec, value: &Value) -> BridgeResult<()> {
    let Some(constraint) = param.constraint else {
        return Ok(());
    };
    let Some(text) = value.as_str() else {
        return Ok(());
    };

    let (pattern, expected): (&Regex, &str) = match constraint {
        Constraint::IssueKey => (&ISSUE_KEY, "an issue key such as PROJ-123"),
        Constraint::ProjectKey => (&UPPER_KEY, "an uppercase project key"),
        Constraint::SpaceKey => (&UPPER_KEY, "an uppercase space key"),
        Constraint::PageId => (&PAGE_ID, "a numeric page id"),
    };

    if pattern.is_match(text) {
        Ok(())
    } else {
        Err(BridgeError::validation(
            param.name,
            format!("expected {}", expected),
        ))
    }
}

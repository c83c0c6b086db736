//! Typed boundary between platform API payloads and [`FundingProject`].
//!
//! The platform sends ISO-8601 strings for dates, numeric or string ids, and
//! amounts either as JSON numbers or as decimal strings. Nothing loosely typed
//! gets past [`FundingProject::from_wire`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{FundingError, Result};
use crate::timeline::{calculate_project_status, parse_instant};
use crate::types::{FundingProject, ProjectStatus};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireAmount {
    Number(f64),
    Text(String),
}

/// A funding project exactly as the platform API serializes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProject {
    pub id: WireId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "artistName")]
    pub artist: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub current_amount: Option<WireAmount>,
    pub target_amount: WireAmount,
    #[serde(default)]
    pub status: Option<String>,
}

impl FundingProject {
    /// Validate a wire record and derive its status at `now`.
    ///
    /// A settlement status sent by the platform is kept; a window status (or
    /// none at all) is recomputed from the dates.
    pub fn from_wire(wire: WireProject, now: DateTime<Utc>) -> Result<Self> {
        let start_date = parse_instant(&wire.start_date)?;
        let end_date = parse_instant(&wire.end_date)?;
        if start_date > end_date {
            return Err(FundingError::InvalidWindow {
                start: start_date,
                end: end_date,
            });
        }

        let current_amount = match wire.current_amount {
            Some(amount) => parse_amount("currentAmount", amount)?,
            None => 0.0,
        };
        let target_amount = parse_amount("targetAmount", wire.target_amount)?;

        let reported = wire
            .status
            .as_deref()
            .map(str::parse::<ProjectStatus>)
            .transpose()?;
        let status = match reported {
            Some(status) if !status.is_date_derived() => status,
            _ => calculate_project_status(start_date, end_date, now),
        };

        Ok(FundingProject {
            id: wire.id.into_string(),
            title: wire.title.unwrap_or_default(),
            artist: wire.artist,
            start_date,
            end_date,
            current_amount,
            target_amount,
            status,
        })
    }
}

fn parse_amount(field: &'static str, raw: WireAmount) -> Result<f64> {
    let value = match raw {
        WireAmount::Number(n) => n,
        WireAmount::Text(s) => s.trim().parse::<f64>().map_err(|_| FundingError::InvalidAmount {
            field,
            value: s.clone(),
        })?,
    };
    if !value.is_finite() || value < 0.0 {
        return Err(FundingError::InvalidAmount {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// Parse a single project payload (`GET /api/funding/projects/:id`).
///
/// Accepts the bare object or an envelope `{ "project": {...} }` / `{ "data": {...} }`.
pub fn parse_project(json: &str, now: DateTime<Utc>) -> Result<FundingProject> {
    let value: Value = serde_json::from_str(json)?;
    let item = match value {
        Value::Object(mut map) if !map.contains_key("startDate") => map
            .remove("project")
            .or_else(|| map.remove("data"))
            .ok_or_else(|| FundingError::InvalidPayload("expected a project object".to_string()))?,
        other => other,
    };
    let wire: WireProject = serde_json::from_value(item)?;
    FundingProject::from_wire(wire, now)
}

/// A record from a list payload that failed validation.
#[derive(Debug)]
pub struct RejectedProject {
    /// The record's id, when it had a readable one.
    pub id: Option<String>,
    pub error: FundingError,
}

/// Outcome of parsing a list payload: valid projects and the rejects.
#[derive(Debug, Default)]
pub struct ProjectBatch {
    pub projects: Vec<FundingProject>,
    pub rejected: Vec<RejectedProject>,
}

/// Parse a list payload (`GET /api/funding/projects`).
///
/// Accepts a bare array or an envelope `{ "projects": [...] }` / `{ "data": [...] }`.
/// A malformed record is reported in [`ProjectBatch::rejected`] and does not
/// fail the batch; a malformed envelope does.
pub fn parse_project_list(json: &str, now: DateTime<Utc>) -> Result<ProjectBatch> {
    let value: Value = serde_json::from_str(json)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("projects").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(FundingError::InvalidPayload(
                    "expected a `projects` or `data` array".to_string(),
                ))
            }
        },
        _ => {
            return Err(FundingError::InvalidPayload(
                "expected an array of projects".to_string(),
            ))
        }
    };

    let mut batch = ProjectBatch::default();
    for item in items {
        let id = item.get("id").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let parsed = serde_json::from_value::<WireProject>(item)
            .map_err(FundingError::from)
            .and_then(|wire| FundingProject::from_wire(wire, now));
        match parsed {
            Ok(project) => batch.projects.push(project),
            Err(error) => {
                debug!("Skipping project {id:?}: {error}");
                batch.rejected.push(RejectedProject { id, error });
            }
        }
    }
    Ok(batch)
}

//! Per-field validation issues, rendered as the JSON shape the signup and
//! job forms key their inline error messages on.

use serde::Serialize;

#[derive(Debug, Serialize, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Collapse issues into `{"validation": {field: {code, message}}}`. A later
/// issue for the same field wins.
pub fn to_payload(issues: &[ValidationIssue]) -> serde_json::Value {
    let fields: serde_json::Map<String, serde_json::Value> = issues
        .iter()
        .map(|issue| {
            (
                issue.field.clone(),
                serde_json::json!({ "code": issue.code, "message": issue.message }),
            )
        })
        .collect();
    serde_json::json!({ "validation": fields })
}

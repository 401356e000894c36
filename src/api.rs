use serde::Serialize;

use crate::intake::IntakeReport;

#[derive(Debug, Serialize, Default)]
pub struct APIResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_route: Option<String>,
}

impl APIResponse {
    pub fn new_from_msg(msg: &str) -> Self {
        APIResponse {
            status: msg.to_owned(),
            ..APIResponse::default()
        }
    }

    pub fn from_report(msg: &str, report: IntakeReport) -> Self {
        APIResponse {
            status: msg.to_owned(),
            added: Some(report.added),
            duplicates: Some(report.duplicates),
            auth_route: report.auth_route,
        }
    }
}

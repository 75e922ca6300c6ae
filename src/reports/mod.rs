//! User reports and automatic escalation

pub mod escalation;
pub mod service;

pub use escalation::{escalated_status, REPORT_ESCALATION_THRESHOLD};
pub use service::ReportService;

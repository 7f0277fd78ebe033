//! OCSF (Open Cybersecurity Schema Framework) structured event logging.
//!
//! Events are emitted via `tracing::info!` on the `ocsf` target as
//! structured JSON. Never panics; serialization errors are dropped.

use serde_json::{Value, json};
use std::time::{SystemTime, UNIX_EPOCH};

// OCSF event class UIDs
pub const CLASS_ACCOUNT_CHANGE: u32 = 3001;
pub const CLASS_AUTHENTICATION: u32 = 3002;
pub const CLASS_AUTHORIZE_SESSION: u32 = 3003;

// Authentication activity IDs
pub const ACTIVITY_LOGON: u32 = 1;
pub const ACTIVITY_LOGOFF: u32 = 2;
pub const ACTIVITY_OTHER: u32 = 99; // Email confirmation, access denial

// Account change activity IDs
pub const ACTIVITY_CREATE: u32 = 1;
pub const ACTIVITY_PASSWORD_CHANGE: u32 = 3;
pub const ACTIVITY_PASSWORD_RESET: u32 = 4;

// Status IDs
pub const STATUS_SUCCESS: u32 = 1;
pub const STATUS_FAILURE: u32 = 2;

// Severity IDs
pub const SEVERITY_INFORMATIONAL: u32 = 1;
pub const SEVERITY_LOW: u32 = 2;
pub const SEVERITY_MEDIUM: u32 = 3;
pub const SEVERITY_HIGH: u32 = 4;

pub const AUTH_PROTOCOL_PASSWORD: u32 = 2;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn severity_name(id: u32) -> &'static str {
    match id {
        SEVERITY_INFORMATIONAL => "Informational",
        SEVERITY_LOW => "Low",
        SEVERITY_MEDIUM => "Medium",
        SEVERITY_HIGH => "High",
        5 => "Critical",
        _ => "Unknown",
    }
}

fn status_name(id: u32) -> &'static str {
    match id {
        STATUS_SUCCESS => "Success",
        _ => "Failure",
    }
}

fn class_name(id: u32) -> &'static str {
    match id {
        CLASS_ACCOUNT_CHANGE => "Account Change",
        CLASS_AUTHENTICATION => "Authentication",
        CLASS_AUTHORIZE_SESSION => "Authorize Session",
        _ => "Unknown",
    }
}

/// Emit an OCSF event as structured JSON via tracing. Never panics.
fn emit(event: &Value) {
    if let Ok(json) = serde_json::to_string(event) {
        tracing::info!(target: "ocsf", "{}", json);
    }
}

/// Common envelope shared by every event this service emits.
fn build_event(
    class_uid: u32,
    activity_id: u32,
    activity_name: &str,
    status_id: u32,
    severity_id: u32,
    user_email: Option<&str>,
    message: &str,
) -> Value {
    let mut event = json!({
        "class_uid": class_uid,
        "class_name": class_name(class_uid),
        "activity_id": activity_id,
        "activity_name": activity_name,
        "severity_id": severity_id,
        "severity": severity_name(severity_id),
        "status_id": status_id,
        "status": status_name(status_id),
        "time": now_millis(),
        "metadata": {
            "product": {
                "name": "todo-gate",
                "version": env!("CARGO_PKG_VERSION"),
            }
        },
        "message": message,
    });

    if let Some(email) = user_email {
        event["actor"] = json!({
            "user": {
                "email_addr": email,
                "type_id": 1,
                "type": "User"
            }
        });
    }

    event
}

fn outcome(success: bool) -> (u32, u32) {
    if success {
        (STATUS_SUCCESS, SEVERITY_INFORMATIONAL)
    } else {
        (STATUS_FAILURE, SEVERITY_MEDIUM)
    }
}

/// Emit an OCSF Authentication (3002) event for a password-based flow.
pub fn authentication_event(
    activity_id: u32,
    activity_name: &str,
    success: bool,
    user_email: Option<&str>,
    message: &str,
) {
    let (status_id, severity_id) = outcome(success);
    let mut event = build_event(
        CLASS_AUTHENTICATION,
        activity_id,
        activity_name,
        status_id,
        severity_id,
        user_email,
        message,
    );
    event["auth_protocol_id"] = json!(AUTH_PROTOCOL_PASSWORD);
    event["auth_protocol"] = json!("Password");
    emit(&event);
}

/// Emit an OCSF Account Change (3001) event: sign-up, password reset/change.
pub fn account_change_event(
    activity_id: u32,
    activity_name: &str,
    success: bool,
    user_email: Option<&str>,
    message: &str,
) {
    let (status_id, severity_id) = outcome(success);
    emit(&build_event(
        CLASS_ACCOUNT_CHANGE,
        activity_id,
        activity_name,
        status_id,
        severity_id,
        user_email,
        message,
    ));
}

/// Emit an OCSF Authorize Session (3003) failure for a gated path.
pub fn access_denied_event(path: &str, reason: &str) {
    let mut event = build_event(
        CLASS_AUTHORIZE_SESSION,
        ACTIVITY_OTHER,
        "Other",
        STATUS_FAILURE,
        SEVERITY_LOW,
        None,
        &format!("Access to {} denied: {}", path, reason),
    );
    event["metadata"]["authorization"] = json!({
        "path": path,
        "decision": "redirect",
        "reason": reason,
    });
    emit(&event);
}

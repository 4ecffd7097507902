//! Audit log entries

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

/// An admin action recorded on the server audit log
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub action: String,
    pub resource: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub details: Option<Value>,
}

impl AuditEntry {
    /// New entry stamped with the current time
    #[must_use]
    pub fn new(
        action: impl Into<String>,
        resource: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            resource: resource.into(),
            user_id: user_id.into(),
            timestamp: Utc::now(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Wire body; `details` is omitted when unset
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "action": self.action,
            "resource": self.resource,
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            "userId": self.user_id,
        });

        if let (Some(details), Some(object)) = (&self.details, value.as_object_mut()) {
            object.insert("details".to_string(), details.clone());
        }

        value
    }
}

// 📜 Audit Log - every change is an event
// Append-only ring buffer, newest first, capped at 50 entries

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of entries kept
pub const AUDIT_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditCategory {
    Sale,
    Correction,
    Revert,
    Captain,
    Info,
}

impl AuditCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            AuditCategory::Sale => "💰",
            AuditCategory::Revert => "❌",
            AuditCategory::Captain => "👑",
            AuditCategory::Correction | AuditCategory::Info => "🔹",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub category: AuditCategory,
}

impl AuditEntry {
    pub fn new(message: impl Into<String>, category: AuditCategory) -> Self {
        AuditEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Local::now(),
            message: message.into(),
            category,
        }
    }

    /// Wall clock time as shown in the activity feed
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: VecDeque<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry, evicting the oldest one past capacity
    pub fn record(&mut self, message: impl Into<String>, category: AuditCategory) -> &AuditEntry {
        let entry = AuditEntry::new(message, category);
        tracing::debug!(category = ?entry.category, message = %entry.message, "audit");

        self.entries.push_front(entry);
        self.entries.truncate(AUDIT_LOG_CAPACITY);
        &self.entries[0]
    }

    /// Newest first
    pub fn entries(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    pub fn recent(&self, n: usize) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().take(n)
    }

    pub fn latest(&self) -> Option<&AuditEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

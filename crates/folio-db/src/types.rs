use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// Kind of file attached to a timeline item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum FileKind {
    Image,
    Text,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Text => "text",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(FileKind::Image),
            "text" => Some(FileKind::Text),
            _ => None,
        }
    }
}

/// File attached to a timeline item, stored in the blob store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Attachment {
    pub url: String,
    pub original_name: String,
    pub kind: FileKind,
}

impl Attachment {
    /// Blob name, i.e. the last path segment of the URL
    pub fn blob_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// Timeline item as exposed by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TimelineItem {
    pub id: String,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub attachment: Option<Attachment>,
    pub created_at: DateTime<Utc>,
}

impl TimelineItem {
    /// Calendar date of the item, ignoring time-of-day
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Timeline row returned from SELECT queries
#[derive(Debug, Clone, FromRow)]
pub struct TimelineRow {
    pub id: String,
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TimelineRow> for TimelineItem {
    fn from(row: TimelineRow) -> Self {
        let attachment = match (row.file_url, row.file_name, row.file_type) {
            (Some(url), Some(original_name), Some(kind)) => {
                FileKind::parse(&kind).map(|kind| Attachment {
                    url,
                    original_name,
                    kind,
                })
            }
            _ => None,
        };

        TimelineItem {
            id: row.id,
            date: row.date,
            title: row.title,
            description: row.description,
            attachment,
            created_at: row.created_at,
        }
    }
}

/// Fields written on timeline create and full-replace update
#[derive(Debug, Clone)]
pub struct TimelineParams {
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub attachment: Option<Attachment>,
}

impl TimelineParams {
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Visitor message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Message {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

/// Fields written when a visitor submits a message
#[derive(Debug, Clone)]
pub struct CreateMessageParams {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl CreateMessageParams {
    /// Build params with the email trimmed and lower-cased
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            message: message.trim().to_string(),
        }
    }
}

/// Aggregate counts over all visitor messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct MessageStats {
    pub total: u64,
    pub unread: u64,
    pub last_message_date: Option<DateTime<Utc>>,
    #[serde(rename = "last7days")]
    pub last_7_days: u64,
    #[serde(rename = "last30days")]
    pub last_30_days: u64,
}

impl MessageStats {
    /// Compute stats over `messages` relative to `now`
    pub fn compute(messages: &[Message], now: DateTime<Utc>) -> Self {
        let week_ago = now - chrono::Duration::days(7);
        let month_ago = now - chrono::Duration::days(30);

        MessageStats {
            total: messages.len() as u64,
            unread: messages.iter().filter(|m| !m.read).count() as u64,
            last_message_date: messages.iter().map(|m| m.created_at).max(),
            last_7_days: messages.iter().filter(|m| m.created_at >= week_ago).count() as u64,
            last_30_days: messages.iter().filter(|m| m.created_at >= month_ago).count() as u64,
        }
    }
}

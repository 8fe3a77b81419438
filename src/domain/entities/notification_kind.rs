use serde::{Deserialize, Serialize};

/// Kinds of outbound notifications recorded in the append-only log.
///
/// The log exists to deduplicate same-day reminders; the other kinds are
/// recorded for operator visibility only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reminder,
    Disconnection,
    Reconnection,
    PaymentReceived,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Reminder => "reminder",
            NotificationKind::Disconnection => "disconnection",
            NotificationKind::Reconnection => "reconnection",
            NotificationKind::PaymentReceived => "payment_received",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

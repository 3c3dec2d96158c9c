use chrono::{DateTime, Utc};

/// Who is asking and when. Handlers build one per request and pass it
/// down; nothing below the HTTP layer looks up the current user itself.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: String,
    pub now: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::at(user_id, Utc::now())
    }

    pub fn at(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            now,
        }
    }
}

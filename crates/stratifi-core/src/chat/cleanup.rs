//! Detection of duplicate sessions created in quick succession.

use std::collections::HashMap;

use chrono::Duration;
use serde::Serialize;
use stratifi_types::chat::ChatSession;
use uuid::Uuid;

/// Default window within which two sessions of one user count as duplicates.
pub const DEFAULT_DUPLICATE_WINDOW_MINUTES: i64 = 5;

/// Outcome of a cleanup run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    /// Active sessions examined.
    pub scanned: usize,
    /// Sessions identified as duplicates.
    pub duplicates: Vec<Uuid>,
    /// Sessions actually deactivated (0 on a dry run).
    pub deactivated: u64,
    pub messages_deleted: u64,
    pub dry_run: bool,
}

/// Return the ids of sessions that duplicate a newer session of the same user.
///
/// Per user, active sessions are sorted newest first; each session created
/// within `window` of the one before it is a duplicate. The newest session of
/// every burst is kept. Inactive sessions are ignored.
pub fn find_duplicate_sessions(sessions: &[ChatSession], window: Duration) -> Vec<Uuid> {
    let mut by_user: HashMap<Uuid, Vec<&ChatSession>> = HashMap::new();
    for session in sessions.iter().filter(|s| s.is_active) {
        by_user.entry(session.user_id).or_default().push(session);
    }

    let mut duplicates = Vec::new();
    for list in by_user.values_mut() {
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        for pair in list.windows(2) {
            let (newer, older) = (pair[0], pair[1]);
            if newer.created_at - older.created_at <= window {
                duplicates.push(older.id);
            }
        }
    }
    duplicates
}

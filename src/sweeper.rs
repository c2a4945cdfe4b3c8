//! The announcement activation sweeper: a process-wide background task,
//! started once at boot, that promotes due scheduled announcements to live.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;

use crate::db::Db;
use crate::utils::error::AppError;

/// Tick forever on `interval`, sweeping all societies each time. Every
/// failure is logged and dropped; because `is_posted` only flips after a
/// successful save, the next tick retries the same due set.
pub async fn run(db: Db, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match activate_due_announcements(&db, Utc::now()).await {
            Ok(0) => {}
            Ok(count) => tracing::info!(count, "Published due scheduled announcements"),
            Err(err) => {
                tracing::warn!(error = %err, "Announcement sweep failed, will retry next tick");
            }
        }
    }
}

/// One sweep pass at the given instant: flip every due announcement and
/// persist each changed society in a single write. Returns how many posts
/// were published. Idempotent for a fixed `now`.
pub async fn activate_due_announcements(db: &Db, now: DateTime<Utc>) -> Result<usize, AppError> {
    let mut activated = 0;

    for mut society in db.list_societies().await? {
        let due = society.doc.activate_due_posts(now);
        if due == 0 {
            continue;
        }
        match db.update_society(&society).await {
            Ok(()) => activated += due,
            Err(err) => {
                // Unsaved flips are lost on purpose; the next tick sees the
                // same due posts again.
                tracing::warn!(
                    society = %society.doc.name,
                    error = %err,
                    "Failed to persist announcement sweep for society"
                );
            }
        }
    }

    Ok(activated)
}

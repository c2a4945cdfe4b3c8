//! Idempotent startup data: the admin account and the shared venue list
//! every society books from.

use crate::db::Db;
use crate::models::event::Venue;
use crate::models::user::{User, UserKind};
use crate::utils::error::AppError;

const SHARED_VENUES: &[(&str, u32, &str)] = &[
    ("Wisdom Tree", 100, "Main Campus"),
    ("CS Lawn", 200, "CS Department"),
    ("Med-C", 150, "Medical Campus"),
    ("Auditorium", 500, "Main Campus"),
    ("Cafeteria", 300, "Main Campus"),
    ("Seminar Hall", 80, "Engineering Block"),
    ("Sports Complex", 1000, "Sports Ground"),
    ("Library", 200, "Academic Block"),
];

/// The venue list a freshly registered society starts with.
pub fn default_venues() -> Vec<Venue> {
    SHARED_VENUES
        .iter()
        .map(|&(name, capacity, location)| {
            Venue::new(name.to_string(), capacity, location.to_string())
        })
        .collect()
}

pub async fn ensure_defaults(db: &Db, admin_name: &str) -> Result<(), AppError> {
    if !db.admin_exists().await? {
        db.insert_user(&User::new(admin_name.to_string(), UserKind::Admin))
            .await?;
        tracing::info!(name = %admin_name, "Admin user initialized");
    }

    // Societies created before the shared venues existed get them backfilled.
    for mut society in db.list_societies().await? {
        if society.doc.venues.is_empty() {
            society.doc.venues = default_venues();
            db.update_society(&society).await?;
            tracing::info!(society = %society.doc.name, "Seeded shared venues");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_venues_are_unique_and_bookable() {
        let venues = default_venues();
        assert_eq!(venues.len(), 8);
        for venue in &venues {
            assert!(venue.is_available);
            assert!(venue.reservations.is_empty());
            assert!(venue.capacity > 0);
        }
        let mut names: Vec<_> = venues.iter().map(|v| v.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), venues.len());
    }
}

//! Account identifier
//!
//! Exposed as `id` on `GET /user` only; register and login responses
//! never carry it.

use kernel::id::Id;

pub struct UserMarker;

/// Primary key of `users`, UUIDv4
pub type UserId = Id<UserMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ids_are_random_v4() {
        let a = UserId::new();
        let b = UserId::new();
        assert_eq!(a.as_uuid().get_version_num(), 4);
        assert_ne!(a, b);
    }

    #[test]
    fn test_round_trips_through_database_uuid() {
        let stored = uuid::Uuid::new_v4();
        assert_eq!(UserId::from_uuid(stored).as_uuid(), &stored);
    }
}

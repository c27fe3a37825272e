//! Database Integration Tests
//!
//! Require a running `PostgreSQL` (`DATABASE_URL`); run with
//! `cargo test -p circle-server db::tests -- --ignored`.

#[cfg(test)]
mod postgres_tests {
    use super::super::*;
    use sqlx::PgPool;
    use uuid::Uuid;

    // ========================================================================
    // User Tests
    // ========================================================================

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_create_and_find_user(pool: PgPool) {
        let user = create_user(&pool, "Test User", "Test@Example.com", "hashed_password")
            .await
            .expect("Failed to create user");

        assert_eq!(user.full_name, "Test User");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.verification_status, VerificationStatus::Unverified);
        assert!(!user.is_admin);
        assert!(!user.archived);

        let found = find_user_by_id(&pool, user.id)
            .await
            .expect("Query failed")
            .expect("User not found");
        assert_eq!(found.id, user.id);

        let found = find_user_by_email(&pool, "TEST@example.com")
            .await
            .expect("Query failed")
            .expect("User not found");
        assert_eq!(found.id, user.id);
    }

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_touch_last_active_returns_fresh_row(pool: PgPool) {
        let user = create_user(&pool, "Idle", "idle@example.com", "hash")
            .await
            .expect("Failed to create user");
        assert!(!user.is_active);

        let touched = touch_last_active(&pool, user.id)
            .await
            .expect("Query failed")
            .expect("User not found");
        assert!(touched.is_active);
        assert!(touched.last_active >= user.last_active);

        let missing = touch_last_active(&pool, Uuid::now_v7())
            .await
            .expect("Query failed");
        assert!(missing.is_none());
    }

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_email_uniqueness(pool: PgPool) {
        create_user(&pool, "One", "dup@example.com", "hash")
            .await
            .expect("Failed to create first user");

        let err = create_user(&pool, "Two", "dup@example.com", "hash")
            .await
            .expect_err("Should fail on duplicate email");
        assert!(is_unique_violation(&err));
    }

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_archive_and_verification_status(pool: PgPool) {
        let user = create_user(&pool, "Archived", "archived@example.com", "hash")
            .await
            .unwrap();

        let archived = set_user_archived(&pool, user.id, true)
            .await
            .unwrap()
            .expect("User should exist");
        assert!(archived.archived);

        assert!(set_user_archived(&pool, Uuid::now_v7(), true)
            .await
            .unwrap()
            .is_none());

        set_verification_status(&pool, user.id, VerificationStatus::Pending)
            .await
            .unwrap();
        let found = find_user_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(found.verification_status, VerificationStatus::Pending);
    }

    // ========================================================================
    // Friendship Tests
    // ========================================================================

    #[sqlx::test]
    #[ignore = "requires PostgreSQL"]
    async fn test_ensure_friendship_is_unordered(pool: PgPool) {
        let a = create_user(&pool, "A", "a@example.com", "hash").await.unwrap();
        let b = create_user(&pool, "B", "b@example.com", "hash").await.unwrap();

        assert!(ensure_friendship(&pool, a.id, b.id).await.unwrap());
        // Same pair in reverse order hits the unordered unique index
        assert!(!ensure_friendship(&pool, b.id, a.id).await.unwrap());

        assert_eq!(friend_ids(&pool, a.id).await.unwrap(), vec![b.id]);
        assert_eq!(friend_ids(&pool, b.id).await.unwrap(), vec![a.id]);
    }
}

//! Session activation and audit log integrity tests

mod helpers;

use std::time::Duration;
use assert_matches::assert_matches;
use futures::future::join_all;
use helpers::*;
use serial_test::serial;
use VoteDesk::database::DatabaseService;
use VoteDesk::models::audit::{AuditAction, NewAuditEntry};
use VoteDesk::utils::errors::VoteDeskError;

async fn active_session_ids(test_db: &TestDatabase) -> Vec<i64> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM sessions WHERE is_active ORDER BY id")
        .fetch_all(&test_db.pool)
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn test_activation_replaces_previous_session() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    let spring = create_session(&db, "Spring Council").await;
    let autumn = create_session(&db, "Autumn Council").await;

    db.activate_session(spring.id, None).await.unwrap();
    assert_eq!(active_session_ids(&test_db).await, vec![spring.id]);

    let activated = db.activate_session(autumn.id, None).await.unwrap();
    assert!(activated.is_active);
    assert_eq!(active_session_ids(&test_db).await, vec![autumn.id]);

    // Re-activating the current session is a no-op
    db.activate_session(autumn.id, None).await.unwrap();
    assert_eq!(active_session_ids(&test_db).await, vec![autumn.id]);

    assert_matches!(db.activate_session(999_999, None).await, Err(VoteDeskError::Validation(_)));
}

#[tokio::test]
#[serial]
async fn test_schema_rejects_second_active_session() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    let first = create_session(&db, "First").await;
    let second = create_session(&db, "Second").await;
    db.activate_session(first.id, None).await.unwrap();

    let err = sqlx::query("UPDATE sessions SET is_active = TRUE WHERE id = $1")
        .bind(second.id)
        .execute(&test_db.pool)
        .await
        .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert!(db_err.is_unique_violation());
    assert_eq!(active_session_ids(&test_db).await, vec![first.id]);
}

#[tokio::test]
#[serial]
async fn test_activation_conflict_reports_unavailable() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    let held = create_session(&db, "Held").await;
    let contender = create_session(&db, "Contender").await;

    // Activate one session in an open transaction so the other activation
    // runs into its pending index entry
    let mut tx = test_db.pool.begin().await.unwrap();
    sqlx::query("UPDATE sessions SET is_active = TRUE WHERE id = $1")
        .bind(held.id)
        .execute(&mut *tx)
        .await
        .unwrap();

    let sessions = db.sessions.clone();
    let racing = tokio::spawn(async move { sessions.activate(contender.id).await });

    tokio::time::sleep(Duration::from_millis(300)).await;
    tx.commit().await.unwrap();

    let result = racing.await.unwrap();
    assert_matches!(result, Err(VoteDeskError::Unavailable(_)));
    assert_eq!(active_session_ids(&test_db).await, vec![held.id]);
}

#[tokio::test]
#[serial]
async fn test_concurrent_activations_leave_one_active_session() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());

    let mut ids = Vec::new();
    for index in 0..6 {
        ids.push(create_session(&db, &format!("Session {}", index)).await.id);
    }

    let attempts = ids.iter().map(|&id| {
        let db = db.clone();
        async move { db.activate_session(id, None).await }
    });

    for result in join_all(attempts).await {
        match result {
            Ok(session) => assert!(ids.contains(&session.id)),
            Err(e) => assert_matches!(e, VoteDeskError::Unavailable(_)),
        }
    }

    assert_eq!(active_session_ids(&test_db).await.len(), 1);
}

#[tokio::test]
#[serial]
async fn test_audit_entries_cannot_be_changed_or_removed() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());

    let entry = db
        .audit
        .record(&NewAuditEntry::new("admin", AuditAction::SessionCreated).with_details("Session created: Council"))
        .await
        .unwrap();

    let update = sqlx::query("UPDATE audit_log SET details = 'rewritten' WHERE id = $1")
        .bind(entry.id)
        .execute(&test_db.pool)
        .await;
    let err = update.unwrap_err();
    assert!(err.to_string().contains("append-only"));

    let delete = sqlx::query("DELETE FROM audit_log WHERE id = $1")
        .bind(entry.id)
        .execute(&test_db.pool)
        .await;
    assert!(delete.unwrap_err().to_string().contains("append-only"));

    let stored = db.audit.recent(10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].details.as_deref(), Some("Session created: Council"));
}

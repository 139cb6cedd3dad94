//! Behaviour every booking store must share, run against each backend.

use crate::error::DbError;
use crate::repository::BookingRepository;
use slotbook_common::{Booking, BookingUpdate};

pub fn booking(code: &str, slot: &str) -> Booking {
    Booking::new(code, "Ada Lovelace", "20251234", None, None, slot)
}

pub async fn exercise_repository(repo: &dyn BookingRepository) {
    repo.init().await.expect("init should succeed");
    repo.init().await.expect("init should be idempotent");
    assert!(repo.list().await.unwrap().is_empty(), "store should start empty");

    // add + lookup
    let first = repo.add(booking("1111", "2099-03-01 - 10:10")).await.unwrap();
    let second = repo.add(booking("2222", "2099-03-01 - 10:35")).await.unwrap();
    assert_eq!(repo.get_by_code("1111").await.unwrap(), Some(first.clone()));
    assert_eq!(repo.get_by_code("9999").await.unwrap(), None);

    let listed = repo.list().await.unwrap();
    let codes: Vec<&str> = listed.iter().map(|b| b.code.as_str()).collect();
    assert_eq!(codes, vec!["1111", "2222"], "list keeps insertion order");

    // duplicates
    let err = repo.add(booking("3333", "2099-03-01 - 10:10")).await.unwrap_err();
    assert!(
        matches!(&err, DbError::Duplicate(msg) if msg == "This slot has already been booked"),
        "duplicate slot must be refused, got {:?}",
        err
    );
    let err = repo.add(booking("1111", "2099-03-01 - 11:00")).await.unwrap_err();
    assert!(matches!(err, DbError::Duplicate(_)), "duplicate code must be refused");

    // update touches only the given fields
    let updated = repo
        .update(
            "2222",
            BookingUpdate {
                company: Some("Acme".to_string()),
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.company.as_deref(), Some("Acme"));
    assert_eq!(updated.notes, None);
    assert_eq!(updated.slot, second.slot);
    assert!(updated.updated_at >= second.updated_at);
    assert_eq!(
        repo.get_by_code("2222").await.unwrap().and_then(|b| b.company),
        Some("Acme".to_string())
    );
    assert!(matches!(
        repo.update("9999", BookingUpdate::default()).await,
        Err(DbError::NotFound(_))
    ));

    // delete frees the slot
    let removed = repo.delete("1111").await.unwrap();
    assert_eq!(removed.slot, "2099-03-01 - 10:10");
    assert!(matches!(repo.delete("1111").await, Err(DbError::NotFound(_))));
    repo.add(booking("4444", "2099-03-01 - 10:10"))
        .await
        .expect("a cancelled slot can be booked again");

    // reset
    assert_eq!(repo.reset_all().await.unwrap(), 2);
    assert!(repo.list().await.unwrap().is_empty());
    assert_eq!(repo.reset_all().await.unwrap(), 0);

    repo.health_check().await.expect("store should be healthy");
}

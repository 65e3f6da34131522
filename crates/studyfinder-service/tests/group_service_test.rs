//! Integration tests for the group lifecycle service against in-memory
//! SurrealDB repositories.

use studyfinder_core::FinderError;
use studyfinder_core::models::group::GroupStatus;
use studyfinder_core::models::identity::Identity;
use studyfinder_db::repository::{SurrealGroupRepository, SurrealUserRepository};
use studyfinder_service::{CreateGroupInput, DirectoryService, GroupService, ServiceConfig};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;

async fn setup() -> (
    GroupService<SurrealGroupRepository<Db>, SurrealUserRepository<Db>>,
    Identity, // alice (synced)
    Identity, // bob (synced)
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    studyfinder_db::run_migrations(&db).await.unwrap();

    let directory = DirectoryService::new(
        SurrealUserRepository::new(db.clone()),
        ServiceConfig::default(),
    );

    let alice = Identity {
        subject_id: "subj_a".into(),
        username: Some("alice".into()),
        name: "Alice".into(),
        email: "alice@example.com".into(),
        avatar_url: None,
    };
    let bob = Identity {
        subject_id: "subj_b".into(),
        username: Some("bob".into()),
        name: "Bob".into(),
        email: "bob@example.com".into(),
        avatar_url: None,
    };
    directory.sync(Some(&alice)).await.unwrap();
    directory.sync(Some(&bob)).await.unwrap();

    let service = GroupService::new(
        SurrealGroupRepository::new(db.clone()),
        SurrealUserRepository::new(db),
    );
    (service, alice, bob)
}

fn valid_input() -> CreateGroupInput {
    CreateGroupInput {
        name: "Midterm Crew".into(),
        bio: Some("Cramming together".into()),
        subjects: vec!["Calc 2".into()],
        scheduling_link: None,
        session_dates: vec!["2025-05-01".into()],
        session_time: "14:00".into(),
        location: "Library".into(),
    }
}

#[tokio::test]
async fn create_requires_authentication() {
    let (service, _, _) = setup().await;
    assert!(matches!(
        service.create(None, valid_input()).await,
        Err(FinderError::Unauthenticated)
    ));
}

#[tokio::test]
async fn create_requires_user_record() {
    let (service, _, _) = setup().await;
    let stranger = Identity {
        subject_id: "subj_z".into(),
        username: Some("zed".into()),
        name: "Zed".into(),
        email: "zed@example.com".into(),
        avatar_url: None,
    };
    assert!(matches!(
        service.create(Some(&stranger), valid_input()).await,
        Err(FinderError::NotFound { .. })
    ));
}

#[tokio::test]
async fn create_validates_required_fields() {
    let (service, alice, _) = setup().await;

    let blank_name = CreateGroupInput {
        name: "   ".into(),
        ..valid_input()
    };
    assert!(matches!(
        service.create(Some(&alice), blank_name).await,
        Err(FinderError::Validation { .. })
    ));

    let no_subjects = CreateGroupInput {
        subjects: vec!["  ".into()],
        ..valid_input()
    };
    assert!(matches!(
        service.create(Some(&alice), no_subjects).await,
        Err(FinderError::Validation { .. })
    ));

    let no_dates = CreateGroupInput {
        session_dates: vec![],
        ..valid_input()
    };
    assert!(matches!(
        service.create(Some(&alice), no_dates).await,
        Err(FinderError::Validation { .. })
    ));

    let bad_time = CreateGroupInput {
        session_time: "half past noon".into(),
        ..valid_input()
    };
    assert!(matches!(
        service.create(Some(&alice), bad_time).await,
        Err(FinderError::Validation { .. })
    ));

    let blank_location = CreateGroupInput {
        location: " ".into(),
        ..valid_input()
    };
    assert!(matches!(
        service.create(Some(&alice), blank_location).await,
        Err(FinderError::Validation { .. })
    ));
}

#[tokio::test]
async fn create_normalizes_time_and_auto_joins_owner() {
    let (service, alice, _) = setup().await;

    let details = service.create(Some(&alice), valid_input()).await.unwrap();

    assert_eq!(details.group.session_time, "2:00 PM");
    assert_eq!(details.group.status, GroupStatus::Active);
    assert_eq!(details.owner.username, "alice");
    assert_eq!(details.members.len(), 1);
    assert_eq!(details.members[0].user_id, details.group.owner_id);
}

#[tokio::test]
async fn create_blanks_out_empty_optionals() {
    let (service, alice, _) = setup().await;

    let input = CreateGroupInput {
        bio: Some("   ".into()),
        scheduling_link: Some("".into()),
        ..valid_input()
    };
    let details = service.create(Some(&alice), input).await.unwrap();

    assert!(details.group.bio.is_none());
    assert!(details.group.scheduling_link.is_none());
}

#[tokio::test]
async fn delete_by_non_owner_fails_without_leaking() {
    let (service, alice, bob) = setup().await;

    let details = service.create(Some(&alice), valid_input()).await.unwrap();

    // Non-owner and nonexistent id produce the same error shape.
    let not_yours = service.delete(Some(&bob), details.group.id).await;
    let not_there = service.delete(Some(&bob), Uuid::new_v4()).await;
    assert!(matches!(not_yours, Err(FinderError::NotFound { .. })));
    assert!(matches!(not_there, Err(FinderError::NotFound { .. })));

    // Group still exists.
    assert!(service.get_by_id(details.group.id).await.is_ok());
}

#[tokio::test]
async fn delete_by_owner_removes_group_and_memberships() {
    let (service, alice, _) = setup().await;

    let details = service.create(Some(&alice), valid_input()).await.unwrap();
    service.delete(Some(&alice), details.group.id).await.unwrap();

    assert!(matches!(
        service.get_by_id(details.group.id).await,
        Err(FinderError::NotFound { .. })
    ));
}

#[tokio::test]
async fn list_all_is_newest_first_and_not_degraded() {
    let (service, alice, bob) = setup().await;

    let first = service.create(Some(&alice), valid_input()).await.unwrap();
    let second = service
        .create(
            Some(&bob),
            CreateGroupInput {
                name: "Finals Prep".into(),
                ..valid_input()
            },
        )
        .await
        .unwrap();

    let feed = service.list_all().await;
    assert!(!feed.degraded);
    assert_eq!(feed.groups.len(), 2);
    assert_eq!(feed.groups[0].group.id, second.group.id);
    assert_eq!(feed.groups[1].group.id, first.group.id);
}

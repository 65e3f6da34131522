//! Integration tests for the User repository using in-memory SurrealDB.

use studyfinder_core::FinderError;
use studyfinder_core::models::group::CreateStudyGroup;
use studyfinder_core::models::user::CreateUser;
use studyfinder_core::repository::{GroupRepository, MembershipRepository, UserRepository};
use studyfinder_db::repository::{
    SurrealGroupRepository, SurrealMembershipRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    studyfinder_db::run_migrations(&db).await.unwrap();
    db
}

fn create_input(subject: &str, username: &str) -> CreateUser {
    CreateUser {
        subject_id: subject.into(),
        username: username.into(),
        name: "Test User".into(),
        email: format!("{username}@example.com"),
        avatar_url: None,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(create_input("subj_a", "alice")).await.unwrap();
    assert_eq!(user.subject_id, "subj_a");
    assert_eq!(user.username, "alice");

    let by_subject = repo.get_by_subject("subj_a").await.unwrap();
    assert_eq!(by_subject.id, user.id);

    let by_username = repo.get_by_username("alice").await.unwrap();
    assert_eq!(by_username.id, user.id);

    let by_id = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(by_id.username, "alice");
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let result = repo.get_by_subject("missing").await;
    assert!(matches!(result, Err(FinderError::NotFound { .. })));
}

#[tokio::test]
async fn duplicate_subject_id_conflicts() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(create_input("subj_a", "alice")).await.unwrap();
    let result = repo.create(create_input("subj_a", "alice2")).await;

    assert!(matches!(result, Err(FinderError::Conflict { .. })));
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(create_input("subj_a", "alice")).await.unwrap();
    let result = repo.create(create_input("subj_b", "alice")).await;

    assert!(matches!(result, Err(FinderError::Conflict { .. })));
}

#[tokio::test]
async fn rename_rewrites_membership_snapshots() {
    let db = setup().await;
    let user_repo = SurrealUserRepository::new(db.clone());
    let group_repo = SurrealGroupRepository::new(db.clone());
    let membership_repo = SurrealMembershipRepository::new(db);

    let owner = user_repo
        .create(create_input("subj_a", "alice"))
        .await
        .unwrap();
    let joiner = user_repo
        .create(create_input("subj_b", "bob"))
        .await
        .unwrap();

    let group = group_repo
        .create(CreateStudyGroup {
            owner_id: owner.id,
            owner_username: owner.username.clone(),
            name: "Midterm Crew".into(),
            bio: None,
            subjects: vec!["Calc 2".into()],
            scheduling_link: None,
            session_dates: vec!["2025-05-01".into()],
            session_time: "2:00 PM".into(),
            location: "Library".into(),
        })
        .await
        .unwrap();

    membership_repo
        .create(joiner.id, group.group.id, &joiner.username)
        .await
        .unwrap();

    user_repo.update_username(joiner.id, "bobby").await.unwrap();

    let membership = membership_repo
        .find(joiner.id, group.group.id)
        .await
        .unwrap();
    assert_eq!(membership.username, "bobby");

    // The owner's snapshot is untouched.
    let owner_membership = membership_repo
        .find(owner.id, group.group.id)
        .await
        .unwrap();
    assert_eq!(owner_membership.username, "alice");
}

#[tokio::test]
async fn rename_to_taken_username_conflicts_and_changes_nothing() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let alice = repo.create(create_input("subj_a", "alice")).await.unwrap();
    repo.create(create_input("subj_b", "bob")).await.unwrap();

    let result = repo.update_username(alice.id, "bob").await;
    assert!(matches!(result, Err(FinderError::Conflict { .. })));

    assert_eq!(repo.get_by_id(alice.id).await.unwrap().username, "alice");
    assert_eq!(repo.get_by_subject("subj_b").await.unwrap().username, "bob");
}

#[tokio::test]
async fn delete_cascades_owned_groups_and_memberships() {
    let db = setup().await;
    let user_repo = SurrealUserRepository::new(db.clone());
    let group_repo = SurrealGroupRepository::new(db.clone());
    let membership_repo = SurrealMembershipRepository::new(db);

    let owner = user_repo
        .create(create_input("subj_a", "alice"))
        .await
        .unwrap();
    let other = user_repo
        .create(create_input("subj_b", "bob"))
        .await
        .unwrap();

    // Owned group, with bob as a second member.
    let owned = group_repo
        .create(CreateStudyGroup {
            owner_id: owner.id,
            owner_username: owner.username.clone(),
            name: "Alice's Group".into(),
            bio: None,
            subjects: vec!["Physics".into()],
            scheduling_link: None,
            session_dates: vec!["2025-05-01".into()],
            session_time: "2:00 PM".into(),
            location: "Library".into(),
        })
        .await
        .unwrap();
    membership_repo
        .create(other.id, owned.group.id, &other.username)
        .await
        .unwrap();

    // A group alice merely joined.
    let joined = group_repo
        .create(CreateStudyGroup {
            owner_id: other.id,
            owner_username: other.username.clone(),
            name: "Bob's Group".into(),
            bio: None,
            subjects: vec!["Chemistry".into()],
            scheduling_link: None,
            session_dates: vec!["2025-05-02".into()],
            session_time: "3:00 PM".into(),
            location: "Lab".into(),
        })
        .await
        .unwrap();
    membership_repo
        .create(owner.id, joined.group.id, &owner.username)
        .await
        .unwrap();

    user_repo.delete_cascading(owner.id).await.unwrap();

    // User row gone.
    assert!(matches!(
        user_repo.get_by_subject("subj_a").await,
        Err(FinderError::NotFound { .. })
    ));

    // Owned group gone, along with every membership it had.
    assert!(matches!(
        group_repo.get_by_id(owned.group.id).await,
        Err(FinderError::NotFound { .. })
    ));
    assert!(matches!(
        membership_repo.find(other.id, owned.group.id).await,
        Err(FinderError::NotFound { .. })
    ));

    // Bob's group survives, but alice's membership in it is gone.
    let remaining = group_repo.get_by_id(joined.group.id).await.unwrap();
    assert_eq!(remaining.members.len(), 1);
    assert_eq!(remaining.members[0].user_id, other.id);
}

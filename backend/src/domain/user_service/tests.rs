//! Tests for the user account service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ports::MockUserRepository;
use crate::domain::{ErrorCode, UserRole};
use crate::test_support::{FixtureClock, admin, customer, fixed_now, principal_for, user};

fn service(repo: MockUserRepository) -> UserAccountService<MockUserRepository> {
    UserAccountService::new(Arc::new(repo), Arc::new(FixtureClock::default()))
}

fn holding(users: Vec<User>) -> MockUserRepository {
    let by_id = users.clone();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(by_id.iter().find(|u| u.id() == id).cloned()));
    repo.expect_find_by_email()
        .returning(move |email| Ok(users.iter().find(|u| u.email() == email).cloned()));
    repo
}

#[tokio::test]
async fn customers_cannot_list_users() {
    let mut repo = MockUserRepository::new();
    repo.expect_list().never();

    let err = service(repo)
        .list_users(&customer())
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.message(), "Only administrators can view all users");
}

#[tokio::test]
async fn admins_list_users() {
    let mut repo = MockUserRepository::new();
    repo.expect_list()
        .times(1)
        .return_once(|| Ok(vec![user("a@example.com", UserRole::Customer)]));

    let users = service(repo).list_users(&admin()).await.expect("listed");
    assert_eq!(users.len(), 1);
}

#[rstest]
#[case::self_read(true, UserRole::Customer, true)]
#[case::other_as_customer(false, UserRole::Customer, false)]
#[case::other_as_admin(false, UserRole::Admin, true)]
#[tokio::test]
async fn get_user_is_self_or_admin(
    #[case] own: bool,
    #[case] role: UserRole,
    #[case] allowed: bool,
) {
    let target = user("target@example.com", UserRole::Customer);
    let caller = if own {
        principal_for(&target)
    } else {
        principal_for(&user("caller@example.com", role))
    };
    let id = *target.id();

    let result = service(holding(vec![target])).get_user(&caller, &id).await;
    match result {
        Ok(found) => {
            assert!(allowed);
            assert_eq!(found.id(), &id);
        }
        Err(err) => {
            assert!(!allowed);
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }
}

#[tokio::test]
async fn update_own_profile_changes_names() {
    let me = user("me@example.com", UserRole::Customer);
    let caller = principal_for(&me);
    let mut repo = holding(vec![me]);
    repo.expect_update()
        .withf(|user| user.first_name() == "Renamed")
        .times(1)
        .return_once(|_| Ok(true));

    let updated = service(repo)
        .update_own_profile(
            &caller,
            UserUpdate {
                first_name: Some("Renamed".to_owned()),
                ..UserUpdate::default()
            },
        )
        .await
        .expect("profile updated");
    assert_eq!(updated.updated_at(), fixed_now());
}

#[tokio::test]
async fn customers_cannot_change_their_own_role() {
    let me = user("me@example.com", UserRole::Customer);
    let caller = principal_for(&me);
    let mut repo = holding(vec![me]);
    repo.expect_update().never();

    let err = service(repo)
        .update_own_profile(
            &caller,
            UserUpdate {
                role: Some(UserRole::Admin),
                ..UserUpdate::default()
            },
        )
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.message(), "Users cannot change their own role");
}

#[tokio::test]
async fn email_taken_by_someone_else_is_a_conflict() {
    let me = user("me@example.com", UserRole::Customer);
    let other = user("taken@example.com", UserRole::Customer);
    let caller = principal_for(&me);
    let mut repo = holding(vec![me, other]);
    repo.expect_update().never();

    let err = service(repo)
        .update_own_profile(
            &caller,
            UserUpdate {
                email: Some("Taken@Example.com".to_owned()),
                ..UserUpdate::default()
            },
        )
        .await
        .expect_err("conflict");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn keeping_your_own_email_is_not_a_conflict() {
    let me = user("me@example.com", UserRole::Customer);
    let caller = principal_for(&me);
    let mut repo = holding(vec![me]);
    repo.expect_update().return_once(|_| Ok(true));

    service(repo)
        .update_own_profile(
            &caller,
            UserUpdate {
                email: Some("me@example.com".to_owned()),
                ..UserUpdate::default()
            },
        )
        .await
        .expect("same email is fine");
}

#[tokio::test]
async fn admin_promotes_user() {
    let target = user("target@example.com", UserRole::Customer);
    let id = *target.id();
    let mut repo = holding(vec![target]);
    repo.expect_update()
        .withf(|user| user.is_admin())
        .return_once(|_| Ok(true));

    let promoted = service(repo)
        .update_user(
            &admin(),
            &id,
            UserUpdate {
                role: Some(UserRole::Admin),
                ..UserUpdate::default()
            },
        )
        .await
        .expect("promoted");
    assert_eq!(promoted.role(), UserRole::Admin);
}

#[tokio::test]
async fn customers_cannot_update_other_users() {
    let err = service(MockUserRepository::new())
        .update_user(&customer(), &UserId::random(), UserUpdate::default())
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let caller = admin();
    let mut repo = MockUserRepository::new();
    repo.expect_delete().never();

    let err = service(repo)
        .delete_user(&caller, caller.user_id())
        .await
        .expect_err("self delete");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Administrators cannot delete themselves");
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::NotFound))]
#[tokio::test]
async fn admin_deletes_other_users(#[case] existed: bool, #[case] expected: Option<ErrorCode>) {
    let mut repo = MockUserRepository::new();
    repo.expect_delete().times(1).return_once(move |_| Ok(existed));

    let result = service(repo).delete_user(&admin(), &UserId::random()).await;
    assert_eq!(result.err().map(|err| err.code()), expected);
}

#[tokio::test]
async fn customers_cannot_delete_users() {
    let mut repo = MockUserRepository::new();
    repo.expect_delete().never();

    let err = service(repo)
        .delete_user(&customer(), &UserId::random())
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

use canhoto::auth::AuthError;
use canhoto::{AuthService, Error};

use crate::helpers::test_store;

async fn service_with_operator() -> AuthService {
    let auth = AuthService::new(test_store().await);
    auth.create_user("operador", "s3nha-forte").await.unwrap();
    auth
}

#[tokio::test]
async fn test_authenticate_accepts_correct_password() {
    let auth = service_with_operator().await;
    assert!(auth.authenticate("operador", "s3nha-forte").await.unwrap());
}

#[tokio::test]
async fn test_authenticate_rejects_wrong_password() {
    let auth = service_with_operator().await;
    assert!(!auth.authenticate("operador", "senha-errada").await.unwrap());
    assert!(!auth.authenticate("operador", "").await.unwrap());
}

#[tokio::test]
async fn test_authenticate_unknown_user_is_false_not_error() {
    let auth = service_with_operator().await;
    assert!(!auth.authenticate("ninguem", "s3nha-forte").await.unwrap());
}

#[tokio::test]
async fn test_usernames_are_case_sensitive() {
    let auth = service_with_operator().await;
    assert!(!auth.authenticate("OPERADOR", "s3nha-forte").await.unwrap());
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let auth = service_with_operator().await;

    let err = auth.create_user("operador", "outra").await.unwrap_err();
    assert!(err.is_conflict());
    assert!(matches!(
        err,
        Error::Auth(AuthError::UsernameAlreadyExists { ref username }) if username == "operador"
    ));

    // The original password still works.
    assert!(auth.authenticate("operador", "s3nha-forte").await.unwrap());
    assert_eq!(auth.user_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_username_is_rejected() {
    let auth = AuthService::new(test_store().await);
    let err = auth.create_user("", "whatever").await.unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(auth.user_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_passwords_are_not_stored_in_clear() {
    let store = test_store().await;
    let auth = AuthService::new(store.clone());
    auth.create_user("operador", "s3nha-forte").await.unwrap();

    let stored = canhoto::store::users::password_hash(&store, "operador")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored, "s3nha-forte");
    assert!(stored.starts_with("$argon2"));
}

#[tokio::test]
async fn test_list_users_sorted() {
    let auth = AuthService::new(test_store().await);
    for name in ["carla", "ana", "bruno"] {
        auth.create_user(name, "pw").await.unwrap();
    }
    assert_eq!(auth.list_users().await.unwrap(), vec!["ana", "bruno", "carla"]);
}

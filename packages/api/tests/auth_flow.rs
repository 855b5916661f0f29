//! Owner account flows end to end: registration constraints, credential
//! checks, the verification gate, and the outbound-email audit trail.

use restomate_api::entity::{prelude::*, sent_email};
use restomate_api::mail::{EmailMessage, Mailer};
use restomate_api::routes::auth::{authenticate_owner, create_owner, mark_email_verified};
use restomate_api::sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

mod support;

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let db = support::init_test_db().await;

    create_owner(&db, "Alex", "Moreau", "alex@example.com", "hunter2!")
        .await
        .expect("first registration works");
    let err = create_owner(&db, "Sam", "Moreau", "alex@example.com", "other-pass")
        .await
        .expect_err("same email must fail");

    assert!(err.to_string().contains("already in use"));
    let count = Owner::find().count(&db).await.expect("count");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let db = support::init_test_db().await;

    let owner = create_owner(&db, "Alex", "Moreau", "login@example.com", "hunter2!")
        .await
        .expect("registration works");
    mark_email_verified(&db, owner.id, &owner.email)
        .await
        .expect("verification works");

    let err = authenticate_owner(&db, "login@example.com", "not-the-password")
        .await
        .expect_err("wrong password must fail");
    assert!(err.to_string().contains("Invalid email or password"));

    let err = authenticate_owner(&db, "nobody@example.com", "hunter2!")
        .await
        .expect_err("unknown email must fail");
    assert!(err.to_string().contains("Invalid email or password"));
}

#[tokio::test]
async fn login_requires_a_verified_email() {
    let db = support::init_test_db().await;

    create_owner(&db, "Alex", "Moreau", "gate@example.com", "hunter2!")
        .await
        .expect("registration works");

    let err = authenticate_owner(&db, "gate@example.com", "hunter2!")
        .await
        .expect_err("unverified login must fail");
    assert!(err.to_string().contains("Verify your email address"));
}

#[tokio::test]
async fn verified_owner_can_log_in() {
    let db = support::init_test_db().await;

    let owner = create_owner(&db, "Alex", "Moreau", "happy@example.com", "hunter2!")
        .await
        .expect("registration works");
    mark_email_verified(&db, owner.id, &owner.email)
        .await
        .expect("verification works");

    let logged_in = authenticate_owner(&db, "happy@example.com", "hunter2!")
        .await
        .expect("login works");
    assert_eq!(logged_in.id, owner.id);
    assert!(logged_in.email_verified);
}

#[tokio::test]
async fn verification_is_one_shot() {
    let db = support::init_test_db().await;

    let owner = create_owner(&db, "Alex", "Moreau", "once@example.com", "hunter2!")
        .await
        .expect("registration works");
    mark_email_verified(&db, owner.id, &owner.email)
        .await
        .expect("first verification works");

    let err = mark_email_verified(&db, owner.id, &owner.email)
        .await
        .expect_err("second verification must fail");
    assert!(err.to_string().contains("already been verified"));
}

#[tokio::test]
async fn verification_checks_the_token_identity() {
    let db = support::init_test_db().await;

    let owner = create_owner(&db, "Alex", "Moreau", "identity@example.com", "hunter2!")
        .await
        .expect("registration works");

    // Claims that do not line up with a stored owner go nowhere.
    let err = mark_email_verified(&db, owner.id, "someone-else@example.com")
        .await
        .expect_err("mismatched claims must fail");
    assert!(err.to_string().contains("Unable to authenticate the token"));
}

#[tokio::test]
async fn failed_email_delivery_is_audited() {
    let db = support::init_test_db().await;
    let mailer = Mailer::new(None, db.clone());

    let sent = mailer
        .send_logged(
            EmailMessage {
                to: "audit@example.com".to_string(),
                subject: "Please verify your email address".to_string(),
                body_html: None,
                body_text: Some("hello".to_string()),
            },
            "owner needs to verify the email address",
        )
        .await;
    assert!(!sent);

    let rows = SentEmail::find()
        .filter(sent_email::Column::SentTo.eq("audit@example.com"))
        .all(&db)
        .await
        .expect("audit rows");
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].successful);
    assert_eq!(rows[0].note, "owner needs to verify the email address");
    assert!(
        rows[0]
            .response
            .as_deref()
            .is_some_and(|r| r.contains("not configured"))
    );
}

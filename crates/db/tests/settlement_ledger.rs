//! Tests for the append-only ledger and the one-record-per-signup
//! invariant backing reward settlement.

use chrono::{Duration, Utc};
use muster_core::status::{ActivityStatus, SignupStatus};
use muster_core::types::DbId;
use muster_db::models::activity::CreateActivity;
use muster_db::models::ledger::SOURCE_SERVICE_AWARD;
use muster_db::models::service_record::NewServiceRecord;
use muster_db::models::signup::CreateSignup;
use muster_db::models::user::CreateUser;
use muster_db::repositories::{
    ActivityRepo, LedgerRepo, ServiceRecordRepo, SignupRepo, UserRepo,
};
use sqlx::PgPool;

async fn seed_user(pool: &PgPool, username: &str, role: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            name: format!("Test {username}"),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_finalizable_signup(pool: &PgPool) -> (DbId, DbId, DbId) {
    let teacher = seed_user(pool, "t1", "teacher").await;
    let student = seed_user(pool, "s1", "student").await;
    let now = Utc::now();
    let activity = ActivityRepo::create(
        pool,
        &CreateActivity {
            organizer_id: teacher,
            title: "Food bank sorting".to_string(),
            location: None,
            start_time: now - Duration::hours(3),
            end_time: now,
            registration_deadline: None,
            points: 20,
            status: ActivityStatus::Ongoing,
        },
    )
    .await
    .unwrap()
    .id;

    let signup = SignupRepo::create(
        pool,
        &CreateSignup {
            activity_id: activity,
            user_id: student,
            reason: None,
        },
    )
    .await
    .unwrap();
    SignupRepo::decide(pool, signup.id, SignupStatus::Approved, None)
        .await
        .unwrap();
    SignupRepo::mark_signed_in(pool, signup.id).await.unwrap();
    SignupRepo::mark_signed_out(pool, signup.id, None, None)
        .await
        .unwrap();

    (signup.id, student, activity)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ledger_total_is_the_sum_of_entries(pool: PgPool) {
    let user = seed_user(&pool, "s9", "student").await;

    assert_eq!(LedgerRepo::total_for_user(&pool, user).await.unwrap(), 0);

    let mut tx = pool.begin().await.unwrap();
    LedgerRepo::insert(&mut tx, user, 20, SOURCE_SERVICE_AWARD)
        .await
        .unwrap();
    LedgerRepo::insert(&mut tx, user, 4, SOURCE_SERVICE_AWARD)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(LedgerRepo::total_for_user(&pool, user).await.unwrap(), 24);

    let entries = LedgerRepo::list_for_user(&pool, user, 20, 0).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.source == SOURCE_SERVICE_AWARD));
    assert_eq!(LedgerRepo::count_for_user(&pool, user).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_awards_are_independent_inserts(pool: PgPool) {
    let user = seed_user(&pool, "s9", "student").await;

    let insert = |points: i64| {
        let pool = pool.clone();
        async move {
            let mut tx = pool.begin().await.unwrap();
            LedgerRepo::insert(&mut tx, user, points, SOURCE_SERVICE_AWARD)
                .await
                .unwrap();
            tx.commit().await.unwrap();
        }
    };

    tokio::join!(insert(10), insert(6), insert(4));

    assert_eq!(LedgerRepo::total_for_user(&pool, user).await.unwrap(), 20);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn a_signup_holds_at_most_one_service_record(pool: PgPool) {
    let (signup_id, student, activity) = seed_finalizable_signup(&pool).await;

    let record = NewServiceRecord {
        signup_id,
        user_id: student,
        activity_id: activity,
        duration_minutes: 180,
        rating: 5,
        evaluation: Some("excellent".to_string()),
        description: None,
        points_earned: 20,
    };

    let mut tx = pool.begin().await.unwrap();
    ServiceRecordRepo::insert(&mut tx, &record).await.unwrap();
    tx.commit().await.unwrap();

    // A second materialization attempt hits the unique index.
    let mut tx = pool.begin().await.unwrap();
    let err = ServiceRecordRepo::insert(&mut tx, &record).await.unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_service_records_signup"));
        }
        other => panic!("expected a unique violation, got {other:?}"),
    }
    drop(tx);

    assert_eq!(
        ServiceRecordRepo::count_for_signup(&pool, signup_id)
            .await
            .unwrap(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn review_fields_and_record_commit_together(pool: PgPool) {
    let (signup_id, student, activity) = seed_finalizable_signup(&pool).await;
    let now = Utc::now();

    let mut tx = pool.begin().await.unwrap();
    let locked = SignupRepo::lock_for_review(&mut tx, signup_id)
        .await
        .unwrap()
        .unwrap();
    assert!(locked.is_unfinalized());

    SignupRepo::apply_review(&mut tx, signup_id, 5, Some("excellent"), now)
        .await
        .unwrap();
    ServiceRecordRepo::insert(
        &mut tx,
        &NewServiceRecord {
            signup_id,
            user_id: student,
            activity_id: activity,
            duration_minutes: 180,
            rating: 5,
            evaluation: Some("excellent".to_string()),
            description: None,
            points_earned: 20,
        },
    )
    .await
    .unwrap();
    LedgerRepo::insert(&mut tx, student, 20, SOURCE_SERVICE_AWARD)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let row = SignupRepo::find_by_id(&pool, signup_id).await.unwrap().unwrap();
    assert_eq!(row.teacher_rating, Some(5));
    assert!(row.teacher_rating_confirmed_at.is_some());
    assert!(!row.is_unfinalized());

    assert!(ServiceRecordRepo::find_by_signup(&pool, signup_id)
        .await
        .unwrap()
        .is_some());
    assert_eq!(LedgerRepo::total_for_user(&pool, student).await.unwrap(), 20);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn an_aborted_review_leaves_no_trace(pool: PgPool) {
    let (signup_id, student, activity) = seed_finalizable_signup(&pool).await;
    let now = Utc::now();

    // Mutate everything, then roll back instead of committing.
    {
        let mut tx = pool.begin().await.unwrap();
        SignupRepo::apply_review(&mut tx, signup_id, 5, None, now)
            .await
            .unwrap();
        ServiceRecordRepo::insert(
            &mut tx,
            &NewServiceRecord {
                signup_id,
                user_id: student,
                activity_id: activity,
                duration_minutes: 180,
                rating: 5,
                evaluation: None,
                description: None,
                points_earned: 20,
            },
        )
        .await
        .unwrap();
        LedgerRepo::insert(&mut tx, student, 20, SOURCE_SERVICE_AWARD)
            .await
            .unwrap();
        tx.rollback().await.unwrap();
    }

    let row = SignupRepo::find_by_id(&pool, signup_id).await.unwrap().unwrap();
    assert!(row.is_unfinalized());
    assert_eq!(
        ServiceRecordRepo::count_for_signup(&pool, signup_id)
            .await
            .unwrap(),
        0
    );
    assert_eq!(LedgerRepo::total_for_user(&pool, student).await.unwrap(), 0);
}

//! Integration tests for the signup lifecycle and review search.

mod common;

use axum::http::{Method, StatusCode};
use common::{bearer_for, body_json, request};
use muster_core::roles::{ROLE_STUDENT, ROLE_TEACHER};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_signup_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let teacher = common::seed_user(&pool, "t3001", ROLE_TEACHER).await;
    let student = common::seed_user(&pool, "s4001", ROLE_STUDENT).await;
    let activity = common::seed_activity(&pool, teacher.id, 10).await;
    let student_auth = bearer_for(student.id, ROLE_STUDENT);

    let response = request(
        app.clone(),
        Method::POST,
        "/api/v1/signups",
        Some(&student_auth),
        Some(json!({ "activity_id": activity.id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = request(
        app.clone(),
        Method::POST,
        "/api/v1/signups",
        Some(&student_auth),
        Some(json!({ "activity_id": activity.id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "ALREADY_SIGNED_UP");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pending_signup_can_be_cancelled_but_approved_cannot(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let teacher = common::seed_user(&pool, "t3002", ROLE_TEACHER).await;
    let student = common::seed_user(&pool, "s4002", ROLE_STUDENT).await;
    let activity = common::seed_activity(&pool, teacher.id, 10).await;
    let teacher_auth = bearer_for(teacher.id, ROLE_TEACHER);
    let student_auth = bearer_for(student.id, ROLE_STUDENT);

    // First signup: cancel while pending.
    let response = request(
        app.clone(),
        Method::POST,
        "/api/v1/signups",
        Some(&student_auth),
        Some(json!({ "activity_id": activity.id })),
    )
    .await;
    let signup_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = request(
        app.clone(),
        Method::DELETE,
        &format!("/api/v1/signups/{signup_id}"),
        Some(&student_auth),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Second signup: approve, then cancellation is refused.
    let response = request(
        app.clone(),
        Method::POST,
        "/api/v1/signups",
        Some(&student_auth),
        Some(json!({ "activity_id": activity.id })),
    )
    .await;
    let signup_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = request(
        app.clone(),
        Method::POST,
        &format!("/api/v1/signups/{signup_id}/approve"),
        Some(&teacher_auth),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(
        app.clone(),
        Method::DELETE,
        &format!("/api/v1/signups/{signup_id}"),
        Some(&student_auth),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "SIGNUP_STATUS_INVALID");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn decided_signup_cannot_be_decided_again(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let teacher = common::seed_user(&pool, "t3003", ROLE_TEACHER).await;
    let student = common::seed_user(&pool, "s4003", ROLE_STUDENT).await;
    let activity = common::seed_activity(&pool, teacher.id, 10).await;
    let teacher_auth = bearer_for(teacher.id, ROLE_TEACHER);

    let response = request(
        app.clone(),
        Method::POST,
        "/api/v1/signups",
        Some(&bearer_for(student.id, ROLE_STUDENT)),
        Some(json!({ "activity_id": activity.id })),
    )
    .await;
    let signup_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = request(
        app.clone(),
        Method::POST,
        &format!("/api/v1/signups/{signup_id}/reject"),
        Some(&teacher_auth),
        Some(json!({ "reason": "roster already full" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "REJECTED");

    let response = request(
        app.clone(),
        Method::POST,
        &format!("/api/v1/signups/{signup_id}/approve"),
        Some(&teacher_auth),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "SIGNUP_STATUS_INVALID");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn review_search_tracks_review_status(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let teacher = common::seed_user(&pool, "t3004", ROLE_TEACHER).await;
    let student = common::seed_user(&pool, "s4004", ROLE_STUDENT).await;
    let activity = common::seed_activity(&pool, teacher.id, 10).await;
    let teacher_auth = bearer_for(teacher.id, ROLE_TEACHER);
    let student_auth = bearer_for(student.id, ROLE_STUDENT);

    // Sign up, approve, check in, check out.
    let response = request(
        app.clone(),
        Method::POST,
        "/api/v1/signups",
        Some(&student_auth),
        Some(json!({ "activity_id": activity.id })),
    )
    .await;
    let signup_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    request(
        app.clone(),
        Method::POST,
        &format!("/api/v1/signups/{signup_id}/approve"),
        Some(&teacher_auth),
        None,
    )
    .await;

    let response = request(
        app.clone(),
        Method::POST,
        &format!("/api/v1/checkin/token/{}", activity.id),
        Some(&teacher_auth),
        None,
    )
    .await;
    let check_in_token = body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();
    request(
        app.clone(),
        Method::POST,
        "/api/v1/checkin",
        Some(&student_auth),
        Some(json!({ "token": check_in_token })),
    )
    .await;

    let response = request(
        app.clone(),
        Method::POST,
        &format!("/api/v1/checkout/token/{}", activity.id),
        Some(&teacher_auth),
        None,
    )
    .await;
    let check_out_token = body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();
    request(
        app.clone(),
        Method::POST,
        "/api/v1/checkout",
        Some(&student_auth),
        Some(json!({ "token": check_out_token })),
    )
    .await;

    // The queue shows the signup as pending review.
    let response = request(
        app.clone(),
        Method::GET,
        "/api/v1/review/search?review_status=PENDING",
        Some(&teacher_auth),
        None,
    )
    .await;
    let page = body_json(response).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["signup_id"], signup_id);
    assert_eq!(page["data"][0]["review_status"], "PENDING");

    // After review it moves to the reviewed bucket.
    request(
        app.clone(),
        Method::PATCH,
        &format!("/api/v1/review/{signup_id}"),
        Some(&teacher_auth),
        Some(json!({ "teacher_rating": 4 })),
    )
    .await;

    let response = request(
        app.clone(),
        Method::GET,
        "/api/v1/review/search?review_status=PENDING",
        Some(&teacher_auth),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["total"], 0);

    let response = request(
        app.clone(),
        Method::GET,
        "/api/v1/review/search?review_status=REVIEWED",
        Some(&teacher_auth),
        None,
    )
    .await;
    let page = body_json(response).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["review_status"], "REVIEWED");

    // Keyword search matches the student number.
    let response = request(
        app.clone(),
        Method::GET,
        "/api/v1/review/search?keyword=s4004",
        Some(&teacher_auth),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["total"], 1);

    let response = request(
        app.clone(),
        Method::GET,
        "/api/v1/review/search?keyword=nobody",
        Some(&teacher_auth),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["total"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rosters_move_students_through_the_attendance_window(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let teacher = common::seed_user(&pool, "t3005", ROLE_TEACHER).await;
    let student = common::seed_user(&pool, "s4005", ROLE_STUDENT).await;
    let activity = common::seed_activity(&pool, teacher.id, 10).await;
    let teacher_auth = bearer_for(teacher.id, ROLE_TEACHER);
    let student_auth = bearer_for(student.id, ROLE_STUDENT);

    let response = request(
        app.clone(),
        Method::POST,
        "/api/v1/signups",
        Some(&student_auth),
        Some(json!({ "activity_id": activity.id })),
    )
    .await;
    let signup_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    request(
        app.clone(),
        Method::POST,
        &format!("/api/v1/signups/{signup_id}/approve"),
        Some(&teacher_auth),
        None,
    )
    .await;

    // Approved but not yet checked in: on the check-in roster.
    let response = request(
        app.clone(),
        Method::GET,
        &format!("/api/v1/checkin/{}/pending", activity.id),
        Some(&teacher_auth),
        None,
    )
    .await;
    let roster = body_json(response).await;
    assert_eq!(roster["data"].as_array().unwrap().len(), 1);
    assert_eq!(roster["data"][0]["username"], "s4005");

    // Check in: moves to the check-out roster.
    let response = request(
        app.clone(),
        Method::POST,
        &format!("/api/v1/checkin/token/{}", activity.id),
        Some(&teacher_auth),
        None,
    )
    .await;
    let token = body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();
    request(
        app.clone(),
        Method::POST,
        "/api/v1/checkin",
        Some(&student_auth),
        Some(json!({ "token": token })),
    )
    .await;

    let response = request(
        app.clone(),
        Method::GET,
        &format!("/api/v1/checkin/{}/pending", activity.id),
        Some(&teacher_auth),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 0);

    let response = request(
        app.clone(),
        Method::GET,
        &format!("/api/v1/checkout/{}/pending", activity.id),
        Some(&teacher_auth),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

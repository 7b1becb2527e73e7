use std::collections::HashMap;
use std::sync::Arc;

use jobboard_auth::{AuthenticatorTrait, JwtAuthenticator, TestAuthenticator};
use jobboard_backend::handlers::jobs;
use jobboard_backend::state::{AppState, AuthSettings};
use jobboard_db::{create_pool, DbConnectionConfig, DbPool};
use uuid::Uuid;

async fn test_pool() -> DbPool {
    // Single connection so the shared in-memory database is actually shared.
    let mut config = DbConnectionConfig::new("sqlite::memory:");
    config.max_connections = 1;
    config.min_connections = 1;
    let pool = create_pool(&config).await.expect("create pool");
    jobboard_migrations::sqlite_migrator()
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

fn state_with(pool: DbPool, authenticator: Arc<dyn AuthenticatorTrait>) -> Arc<AppState> {
    let jwt = JwtAuthenticator::new_hs256("integration-test-secret");
    let auth_settings = AuthSettings {
        session_ttl_hours: 1,
        reset_token_ttl_minutes: 30,
        reset_link_base: "http://localhost:4000/reset-password".to_string(),
    };
    Arc::new(AppState::new(pool, authenticator, jwt, None, auth_settings))
}

fn bearer_headers() -> axum::http::HeaderMap {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(
        axum::http::header::AUTHORIZATION,
        axum::http::HeaderValue::from_static("Bearer test-token"),
    );
    headers
}

fn job_body(title: &str, location: &str, job_type: &str) -> Option<axum::Json<serde_json::Value>> {
    Some(axum::Json(serde_json::json!({
        "title": title,
        "company_name": "Acme",
        "description": format!("{title} at Acme"),
        "location": location,
        "job_type": job_type,
    })))
}

fn path_for(id: &str) -> axum::extract::Path<HashMap<String, String>> {
    let mut m = HashMap::new();
    m.insert("jobId".to_string(), id.to_string());
    axum::extract::Path(m)
}

async fn seed_user(pool: &DbPool) -> Uuid {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now().to_rfc3339();
    let row = jobboard_db::users::UsersRow {
        id,
        email: format!("{id}@example.com"),
        full_name: "Seed User".to_string(),
        password_hash: "$argon2id$stub".to_string(),
        created_at: now.clone(),
        updated_at: now,
    };
    jobboard_db::users::insert_user(pool, &row)
        .await
        .expect("seed user");
    id
}

#[tokio::test]
async fn jobs_crud_sqlite_in_memory() {
    let pool = test_pool().await;
    let owner = seed_user(&pool).await;
    let state = state_with(pool.clone(), Arc::new(TestAuthenticator::user(owner)));
    let headers = bearer_headers();

    // Create
    let (status, created) = jobs::create::create(
        axum::Extension(state.clone()),
        headers.clone(),
        job_body("Backend Engineer", "NY", "Full-Time"),
    )
    .await
    .expect("create");
    assert_eq!(status, axum::http::StatusCode::CREATED);
    let id = created
        .0
        .get("id")
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string();
    assert_eq!(
        created.0.get("userId").and_then(|v| v.as_str()),
        Some(owner.to_string().as_str())
    );

    // Read, no session needed.
    let got = jobs::get::get_job(axum::Extension(state.clone()), path_for(&id))
        .await
        .expect("get");
    assert_eq!(
        got.0.get("title").and_then(|v| v.as_str()),
        Some("Backend Engineer")
    );

    // Update
    let updated = jobs::update::update(
        axum::Extension(state.clone()),
        headers.clone(),
        path_for(&id),
        job_body("Senior Backend Engineer", "NY", "Full-Time"),
    )
    .await
    .expect("update");
    assert_eq!(
        updated.0.get("title").and_then(|v| v.as_str()),
        Some("Senior Backend Engineer")
    );

    // A different authenticated user cannot edit or delete it.
    let stranger = seed_user(&pool).await;
    let stranger_state = state_with(pool.clone(), Arc::new(TestAuthenticator::user(stranger)));
    let err = jobs::update::update(
        axum::Extension(stranger_state.clone()),
        headers.clone(),
        path_for(&id),
        job_body("Hijacked", "NY", "Full-Time"),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        jobboard_backend::error::ApiError::Forbidden(_)
    ));
    let err = jobs::delete::delete_job(
        axum::Extension(stranger_state),
        headers.clone(),
        path_for(&id),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        jobboard_backend::error::ApiError::Forbidden(_)
    ));

    // Owner delete succeeds; a second read is a 404.
    let deleted = jobs::delete::delete_job(
        axum::Extension(state.clone()),
        headers.clone(),
        path_for(&id),
    )
    .await
    .expect("delete");
    assert_eq!(
        deleted.0.get("deleted").and_then(|v| v.as_bool()),
        Some(true)
    );
    let err = jobs::get::get_job(axum::Extension(state), path_for(&id))
        .await
        .unwrap_err();
    assert!(matches!(err, jobboard_backend::error::ApiError::NotFound(_)));
}

#[tokio::test]
async fn anonymous_requests_cannot_post() {
    let pool = test_pool().await;
    let state = state_with(pool, Arc::new(TestAuthenticator::anonymous()));

    let err = jobs::create::create(
        axum::Extension(state),
        bearer_headers(),
        job_body("Backend Engineer", "NY", "Full-Time"),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        jobboard_backend::error::ApiError::Authentication(_)
    ));
}

async fn seed_jobs(pool: &DbPool, owner: Uuid, count: usize, location: &str, job_type: &str) {
    for i in 0..count {
        let now = chrono::Utc::now();
        let row = jobboard_db::jobs::JobsRow {
            id: Uuid::new_v4(),
            title: format!("Role {i} {location}"),
            company_name: "Acme".to_string(),
            description: format!("Description for role {i}"),
            location: location.to_string(),
            job_type: job_type.to_string(),
            user_id: owner,
            // Distinct timestamps keep the DESC ordering deterministic.
            created_at: (now + chrono::Duration::seconds(i as i64)).to_rfc3339(),
            updated_at: now.to_rfc3339(),
        };
        jobboard_db::jobs::insert_job(pool, &row)
            .await
            .expect("seed job");
    }
}

fn query(params: &[(&str, &str)]) -> axum::extract::Query<HashMap<String, String>> {
    let map: HashMap<String, String> = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    axum::extract::Query(map)
}

#[tokio::test]
async fn listing_paginates_and_filters() {
    let pool = test_pool().await;
    let alice = seed_user(&pool).await;
    let bob = seed_user(&pool).await;
    seed_jobs(&pool, alice, 12, "NY", "Full-Time").await;
    seed_jobs(&pool, bob, 3, "LA", "Contract").await;

    let anon_state = state_with(pool.clone(), Arc::new(TestAuthenticator::anonymous()));

    // Page 1 carries 9 of 15, page 2 the remaining 6.
    let page1 = jobs::list::list(
        axum::Extension(anon_state.clone()),
        axum::http::HeaderMap::new(),
        query(&[]),
    )
    .await
    .expect("list");
    assert_eq!(page1.0["items"].as_array().unwrap().len(), 9);
    assert_eq!(page1.0["pagination"]["total"], 15);
    assert_eq!(page1.0["pagination"]["totalPages"], 2);
    assert_eq!(page1.0["pagination"]["perPage"], 9);

    let page2 = jobs::list::list(
        axum::Extension(anon_state.clone()),
        axum::http::HeaderMap::new(),
        query(&[("page", "2")]),
    )
    .await
    .expect("list");
    assert_eq!(page2.0["items"].as_array().unwrap().len(), 6);

    // Location and job-type filters are equality matches.
    let la_only = jobs::list::list(
        axum::Extension(anon_state.clone()),
        axum::http::HeaderMap::new(),
        query(&[("location", "LA")]),
    )
    .await
    .expect("list");
    assert_eq!(la_only.0["pagination"]["total"], 3);

    let contract_only = jobs::list::list(
        axum::Extension(anon_state.clone()),
        axum::http::HeaderMap::new(),
        query(&[("job_type", "Contract")]),
    )
    .await
    .expect("list");
    assert_eq!(contract_only.0["pagination"]["total"], 3);

    // Search is a case-insensitive substring match.
    let search = jobs::list::list(
        axum::Extension(anon_state.clone()),
        axum::http::HeaderMap::new(),
        query(&[("q", "ROLE 1")]),
    )
    .await
    .expect("list");
    // "Role 1 NY", "Role 10 NY", "Role 11 NY", "Role 1 LA"
    assert_eq!(search.0["pagination"]["total"], 4);

    // An authenticated viewer sees only their own postings.
    let alice_state = state_with(pool.clone(), Arc::new(TestAuthenticator::user(alice)));
    let mine = jobs::list::list(axum::Extension(alice_state), bearer_headers(), query(&[]))
        .await
        .expect("list");
    assert_eq!(mine.0["pagination"]["total"], 12);

    // Invalid page parameter is a 400.
    let err = jobs::list::list(
        axum::Extension(anon_state.clone()),
        axum::http::HeaderMap::new(),
        query(&[("page", "zero")]),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        jobboard_backend::error::ApiError::BadRequest(_)
    ));

    // Newest first.
    let first_title = page1.0["items"][0]["title"].as_str().unwrap();
    assert_eq!(first_title, "Role 11 NY");
}

#[tokio::test]
async fn locations_endpoint_dedupes_and_sorts() {
    let pool = test_pool().await;
    let owner = seed_user(&pool).await;
    seed_jobs(&pool, owner, 2, "NY", "Full-Time").await;
    seed_jobs(&pool, owner, 1, "LA", "Part-Time").await;

    let state = state_with(pool, Arc::new(TestAuthenticator::anonymous()));
    let resp = jobs::locations::locations(axum::Extension(state))
        .await
        .expect("locations");
    assert_eq!(resp.0["locations"], serde_json::json!(["LA", "NY"]));
}

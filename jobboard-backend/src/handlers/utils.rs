use jobboard_db::jobs as db_jobs;
use jobboard_db::users as db_users;
use serde_json::{json, Value};

pub fn job_to_payload(row: &db_jobs::JobsRow) -> Value {
    json!({
        "id": row.id,
        "title": row.title,
        "companyName": row.company_name,
        "description": row.description,
        "location": row.location,
        "jobType": row.job_type,
        "userId": row.user_id,
        "createdAt": row.created_at,
        "updatedAt": row.updated_at,
    })
}

pub fn user_to_payload(row: &db_users::UsersRow) -> Value {
    json!({
        "id": row.id,
        "email": row.email,
        "fullName": row.full_name,
        "createdAt": row.created_at,
    })
}

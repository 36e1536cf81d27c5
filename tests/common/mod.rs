use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use userforge::utils::password::hash_password;

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

/// Create a test account directly in the database.
/// `role` should be "user" or "admin".
pub async fn create_test_user(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    role: &str,
    is_active: bool,
) -> TestUser {
    let hashed = hash_password(password).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (name, email, password, role, is_active)
        VALUES ($1, $2, $3, $4::user_role, $5)
        RETURNING id
        "#,
    )
    .bind("Test User")
    .bind(email)
    .bind(&hashed)
    .bind(role)
    .bind(is_active)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestUser {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

use sqlx::PgPool;
use validator::ValidateEmail;

use crate::modules::users::model::normalize_email;
use crate::utils::password::hash_password;

/// Seeds an admin account. Admins cannot be created through the API, only
/// through the `create-admin` startup command.
pub async fn create_admin(
    db: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = normalize_email(email);

    if !email.validate_email() {
        return Err(format!("'{email}' is not a valid email address").into());
    }

    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {e}"))?;

    let result = sqlx::query(
        "INSERT INTO users (name, email, password, role)
         VALUES ($1, $2, $3, 'admin')
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(name.trim())
    .bind(&email)
    .bind(&hashed_password)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err("User with this email already exists".into());
    }

    Ok(())
}

use sqlx::PgPool;

/// Store one submission. Rows are write-only; nothing in the app reads
/// them back.
pub async fn insert_submission(
    db: &PgPool,
    name: &str,
    email: &str,
    comment: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO contact_form ("Name", email, comment)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(comment)
    .execute(db)
    .await?;
    Ok(())
}

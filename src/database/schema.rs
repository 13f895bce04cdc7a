use crate::error::{Error, Result};
use sqlx::PgPool;

/// Rows carry no business key; `id` is only the row identity.
pub const CREATE_VACANCIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS vacancies (
    id SERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    salary_min INTEGER,
    salary_max INTEGER,
    currency TEXT,
    name_company TEXT NOT NULL,
    link_vacancies TEXT NOT NULL
)
"#;

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(CREATE_VACANCIES_TABLE)
        .execute(pool)
        .await
        .map_err(Error::Database)?;
    Ok(())
}

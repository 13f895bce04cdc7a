use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::vacancy::Vacancy;

/// How a batch meets rows already in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Insert every vacancy; reloading an employer duplicates its rows.
    #[default]
    Append,
    /// Delete the batch's employers' rows first, in the same transaction.
    Replace,
}

impl std::str::FromStr for LoadMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "append" => Ok(LoadMode::Append),
            "replace" => Ok(LoadMode::Replace),
            other => Err(format!("expected `append` or `replace`, got `{}`", other)),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VacancySink: Send + Sync {
    /// Stores one employer's batch atomically, returning the rows inserted.
    async fn append_vacancies(&self, vacancies: &[Vacancy]) -> Result<u64>;
}

#[derive(Clone)]
pub struct LoaderService {
    pool: PgPool,
    mode: LoadMode,
}

impl LoaderService {
    pub fn new(pool: PgPool, mode: LoadMode) -> Self {
        Self { pool, mode }
    }
}

#[async_trait]
impl VacancySink for LoaderService {
    #[instrument(skip(self, vacancies), fields(batch = vacancies.len()))]
    async fn append_vacancies(&self, vacancies: &[Vacancy]) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(Error::Load)?;

        if self.mode == LoadMode::Replace {
            let employers: Vec<String> = employer_names(vacancies).into_iter().collect();
            let deleted = sqlx::query("DELETE FROM vacancies WHERE name_company = ANY($1)")
                .bind(&employers)
                .execute(&mut *tx)
                .await
                .map_err(Error::Load)?
                .rows_affected();
            if deleted > 0 {
                warn!(deleted, ?employers, "Replacing previously loaded vacancies");
            }
        }

        let mut inserted = 0;
        for vacancy in vacancies {
            inserted += sqlx::query(
                r#"
                INSERT INTO vacancies (title, salary_min, salary_max, currency, name_company, link_vacancies)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&vacancy.title)
            .bind(vacancy.salary_min())
            .bind(vacancy.salary_max())
            .bind(vacancy.currency())
            .bind(&vacancy.employer_name)
            .bind(&vacancy.link)
            .execute(&mut *tx)
            .await
            .map_err(Error::Load)?
            .rows_affected();
        }

        tx.commit().await.map_err(Error::Load)?;
        info!(inserted, mode = ?self.mode, "Vacancies loaded");
        Ok(inserted)
    }
}

fn employer_names(vacancies: &[Vacancy]) -> BTreeSet<String> {
    vacancies.iter().map(|v| v.employer_name.clone()).collect()
}

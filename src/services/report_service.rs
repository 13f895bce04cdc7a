use sqlx::PgPool;
use std::io::Write;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::models::report::{CompanyVacancyCount, SalaryAverages, VacancyListing};
use crate::models::vacancy::VacancyRow;

/// The fixed set of reports an operator can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    CompaniesAndCounts,
    AllVacancies,
    AverageSalary,
    AboveAverageSalary,
    KeywordSearch(String),
}

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs one report and renders it to `out`.
    #[instrument(skip(self, out))]
    pub async fn run<W: Write>(&self, report: &Report, out: &mut W) -> Result<()> {
        match report {
            Report::CompaniesAndCounts => {
                let rows = self.companies_and_counts().await?;
                render_company_counts(out, &rows)?;
            }
            Report::AllVacancies => {
                let rows = self.all_vacancies().await?;
                render_listings(out, &rows)?;
            }
            Report::AverageSalary => {
                let averages = self.average_salary().await?;
                render_averages(out, &averages)?;
            }
            Report::AboveAverageSalary => {
                let rows = self.above_average_salary().await?;
                render_rows(out, &rows)?;
            }
            Report::KeywordSearch(keyword) => {
                let rows = self.keyword_search(keyword).await?;
                render_rows(out, &rows)?;
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Vacancy count per company, fewest first.
    pub async fn companies_and_counts(&self) -> Result<Vec<CompanyVacancyCount>> {
        let mut conn = self.pool.acquire().await.map_err(Error::Query)?;
        sqlx::query_as::<_, CompanyVacancyCount>(
            r#"
            SELECT name_company, COUNT(*) AS vacancies_count
            FROM vacancies
            GROUP BY name_company
            ORDER BY COUNT(*), name_company
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Query)
    }

    pub async fn all_vacancies(&self) -> Result<Vec<VacancyListing>> {
        let mut conn = self.pool.acquire().await.map_err(Error::Query)?;
        sqlx::query_as::<_, VacancyListing>(
            "SELECT name_company, title, salary_min, salary_max, link_vacancies FROM vacancies",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Query)
    }

    /// Means over rows that have the respective bound; null bounds are ignored.
    pub async fn average_salary(&self) -> Result<SalaryAverages> {
        let mut conn = self.pool.acquire().await.map_err(Error::Query)?;
        sqlx::query_as::<_, SalaryAverages>(
            "SELECT AVG(salary_min) AS avg_min, AVG(salary_max) AS avg_max FROM vacancies",
        )
        .fetch_one(&mut *conn)
        .await
        .map_err(Error::Query)
    }

    /// Rows whose minimum and maximum both exceed the global means.
    pub async fn above_average_salary(&self) -> Result<Vec<VacancyRow>> {
        let mut conn = self.pool.acquire().await.map_err(Error::Query)?;
        sqlx::query_as::<_, VacancyRow>(
            r#"
            SELECT id, title, salary_min, salary_max, currency, name_company, link_vacancies
            FROM vacancies
            WHERE salary_min > (SELECT AVG(salary_min) FROM vacancies)
              AND salary_max > (SELECT AVG(salary_max) FROM vacancies)
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Query)
    }

    /// Literal substring match on the title, case-insensitive on purpose so
    /// that `python` finds `Python Developer` (a plain `LIKE` would be
    /// case-sensitive). `%`, `_` and quotes in `keyword` carry no special
    /// meaning.
    pub async fn keyword_search(&self, keyword: &str) -> Result<Vec<VacancyRow>> {
        let mut conn = self.pool.acquire().await.map_err(Error::Query)?;
        sqlx::query_as::<_, VacancyRow>(
            r#"
            SELECT id, title, salary_min, salary_max, currency, name_company, link_vacancies
            FROM vacancies
            WHERE strpos(lower(title), lower($1)) > 0
            "#,
        )
        .bind(keyword)
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Query)
    }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn render_company_counts<W: Write>(out: &mut W, rows: &[CompanyVacancyCount]) -> Result<()> {
    writeln!(out, "Company, vacancies")?;
    for row in rows {
        writeln!(out, "{}, {}", row.name_company, row.vacancies_count)?;
    }
    Ok(())
}

pub fn render_listings<W: Write>(out: &mut W, rows: &[VacancyListing]) -> Result<()> {
    writeln!(out, "Company, title, salary min, salary max, URL")?;
    for row in rows {
        writeln!(
            out,
            "{}, {}, {}, {}, {}",
            row.name_company,
            row.title,
            or_dash(row.salary_min),
            or_dash(row.salary_max),
            row.link_vacancies
        )?;
    }
    Ok(())
}

pub fn render_averages<W: Write>(out: &mut W, averages: &SalaryAverages) -> Result<()> {
    writeln!(out, "Average salary min, average salary max")?;
    writeln!(
        out,
        "{}, {}",
        or_dash(averages.rounded_min()),
        or_dash(averages.rounded_max())
    )?;
    Ok(())
}

pub fn render_rows<W: Write>(out: &mut W, rows: &[VacancyRow]) -> Result<()> {
    writeln!(out, "Title, salary min, salary max, currency, company, URL")?;
    for row in rows {
        writeln!(
            out,
            "{}, {}, {}, {}, {}, {}",
            row.title,
            or_dash(row.salary_min),
            or_dash(row.salary_max),
            or_dash(row.currency.as_deref()),
            row.name_company,
            row.link_vacancies
        )?;
    }
    Ok(())
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Salary block of a listing. Values are passed through from the source,
/// so either bound may be missing even when the block itself is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salary {
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub currency: Option<String>,
}

/// Canonical, store-ready vacancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacancy {
    pub title: String,
    pub salary: Option<Salary>,
    pub employer_name: String,
    pub link: String,
}

impl Vacancy {
    pub fn salary_min(&self) -> Option<i32> {
        self.salary.as_ref().and_then(|s| s.min)
    }

    pub fn salary_max(&self) -> Option<i32> {
        self.salary.as_ref().and_then(|s| s.max)
    }

    pub fn currency(&self) -> Option<&str> {
        self.salary.as_ref().and_then(|s| s.currency.as_deref())
    }
}

/// A persisted row of the `vacancies` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VacancyRow {
    pub id: i32,
    pub title: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub currency: Option<String>,
    pub name_company: String,
    pub link_vacancies: String,
}

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CompanyVacancyCount {
    pub name_company: String,
    pub vacancies_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VacancyListing {
    pub name_company: String,
    pub title: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub link_vacancies: String,
}

#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct SalaryAverages {
    pub avg_min: Option<Decimal>,
    pub avg_max: Option<Decimal>,
}

impl SalaryAverages {
    /// Mean minimum salary rounded half-to-even, `None` when no row has one.
    pub fn rounded_min(&self) -> Option<i64> {
        self.avg_min.as_ref().and_then(round_to_integer)
    }

    pub fn rounded_max(&self) -> Option<i64> {
        self.avg_max.as_ref().and_then(round_to_integer)
    }
}

fn round_to_integer(value: &Decimal) -> Option<i64> {
    use rust_decimal::prelude::ToPrimitive;
    value.round().to_i64()
}

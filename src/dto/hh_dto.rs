use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::vacancy::{Salary, Vacancy};

/// One page of `GET /vacancies`. Items stay untyped so snapshots keep the
/// records exactly as the service returned them.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub items: Vec<JsonValue>,
}

/// The fields of a HeadHunter vacancy record that the pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVacancy {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub salary: Option<RawSalary>,
    pub employer: RawEmployer,
    pub alternate_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSalary {
    #[serde(default)]
    pub from: Option<i32>,
    #[serde(default)]
    pub to: Option<i32>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEmployer {
    pub name: String,
}

pub fn normalize(raw: RawVacancy) -> Vacancy {
    Vacancy {
        title: raw.name.unwrap_or_default(),
        salary: raw.salary.map(|s| Salary {
            min: s.from,
            max: s.to,
            currency: s.currency,
        }),
        employer_name: raw.employer.name,
        link: raw.alternate_url,
    }
}

impl From<RawVacancy> for Vacancy {
    fn from(raw: RawVacancy) -> Self {
        normalize(raw)
    }
}

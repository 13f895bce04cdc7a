use serde::Deserialize;
use validator::Validate;

use crate::error::{Error, Result};
use crate::services::report_service::Report;

pub const MENU: &str = "\
1 - Update the database from the listing service
2 - Companies and their vacancy counts
3 - All vacancies
4 - Average salary
5 - Vacancies paying above the average salary
6 - Search vacancies by keyword
7 - Exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Ingest,
    Report(Report),
    KeywordSearch,
    Exit,
}

impl std::str::FromStr for MenuChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1" => Ok(MenuChoice::Ingest),
            "2" => Ok(MenuChoice::Report(Report::CompaniesAndCounts)),
            "3" => Ok(MenuChoice::Report(Report::AllVacancies)),
            "4" => Ok(MenuChoice::Report(Report::AverageSalary)),
            "5" => Ok(MenuChoice::Report(Report::AboveAverageSalary)),
            "6" => Ok(MenuChoice::KeywordSearch),
            "7" => Ok(MenuChoice::Exit),
            other => Err(Error::InvalidInput(format!(
                "`{}` is not a menu option, enter a number from 1 to 7",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct KeywordInput {
    #[validate(length(min = 1, max = 200))]
    pub keyword: String,
}

impl KeywordInput {
    /// Trims the raw line and validates it into a search report.
    pub fn parse(raw: &str) -> Result<Report> {
        let input = KeywordInput {
            keyword: raw.trim().to_string(),
        };
        input.validate()?;
        Ok(Report::KeywordSearch(input.keyword))
    }
}

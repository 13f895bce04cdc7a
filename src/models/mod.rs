pub mod employer;
pub mod report;
pub mod vacancy;

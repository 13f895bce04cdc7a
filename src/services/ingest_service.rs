use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::employer::{EmployerTarget, EmployerTargets};
use crate::services::hh_service::ListingSource;
use crate::services::loader_service::VacancySink;
use crate::services::snapshot_service::SnapshotService;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmployerStatus {
    Loaded { fetched: usize, inserted: u64 },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerOutcome {
    pub employer: EmployerTarget,
    #[serde(flatten)]
    pub status: EmployerStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<EmployerOutcome>,
}

impl IngestReport {
    pub fn loaded(&self) -> impl Iterator<Item = &EmployerOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, EmployerStatus::Loaded { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &EmployerOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, EmployerStatus::Failed { .. }))
    }

    pub fn total_inserted(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                EmployerStatus::Loaded { inserted, .. } => inserted,
                EmployerStatus::Failed { .. } => 0,
            })
            .sum()
    }
}

impl std::fmt::Display for IngestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.status {
                EmployerStatus::Loaded { fetched, inserted } => writeln!(
                    f,
                    "{} ({}): fetched {}, loaded {}",
                    outcome.employer.name, outcome.employer.id, fetched, inserted
                )?,
                EmployerStatus::Failed { reason } => writeln!(
                    f,
                    "{} ({}): FAILED: {}",
                    outcome.employer.name, outcome.employer.id, reason
                )?,
            }
        }
        write!(
            f,
            "Loaded {} vacancies for {} of {} employers in {}s",
            self.total_inserted(),
            self.loaded().count(),
            self.outcomes.len(),
            (self.finished_at - self.started_at).num_seconds()
        )
    }
}

/// Drives fetch, snapshot, normalize and load for every employer in turn.
pub struct IngestService<S, L> {
    source: S,
    snapshots: SnapshotService,
    sink: L,
}

impl<S, L> IngestService<S, L>
where
    S: ListingSource,
    L: VacancySink,
{
    pub fn new(source: S, snapshots: SnapshotService, sink: L) -> Self {
        Self {
            source,
            snapshots,
            sink,
        }
    }

    pub async fn run(&self, employers: &EmployerTargets) -> IngestReport {
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(employers.len());

        for employer in employers {
            let status = match self.ingest_employer(employer).await {
                Ok((fetched, inserted)) => {
                    info!(employer = %employer.name, employer_id = employer.id, fetched, inserted, "Employer ingested");
                    EmployerStatus::Loaded { fetched, inserted }
                }
                Err(e) => {
                    error!(employer = %employer.name, employer_id = employer.id, error = %e, "Employer ingestion failed");
                    EmployerStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push(EmployerOutcome {
                employer: employer.clone(),
                status,
            });
        }

        IngestReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        }
    }

    #[instrument(skip(self, employer), fields(employer = %employer.name, employer_id = employer.id))]
    async fn ingest_employer(&self, employer: &EmployerTarget) -> Result<(usize, u64)> {
        let records = self.source.fetch_all_pages(employer.id).await?;
        self.snapshots.write(employer.id, &records).await?;
        let vacancies = self.snapshots.read(employer.id).await?;
        let inserted = self.sink.append_vacancies(&vacancies).await?;
        Ok((records.len(), inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::vacancy::Vacancy;
    use crate::services::hh_service::MockListingSource;
    use crate::services::loader_service::MockVacancySink;
    use mockall::predicate::eq;
    use serde_json::json;

    fn listing(title: &str, employer: &str) -> serde_json::Value {
        json!({
            "name": title,
            "salary": { "from": 100000, "to": 150000, "currency": "RUR" },
            "employer": { "name": employer },
            "alternate_url": "https://hh.ru/vacancy/42"
        })
    }

    fn targets() -> EmployerTargets {
        EmployerTargets::new(vec![
            EmployerTarget::new("Failing", 11),
            EmployerTarget::new("Working", 22),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn failed_fetch_is_isolated_to_its_employer() {
        let dir = tempfile::tempdir().unwrap();

        let mut source = MockListingSource::new();
        source
            .expect_fetch_all_pages()
            .with(eq(11))
            .times(1)
            .returning(|_| {
                Err(Error::TransportStatus {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    url: "https://api.hh.ru/vacancies?employer_id=11".to_string(),
                })
            });
        source
            .expect_fetch_all_pages()
            .with(eq(22))
            .times(1)
            .returning(|_| Ok(vec![listing("Java Developer", "Working"), listing("Python Developer", "Working")]));

        let mut sink = MockVacancySink::new();
        sink.expect_append_vacancies()
            .withf(|batch: &[Vacancy]| batch.len() == 2 && batch.iter().all(|v| v.employer_name == "Working"))
            .times(1)
            .returning(|batch| Ok(batch.len() as u64));

        let service = IngestService::new(source, SnapshotService::new(dir.path()), sink);
        let report = service.run(&targets()).await;

        assert_eq!(report.outcomes.len(), 2);
        assert!(matches!(report.outcomes[0].status, EmployerStatus::Failed { .. }));
        assert_eq!(
            report.outcomes[1].status,
            EmployerStatus::Loaded { fetched: 2, inserted: 2 }
        );
        assert_eq!(report.total_inserted(), 2);
        assert_eq!(report.failed().count(), 1);
        assert!(!dir.path().join("11.json").exists());
        assert!(dir.path().join("22.json").exists());
    }

    #[tokio::test]
    async fn load_failure_is_reported_and_run_continues() {
        let dir = tempfile::tempdir().unwrap();

        let mut source = MockListingSource::new();
        source
            .expect_fetch_all_pages()
            .times(2)
            .returning(|id| Ok(vec![listing("Аналитик", &format!("Employer {}", id))]));

        let mut sink = MockVacancySink::new();
        sink.expect_append_vacancies()
            .withf(|batch: &[Vacancy]| batch[0].employer_name == "Employer 11")
            .times(1)
            .returning(|_| Err(Error::Load(sqlx::Error::PoolTimedOut)));
        sink.expect_append_vacancies()
            .withf(|batch: &[Vacancy]| batch[0].employer_name == "Employer 22")
            .times(1)
            .returning(|_| Ok(1));

        let service = IngestService::new(source, SnapshotService::new(dir.path()), sink);
        let report = service.run(&targets()).await;

        match &report.outcomes[0].status {
            EmployerStatus::Failed { reason } => assert!(reason.starts_with("Load error")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(report.loaded().count(), 1);
        assert!(report.to_string().contains("Failing (11): FAILED"));
    }

    #[tokio::test]
    async fn empty_listing_still_loads_an_empty_batch() {
        let dir = tempfile::tempdir().unwrap();

        let mut source = MockListingSource::new();
        source.expect_fetch_all_pages().returning(|_| Ok(vec![]));
        let mut sink = MockVacancySink::new();
        sink.expect_append_vacancies()
            .withf(|batch: &[Vacancy]| batch.is_empty())
            .times(2)
            .returning(|_| Ok(0));

        let service = IngestService::new(source, SnapshotService::new(dir.path()), sink);
        let report = service.run(&targets()).await;

        assert_eq!(report.loaded().count(), 2);
        assert_eq!(report.total_inserted(), 0);
    }
}

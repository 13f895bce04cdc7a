pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    hh_service::HhService, ingest_service::IngestService, loader_service::LoaderService,
    report_service::ReportService, snapshot_service::SnapshotService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub hh_service: HhService,
    pub snapshot_service: SnapshotService,
    pub loader_service: LoaderService,
    pub report_service: ReportService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let hh_service = HhService::from_config(config)?;
        let snapshot_service = SnapshotService::new(config.snapshot_dir.clone());
        let loader_service = LoaderService::new(pool.clone(), config.load_mode);
        let report_service = ReportService::new(pool.clone());

        Ok(Self {
            pool,
            hh_service,
            snapshot_service,
            loader_service,
            report_service,
        })
    }

    pub fn ingest_service(&self) -> IngestService<HhService, LoaderService> {
        IngestService::new(
            self.hh_service.clone(),
            self.snapshot_service.clone(),
            self.loader_service.clone(),
        )
    }
}

//! Simulated analysis pipeline run while the workflow is `Running`.

use std::fmt;
use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};

use crate::domain::{seed_updates, AnalysisError, DomainResult, UpdateRecord};

/// Source of wall-clock timestamps for log lines and report headers.
pub trait Clock: fmt::Debug {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingestion,
    Parsing,
    Classification,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Ingestion, Stage::Parsing, Stage::Classification];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ingestion => write!(f, "Ingestion"),
            Stage::Parsing => write!(f, "Parsing"),
            Stage::Classification => write!(f, "Classification"),
        }
    }
}

/// Ingest, parse and classify over a fixed result set.
///
/// Each stage appends a `"{stage} started at HH:MM:SS"` line to the session
/// log and then blocks for the stage delay. A successful run returns a copy of
/// the fixed result set.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    results: Vec<UpdateRecord>,
    stage_delay: Duration,
    fault: Option<String>,
}

impl AnalysisPipeline {
    pub const DEFAULT_STAGE_DELAY: Duration = Duration::from_millis(500);

    pub fn new(results: Vec<UpdateRecord>) -> Self {
        Self {
            results,
            stage_delay: Self::DEFAULT_STAGE_DELAY,
            fault: None,
        }
    }

    /// Pipeline over the built-in stub update set.
    pub fn seeded() -> DomainResult<Self> {
        Ok(Self::new(seed_updates()?))
    }

    pub fn with_stage_delay(mut self, stage_delay: Duration) -> Self {
        self.stage_delay = stage_delay;
        self
    }

    /// Arms the single failure point: the run fails with `message` once
    /// classification has finished, before any results are returned.
    ///
    /// Intended for exercising the `Failure` path in tests.
    pub fn inject_fault(mut self, message: impl Into<String>) -> Self {
        self.fault = Some(message.into());
        self
    }

    pub fn stage_delay(&self) -> Duration {
        self.stage_delay
    }

    pub fn run(&self, clock: &dyn Clock, log: &mut Vec<String>) -> Result<Vec<UpdateRecord>, AnalysisError> {
        for stage in Stage::ALL {
            log.push(format!("{} started at {}", stage, clock.now().format("%H:%M:%S")));
            tracing::debug!(%stage, "Pipeline stage started");
            if !self.stage_delay.is_zero() {
                thread::sleep(self.stage_delay);
            }
        }

        if let Some(message) = &self.fault {
            return Err(AnalysisError(message.clone()));
        }

        Ok(self.results.clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn fixed_clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2025, 10, 18)
                .and_then(|d| d.and_hms_opt(14, 5, 9))
                .unwrap(),
        )
    }

    pub(crate) fn instant_pipeline() -> AnalysisPipeline {
        AnalysisPipeline::seeded().unwrap().with_stage_delay(Duration::ZERO)
    }

    #[test]
    fn test_run_logs_each_stage() {
        let mut log = Vec::new();
        let results = instant_pipeline().run(&fixed_clock(), &mut log).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(
            log,
            vec![
                "Ingestion started at 14:05:09",
                "Parsing started at 14:05:09",
                "Classification started at 14:05:09",
            ]
        );
    }

    #[test]
    fn test_injected_fault_fails_after_all_stages() {
        let mut log = Vec::new();
        let pipeline = instant_pipeline().inject_fault("Simulated analysis failure.");
        let err = pipeline.run(&fixed_clock(), &mut log).unwrap_err();
        assert_eq!(err, AnalysisError("Simulated analysis failure.".to_string()));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_default_stage_delay() {
        let pipeline = AnalysisPipeline::seeded().unwrap();
        assert_eq!(pipeline.stage_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_stage_display() {
        let names: Vec<String> = Stage::ALL.iter().map(Stage::to_string).collect();
        assert_eq!(names, vec!["Ingestion", "Parsing", "Classification"]);
    }
}

//! Report storage.
//!
//! [`ReportStore`] is the seam to whatever persists reports. Two backends
//! ship here: an in-memory store for tests and embedding, and an
//! append-only JSON lines file used by the CLI.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::{ErrorReport, ReportError, ReportId, Result};

/// Persistence collaborator for error reports.
pub trait ReportStore: Send + Sync {
    /// Persist a report and return it with its assigned id.
    fn save(&self, report: ErrorReport) -> Result<ErrorReport>;

    /// Look up a report by id.
    fn get(&self, id: ReportId) -> Result<Option<ErrorReport>>;

    /// Distinct category labels across stored reports, sorted.
    fn categories(&self) -> Result<Vec<String>>;

    /// Number of stored reports.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Distinct, sorted categories of a report sequence.
fn distinct_categories<'a>(reports: impl IntoIterator<Item = &'a ErrorReport>) -> Vec<String> {
    reports
        .into_iter()
        .filter_map(|r| r.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| ReportError::store("store lock poisoned"))
}

/// Reports held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    reports: Mutex<Vec<ErrorReport>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently saved report.
    pub fn last(&self) -> Result<Option<ErrorReport>> {
        Ok(lock(&self.reports)?.last().cloned())
    }
}

impl ReportStore for InMemoryReportStore {
    fn save(&self, mut report: ErrorReport) -> Result<ErrorReport> {
        let mut reports = lock(&self.reports)?;
        let id = reports.len() as ReportId + 1;
        report.id = Some(id);
        reports.push(report.clone());
        Ok(report)
    }

    fn get(&self, id: ReportId) -> Result<Option<ErrorReport>> {
        Ok(lock(&self.reports)?
            .iter()
            .find(|r| r.id == Some(id))
            .cloned())
    }

    fn categories(&self) -> Result<Vec<String>> {
        Ok(distinct_categories(lock(&self.reports)?.iter()))
    }

    fn len(&self) -> Result<usize> {
        Ok(lock(&self.reports)?.len())
    }
}

/// Append-only JSON lines file of reports.
///
/// Ids are assigned sequentially from the highest id already in the file.
/// Category labels are cached in memory so `categories` never rescans.
#[derive(Debug)]
pub struct JsonlReportStore {
    path: PathBuf,
    state: Mutex<JsonlState>,
}

#[derive(Debug)]
struct JsonlState {
    next_id: ReportId,
    count: usize,
    categories: BTreeSet<String>,
}

impl JsonlReportStore {
    /// Open (or create) a store file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if !path.exists() {
            File::create(&path)?;
        }

        let mut state = JsonlState {
            next_id: 1,
            count: 0,
            categories: BTreeSet::new(),
        };
        for report in read_reports(&path)? {
            if let Some(id) = report.id {
                state.next_id = state.next_id.max(id + 1);
            }
            if let Some(category) = report.category {
                state.categories.insert(category);
            }
            state.count += 1;
        }

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_reports(path: &Path) -> Result<Vec<ErrorReport>> {
    let file = File::open(path)?;
    let mut reports = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let report: ErrorReport = serde_json::from_str(&line).map_err(|e| {
            ReportError::store(format!("{}:{}: {}", path.display(), idx + 1, e))
        })?;
        reports.push(report);
    }
    Ok(reports)
}

impl ReportStore for JsonlReportStore {
    fn save(&self, mut report: ErrorReport) -> Result<ErrorReport> {
        let mut state = lock(&self.state)?;
        report.id = Some(state.next_id);

        let mut line = serde_json::to_string(&report)?;
        line.push('\n');
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;

        state.next_id += 1;
        state.count += 1;
        if let Some(category) = &report.category {
            state.categories.insert(category.clone());
        }
        Ok(report)
    }

    fn get(&self, id: ReportId) -> Result<Option<ErrorReport>> {
        let _state = lock(&self.state)?;
        Ok(read_reports(&self.path)?
            .into_iter()
            .find(|r| r.id == Some(id)))
    }

    fn categories(&self) -> Result<Vec<String>> {
        Ok(lock(&self.state)?.categories.iter().cloned().collect())
    }

    fn len(&self) -> Result<usize> {
        Ok(lock(&self.state)?.count)
    }
}

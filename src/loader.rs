//! Startup load of `engineers.json`, `projects.json` and `allocations.json`.
//!
//! Each file holds a JSON array. A file that is missing loads nothing; a file
//! that fails to read or parse is logged and also loads nothing. One bad entity
//! type never stops the others from loading.

use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::engine::Engine;
use crate::limits::{MAX_PERCENTAGE, MIN_PERCENTAGE};
use crate::model::*;
use crate::observability;

pub const ENGINEERS_FILE: &str = "engineers.json";
pub const PROJECTS_FILE: &str = "projects.json";
pub const ALLOCATIONS_FILE: &str = "allocations.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "allocation {id}: allocationPercentage {value} outside {}..={}",
        MIN_PERCENTAGE,
        MAX_PERCENTAGE
    )]
    BadPercentage { id: String, value: u32 },
    #[error("allocation {id}: invalid {field} '{value}'")]
    BadDate {
        id: String,
        field: &'static str,
        value: String,
    },
}

/// Allocation as stored on disk. Dates are usually `YYYY-MM-DDTHH:MM:SS`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecord {
    pub id: String,
    pub engineer_id: String,
    pub project_id: String,
    pub allocation_percentage: u32,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl AllocationRecord {
    pub fn into_allocation(self) -> Result<Allocation, LoadError> {
        if !(MIN_PERCENTAGE..=MAX_PERCENTAGE).contains(&i64::from(self.allocation_percentage)) {
            return Err(LoadError::BadPercentage {
                id: self.id,
                value: self.allocation_percentage,
            });
        }
        let start_date = parse_date(&self.start_date).ok_or_else(|| LoadError::BadDate {
            id: self.id.clone(),
            field: "startDate",
            value: self.start_date.clone(),
        })?;
        let end_date = match non_blank(self.end_date.as_deref()) {
            Some(text) => Some(parse_date(text).ok_or_else(|| LoadError::BadDate {
                id: self.id.clone(),
                field: "endDate",
                value: text.to_string(),
            })?),
            None => None,
        };
        Ok(Allocation {
            id: self.id,
            engineer_id: self.engineer_id,
            project_id: self.project_id,
            allocation_percentage: self.allocation_percentage,
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub engineers: usize,
    pub projects: usize,
    pub allocations: usize,
}

/// Load all three files from `dir` into the engine. Creates `dir` if it does
/// not exist. Only failing to create the directory is an error.
pub async fn load_data_dir(engine: &Engine, dir: &Path) -> io::Result<LoadSummary> {
    let mut summary = LoadSummary::default();
    if !tokio::fs::try_exists(dir).await? {
        tokio::fs::create_dir_all(dir).await?;
        info!("created empty data dir {}", dir.display());
        return Ok(summary);
    }

    match read_records::<Engineer>(&dir.join(ENGINEERS_FILE)).await {
        Ok(records) => {
            for engineer in records {
                summary.engineers += usize::from(engine.add_engineer(engineer));
            }
        }
        Err(e) => error!("error loading engineers: {e}"),
    }

    match read_records::<Project>(&dir.join(PROJECTS_FILE)).await {
        Ok(records) => {
            for project in records {
                summary.projects += usize::from(engine.add_project(project));
            }
        }
        Err(e) => error!("error loading projects: {e}"),
    }

    let allocations = read_records::<AllocationRecord>(&dir.join(ALLOCATIONS_FILE))
        .await
        .and_then(|records| {
            records
                .into_iter()
                .map(AllocationRecord::into_allocation)
                .collect::<Result<Vec<_>, _>>()
        });
    match allocations {
        Ok(records) => {
            for allocation in records {
                summary.allocations += usize::from(engine.load_allocation(allocation).await);
            }
        }
        Err(e) => error!("error loading allocations: {e}"),
    }

    for (entity, count) in [
        ("engineers", summary.engineers),
        ("projects", summary.projects),
        ("allocations", summary.allocations),
    ] {
        metrics::gauge!(observability::RECORDS_LOADED, "entity" => entity).set(count as f64);
    }
    info!(
        "loaded {} engineers, {} projects, {} allocations from {} ({} engineers in store)",
        summary.engineers,
        summary.projects,
        summary.allocations,
        dir.display(),
        engine.store.engineer_count()
    );
    Ok(summary)
}

/// Read a JSON array of records. A missing file reads as empty.
async fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

//! One pruning run: resolve the classpath, build the reference set, reconcile the
//! classdump, report. Each stage only starts once the previous one has succeeded,
//! and nothing on disk changes before the reconcile stage.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::classpath::{self, ClasspathLookup};
use crate::error::{Error, Result};
use crate::reconcile;
use crate::reference;
use crate::report::PruneReport;

/// Inputs to a run, however they were configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneSettings {
    pub classdump: PathBuf,
    /// Classpath entries in lookup order.
    pub classpath: Vec<String>,
    /// File name of the exclusion directory created next to the classdump.
    pub exclusion_name: String,
}

pub fn run(settings: &PruneSettings) -> Result<PruneReport> {
    let start = Instant::now();

    let classdump = std::path::absolute(&settings.classdump).map_err(|e| {
        Error::Config(format!(
            "classdump path {} cannot be made absolute: {e}",
            settings.classdump.display()
        ))
    })?;
    if !classdump.is_dir() {
        return Err(Error::Config(format!(
            "classdump directory {} does not exist",
            classdump.display()
        )));
    }
    // `..` and symlinks must be gone before the parent is taken.
    let classdump = fs::canonicalize(&classdump).map_err(|e| {
        Error::Config(format!(
            "classdump directory {} cannot be resolved: {e}",
            classdump.display()
        ))
    })?;
    validate_exclusion_name(&settings.exclusion_name)?;
    let exclusion = reconcile::exclusion_root_for(&classdump, &settings.exclusion_name)?;
    reconcile::check_exclusion_root(&classdump, &exclusion)?;
    tracing::info!("pruning classdump at: {}", classdump.display());

    let classpath = classpath::resolve(&settings.classpath)?;
    let roots = classpath.local_roots();
    tracing::info!(
        "using reference classes from local build classpath: {:?}",
        roots.iter().map(|r| r.path()).collect::<Vec<_>>()
    );

    let reference = {
        let lookup = ClasspathLookup::open(&classpath);
        reference::build_reference_set(&roots, &lookup)?
    };
    if tracing::enabled!(tracing::Level::TRACE) {
        for key in reference.sorted_keys() {
            tracing::trace!("keeping class: {}", key);
        }
    }

    let summary = reconcile::reconcile(&classdump, &exclusion, &reference)?;

    Ok(PruneReport {
        classdump: classdump.to_string_lossy().to_string(),
        exclusion_root: exclusion.to_string_lossy().to_string(),
        classpath_roots: roots
            .iter()
            .map(|r| r.path().to_string_lossy().to_string())
            .collect(),
        reference_classes: reference.len(),
        kept: summary.kept,
        pruned: summary.pruned,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn validate_exclusion_name(name: &str) -> Result<()> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if plain {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "exclusion directory name {name:?} must be a plain file name"
        )))
    }
}

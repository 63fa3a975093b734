//! Moves every dumped class that is not in the reference set into the exclusion tree.

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::naming;
use crate::reference::ReferenceSet;
use crate::walk::walk_files;

pub const DEFAULT_EXCLUSION_NAME: &str = "exclclassdump";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub kept: u64,
    pub pruned: u64,
}

/// The exclusion tree lives next to the classdump: `<parent>/<name>`.
pub fn exclusion_root_for(classdump: &Path, name: &str) -> Result<PathBuf> {
    let parent = classdump
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| {
            Error::Config(format!(
                "classdump directory {} has no parent to hold the exclusion directory",
                classdump.display()
            ))
        })?;
    Ok(parent.join(name))
}

/// Refuses an exclusion tree inside the classdump: pruned files would stay under the
/// classdump root. Both paths are compared as given, so resolve them first.
pub fn check_exclusion_root(classdump: &Path, exclusion: &Path) -> Result<()> {
    if exclusion.starts_with(classdump) {
        return Err(Error::Config(format!(
            "exclusion directory {} would be inside the classdump {}",
            exclusion.display(),
            classdump.display()
        )));
    }
    Ok(())
}

/// Walks `classdump` and keeps every class file whose relative path is a reference
/// key; every other class file is moved to the same relative path under `exclusion`.
///
/// `exclusion` must not exist yet and must lie outside `classdump`. Non-class files are neither counted nor moved.
/// Entries the walk cannot read are skipped. A failed move stops the run; moves made
/// before it stay where they are.
pub fn reconcile(classdump: &Path, exclusion: &Path, reference: &ReferenceSet) -> Result<ReconcileSummary> {
    check_exclusion_root(classdump, exclusion)?;
    fs::create_dir(exclusion).map_err(|source| Error::ExclusionRoot {
        path: exclusion.to_path_buf(),
        source,
    })?;
    tracing::info!("putting pruned classdump contents into {}", exclusion.display());

    let mut summary = ReconcileSummary::default();
    walk_files::<Error, _>(classdump, |file| {
        if !naming::is_class_file(file) {
            return Ok(());
        }

        // org/apache/cassandra/Klass.0123456789abcdef.class
        let relative = file.strip_prefix(classdump).unwrap_or(file);
        let keep = naming::slash_path(relative).is_some_and(|p| reference.contains(&p));

        if keep {
            tracing::trace!("keeping classdump for {}", relative.display());
            summary.kept += 1;
        } else {
            let target = exclusion.join(relative);
            tracing::trace!("removing classdump for {}: {}", relative.display(), file.display());
            move_file(file, &target)?;
            summary.pruned += 1;
        }
        Ok(())
    })?;

    tracing::info!("pruned {} files from classdump", summary.pruned);
    tracing::info!("kept {} files from classdump", summary.kept);
    Ok(summary)
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    let move_err = |source: std::io::Error| Error::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(move_err)?;
    }
    if fs::symlink_metadata(to).is_ok() {
        return Err(move_err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "target already exists",
        )));
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            fs::copy(from, to).map_err(move_err)?;
            fs::remove_file(from).map_err(move_err)
        }
        Err(e) => Err(move_err(e)),
    }
}

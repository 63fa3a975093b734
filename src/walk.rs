//! Recursive file walk shared by the reference scan and the classdump scan.

use ignore::WalkBuilder;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub files: usize,
    /// Entries that could not be read. They are skipped, never retried.
    pub failed: usize,
}

/// Visits every non-directory entry under `root`, in file-name order.
///
/// Nothing is filtered out: hidden files and ignore files are treated like any other
/// entry. Symlinks are not followed; a symlink is visited as a file in its own right.
/// An entry the walker cannot read is skipped and the walk continues. An error
/// returned by `visit` ends the walk and is passed back to the caller.
pub fn walk_files<E, F>(root: &Path, mut visit: F) -> Result<WalkStats, E>
where
    F: FnMut(&Path) -> Result<(), E>,
{
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut stats = WalkStats::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!("skipping unreadable entry: {}", err);
                stats.failed += 1;
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file() || t.is_symlink()) {
            continue;
        }

        stats.files += 1;
        visit(entry.path())?;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "classdump_prune_walk_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn visits_nested_and_hidden_files_only() {
        let root = temp_dir("nested");
        touch(&root.join("a/b/C.class"));
        touch(&root.join("a/D.class"));
        touch(&root.join(".hidden/E.class"));
        touch(&root.join(".gitignore"));
        fs::create_dir_all(root.join("empty")).unwrap();

        let mut seen = Vec::new();
        let stats = walk_files::<(), _>(&root, |p| {
            seen.push(p.strip_prefix(&root).unwrap().to_path_buf());
            Ok(())
        })
        .unwrap();

        assert_eq!(stats.files, 4);
        assert_eq!(stats.failed, 0);
        assert!(seen.contains(&PathBuf::from("a/b/C.class")));
        assert!(seen.contains(&PathBuf::from(".hidden/E.class")));
        assert!(seen.contains(&PathBuf::from(".gitignore")));

        let _ = fs::remove_dir_all(root);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_visited_not_followed() {
        use std::os::unix::fs::symlink;

        let root = temp_dir("symlink");
        let outside = temp_dir("symlink_target");
        touch(&outside.join("Real.class"));
        touch(&outside.join("pkg/Deep.class"));
        fs::create_dir_all(&root).unwrap();
        symlink(outside.join("Real.class"), root.join("Link.class")).unwrap();
        symlink(outside.join("pkg"), root.join("pkg")).unwrap();
        symlink(outside.join("gone.class"), root.join("Dangling.class")).unwrap();

        let mut seen = Vec::new();
        let stats = walk_files::<(), _>(&root, |p| {
            seen.push(p.strip_prefix(&root).unwrap().to_path_buf());
            Ok(())
        })
        .unwrap();

        assert_eq!(stats.files, 3);
        assert!(seen.contains(&PathBuf::from("Link.class")));
        assert!(seen.contains(&PathBuf::from("Dangling.class")));
        assert!(seen.contains(&PathBuf::from("pkg")));
        assert!(!seen.contains(&PathBuf::from("pkg/Deep.class")));

        let _ = fs::remove_dir_all(root);
        let _ = fs::remove_dir_all(outside);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_skipped_and_counted() {
        use std::os::unix::fs::PermissionsExt;

        let root = temp_dir("unreadable");
        touch(&root.join("a/A.class"));
        touch(&root.join("locked/L.class"));
        touch(&root.join("z/Z.class"));
        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running as root: permissions are not enforced.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            let _ = fs::remove_dir_all(root);
            return;
        }

        let mut seen = Vec::new();
        let stats = walk_files::<(), _>(&root, |p| {
            seen.push(p.strip_prefix(&root).unwrap().to_path_buf());
            Ok(())
        });

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let stats = stats.unwrap();
        assert!(stats.failed >= 1);
        assert_eq!(stats.files, 2);
        assert_eq!(seen, vec![PathBuf::from("a/A.class"), PathBuf::from("z/Z.class")]);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn visitor_error_is_returned() {
        let root = temp_dir("error");
        touch(&root.join("a.class"));

        let result = walk_files(&root, |p| Err(p.to_path_buf()));
        assert_eq!(result.unwrap_err(), root.join("a.class"));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn missing_root_visits_nothing() {
        let root = temp_dir("missing");
        let stats = walk_files::<(), _>(&root, |_| Ok(())).unwrap();
        assert_eq!(stats.files, 0);
    }
}

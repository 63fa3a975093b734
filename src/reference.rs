//! The set of classdump file names that belong to the local build.

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::classpath::{ClassResolver, ClasspathRoot};
use crate::error::{Error, Result};
use crate::fingerprint;
use crate::naming::{self, BinaryName, ClassKey};
use crate::walk::walk_files;

/// Keys a classdump entry must match, by exact relative path, to be kept.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    keys: HashSet<ClassKey>,
}

impl ReferenceSet {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.keys.contains(relative_path)
    }

    /// Keys in lexical order.
    pub fn sorted_keys(&self) -> Vec<&ClassKey> {
        let mut keys: Vec<&ClassKey> = self.keys.iter().collect();
        keys.sort();
        keys
    }
}

impl FromIterator<ClassKey> for ReferenceSet {
    fn from_iter<I: IntoIterator<Item = ClassKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug)]
struct LocalClass {
    root: PathBuf,
    /// Relative path as found under `root`, `/`-separated.
    resource: String,
    name: BinaryName,
}

/// Builds the reference set from every class file under `roots`.
///
/// Bytes are read through `resolver` under the path the file was found at, not from
/// the file itself, so a class shadowed by an earlier classpath entry is keyed by the
/// bytes that entry holds.
/// Fails without touching anything if a class cannot be read back or if no class is
/// found at all.
pub fn build_reference_set<R: ClassResolver>(roots: &[ClasspathRoot], resolver: &R) -> Result<ReferenceSet> {
    let mut classes = Vec::new();
    for root in roots {
        tracing::debug!("checking local classes: {}", root.path().display());
        collect_local_classes(root, &mut classes)?;
    }

    let keys = classes
        .par_iter()
        .map(|class| key_for(class, resolver))
        .collect::<Result<Vec<ClassKey>>>()?;

    let set: ReferenceSet = keys.into_iter().collect();
    if set.is_empty() {
        return Err(Error::EmptyReferenceSet { roots: roots.len() });
    }

    tracing::info!(
        "found {} reference classes in {} local root(s)",
        set.len(),
        roots.len()
    );
    Ok(set)
}

fn collect_local_classes(root: &ClasspathRoot, out: &mut Vec<LocalClass>) -> Result<()> {
    let root_path = root.path();
    walk_files::<Error, _>(root_path, |file| {
        if !naming::is_class_file(file) {
            return Ok(());
        }

        let relative = file.strip_prefix(root_path).unwrap_or(file);
        let unnamed = || Error::Consistency {
            class_name: relative.to_string_lossy().to_string(),
            root: root_path.to_path_buf(),
            reason: "path does not form a binary class name".to_string(),
        };
        let resource = naming::slash_path(relative).ok_or_else(unnamed)?;
        let name = BinaryName::from_relative_path(relative).ok_or_else(unnamed)?;

        tracing::trace!("got local class: {} {}", file.display(), name);
        out.push(LocalClass {
            root: root_path.to_path_buf(),
            resource,
            name,
        });
        Ok(())
    })?;
    Ok(())
}

fn key_for<R: ClassResolver>(class: &LocalClass, resolver: &R) -> Result<ClassKey> {
    let inconsistent = |reason: String| Error::Consistency {
        class_name: class.name.to_string(),
        root: class.root.clone(),
        reason,
    };

    let bytes = resolver
        .resolve(&class.resource)
        .map_err(|e| inconsistent(e.to_string()))?
        .ok_or_else(|| inconsistent("not found on the classpath".to_string()))?;

    let key = ClassKey::new(&class.name, fingerprint::class_id(&bytes));
    tracing::trace!("got class id {} for class {}", key, class.name);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::{self, ClasspathLookup};
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "classdump_prune_reference_{}_{}_{}",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn write_file(path: &Path, content: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn build(dirs: &[&PathBuf]) -> Result<ReferenceSet> {
        let raw: Vec<String> = dirs.iter().map(|p| p.to_string_lossy().to_string()).collect();
        let cp = classpath::resolve(&raw)?;
        let lookup = ClasspathLookup::open(&cp);
        build_reference_set(&cp.local_roots(), &lookup)
    }

    struct NothingResolves;

    impl ClassResolver for NothingResolves {
        fn resolve(&self, _resource: &str) -> std::io::Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    struct BrokenResolver;

    impl ClassResolver for BrokenResolver {
        fn resolve(&self, _resource: &str) -> std::io::Result<Option<Vec<u8>>> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn every_local_class_gets_exactly_its_key() -> Result<()> {
        let base = temp_dir("keys");
        let root = base.join("classes");
        write_file(&root.join("a/B.class"), b"class A");
        write_file(&root.join("a/b/C$1.class"), b"class B");
        write_file(&root.join("a/notes.txt"), b"ignored");

        let set = build(&[&root])?;
        assert_eq!(set.len(), 2);
        assert!(set.contains("a/B.6d8643938be118d0.class"));
        assert!(set.contains("a/b/C$1.6f5643938be118d0.class"));
        assert!(!set.contains("a/B.class"));

        let _ = std::fs::remove_dir_all(base);
        Ok(())
    }

    #[test]
    fn shadowed_class_is_keyed_by_first_root() -> Result<()> {
        let base = temp_dir("shadow");
        let first = base.join("first");
        let second = base.join("second");
        write_file(&first.join("a/B.class"), b"class A");
        write_file(&second.join("a/B.class"), b"class B");

        let set = build(&[&first, &second])?;
        let keys: Vec<String> = set.sorted_keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a/B.6d8643938be118d0.class".to_string()]);

        let _ = std::fs::remove_dir_all(base);
        Ok(())
    }

    #[test]
    fn dotted_directories_are_read_where_they_were_found() -> Result<()> {
        let base = temp_dir("dotted");
        let root = base.join("classes");
        write_file(&root.join("org/apache/Klass.class"), b"class A");
        write_file(&root.join("META-INF/x.y/Gen.class"), b"class B");

        let set = build(&[&root])?;
        let keys: Vec<String> = set.sorted_keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "META-INF/x/y/Gen.6f5643938be118d0.class".to_string(),
                "org/apache/Klass.6d8643938be118d0.class".to_string(),
            ]
        );

        let _ = std::fs::remove_dir_all(base);
        Ok(())
    }

    #[test]
    fn empty_roots_are_rejected() {
        let base = temp_dir("empty");
        let root = base.join("classes");
        write_file(&root.join("README"), b"no classes here");

        let err = build(&[&root]).unwrap_err();
        assert!(matches!(err, Error::EmptyReferenceSet { roots: 1 }));

        let _ = std::fs::remove_dir_all(base);
    }

    #[test]
    fn unresolvable_class_is_a_consistency_error() {
        let base = temp_dir("consistency");
        let root = base.join("classes");
        write_file(&root.join("a/B.class"), b"class A");
        let cp = classpath::resolve(&[root.to_string_lossy().to_string()]).unwrap();

        let err = build_reference_set(&cp.local_roots(), &NothingResolves).unwrap_err();
        match err {
            Error::Consistency { class_name, .. } => assert_eq!(class_name, "a.B"),
            other => panic!("unexpected error: {other}"),
        }

        let err = build_reference_set(&cp.local_roots(), &BrokenResolver).unwrap_err();
        assert!(err.to_string().contains("disk on fire"));

        let _ = std::fs::remove_dir_all(base);
    }

    #[test]
    fn collected_keys_form_a_set() {
        let name = BinaryName::from_relative_path(Path::new("a/B.class")).unwrap();
        let set: ReferenceSet = vec![ClassKey::new(&name, 1), ClassKey::new(&name, 1), ClassKey::new(&name, 2)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("a/B.0000000000000001.class"));
        assert!(set.contains("a/B.0000000000000002.class"));
    }
}

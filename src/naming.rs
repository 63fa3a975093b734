//! Binary class names and the classdump file names derived from them.

use std::borrow::Borrow;
use std::fmt;
use std::path::{Component, Path};

use crate::fingerprint;

pub const CLASS_SUFFIX: &str = ".class";

/// A dotted binary class name, e.g. `org.apache.cassandra.Klass$Inner`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinaryName(String);

impl BinaryName {
    /// Derives the binary name from a class file path relative to its classpath root.
    ///
    /// Returns `None` for anything that is not a `.class` file made of plain UTF-8
    /// path segments.
    pub fn from_relative_path(relative: &Path) -> Option<Self> {
        let segments = plain_segments(relative)?;
        let (file, packages) = segments.split_last()?;
        let simple = file.strip_suffix(CLASS_SUFFIX)?;
        if simple.is_empty() {
            return None;
        }

        let mut name = String::new();
        for pkg in packages {
            name.push_str(pkg);
            name.push('.');
        }
        name.push_str(simple);
        Some(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `org/apache/cassandra/Klass`
    pub fn internal_name(&self) -> String {
        self.0.replace('.', "/")
    }
}

impl fmt::Display for BinaryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `org/apache/cassandra/Klass.0123456789abcdef.class`: the path, relative to the
/// classdump root, under which the agent dumps a class with a given id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassKey(String);

impl ClassKey {
    pub fn new(name: &BinaryName, class_id: u64) -> Self {
        Self(format!(
            "{}.{}{CLASS_SUFFIX}",
            name.internal_name(),
            fingerprint::to_hex(class_id)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ClassKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Joins the segments of a relative path with `/`, independent of the host separator.
///
/// This is the form a dumped file is compared against [`ClassKey`]s in.
pub fn slash_path(relative: &Path) -> Option<String> {
    plain_segments(relative).map(|s| s.join("/"))
}

pub fn is_class_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(CLASS_SUFFIX))
}

fn plain_segments(relative: &Path) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(s) => segments.push(s.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments)
}

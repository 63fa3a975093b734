//! Turns either command line adapter into [`PruneSettings`].
//!
//! `prune` reads flags, then environment variables, then defaults. `ant` reads the
//! two properties an Ant build passes to the pruning task.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::classpath::split_classpath;
use crate::cli::{AntArgs, LayoutArgs, PruneArgs};
use crate::error::{Error, Result};
use crate::pipeline::PruneSettings;

pub const CLASSDUMP_ENV: &str = "CLASSDUMP_DIR";
pub const CLASSPATH_ENV: &str = "CLASSDUMP_CLASSPATH";
pub const DEFAULT_CLASSDUMP: &str = "build/jacoco/classdump";

pub const CLASSDUMP_PROPERTY: &str = "jacoco.classdump.dir";
pub const CLASSPATH_PROPERTY: &str = "build.classes.main";

pub fn prune_settings(args: &PruneArgs) -> Result<PruneSettings> {
    prune_settings_with_env(args, |key| std::env::var(key).ok())
}

pub fn prune_settings_with_env<F>(args: &PruneArgs, env: F) -> Result<PruneSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let classdump = match &args.classdump {
        Some(p) => p.clone(),
        None => env(CLASSDUMP_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLASSDUMP)),
    };

    let classpath = match &args.classpath {
        Some(raw) => raw.clone(),
        None => env(CLASSPATH_ENV).ok_or_else(|| {
            Error::Config(format!("no classpath configured (use --classpath or {CLASSPATH_ENV})"))
        })?,
    };

    Ok(settings(classdump, &classpath, &args.layout))
}

pub fn ant_settings(args: &AntArgs) -> Result<PruneSettings> {
    let mut properties = match &args.property_file {
        Some(path) => load_properties(path)?,
        None => HashMap::new(),
    };
    for definition in &args.define {
        let (key, value) = parse_definition(definition)?;
        properties.insert(key, value);
    }

    let classdump = require(&properties, CLASSDUMP_PROPERTY)?;
    let classpath = require(&properties, CLASSPATH_PROPERTY)?;
    Ok(settings(PathBuf::from(classdump), classpath, &args.layout))
}

fn settings(classdump: PathBuf, classpath: &str, layout: &LayoutArgs) -> PruneSettings {
    PruneSettings {
        classdump,
        classpath: split_classpath(classpath, layout.delimiter),
        exclusion_name: layout.exclusion_name.clone(),
    }
}

fn require<'a>(properties: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    properties
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| Error::Config(format!("property {key} is not set")))
}

/// Parses `key=value`, as given to `-D`.
pub fn parse_definition(definition: &str) -> Result<(String, String)> {
    let (key, value) = definition
        .split_once('=')
        .ok_or_else(|| Error::Config(format!("expected KEY=VALUE, got {definition:?}")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Config(format!("empty property name in {definition:?}")));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn load_properties(path: &Path) -> Result<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_properties(&text))
}

/// Reads the line-oriented subset of Java `.properties`: `key=value` or
/// `key: value`, with `#` and `!` comment lines. Later keys win.
pub fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let Some(idx) = line.find(['=', ':']) else {
            properties.insert(line.to_string(), String::new());
            continue;
        };
        let key = line[..idx].trim();
        let value = line[idx + 1..].trim();
        if !key.is_empty() {
            properties.insert(key.to_string(), value.to_string());
        }
    }
    properties
}

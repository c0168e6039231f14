use crate::{agent::AgentProfile, error::InstallError};
use anyhow::{Context, Result};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Overrides where the bundled templates are read from.
pub const TEMPLATES_ENV: &str = "PR_REVIEW_TEMPLATES";

const BUNDLED_TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedPrompts {
    pub agent: String,
    pub dir: PathBuf,
    pub files: usize,
}

/// Finds the template root relative to the installed binary.
pub fn locate_template_root() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(TEMPLATES_ENV).filter(|dir| !dir.is_empty()) {
        let dir = PathBuf::from(dir);
        info!(path = %dir.display(), "using template root from {TEMPLATES_ENV}");
        return Ok(dir);
    }

    let exe = env::current_exe().context("failed to locate the pr-review executable")?;
    let candidates = exe
        .parent()
        .map(|bin| {
            vec![
                bin.join("..").join("share").join("pr-review").join("templates"),
                bin.join("..").join("templates"),
                bin.join("templates"),
            ]
        })
        .unwrap_or_default();

    let root = candidates
        .into_iter()
        .find(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from(BUNDLED_TEMPLATES));
    info!(path = %root.display(), "resolved template root");
    Ok(root)
}

/// Copies `<template_root>/prompts/<subdir>` over the profile's destination.
/// Existing files are overwritten; files absent from the template are left alone.
pub fn copy_prompts(template_root: &Path, profile: &AgentProfile) -> Result<CopiedPrompts> {
    let source = template_root.join("prompts").join(&profile.template_subdir);
    if !source.is_dir() {
        return Err(InstallError::MissingTemplate {
            agent: profile.display_name.clone(),
            path: source,
        }
        .into());
    }

    let files = copy_tree(&source, &profile.destination)?;
    Ok(CopiedPrompts {
        agent: profile.display_name.clone(),
        dir: profile.destination.clone(),
        files,
    })
}

fn copy_tree(source: &Path, destination: &Path) -> Result<usize> {
    fs::create_dir_all(destination)
        .with_context(|| format!("failed to create {}", destination.display()))?;

    let mut copied = 0;
    for entry in WalkDir::new(source).follow_links(true).min_depth(1) {
        let entry = entry.with_context(|| format!("failed to read {}", source.display()))?;
        let rel = entry.path().strip_prefix(source)?;
        let target = destination.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("failed to create {}", target.display()))?;
            continue;
        }

        // read-only templates produce read-only copies, so replace rather than truncate
        if target.is_file() {
            fs::remove_file(&target)
                .with_context(|| format!("failed to replace {}", target.display()))?;
        }
        fs::copy(entry.path(), &target).with_context(|| {
            format!(
                "failed to copy {} to {}",
                entry.path().display(),
                target.display()
            )
        })?;
        debug!(file = %target.display(), "copied template");
        copied += 1;
    }

    Ok(copied)
}

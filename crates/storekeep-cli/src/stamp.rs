//! `stamp-version`: writes the deployed commit and branch into `index.html`.
//!
//! The page carries `<meta name="deployment-version">` and
//! `<meta name="deployment-branch">` so a browser can tell which build it is
//! running. Existing tags are replaced; missing ones are inserted after the
//! viewport meta tag.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context;
use regex::{Captures, NoExpand, Regex};

const FALLBACK: &str = "dev";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeploymentInfo {
    pub commit: String,
    pub branch: String,
}

/// Resolve commit and branch from the Vercel build environment, then git,
/// then the `dev` fallback.
pub(crate) fn resolve_deployment_info<E, G>(env: E, git: G) -> DeploymentInfo
where
    E: Fn(&str) -> Option<String>,
    G: Fn(&[&str]) -> Option<String>,
{
    let commit = env("VERCEL_GIT_COMMIT_SHA")
        .map(|sha| sha.chars().take(7).collect())
        .or_else(|| git(&["rev-parse", "--short", "HEAD"]))
        .unwrap_or_else(|| {
            tracing::warn!("could not determine commit hash, using fallback");
            FALLBACK.to_string()
        });

    let branch = env("VERCEL_GIT_COMMIT_REF")
        .or_else(|| git(&["rev-parse", "--abbrev-ref", "HEAD"]))
        .unwrap_or_else(|| {
            tracing::warn!("could not determine branch, using fallback");
            FALLBACK.to_string()
        });

    DeploymentInfo { commit, branch }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn meta_regex(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"(?i)<meta\s+name=["']{name}["']\s+content=["'][^"']*["']\s*/?>"#
    ))
}

fn anchor_regex(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r#"(?i)(<meta\s+name=["']{name}["'][^>]*>)"#))
}

/// Replace `tag_regex`'s first match with `tag`, or insert `tag` on a new
/// line after the first anchor that matches. Returns `None` when neither is
/// present.
fn upsert_tag(html: &str, tag_regex: &Regex, tag: &str, anchors: &[&Regex]) -> Option<String> {
    if tag_regex.is_match(html) {
        return Some(tag_regex.replace(html, NoExpand(tag)).into_owned());
    }
    anchors.iter().find(|a| a.is_match(html)).map(|anchor| {
        anchor
            .replace(html, |caps: &Captures| format!("{}\n    {tag}", &caps[1]))
            .into_owned()
    })
}

/// Apply both deployment meta tags to `html`.
///
/// # Errors
///
/// Fails when the version tag is absent and there is no viewport meta tag
/// to insert it after.
pub(crate) fn stamp_html(html: &str, info: &DeploymentInfo) -> anyhow::Result<String> {
    let version_re = meta_regex("deployment-version")?;
    let branch_re = meta_regex("deployment-branch")?;
    let viewport_re = anchor_regex("viewport")?;
    let version_anchor_re = anchor_regex("deployment-version")?;

    let version_tag = format!(
        r#"<meta name="deployment-version" content="{}">"#,
        escape_attr(&info.commit)
    );
    let branch_tag = format!(
        r#"<meta name="deployment-branch" content="{}">"#,
        escape_attr(&info.branch)
    );

    let html = upsert_tag(html, &version_re, &version_tag, &[&viewport_re])
        .context("no viewport meta tag to insert deployment-version after")?;

    Ok(
        match upsert_tag(&html, &branch_re, &branch_tag, &[&version_anchor_re, &viewport_re]) {
            Some(updated) => updated,
            None => {
                tracing::warn!("no anchor for deployment-branch meta tag; leaving it out");
                html
            }
        },
    )
}

fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Stamp `path` in place.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, or if
/// [`stamp_html`] fails.
pub(crate) fn run_stamp_version(path: &Path) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let info = resolve_deployment_info(
        |key| std::env::var(key).ok().filter(|v| !v.is_empty()),
        |args| git_output(dir, args),
    );
    tracing::info!(commit = %info.commit, branch = %info.branch, "resolved deployment info");

    let html = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let stamped = stamp_html(&html, &info)?;
    std::fs::write(path, stamped)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "updated {} (version {}, branch {})",
        path.display(),
        info.commit,
        info.branch
    );
    Ok(())
}

//! One-time repository scaffolding for a new mirror repo.
//!
//! Reads `setup.json`, rewrites the README from a static template,
//! un-comments the CI workflow file and substitutes the add-on name
//! placeholder, and exports the add-on variables to the file named by
//! `GITHUB_ENV`. Pure templating; no network and no algorithmic content.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Placeholder in the workflow template replaced with the add-on URL name.
const WORKFLOW_NAME_PLACEHOLDER: &str = "ADDON_NAME_HERE";

/// Workflow file rewritten in place.
const WORKFLOW_PATH: &str = ".github/workflows/main.yml";

#[derive(Debug, Deserialize)]
struct SetupData {
    addon_author: String,
    curseforge_addon_url_name: String,
    addon_name: String,
}

fn render_readme(setup: &SetupData) -> String {
    format!(
        "# {addon} Mirror\n\n\
         This is a mirror of {author}'s {addon}\n\n\
         - [Curseforge URL](https://www.curseforge.com/wow/addons/{addon_url})\n\n\
         ----\n\n\
         To open a ticket related to this repository, please do so on \
         [this repository](https://github.com/curseforge-mirror/.github)",
        addon = setup.addon_name,
        author = setup.addon_author,
        addon_url = setup.curseforge_addon_url_name,
    )
}

/// Un-comments the template workflow and substitutes the add-on name.
fn rewrite_workflow(path: &Path, addon_url_name: &str) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read workflow at {}", path.display()))?;
    let contents = contents
        .replace("# ", "")
        .replace(WORKFLOW_NAME_PLACEHOLDER, addon_url_name);
    fs::write(path, contents)
        .with_context(|| format!("failed to write workflow at {}", path.display()))
}

fn rewrite_readme(path: &Path, setup: &SetupData) -> Result<()> {
    fs::write(path, render_readme(setup))
        .with_context(|| format!("failed to write README at {}", path.display()))
}

/// Appends the add-on variables to the GitHub Actions environment file.
fn export_github_env(path: &Path, setup: &SetupData) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open env file at {}", path.display()))?;
    writeln!(file, "ADDON_AUTHOR={}", setup.addon_author)?;
    writeln!(file, "ADDON_NAME={}", setup.addon_name)?;
    Ok(())
}

fn load_setup(root: &Path) -> Result<SetupData> {
    let path = root.join("setup.json");
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn run(root: &Path) -> Result<()> {
    let setup = load_setup(root)?;
    rewrite_workflow(&root.join(WORKFLOW_PATH), &setup.curseforge_addon_url_name)?;
    rewrite_readme(&root.join("README.md"), &setup)?;
    if let Ok(env_path) = std::env::var("GITHUB_ENV") {
        export_github_env(Path::new(&env_path), &setup)?;
    } else {
        eprintln!("GITHUB_ENV not set; skipping variable export");
    }
    Ok(())
}

fn main() -> Result<()> {
    run(Path::new("."))
}

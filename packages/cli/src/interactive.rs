//! Interactive menu for the spot map toolchain.
//!
//! Provides a menu-driven interface using `dialoguer` that builds the same
//! [`Commands`] value the CLI flags would, so both paths share one
//! executor.

use std::path::PathBuf;

use dialoguer::{Input, MultiSelect, Select};
use spotmap_generate::partition::DEFAULT_FILE_PREFIX;
use spotmap_spot_models::{Badge, PartitionMode};

use crate::Commands;

/// Top-level actions available in the interactive menu.
enum Action {
    Sanitize,
    Split,
    Merge,
    Derive,
    ListBadges,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Sanitize,
        Self::Split,
        Self::Merge,
        Self::Derive,
        Self::ListBadges,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Sanitize => "Sanitize a spot file",
            Self::Split => "Split spots into category files",
            Self::Merge => "Merge category files",
            Self::Derive => "Derive scores & badges",
            Self::ListBadges => "List badge codes",
        }
    }
}

/// Prompts for an action and its parameters.
///
/// # Errors
///
/// Returns an error if reading from the terminal fails.
pub fn run() -> Result<Commands, Box<dyn std::error::Error>> {
    println!("Spot Map Toolchain");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(match Action::ALL[idx] {
        Action::Sanitize => Commands::Sanitize {
            input: prompt_path("Input file", "spots.json")?,
            output: prompt_path("Output file", "spots.clean.json")?,
        },
        Action::Split => Commands::Split {
            input: prompt_path("Spot collection", "spots.json")?,
            out_dir: prompt_path("Output directory", "public/data")?,
            mode: prompt_mode()?,
            file_prefix: Input::new()
                .with_prompt("Index file prefix")
                .default(DEFAULT_FILE_PREFIX.to_string())
                .allow_empty(true)
                .interact_text()?,
            categories: prompt_optional_path("Category table (empty for built-in)")?,
        },
        Action::Merge => Commands::Merge {
            data_dir: prompt_path("Category directory", "public/data")?,
            output: prompt_path("Output file", "spots.merged.json")?,
        },
        Action::Derive => Commands::Derive {
            input: prompt_path("Spot collection", "spots.json")?,
            output: prompt_path("Output file", "spots.derived.json")?,
            badges: prompt_badges()?,
        },
        Action::ListBadges => Commands::Badges,
    })
}

fn prompt_path(prompt: &str, default: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;
    Ok(PathBuf::from(raw))
}

fn prompt_optional_path(prompt: &str) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let raw = raw.trim();
    Ok((!raw.is_empty()).then(|| PathBuf::from(raw)))
}

fn prompt_mode() -> Result<PartitionMode, Box<dyn std::error::Error>> {
    let modes = [PartitionMode::Replicate, PartitionMode::Primary];
    let labels = [
        "replicate (every category)",
        "primary (one category per spot)",
    ];

    let idx = Select::new()
        .with_prompt("Partition mode")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(modes[idx])
}

fn prompt_badges() -> Result<Vec<Badge>, Box<dyn std::error::Error>> {
    let labels: Vec<String> = Badge::all()
        .iter()
        .map(|b| format!("{:<7} {}", b.as_ref(), b.label()))
        .collect();

    let selected = MultiSelect::new()
        .with_prompt("Required badges (space to toggle, enter for none)")
        .items(&labels)
        .interact()?;

    Ok(selected.into_iter().map(|i| Badge::all()[i]).collect())
}

//! CLI command implementations.

pub mod analyze;
pub mod graph;
pub mod order;
pub mod semantics;
pub mod story;

use storyline::Storyline;

use crate::cli::TargetArgs;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the target and its system database.
fn open(target: &TargetArgs) -> Result<Storyline, Box<dyn std::error::Error>> {
    let system = target.system_path();
    tracing::debug!(db = %target.db.display(), system = %system.display(), "opening");
    Ok(Storyline::open(&target.db, system)?)
}

/// Open and refresh the metadata cache from the live schema.
fn open_refreshed(target: &TargetArgs) -> Result<Storyline, Box<dyn std::error::Error>> {
    let mut storyline = open(target)?;
    storyline.refresh_metadata()?;
    Ok(storyline)
}

/// Text progress bar for a 0..=100 percentage.
fn progress_bar(percentage: u8, width: usize) -> String {
    let filled = (usize::from(percentage.min(100)) * width) / 100;
    "█".repeat(filled) + &"░".repeat(width - filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 4), "░░░░");
        assert_eq!(progress_bar(50, 4), "██░░");
        assert_eq!(progress_bar(100, 4), "████");
        assert_eq!(progress_bar(255, 4), "████");
    }
}

//! Story commands - generate, inspect and edit the guided data-entry story.

use colored::Colorize;
use storyline::story::StepStatus;
use storyline::{StepUpdate, StoryStep};

use super::{open, progress_bar, CommandResult};
use crate::cli::TargetArgs;

/// Regenerate every step from the live schema.
pub fn reset(target: TargetArgs, json_output: bool) -> CommandResult {
    let mut storyline = open(&target)?;
    let steps = storyline.reset_story()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }

    println!(
        "{} {} steps generated",
        "Story reset:".green().bold(),
        steps.len()
    );
    println!();
    for step in &steps {
        print_step_line(step);
    }

    Ok(())
}

/// Show progress, generating the story on first use.
pub fn status(target: TargetArgs, all: bool, json_output: bool) -> CommandResult {
    let mut storyline = open(&target)?;
    let generated = storyline.initialize_story()?;
    let stale = !generated && storyline.is_story_stale()?;
    let progress = storyline.story_progress()?;

    if json_output {
        let mut value = serde_json::to_value(&progress)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("stale".to_string(), serde_json::Value::Bool(stale));
            if all {
                let steps = storyline.story_steps(true)?;
                object.insert("all_steps".to_string(), serde_json::to_value(&steps)?);
            }
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if generated {
        println!("{}", "Generated a new story from the current schema.".dimmed());
        println!();
    }
    if stale {
        println!(
            "{} the schema changed since the story was generated; run `storyline story reset` to regenerate",
            "Warning:".yellow().bold()
        );
        println!();
    }

    println!("{}", "Story progress".cyan().bold());
    println!(
        "  {} {:>3}%  ({}/{} steps)",
        progress_bar(progress.overall_percentage, 30),
        progress.overall_percentage,
        progress.completed_steps,
        progress.total_steps
    );
    println!();

    for status in &progress.steps {
        print_status_line(status);
    }

    if all {
        let disabled: Vec<StoryStep> = storyline
            .story_steps(true)?
            .into_iter()
            .filter(|step| !step.enabled)
            .collect();
        if !disabled.is_empty() {
            println!();
            println!("{}", "Disabled:".yellow().bold());
            for step in &disabled {
                print_step_line(step);
            }
        }
    }

    println!();
    match progress.current_step() {
        Some(current) => println!(
            "{} {} ({} of {} records)",
            "Next:".cyan().bold(),
            current.step.title.white().bold(),
            current.progress.current_count,
            current.progress.required
        ),
        None => println!("{}", "Story complete.".green().bold()),
    }

    Ok(())
}

/// Apply a sparse edit to one step.
pub fn edit(target: TargetArgs, id: i64, update: StepUpdate) -> CommandResult {
    if update.is_empty() {
        return Err("nothing to change; pass at least one of --title, --description, --min-records, --enabled, --order-index".into());
    }

    let mut storyline = open(&target)?;
    let step = storyline.update_step(id, &update)?;

    println!("{} step {}", "Updated".green().bold(), step.id);
    print_step_line(&step);

    Ok(())
}

/// Reorder steps to follow the given ids.
pub fn reorder(target: TargetArgs, ids: Vec<i64>) -> CommandResult {
    let mut storyline = open(&target)?;
    storyline.reorder_steps(&ids)?;

    println!("{} {} steps", "Reordered".green().bold(), ids.len());
    for step in storyline.story_steps(true)? {
        print_step_line(&step);
    }

    Ok(())
}

fn print_step_line(step: &StoryStep) {
    let enabled = if step.enabled {
        String::new()
    } else {
        " (disabled)".dimmed().to_string()
    };
    println!(
        "  {:>3}. [{}] {} {}{}",
        step.order_index,
        step.id,
        step.title.white(),
        format!("({} {})", step.source_type, step.source_name).dimmed(),
        enabled
    );
}

fn print_status_line(status: &StepStatus) {
    let progress = &status.progress;
    let mark = if progress.is_complete {
        "✓".green().to_string()
    } else {
        "·".yellow().to_string()
    };
    println!(
        "  {} {:<28} {} {:>3}%  {}/{}",
        mark,
        status.step.title,
        progress_bar(progress.percentage, 10),
        progress.percentage,
        progress.current_count,
        progress.required
    );
}

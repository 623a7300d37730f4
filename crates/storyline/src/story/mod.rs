//! Guided data-entry story: steps, default generation and progress.

mod materialize;
mod progress;
mod step;

pub use materialize::{describe, generate_default_steps, materialize_steps, title_case};
pub use progress::{step_progress, story_progress, StepProgress, StepStatus, StoryProgress};
pub use step::{NewStoryStep, SourceType, StepUpdate, StoryStep};

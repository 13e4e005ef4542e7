use time::OffsetDateTime;

use crate::core::model::Project;

const EXCERPT_CHARS: usize = 100;

/// First hundred characters of the description followed by an ellipsis.
pub fn excerpt(description: &str) -> String {
    let head: String = description.chars().take(EXCERPT_CHARS).collect();
    format!("{head}...")
}

pub fn relative_due(project: &Project, now: OffsetDateTime) -> String {
    let days = (project.due_date - now.date()).whole_days();
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if d > 0 => format!("in {d} days"),
        d => format!("{} days ago", -d),
    }
}

// src/cli/progress.rs — Terminal progress renderer

use crate::core::types::ProgressEvent;
use crate::util::preview;

/// One-line rendering of an event.
pub fn format_event(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::QuestionStart {
            index,
            total,
            pair,
            question,
        } => format!(
            "\n[{}/{}] {} | {}",
            index,
            total,
            pair,
            preview(question, 80)
        ),
        ProgressEvent::StateEntered { state } => format!("  -> {}", state),
        ProgressEvent::SearchDispatched { queries } => {
            format!("     searched {} quer{}", queries, if *queries == 1 { "y" } else { "ies" })
        }
        ProgressEvent::Decision {
            signal,
            messages,
            tool_results,
        } => format!(
            "     {} (messages={}, tool_results={})",
            signal, messages, tool_results
        ),
        ProgressEvent::Evaluated { winner } => format!("  [eval] pairwise winner: {}", winner),
        ProgressEvent::QuestionFailed { index, error } => {
            format!("  [skip] question {} failed: {}", index, error)
        }
    }
}

/// Build a progress callback that writes formatted output to stderr.
///
/// All progress output goes to stderr so stdout stays clean for the summary.
pub fn terminal_progress() -> impl Fn(ProgressEvent) + Send + Sync + 'static {
    move |event| eprintln!("{}", format_event(&event))
}

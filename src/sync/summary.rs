use super::models::WorkItem;

/// Longest summary sent to the tracker, in characters.
pub const MAX_SUMMARY_CHARS: usize = 250;

/// Summary used when a work item yields no text at all.
pub const FALLBACK_SUMMARY: &str = "User Story";

/// Derive the issue summary for a work item.
///
/// `As {actor}, {content}` when an actor is set, otherwise the content
/// verbatim. Empty text falls back to [`FALLBACK_SUMMARY`]. The result is
/// cut at [`MAX_SUMMARY_CHARS`] characters.
pub fn derive_summary(item: &WorkItem) -> String {
    let text = match item.actor.as_deref().filter(|a| !a.is_empty()) {
        Some(actor) => format!("As {}, {}", actor, item.content),
        None => item.content.clone(),
    };

    if text.is_empty() {
        return FALLBACK_SUMMARY.to_string();
    }

    match text.char_indices().nth(MAX_SUMMARY_CHARS) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}

//! Rulebook corpus assembly and prompt context.

/// Keep the first `max_chars` characters of `text`.
///
/// Counts characters, not bytes, so multi-byte text is never split inside a
/// code point. Idempotent and prefix-preserving.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Concatenate extracted texts as `"\nFILE: {name}\n{text}"` blocks.
///
/// Entries without text are skipped.
pub fn assemble<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut corpus = String::new();
    for (file_name, text) in entries {
        let Some(text) = text else {
            log::debug!("Skipping {file_name}: no extracted text");
            continue;
        };
        corpus.push_str("\nFILE: ");
        corpus.push_str(file_name);
        corpus.push('\n');
        corpus.push_str(text);
    }
    corpus
}

pub const NO_RULEBOOK_NOTE: &str =
    "Note: No official rulebook PDF was provided. Rely on your internal knowledge.";

/// The shared context block placed in front of the Oracle and Assistant
/// prompts.
pub fn context_block(game_title: Option<&str>, corpus: &str) -> String {
    let mut block = String::new();
    if let Some(title) = game_title {
        block.push_str(&format!("Game Title: {title}\n\n"));
    }
    if corpus.is_empty() {
        block.push_str(NO_RULEBOOK_NOTE);
    } else {
        block.push_str(&format!(
            "Official Rules (Context from PDFs):\n---\n{corpus}\n---"
        ));
    }
    block
}

use super::types::AnnotatedFragment;
use crate::conventions::Conventions;
use crate::error::WeaveError;
use tracing::debug;

/// Fragments in source order, plus the number of dangling open markers.
pub fn scan_fragments(
    source: &str,
    conv: &Conventions,
) -> Result<(Vec<AnnotatedFragment>, usize), WeaveError> {
    let open = conv.fragment_open.as_str();
    let close = conv.fragment_close.as_str();

    let mut fragments = Vec::new();
    let mut dropped = 0usize;
    let mut pos = 0usize;

    // Incremental line counting: `line` is the line number at `counted_to`.
    let mut line = 1usize;
    let mut counted_to = 0usize;

    while let Some(rel) = source[pos..].find(open) {
        let open_at = pos + rel;
        line += count_newlines(&source[counted_to..open_at]);
        counted_to = open_at;

        let code_start = open_at + open.len();
        let close_at = source[code_start..].find(close).map(|i| code_start + i);
        let next_open = source[code_start..].find(open).map(|i| code_start + i);

        let Some(close_at) = close_at else {
            debug!("dropping unterminated fragment at line {}", line);
            dropped += 1;
            pos = code_start;
            continue;
        };

        if let Some(inner) = next_open.filter(|&inner| inner < close_at) {
            return Err(WeaveError::NestedFragment {
                line: line + count_newlines(&source[open_at..inner]),
                open_line: line,
            });
        }

        fragments.push(AnnotatedFragment {
            source_line: line,
            code: source[code_start..close_at].trim().to_string(),
        });
        pos = close_at + close.len();
    }

    Ok((fragments, dropped))
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

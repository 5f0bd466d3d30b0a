//! Low-level text scanning helpers shared by the statement parsers.

/// Split a QIF detail line into its single-character tag and the value that
/// follows it.
///
/// Returns `None` for an empty line. Leading and trailing whitespace is
/// trimmed from the value.
pub(crate) fn split_tag_line(line: &str) -> Option<(char, &str)> {
    let tag = line.chars().next()?;
    let value = line[tag.len_utf8()..].trim();

    Some((tag, value))
}

/// Extract the content of every `<TAG>...</TAG>` block in `text`.
///
/// Tag matching is ASCII case-insensitive. A block that is never closed runs
/// to the next opening tag, or to the end of the input.
pub(crate) fn find_tag_blocks<'a>(text: &'a str, tag: &str) -> Vec<&'a str> {
    let haystack = text.to_ascii_uppercase();
    let open_tag = format!("<{}>", tag.to_ascii_uppercase());
    let close_tag = format!("</{}>", tag.to_ascii_uppercase());

    let mut blocks = Vec::new();
    let mut search_start = 0;

    while let Some(offset) = haystack[search_start..].find(&open_tag) {
        let content_start = search_start + offset + open_tag.len();
        let content = &haystack[content_start..];

        // An unterminated block ends where the next one begins, so a block
        // ends at whichever of the two tags appears first.
        let next_close = content.find(&close_tag);
        let next_open = content.find(&open_tag);

        let content_end = match (next_close, next_open) {
            (Some(close), Some(open)) => content_start + close.min(open),
            (Some(end), None) | (None, Some(end)) => content_start + end,
            (None, None) => haystack.len(),
        };

        // Uppercasing ASCII preserves byte offsets, so the indices found in
        // `haystack` can be used to slice the original text.
        blocks.push(&text[content_start..content_end]);
        search_start = content_end;
    }

    blocks
}

/// Extract the value of the first `<TAG>` field within an SGML block.
///
/// The value runs from the end of the tag to the next tag or line ending,
/// whichever comes first. Returns `None` when the tag is absent or its value
/// is blank.
pub(crate) fn tag_value<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    let haystack = block.to_ascii_uppercase();
    let open_tag = format!("<{}>", tag.to_ascii_uppercase());

    let value_start = haystack.find(&open_tag)? + open_tag.len();
    let value = &block[value_start..];
    let value_end = value.find(['<', '\r', '\n']).unwrap_or(value.len());
    let value = value[..value_end].trim();

    if value.is_empty() { None } else { Some(value) }
}

use crate::models::entry::{AggregateResult, Sentinel};
use crate::models::size::human_readable_size;

const INDENT: &str = "  ";

/// One report line: `name size`, indented two spaces per depth level.
pub fn render_line(depth: usize, name: &str, size: i64) -> String {
    format!("{}{} {}\n", INDENT.repeat(depth), name, human_readable_size(size))
}

pub fn render_sentinel(depth: usize, name: &str, sentinel: Sentinel) -> String {
    format!("{}{}{}\n", INDENT.repeat(depth), name, sentinel.marker())
}

/// A child result together with its position in the parent's listing.
#[derive(Debug)]
pub struct ChildResult {
    pub index: usize,
    pub result: AggregateResult,
}

/// Merge one directory's child results into its own result.
///
/// Children are ordered by size, largest first; equal sizes keep listing
/// order no matter which task finished first. Text is only kept when the
/// children's depth is within `max_print_depth`, but sizes always count.
pub fn assemble(
    mut children: Vec<ChildResult>,
    depth: usize,
    max_print_depth: usize,
    hidden_size: i64,
) -> AggregateResult {
    children.sort_by_key(|c| c.index);
    children.sort_by(|a, b| b.result.size.cmp(&a.result.size));

    let size = children.iter().map(|c| c.result.size).sum::<i64>() + hidden_size;

    let mut text = String::new();
    if depth <= max_print_depth {
        for child in &children {
            text.push_str(&child.result.text);
        }
    }

    AggregateResult::new(text, size)
}

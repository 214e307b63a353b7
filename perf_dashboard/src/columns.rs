//! Column projection helpers.
//!
//! Removing columns from a table shifts every later column left, so every
//! positional structure (rules, spans, sort keys) goes through [`remap_index`].

/// New index of `column` once the columns in `removed` (sorted, ascending)
/// are gone, or `None` if `column` itself was removed.
pub fn remap_index(column: usize, removed: &[usize]) -> Option<usize> {
    match removed.binary_search(&column) {
        Ok(_) => None,
        Err(shift) => Some(column - shift),
    }
}

/// Indices of the columns whose title is listed in `hidden`, in ascending order.
///
/// Titles that do not exist in the table are reported and ignored. A title
/// that appears several times hides every column carrying it.
pub fn hidden_column_indices(titles: &[String], hidden: &[String]) -> Vec<usize> {
    for title in hidden {
        if !titles.contains(title) {
            log::warn!("Cannot hide unknown column '{}'", title);
        }
    }

    titles
        .iter()
        .enumerate()
        .filter(|(_, title)| hidden.contains(*title))
        .map(|(i, _)| i)
        .collect()
}

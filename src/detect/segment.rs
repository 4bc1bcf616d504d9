/// Default minimum of non-empty cells for a row to count as table-like.
pub const MIN_NON_NULL: usize = 2;
/// Default minimum number of rows for a run to count as a candidate table.
pub const MIN_ROWS: usize = 2;

/// Partitions row indexes into contiguous candidate-table ranges.
///
/// A row qualifies when its non-empty cell count reaches `min_non_null`;
/// maximal runs of consecutive qualifying rows shorter than `min_rows` are
/// discarded. Ranges are inclusive, disjoint and ordered by start index.
/// An empty result means the caller should treat the whole grid as a single
/// segment; that fallback lives in the table detector, not here.
pub fn find_segments(
    non_null_counts: &[usize],
    min_non_null: usize,
    min_rows: usize,
) -> Vec<(usize, usize)> {
    let mut good = non_null_counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count >= min_non_null)
        .map(|(index, _)| index);

    let mut segments = Vec::new();
    let Some(first) = good.next() else {
        return segments;
    };
    let mut start = first;
    let mut prev = first;
    for row in good {
        if row == prev + 1 {
            prev = row;
        } else {
            if prev - start + 1 >= min_rows {
                segments.push((start, prev));
            }
            start = row;
            prev = row;
        }
    }
    if prev - start + 1 >= min_rows {
        segments.push((start, prev));
    }
    segments
}

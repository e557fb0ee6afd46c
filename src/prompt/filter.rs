//! Query filtering and cursor arithmetic shared by both prompts.

use crate::core::FuzzyMatcher;

use super::choice::Entry;

/// A visible choice: entry `index` with matched char positions in its search key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Row {
    pub(crate) index: usize,
    pub(crate) positions: Vec<u32>,
}

/// The rows visible for the current query.
///
/// `selectable` lists the positions in `rows` the cursor can land on; the
/// prompts' cursor indexes into it.
#[derive(Debug, Clone, Default)]
pub(crate) struct FilteredView {
    pub(crate) rows: Vec<Row>,
    pub(crate) selectable: Vec<usize>,
}

impl FilteredView {
    /// Filter `entries` by `query`.
    ///
    /// `keys[i]` is the search key of entry `i`. Separators never match. A
    /// blank query keeps every choice in original order; otherwise matches
    /// are ranked.
    pub(crate) fn compute<V>(
        matcher: &mut FuzzyMatcher,
        entries: &[Entry<V>],
        keys: &[String],
        query: &str,
    ) -> Self {
        let candidates = entries
            .iter()
            .zip(keys)
            .enumerate()
            .filter(|(_, (entry, _))| entry.as_choice().is_some())
            .map(|(index, (_, key))| (index, key.as_str()));

        let rows: Vec<Row> = matcher
            .find(query, candidates)
            .into_iter()
            .map(|m| Row {
                index: m.index,
                positions: m.positions,
            })
            .collect();

        let selectable = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| entries[row.index].is_selectable())
            .map(|(pos, _)| pos)
            .collect();

        Self { rows, selectable }
    }

    /// Number of rows the cursor can land on.
    pub(crate) fn selectable_count(&self) -> usize {
        self.selectable.len()
    }

    /// Position in `rows` of the cursor, if it lands anywhere.
    pub(crate) fn row_position(&self, cursor: usize) -> Option<usize> {
        self.selectable.get(cursor).copied()
    }

    /// Original entry index under the cursor.
    pub(crate) fn entry_at(&self, cursor: usize) -> Option<usize> {
        self.row_position(cursor).map(|pos| self.rows[pos].index)
    }
}

/// Direction of a cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Up,
    Down,
}

/// Bring `cursor` back into `[0, count)` after the list changed size.
///
/// Left untouched when nothing is selectable, so it can wrap again once
/// the list grows back.
pub(crate) fn wrap_cursor(cursor: usize, count: usize) -> usize {
    if count == 0 {
        cursor
    } else {
        cursor % count
    }
}

/// Move `cursor` one step with wraparound. No-op when nothing is selectable.
pub(crate) fn step_cursor(cursor: usize, count: usize, step: Step) -> usize {
    if count == 0 {
        return cursor;
    }
    let cursor = cursor % count;
    match step {
        Step::Up => (cursor + count - 1) % count,
        Step::Down => (cursor + 1) % count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Choice, Disabled, Separator};

    fn entries() -> Vec<Entry<&'static str>> {
        vec![
            Choice::new("alpha").into(),
            Separator::default().into(),
            Choice::new("beta").disabled(Disabled::Yes).into(),
            Choice::new("gamma").into(),
        ]
    }

    fn keys(entries: &[Entry<&'static str>]) -> Vec<String> {
        entries
            .iter()
            .map(|e| e.as_choice().map(|c| c.value.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn blank_query_keeps_every_choice_in_order() {
        let entries = entries();
        let view = FilteredView::compute(&mut FuzzyMatcher::new(), &entries, &keys(&entries), "");
        let indices: Vec<usize> = view.rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
        assert_eq!(view.selectable, vec![0, 2]);
        assert_eq!(view.entry_at(1), Some(3));
    }

    #[test]
    fn query_keeps_disabled_visible() {
        let entries = entries();
        let view = FilteredView::compute(&mut FuzzyMatcher::new(), &entries, &keys(&entries), "a");
        assert!(view.rows.iter().all(|r| entries[r.index].as_choice().is_some()));
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.selectable_count(), 2);
    }

    #[test]
    fn unmatched_query_is_empty() {
        let entries = entries();
        let view = FilteredView::compute(&mut FuzzyMatcher::new(), &entries, &keys(&entries), "zzz");
        assert!(view.rows.is_empty());
        assert_eq!(view.entry_at(0), None);
    }

    #[test]
    fn step_wraps_both_ways() {
        assert_eq!(step_cursor(0, 3, Step::Up), 2);
        assert_eq!(step_cursor(2, 3, Step::Down), 0);
        assert_eq!(step_cursor(1, 0, Step::Down), 1);
    }

    #[test]
    fn wrap_is_modular() {
        assert_eq!(wrap_cursor(5, 3), 2);
        assert_eq!(wrap_cursor(5, 0), 5);
        assert_eq!(wrap_cursor(1, 3), 1);
    }
}

//! Selection policy: line numbering, omission set, start/end bounds.

use std::collections::BTreeSet;

/// Ordered list of selected frame indices, one per detected tab line.
/// Insertion order is detection order is presentation order (top line
/// first); indices are strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetFrameList(Vec<u64>);

impl SheetFrameList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a selection. Callers must append in scan order.
    pub fn push(&mut self, index: u64) {
        debug_assert!(self.0.last().is_none_or(|&last| index > last));
        self.0.push(index);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<u64> {
        self.0.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }
}

/// One retained tab line: its 1-based line number from the scan and the
/// frame index to export it from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLine {
    pub number: usize,
    pub frame_index: u64,
}

/// Filter parameters applied at export time.
#[derive(Debug, Clone, Default)]
pub struct LineFilter {
    /// 1-based line numbers to discard.
    pub omit: BTreeSet<usize>,
    /// Inclusive lower bound on retained line numbers.
    pub first_line: Option<usize>,
    /// Inclusive upper bound on retained line numbers.
    pub last_line: Option<usize>,
}

impl LineFilter {
    fn retains(&self, number: usize) -> bool {
        !self.omit.contains(&number)
            && self.first_line.is_none_or(|lo| number >= lo)
            && self.last_line.is_none_or(|hi| number <= hi)
    }
}

/// Number the scanned frames 1-based and drop the ones the filter
/// excludes. Line numbers survive filtering, so reapplying the same
/// filter is a no-op.
pub fn select_lines(frames: &SheetFrameList, filter: &LineFilter) -> Vec<SheetLine> {
    let numbered = frames
        .iter()
        .enumerate()
        .map(|(i, frame_index)| SheetLine {
            number: i + 1,
            frame_index,
        })
        .collect();
    apply_filter(numbered, filter)
}

/// Apply the filter to an already-numbered selection.
pub fn apply_filter(lines: Vec<SheetLine>, filter: &LineFilter) -> Vec<SheetLine> {
    lines
        .into_iter()
        .filter(|line| filter.retains(line.number))
        .collect()
}

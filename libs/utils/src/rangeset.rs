// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! A set of non-overlapping ranges of positive integers.

use std::{cmp::Ordering, iter::Sum};

use num_traits::{PrimInt, Unsigned};
use thiserror::Error;

/// Rangeset creation errors.
#[derive(Debug, Error)]
pub enum NewRangeSetError {
    /// Invalid ranges.
    #[error("ranges must be non-empty, non-overlapping and sorted by start")]
    InvalidRanges,
}

/// A set of non-overlapping ranges of positive integers.
///
/// Ranges are kept sorted by start address and coalesced: no two stored ranges
/// overlap or touch.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct RangeSet<T: PrimInt + Unsigned + Sum<T>> {
    ranges: Vec<Range<T>>,
}

impl<T: PrimInt + Unsigned + Sum<T>> RangeSet<T> {
    /// Creates a new RangeSet from a vector of ranges. The ranges must be
    /// non-empty, non-overlapping and sorted by start; adjacent ranges are
    /// coalesced.
    pub fn new(ranges: Vec<Range<T>>) -> Result<Self, NewRangeSetError> {
        for i in 0..ranges.len() {
            // check if the range is valid
            if ranges[i].start >= ranges[i].end {
                return Err(NewRangeSetError::InvalidRanges);
            }
            // check if the ranges are non-overlapping
            if i == 0 {
                continue;
            }
            if ranges[i - 1].end > ranges[i].start {
                return Err(NewRangeSetError::InvalidRanges);
            }
        }
        let mut set = Self { ranges: Vec::new() };
        for range in ranges {
            set.merge_range(range);
        }
        Ok(set)
    }

    /// Creates an empty RangeSet.
    pub fn empty() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Returns true if the range set is empty.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the total length of all ranges in the set.
    pub fn len(&self) -> T {
        self.ranges.iter().map(|range| range.len()).sum()
    }

    /// Returns true if the value is contained in the range set.
    pub fn contains(&self, value: T) -> bool {
        self.ranges
            .binary_search_by(|range| range.compare(&value))
            .is_ok()
    }

    /// Returns true if the whole given range is contained in the set.
    pub fn contains_range(&self, range: &Range<T>) -> bool {
        if range.is_empty() {
            return true;
        }
        match self
            .ranges
            .binary_search_by(|stored| stored.compare(&range.start))
        {
            // Stored ranges are coalesced, so a containing range is a single
            // stored entry.
            Ok(i) => self.ranges[i].end >= range.end,
            Err(_) => false,
        }
    }

    /// Returns true if the two sets share at least one value.
    pub fn intersects(&self, other: &Self) -> bool {
        let (a, b) = (&self.ranges, &other.ranges);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if a[i].end <= b[j].start {
                i += 1;
            } else if b[j].end <= a[i].start {
                j += 1;
            } else {
                return true;
            }
        }
        false
    }

    /// Inserts a whole range into the set, merging it with any overlapping or
    /// adjacent stored ranges.
    pub fn merge_range(&mut self, range: Range<T>) {
        if range.is_empty() {
            return;
        }
        // Index of the first stored range that could overlap or touch.
        let first = self.ranges.partition_point(|r| r.end < range.start);
        let mut merged = range;
        let mut last = first;
        while last < self.ranges.len() && self.ranges[last].start <= merged.end {
            merged.start = merged.start.min(self.ranges[last].start);
            merged.end = merged.end.max(self.ranges[last].end);
            last += 1;
        }
        self.ranges.splice(first..last, [merged]);
    }

    /// Combines two sets with a boolean membership function.
    ///
    /// `keep` is evaluated once per elementary interval of the combined
    /// boundary sweep and decides whether the interval belongs to the result.
    fn combine(&self, other: &Self, keep: impl Fn(bool, bool) -> bool) -> Self {
        let mut points: Vec<T> = Vec::with_capacity(2 * (self.ranges.len() + other.ranges.len()));
        for range in self.ranges.iter().chain(other.ranges.iter()) {
            points.push(range.start);
            points.push(range.end);
        }
        points.sort_unstable();
        points.dedup();

        let mut ranges: Vec<Range<T>> = Vec::new();
        for window in points.windows(2) {
            let (start, end) = (window[0], window[1]);
            if keep(self.contains(start), other.contains(start)) {
                match ranges.last_mut() {
                    Some(last) if last.end == start => last.end = end,
                    _ => ranges.push(Range::new(start, end)),
                }
            }
        }
        Self { ranges }
    }

    /// Returns the union of the two sets.
    pub fn union(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a || b)
    }

    /// Returns the intersection of the two sets.
    pub fn intersection(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a && b)
    }

    /// Returns the values of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a && !b)
    }

    /// Returns the values contained in exactly one of the two sets.
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a != b)
    }

    /// Returns the ranges in the set.
    pub fn ranges(&self) -> &[Range<T>] {
        &self.ranges
    }
}

/// A half-open range of positive integers.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub struct Range<T: Ord + Copy> {
    /// Start of the range.
    pub start: T,
    /// End of the range, exclusive.
    pub end: T,
}

impl<T: Ord + Copy> Range<T> {
    /// Creates a new range.
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    /// Compare the range to a value.
    pub fn compare(&self, other: &T) -> Ordering {
        if self.start <= *other && self.end > *other {
            Ordering::Equal
        } else if self.start > *other {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }

    /// Returns true if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl<T: Ord + Copy + std::ops::Sub<Output = T>> Range<T> {
    /// Return the length of the range.
    pub fn len(&self) -> T {
        self.end - self.start
    }
}

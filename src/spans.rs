/*
    MIT License

    Copyright (c) 2026 The charter developers

    Permission is hereby granted, free of charge, to any person obtaining a copy
    of this software and associated documentation files (the "Software"), to deal
    in the Software without restriction, including without limitation the rights
    to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
    copies of the Software, and to permit persons to whom the Software is
    furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in all
    copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
    OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
    SOFTWARE.
*/

//! Segmented list of spans over one append-only buffer

use crate::reserved::{ReservedVec, Result};

/// Append-only list partitioned into segments.
///
/// All elements live in one [ReservedVec]; `starts` records the offset at
/// which each segment begins. Closed segments are delimited by the start of
/// their successor, the open segment runs to the buffer tail. The recognizer
/// stores one state set per segment.
///
/// Appending goes through `&self` (see [ReservedVec::push]), so slices of
/// closed segments and the [live view](SpanList::current_segment) of the open
/// segment stay usable while items are pushed. Opening a segment takes
/// `&mut self` and thereby ends all outstanding views.
///
/// Offsets are `u32`: the list addresses at most 2^32 items.
#[derive(Debug)]
pub struct SpanList<T: Copy> {
    /// Backing buffer holding every segment back to back.
    items: ReservedVec<T>,

    /// Offset of the first element of each segment.
    starts: Vec<u32>,
}

impl<T: Copy> SpanList<T> {
    /// Create a list with no segments, able to hold `capacity` elements in
    /// total.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            items: ReservedVec::new(capacity)?,
            starts: Vec::new(),
        })
    }

    /// Close the current segment and open a new, empty one at the tail.
    pub fn open_segment(&mut self) {
        debug_assert!(self.items.len() <= std::u32::MAX as usize);
        self.starts.push(self.items.len() as u32);
    }

    /// Append to the open segment.
    ///
    /// At least one segment must have been opened.
    pub fn push(&self, value: T) -> Result<&T> {
        debug_assert!(!self.starts.is_empty());
        self.items.push(value)
    }

    /// Append every element of an iterator to the open segment.
    pub fn append<I>(&self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.push(value)?;
        }
        Ok(())
    }

    /// Number of segments opened so far.
    pub fn segment_count(&self) -> usize {
        self.starts.len()
    }

    /// Total number of elements over all segments.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bounds of a segment in the backing buffer. The open segment ends at
    /// the live tail.
    fn bounds(&self, segment: usize) -> (usize, usize) {
        let start = self.starts[segment] as usize;
        let end = match self.starts.get(segment + 1) {
            Some(&next) => next as usize,
            None => self.items.len(),
        };
        (start, end)
    }

    /// The elements of segment `segment` as a slice.
    ///
    /// The slice end is fixed at the time of the call; for the open segment,
    /// elements pushed later are not part of it. Use
    /// [current_segment](SpanList::current_segment) for a view that grows.
    pub fn segment(&self, segment: usize) -> &[T] {
        let (start, end) = self.bounds(segment);
        &self.items.as_slice()[start..end]
    }

    /// Number of elements currently in segment `segment`.
    pub fn segment_len(&self, segment: usize) -> usize {
        let (start, end) = self.bounds(segment);
        end - start
    }

    /// Element `index` of segment `segment`, observing the live end of the
    /// open segment.
    pub fn get(&self, segment: usize, index: usize) -> Option<&T> {
        let (start, end) = self.bounds(segment);
        let offset = start + index;
        if offset < end {
            self.items.get(offset)
        } else {
            None
        }
    }

    /// Lazy iterator over the open segment.
    ///
    /// The iterator observes elements appended after it was created: it keeps
    /// yielding until it catches up with the live tail of the buffer.
    pub fn current_segment(&self) -> CurrentSegment<T> {
        CurrentSegment {
            list: self,
            next: self.starts.last().map_or(0, |&s| s as usize),
        }
    }
}

/// Live iterator over the open segment of a [SpanList].
///
/// Yields elements by value.
pub struct CurrentSegment<'a, T: Copy> {
    list: &'a SpanList<T>,
    next: usize,
}

impl<'a, T: Copy> Iterator for CurrentSegment<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.list.items.get(self.next).copied();
        if item.is_some() {
            self.next += 1;
        }
        item
    }
}

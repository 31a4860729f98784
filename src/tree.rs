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

//! Derivation walks over a finished chart

use crate::grammar::{EarleyItem, GrammarIndex, Symbol};
use crate::spans::SpanList;

/// Location of an Earley item in a chart: the state set that holds it and
/// its offset within that set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ItemLocation {
    /// Index of the state set.
    pub set: usize,

    /// Offset of the item within the state set.
    pub index: usize,
}

/// Find the item that derives the start symbol over the whole input.
///
/// Returns the location of the first item in state set `input_len` that is
/// complete, starts at position 0 and has `start` as its left-hand side.
/// Returns None if the chart has fewer than `input_len + 1` state sets (the
/// input was not fully consumed) or no such item exists.
///
/// An ambiguous grammar can put several such items in the state set; the
/// first one wins. Callers wanting the alternatives enumerate the set
/// themselves.
pub fn find_full_parse<T, S>(
    grammar: &GrammarIndex<T, S>,
    start: S,
    chart: &SpanList<EarleyItem>,
    input_len: usize,
) -> Option<ItemLocation>
where
    S: Symbol<T>,
{
    if chart.segment_count() < input_len + 1 {
        return None;
    }
    chart
        .segment(input_len)
        .iter()
        .position(|&item| {
            grammar.is_complete(item) && item.start == 0 && grammar.lhs(item.rule) == start
        })
        .map(|index| ItemLocation {
            set: input_len,
            index,
        })
}

/// Find a completed item for `sym` in a state set.
///
/// Returns the offset of the first completed item whose left-hand side is
/// `sym`. Pass a subslice starting behind a previous hit to enumerate the
/// alternatives of an ambiguous derivation.
///
/// TODO: Filter by start position when the parent's child boundary is known.
/// For highly ambiguous grammars the first completed item may belong to a
/// subderivation that cannot extend to the parent's start.
pub fn find_completed_item<T, S>(
    grammar: &GrammarIndex<T, S>,
    items: &[EarleyItem],
    sym: S,
) -> Option<usize>
where
    S: Symbol<T>,
{
    items
        .iter()
        .position(|&item| grammar.is_complete(item) && grammar.lhs(item.rule) == sym)
}

/// Step the state-set cursor back over a scanned terminal.
///
/// The matching terminal was consumed by the scan that produced the current
/// state set, so the preceding set becomes relevant.
pub fn advance_from_terminal(set: &mut usize) {
    debug_assert!(*set > 0);
    *set -= 1;
}

/// Step the state-set cursor to the origin of a completed subderivation.
pub fn advance_from_nonterminal(set: &mut usize, completed: &EarleyItem) {
    *set = completed.start as usize;
}

/// One child of a completed item, as reported by [visit_children].
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Child<S> {
    /// A terminal of the rule, matched by the scan that produced state set
    /// `end`. The corresponding input token sits at position `end - 1`.
    Terminal { sym: S, end: usize },

    /// A completed subderivation; its item sits in state set `set`.
    Completed { item: EarleyItem, set: usize },
}

/// Visit the children of a completed item, from the last right-hand side
/// symbol to the first.
///
/// `end` is the state set holding `item`. A cursor runs backwards through
/// the state sets: a terminal child steps it back by one, a nonterminal
/// child jumps to the start position of the completed item selected for it.
/// The walk can only go right to left: the chart records where each child
/// began, not where it ended.
///
/// Only this item's own right-hand side is visited; recurse on the reported
/// [Child::Completed] items to walk the whole derivation. Where several
/// completed items could fill a slot, the first one in the state set is
/// chosen (see [find_completed_item]).
///
/// Returns None if no completed item can be found for a nonterminal child.
/// This does not happen for completed items taken from a chart produced by
/// [parse](crate::parse).
pub fn visit_children<T, S, F>(
    grammar: &GrammarIndex<T, S>,
    chart: &SpanList<EarleyItem>,
    item: EarleyItem,
    end: usize,
    visit: &mut F,
) -> Option<()>
where
    S: Symbol<T>,
    F: FnMut(Child<S>),
{
    debug_assert!(grammar.is_complete(item));
    let mut set = end;
    for &sym in grammar.rhs(item.rule).iter().rev() {
        if sym.is_terminal() {
            visit(Child::Terminal { sym, end: set });
            advance_from_terminal(&mut set);
        } else {
            let index = find_completed_item(grammar, chart.segment(set), sym)?;
            let child = chart.segment(set)[index];
            visit(Child::Completed { item: child, set });
            advance_from_nonterminal(&mut set, &child);
        }
    }
    Some(())
}

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

//! Generic Earley recognition over stable-address parse charts.
//!
//! The crate parses a stream of tokens against a context-free grammar and
//! keeps every Earley item the algorithm considers in a chart: one state set
//! per input position, all sets stored back to back in a single
//! virtual-memory reservation. Because the backing memory never moves,
//! the recognizer can read earlier state sets, and even the one it is
//! currently filling, while it appends to it.
//!
//! The grammar author supplies a symbol type implementing [Symbol] and a
//! table of [Rule]s grouped by left-hand side. A parse goes through three
//! steps:
//!
//! ```ignore
//! let grammar = GrammarIndex::build(&rules);
//! let chart = parse(&grammar, start, item_capacity, input)?;
//! if let Some(root) = find_full_parse(&grammar, start, &chart, input_len) {
//!     // Walk the derivation right to left with visit_children.
//! }
//! ```
//!
//! The recognizer handles empty productions, including cyclic ones, via the
//! nullable advance during prediction. It recognizes; it does not enumerate
//! the derivations of an ambiguous input. [visit_children] reconstructs one
//! concrete derivation from the chart.

mod grammar;
mod parser;
mod reserved;
mod spans;
mod tree;

pub use grammar::{DottedSymbol, EarleyItem, GrammarIndex, Rule, RuleId, Symbol};
pub use parser::{
    dotted_to_string, expected_terminals, parse, print_chart, trace_chart,
};
pub use reserved::{Error, ReservedVec, Result};
pub use spans::{CurrentSegment, SpanList};
pub use tree::{
    advance_from_nonterminal, advance_from_terminal, find_completed_item, find_full_parse,
    visit_children, Child, ItemLocation,
};

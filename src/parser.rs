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

//! Earley recognizer

use std::fmt;
use std::hash::Hash;

use itertools::Itertools;
use log::{debug, trace};

use crate::grammar::{DottedSymbol, EarleyItem, GrammarIndex, RuleId, Symbol};
use crate::reserved::Result;
use crate::spans::SpanList;

/// Add an item to the open segment if an equal item is not already there.
///
/// State sets have set semantics; without this check the fixed point would
/// diverge on left-recursive and cyclic nullable grammars.
fn push_if_absent(chart: &SpanList<EarleyItem>, item: EarleyItem) -> Result<()> {
    for existing in chart.current_segment() {
        if existing == item {
            return Ok(());
        }
    }
    chart.push(item)?;
    Ok(())
}

/// Recognize `input` against a grammar, producing one state set per consumed
/// token plus the initial one.
///
/// State set `i` of the returned chart holds the Earley items that apply
/// after `i` tokens of the input. The chart has `k + 1` segments where `k` is
/// the number of tokens consumed before no further progress was possible; on
/// a complete parse `k` equals the input length. Input beyond `k` tokens is
/// left unconsumed.
///
/// `item_capacity` bounds the total number of items over all state sets.
/// Exceeding it fails the parse with [Error::OutOfCapacity]; reserving the
/// capacity itself may fail with [Error::Oom]. The chart built so far is
/// dropped in both cases.
///
/// The input is consumed as a single pass; the iterator is advanced once per
/// state set transition and never rewound.
///
/// [Error::OutOfCapacity]: crate::Error::OutOfCapacity
/// [Error::Oom]: crate::Error::Oom
pub fn parse<T, S, I>(
    grammar: &GrammarIndex<T, S>,
    start: S,
    item_capacity: usize,
    input: I,
) -> Result<SpanList<EarleyItem>>
where
    S: Symbol<T>,
    I: IntoIterator<Item = T>,
{
    let mut input = input.into_iter();
    let mut chart = SpanList::with_capacity(item_capacity)?;

    // Seed state set 0 with all rules of the start symbol. Their predictions
    // and completions are handled by the regular per-position walk below.
    chart.open_segment();
    for rule in grammar.rules_for(start) {
        push_if_absent(&chart, EarleyItem::predicted(rule as RuleId, 0))?;
    }

    let mut curr_pos = 0;
    // Scanned items for the next state set. They must not land in the open
    // segment, so they are staged here and flushed after the segment for the
    // next position has been opened.
    let mut staged: Vec<EarleyItem> = Vec::new();
    loop {
        let token = input.next();

        // Walk the open segment, including the items appended during the
        // walk itself.
        for item in chart.current_segment() {
            match grammar.dotted_symbol(item) {
                DottedSymbol::Completed(lhs) => {
                    // Advance every item in the origin state set that waits
                    // for the completed symbol. The origin can be the open
                    // segment (empty derivations), which grows while we scan
                    // it, hence the indexed walk with a live bound.
                    let origin = item.start as usize;
                    let mut waiting_index = 0;
                    while let Some(&waiting) = chart.get(origin, waiting_index) {
                        if let DottedSymbol::NonTerminal(sym) = grammar.dotted_symbol(waiting) {
                            if sym == lhs {
                                push_if_absent(&chart, waiting.advanced())?;
                            }
                        }
                        waiting_index += 1;
                    }
                }
                DottedSymbol::Terminal(sym) => {
                    if let Some(token) = &token {
                        if sym.matches_terminal(token) {
                            staged.push(item.advanced());
                        }
                    }
                }
                DottedSymbol::NonTerminal(sym) => {
                    for rule in grammar.rules_for(sym) {
                        push_if_absent(&chart, EarleyItem::predicted(rule as RuleId, curr_pos))?;
                    }
                    // The nullable advance: the predicted symbol may derive
                    // the empty string, and its completion can predate this
                    // item's arrival in the state set. Advancing over it here
                    // keeps such completions from being missed.
                    if grammar.is_nullable(sym) {
                        push_if_absent(&chart, item.advanced())?;
                    }
                }
            }
        }

        trace!(
            "state set {}: {} items",
            curr_pos,
            chart.segment_len(curr_pos)
        );

        // No scanned item means no further progress: either the input is
        // exhausted or the next token matches no expected terminal.
        if staged.is_empty() {
            break;
        }
        chart.open_segment();
        for item in staged.drain(..) {
            push_if_absent(&chart, item)?;
        }
        curr_pos += 1;
    }

    debug!(
        "parse finished: {} state sets, {} items",
        chart.segment_count(),
        chart.len()
    );
    Ok(chart)
}

/// The terminal symbols the recognizer can still accept at a position.
///
/// In ambiguous grammars, the same terminal may be expected by several items;
/// duplicates are removed. Returns an empty list for positions beyond the
/// chart.
pub fn expected_terminals<T, S>(
    grammar: &GrammarIndex<T, S>,
    chart: &SpanList<EarleyItem>,
    pos: usize,
) -> Vec<S>
where
    S: Symbol<T> + Eq + Hash,
{
    if pos >= chart.segment_count() {
        return Vec::new();
    }
    chart
        .segment(pos)
        .iter()
        .filter_map(|&item| match grammar.dotted_symbol(item) {
            DottedSymbol::Terminal(sym) => Some(sym),
            _ => None,
        })
        .unique()
        .collect()
}

/// Render an item as a dotted rule with its start position.
pub fn dotted_to_string<T, S>(grammar: &GrammarIndex<T, S>, item: EarleyItem) -> String
where
    S: Symbol<T> + fmt::Debug,
{
    let mut out = format!("{:?} ->", grammar.lhs(item.rule));
    let rhs = grammar.rhs(item.rule);
    for (i, sym) in rhs.iter().enumerate() {
        if i == item.progress as usize {
            out.push_str(" .");
        }
        out.push_str(&format!(" {:?}", sym));
    }
    if item.progress as usize == rhs.len() {
        out.push_str(" .");
    }
    out.push_str(&format!(" [{}]", item.start));
    out
}

pub fn print_chart<T, S>(grammar: &GrammarIndex<T, S>, chart: &SpanList<EarleyItem>)
where
    S: Symbol<T> + fmt::Debug,
{
    for pos in 0..chart.segment_count() {
        println!("state set {}:", pos);
        for &item in chart.segment(pos) {
            println!("  {}", dotted_to_string(grammar, item));
        }
    }
}

pub fn trace_chart<T, S>(grammar: &GrammarIndex<T, S>, chart: &SpanList<EarleyItem>)
where
    S: Symbol<T> + fmt::Debug,
{
    for pos in 0..chart.segment_count() {
        trace!("state set {}:", pos);
        for (i, &item) in chart.segment(pos).iter().enumerate() {
            trace!("  {:6}: {}", i, dotted_to_string(grammar, item));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    use crate::grammar::tests::{arith_rules, loop_rules, Loop, Sym};
    use crate::grammar::Rule;
    use crate::reserved::Error;

    fn item(rule: RuleId, progress: u16, start: u32) -> EarleyItem {
        EarleyItem {
            rule,
            progress,
            start,
        }
    }

    /// "1+(8*9)" is accepted; the root item sits in the last state set.
    #[test]
    fn arith_accepted() {
        let rules = arith_rules();
        let grammar = GrammarIndex::build(&rules);
        let chart = parse(&grammar, Sym::Sum, 4096, "1+(8*9)".chars()).unwrap();

        // One state set per consumed token plus the initial one.
        assert_eq!(chart.segment_count(), 8);
        // Sum -> Sum Plus Product, completed over the whole input.
        assert!(chart.segment(7).contains(&item(0, 3, 0)));
    }

    /// No two equal items in any state set.
    #[test]
    fn set_semantics() {
        let rules = arith_rules();
        let grammar = GrammarIndex::build(&rules);
        let chart = parse(&grammar, Sym::Sum, 4096, "1+(8*9)".chars()).unwrap();

        for pos in 0..chart.segment_count() {
            let set = chart.segment(pos);
            for i in 0..set.len() {
                for j in 0..i {
                    assert_ne!(set[i], set[j], "duplicate in state set {}", pos);
                }
            }
        }
    }

    /// Two parses of the same input produce bit-equal charts.
    #[test]
    fn deterministic() {
        let rules = arith_rules();
        let grammar = GrammarIndex::build(&rules);
        let a = parse(&grammar, Sym::Sum, 4096, "1+(8*9)".chars()).unwrap();
        let b = parse(&grammar, Sym::Sum, 4096, "1+(8*9)".chars()).unwrap();

        assert_eq!(a.segment_count(), b.segment_count());
        for pos in 0..a.segment_count() {
            assert_eq!(a.segment(pos), b.segment(pos));
        }
    }

    /// A scanned item appears in the next state set with the dot advanced
    /// over the matching terminal.
    #[test]
    fn scan_advances_into_next_set() {
        let rules = arith_rules();
        let grammar = GrammarIndex::build(&rules);
        let chart = parse(&grammar, Sym::Sum, 4096, "11".chars()).unwrap();

        // Number -> Digit Number and Number -> Digit, predicted at 0.
        assert!(chart.segment(0).contains(&item(8, 0, 0)));
        assert!(chart.segment(0).contains(&item(9, 0, 0)));
        // Their scans over the first '1'.
        assert!(chart.segment(1).contains(&item(8, 1, 0)));
        assert!(chart.segment(1).contains(&item(9, 1, 0)));
        // No scan without a matching predecessor: nothing advanced over a
        // Digit into set 1 that was not waiting on one in set 0.
        for &it in chart.segment(1).iter().filter(|it| it.progress > 0) {
            let predecessor = EarleyItem {
                progress: it.progress - 1,
                ..it
            };
            if grammar.next_symbol(predecessor) == Some(Sym::Digit) {
                assert!(chart.segment(0).contains(&predecessor));
            }
        }
    }

    /// "1+" consumes both tokens but never completes the start symbol.
    #[test]
    fn incomplete_input() {
        let rules = arith_rules();
        let grammar = GrammarIndex::build(&rules);
        let chart = parse(&grammar, Sym::Sum, 4096, "1+".chars()).unwrap();

        assert_eq!(chart.segment_count(), 3);
        assert!(!chart.segment(2).is_empty());
        assert!(!chart
            .segment(2)
            .iter()
            .any(|&it| grammar.is_complete(it) && it.start == 0 && grammar.lhs(it.rule) == Sym::Sum));
    }

    /// An unmatchable token stops the parse; the rest stays unconsumed.
    #[test]
    fn stops_at_unmatched_token() {
        let rules = arith_rules();
        let grammar = GrammarIndex::build(&rules);
        let chart = parse(&grammar, Sym::Sum, 4096, "1%2".chars()).unwrap();

        assert_eq!(chart.segment_count(), 2);
        assert_eq!(expected_terminals(&grammar, &chart, 0), vec![Sym::LParen, Sym::Digit]);
        assert_eq!(
            expected_terminals(&grammar, &chart, 1),
            vec![Sym::Digit, Sym::Star, Sym::Slash, Sym::Plus, Sym::Minus]
        );
        assert_eq!(expected_terminals(&grammar, &chart, 2), Vec::new());
    }

    /// The empty input on a grammar of empty derivations: state set 0 reaches
    /// its fixed point with exactly the five derivable items.
    #[test]
    fn nullable_loop() {
        let rules = loop_rules();
        let grammar = GrammarIndex::build(&rules);
        let chart = parse(&grammar, Loop::A, 64, "".chars()).unwrap();

        assert_eq!(chart.segment_count(), 1);
        let set = chart.segment(0);
        assert_eq!(set.len(), 5);
        // A -> ., A -> . B, B -> . A, A -> B ., B -> A .
        for expected in [
            item(0, 0, 0),
            item(1, 0, 0),
            item(2, 0, 0),
            item(1, 1, 0),
            item(2, 1, 0),
        ]
        .iter()
        {
            assert!(set.contains(expected), "missing {:?}", expected);
        }
    }

    /// Grammar with a nullable nonterminal in rule middle.
    ///
    /// S = 'a' N 'b'
    /// N = M
    /// N = 'n'
    /// M =
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    enum Mid {
        S,
        N,
        M,
        TermA,
        TermB,
        TermN,
    }

    impl Symbol<char> for Mid {
        const SYMBOL_COUNT: usize = 6;

        fn to_index(self) -> u8 {
            self as u8
        }

        fn is_terminal(self) -> bool {
            match self {
                Mid::S | Mid::N | Mid::M => false,
                _ => true,
            }
        }

        fn matches_terminal(self, token: &char) -> bool {
            match self {
                Mid::TermA => *token == 'a',
                Mid::TermB => *token == 'b',
                Mid::TermN => *token == 'n',
                _ => false,
            }
        }
    }

    fn mid_rules() -> Vec<Rule<Mid>> {
        vec![
            Rule::new(Mid::S).sym(Mid::TermA).sym(Mid::N).sym(Mid::TermB),
            Rule::new(Mid::N).sym(Mid::M),
            Rule::new(Mid::N).sym(Mid::TermN),
            Rule::new(Mid::M),
        ]
    }

    /// The empty derivation of N only becomes available after S has been
    /// predicted past 'a'; the nullable advance must still complete S.
    #[test]
    fn nullable_advance_in_rule_middle() {
        let rules = mid_rules();
        let grammar = GrammarIndex::build(&rules);

        let chart = parse(&grammar, Mid::S, 256, "ab".chars()).unwrap();
        assert_eq!(chart.segment_count(), 3);
        assert!(chart.segment(2).contains(&item(0, 3, 0)));
        // The grammar is unambiguous: exactly one item completes S over the
        // whole input.
        assert_eq!(
            chart
                .segment(2)
                .iter()
                .filter(|&&it| grammar.is_complete(it)
                    && it.start == 0
                    && grammar.lhs(it.rule) == Mid::S)
                .count(),
            1
        );

        // The non-empty alternative of N still works.
        let chart = parse(&grammar, Mid::S, 256, "anb".chars()).unwrap();
        assert_eq!(chart.segment_count(), 4);
        assert!(chart.segment(3).contains(&item(0, 3, 0)));
    }

    /// An item capacity of one cannot even hold the seed.
    #[test]
    fn capacity_exhausted() {
        let rules = arith_rules();
        let grammar = GrammarIndex::build(&rules);
        assert_matches!(
            parse(&grammar, Sym::Sum, 1, "1".chars()),
            Err(Error::OutOfCapacity)
        );
    }

    #[test]
    fn empty_input_not_accepted() {
        let rules = arith_rules();
        let grammar = GrammarIndex::build(&rules);
        let chart = parse(&grammar, Sym::Sum, 4096, "".chars()).unwrap();

        assert_eq!(chart.segment_count(), 1);
        assert!(!chart
            .segment(0)
            .iter()
            .any(|&it| grammar.is_complete(it) && grammar.lhs(it.rule) == Sym::Sum));
    }

    #[test]
    fn dotted_rendering() {
        let rules = arith_rules();
        let grammar = GrammarIndex::build(&rules);

        assert_eq!(
            dotted_to_string(&grammar, item(0, 1, 0)),
            "Sum -> Sum . Plus Product [0]"
        );
        assert_eq!(
            dotted_to_string(&grammar, item(9, 1, 3)),
            "Number -> Digit . [3]"
        );
    }
}

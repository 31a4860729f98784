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

//! Grammar rules and the immutable index built from them

use std::marker::PhantomData;
use std::ops::Range;

/// Rules are addressed by a dense index into the rule table. 16 bit are
/// sufficient for all purposes. If not, file a feature request.
pub type RuleId = u16;

/// Contract between the grammar author and the recognizer.
///
/// Symbols are plain value types (tagged variants or small integers) that the
/// recognizer only compares, indexes and matches against input tokens. Token
/// classes (e.g. all digits 0-9) could be represented as rules with
/// alternative terminal symbols, but that is very inefficient for large
/// classes, so each terminal matches tokens through
/// [matches_terminal](Symbol::matches_terminal) instead.
///
/// `T` is the type of the input tokens.
pub trait Symbol<T>: Copy + PartialEq {
    /// Exclusive upper bound on the indices returned by
    /// [to_index](Symbol::to_index).
    const SYMBOL_COUNT: usize;

    /// Dense injective mapping of the symbol into `[0, SYMBOL_COUNT)`.
    fn to_index(self) -> u8;

    /// Whether the symbol is a terminal.
    ///
    /// The result is undefined for symbols that appear as a rule's left-hand
    /// side; the grammar is expected to be well-formed.
    fn is_terminal(self) -> bool;

    /// Whether this terminal symbol matches a single input token.
    fn matches_terminal(self, token: &T) -> bool;
}

/// A production rule: one left-hand side nonterminal and its expansion.
///
/// The right-hand side may be empty (an epsilon production).
pub struct Rule<S> {
    lhs: S,
    rhs: Vec<S>,
}

impl<S> Rule<S> {
    /// Create a new rule for the given symbol.
    ///
    /// ```ignore
    /// Rule::new(Sym::MaybeB)
    /// ```
    ///
    /// corresponds to
    /// ```ignore
    /// <maybe_b> ::=
    /// ```
    ///
    /// in [BNF](https://en.wikipedia.org/wiki/Backus%E2%80%93Naur_form).
    pub fn new(lhs: S) -> Self {
        Self {
            lhs,
            rhs: Vec::new(),
        }
    }

    /// Append a symbol to the right-hand side.
    pub fn sym(mut self, sym: S) -> Self {
        self.rhs.push(sym);
        self
    }

    /// Append a sequence of symbols to the right-hand side.
    pub fn syms<I>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        self.rhs.extend(iter);
        self
    }

    pub fn lhs(&self) -> &S {
        &self.lhs
    }

    pub fn rhs(&self) -> &[S] {
        &self.rhs
    }
}

/// One Earley item: a dotted rule and the state set where the match began.
///
/// Eight bytes, copied freely. Inputs longer than 2^32 tokens are not
/// supported.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EarleyItem {
    /// Index into the grammar's rule table.
    pub rule: RuleId,

    /// Number of right-hand side symbols already matched, i.e. the dot
    /// position.
    pub progress: u16,

    /// Index of the state set at which this match began.
    pub start: u32,
}

impl EarleyItem {
    /// A fresh prediction: the dot at the start of the rule.
    pub fn predicted(rule: RuleId, start: usize) -> Self {
        debug_assert!(start <= std::u32::MAX as usize);
        Self {
            rule,
            progress: 0,
            start: start as u32,
        }
    }

    /// The same item with the dot advanced over one symbol.
    pub fn advanced(self) -> Self {
        Self {
            progress: self.progress + 1,
            ..self
        }
    }
}

/// The symbol right after the dot of an item, classified.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DottedSymbol<S> {
    /// The dot is before a terminal symbol.
    Terminal(S),

    /// The dot is before a nonterminal symbol.
    NonTerminal(S),

    /// The dot is at the end of the rule; the payload is the rule's
    /// left-hand side.
    Completed(S),
}

/// Immutable look-up structure over a borrowed rule table.
///
/// Built once per grammar, shared by any number of parses. Holds the
/// contiguous rule-index range of every left-hand side and the set of
/// nullable nonterminals.
///
/// All rules sharing a left-hand side must occupy a contiguous range of the
/// rule table. A table violating that invariant produces wrong but
/// memory-safe results.
pub struct GrammarIndex<'g, T, S> {
    /// The rule table, borrowed for the lifetime of the index.
    rules: &'g [Rule<S>],

    /// Half-open `[first, last)` range of rule indices per symbol index.
    /// Symbols without rules (terminals) have an empty range.
    rule_spans: Vec<(RuleId, RuleId)>,

    /// Whether the symbol at each index can derive the empty string.
    nullable: Vec<bool>,

    /// Marker to indicate that T is used indirectly by Symbol
    _marker: PhantomData<T>,
}

impl<'g, T, S> GrammarIndex<'g, T, S>
where
    S: Symbol<T>,
{
    /// Build the index for a rule table.
    ///
    /// Computes the per-symbol rule ranges and the nullability fixed point:
    /// a nonterminal is nullable when some rule for it has every right-hand
    /// side symbol already nullable (vacuously true for an empty right-hand
    /// side).
    pub fn build(rules: &'g [Rule<S>]) -> Self {
        debug_assert!(rules.len() <= RuleId::max_value() as usize);

        let mut rule_spans = vec![(0, 0); S::SYMBOL_COUNT];
        for (i, rule) in rules.iter().enumerate() {
            let sym = rule.lhs.to_index() as usize;
            let i = i as RuleId;
            let span = &mut rule_spans[sym];
            if span.0 == span.1 {
                *span = (i, i + 1);
            } else {
                debug_assert_eq!(span.1, i, "rules of one lhs must be contiguous");
                span.1 = i + 1;
            }
        }

        let mut nullable = vec![false; S::SYMBOL_COUNT];
        let mut changed = true;
        while changed {
            changed = false;
            for rule in rules {
                let lhs = rule.lhs.to_index() as usize;
                if nullable[lhs] {
                    continue;
                }
                if rule
                    .rhs
                    .iter()
                    .all(|&sym| !sym.is_terminal() && nullable[sym.to_index() as usize])
                {
                    nullable[lhs] = true;
                    changed = true;
                }
            }
        }

        Self {
            rules,
            rule_spans,
            nullable,
            _marker: PhantomData,
        }
    }

    /// The borrowed rule table.
    pub fn rules(&self) -> &'g [Rule<S>] {
        self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Left-hand side symbol of a rule.
    pub fn lhs(&self, rule: RuleId) -> S {
        self.rules[rule as usize].lhs
    }

    /// Right-hand side symbols of a rule.
    pub fn rhs(&self, rule: RuleId) -> &'g [S] {
        &self.rules[rule as usize].rhs
    }

    /// Range of rule indices whose left-hand side is `sym`.
    pub fn rules_for(&self, sym: S) -> Range<usize> {
        let (first, last) = self.rule_spans[sym.to_index() as usize];
        first as usize..last as usize
    }

    /// Whether `sym` can derive the empty string.
    pub fn is_nullable(&self, sym: S) -> bool {
        self.nullable[sym.to_index() as usize]
    }

    /// Whether the dot of an item has reached the end of its rule.
    pub fn is_complete(&self, item: EarleyItem) -> bool {
        self.rules[item.rule as usize].rhs.len() == item.progress as usize
    }

    /// The symbol after the dot of an incomplete item.
    pub fn next_symbol(&self, item: EarleyItem) -> Option<S> {
        self.rules[item.rule as usize]
            .rhs
            .get(item.progress as usize)
            .copied()
    }

    /// Classify the symbol after the dot of an item.
    pub fn dotted_symbol(&self, item: EarleyItem) -> DottedSymbol<S> {
        let rule = &self.rules[item.rule as usize];
        match rule.rhs.get(item.progress as usize) {
            Some(&sym) => {
                if sym.is_terminal() {
                    DottedSymbol::Terminal(sym)
                } else {
                    DottedSymbol::NonTerminal(sym)
                }
            }
            None => DottedSymbol::Completed(rule.lhs),
        }
    }
}

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

//! Arithmetic expression grammar for the demonstration driver

use charter::{Rule, Symbol};

/// Symbols of the expression grammar. The first four are nonterminals, the
/// rest terminals over single characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Sym {
    Sum,
    Product,
    Factor,
    Number,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Digit,
}

pub const START: Sym = Sym::Sum;

impl Symbol<char> for Sym {
    const SYMBOL_COUNT: usize = 11;

    fn to_index(self) -> u8 {
        self as u8
    }

    fn is_terminal(self) -> bool {
        match self {
            Sym::Sum | Sym::Product | Sym::Factor | Sym::Number => false,
            _ => true,
        }
    }

    fn matches_terminal(self, token: &char) -> bool {
        match self {
            Sym::Plus => *token == '+',
            Sym::Minus => *token == '-',
            Sym::Star => *token == '*',
            Sym::Slash => *token == '/',
            Sym::LParen => *token == '(',
            Sym::RParen => *token == ')',
            Sym::Digit => token.is_ascii_digit(),
            _ => false,
        }
    }
}

/// The rule table, grouped by left-hand side:
///
/// Sum     = Sum '+' Product | Sum '-' Product | Product
/// Product = Product '*' Factor | Product '/' Factor | Factor
/// Factor  = '(' Sum ')' | Number
/// Number  = Digit Number | Digit
pub fn rules() -> Vec<Rule<Sym>> {
    use Sym::*;
    vec![
        Rule::new(Sum).sym(Sum).sym(Plus).sym(Product),
        Rule::new(Sum).sym(Sum).sym(Minus).sym(Product),
        Rule::new(Sum).sym(Product),
        Rule::new(Product).sym(Product).sym(Star).sym(Factor),
        Rule::new(Product).sym(Product).sym(Slash).sym(Factor),
        Rule::new(Product).sym(Factor),
        Rule::new(Factor).sym(LParen).sym(Sum).sym(RParen),
        Rule::new(Factor).sym(Number),
        Rule::new(Number).sym(Digit).sym(Number),
        Rule::new(Number).sym(Digit),
    ]
}

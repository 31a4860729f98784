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

//! Demonstration driver: parse an arithmetic expression, print the derivation

use std::fs;
use std::path::PathBuf;
use std::process;

use itertools::Itertools;
use log::{debug, info};
use structopt::StructOpt;

use charter::{
    expected_terminals, find_full_parse, parse, print_chart, visit_children, Child, EarleyItem,
    GrammarIndex, SpanList,
};

mod arith;
use arith::Sym;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "charter",
    about = "Parse an arithmetic expression with the Earley recognizer"
)]
struct CommandLine {
    /// Print all state sets after parsing
    #[structopt(short, long)]
    chart: bool,

    /// Maximum number of Earley items for the parse
    #[structopt(long, default_value = "65536")]
    capacity: usize,

    /// Read the expression from a file instead of the command line
    #[structopt(short, long, parse(from_os_str), conflicts_with = "expression")]
    file: Option<PathBuf>,

    /// Expression to parse, e.g. 1+(8*9)
    #[structopt(required_unless = "file")]
    expression: Option<String>,
}

/// Print one node of the derivation and recurse into its subderivations.
///
/// Children are reported right to left by the walk; buffer and reverse them
/// so the tree reads in input order.
fn print_tree(
    grammar: &GrammarIndex<char, Sym>,
    chart: &SpanList<EarleyItem>,
    tokens: &[char],
    item: EarleyItem,
    set: usize,
    depth: usize,
) {
    let indent = 2 * depth;
    println!(
        "{:indent$}{:?} = {} [{}..{}]",
        "",
        grammar.lhs(item.rule),
        grammar
            .rhs(item.rule)
            .iter()
            .map(|sym| format!("{:?}", sym))
            .join(" "),
        item.start,
        set,
        indent = indent
    );

    let mut children = Vec::new();
    if visit_children(grammar, chart, item, set, &mut |child| children.push(child)).is_none() {
        eprintln!("charter: derivation incomplete below this node");
        return;
    }
    for child in children.into_iter().rev() {
        match child {
            Child::Terminal { end, .. } => {
                println!("{:indent$}'{}'", "", tokens[end - 1], indent = indent + 2);
            }
            Child::Completed { item, set } => {
                print_tree(grammar, chart, tokens, item, set, depth + 1)
            }
        }
    }
}

fn main() {
    // Initialise the logger first
    let _ = std::env::var("CHARTER_LOG").and_then(|log| {
        let _ = flexi_logger::Logger::with_str(log)
            .format(flexi_logger::with_thread)
            .log_to_file()
            .start();
        info!("Logging is ready");
        Ok(())
    });

    let cmd_line = CommandLine::from_args();
    debug!("{:?}", cmd_line);

    let text = match &cmd_line.file {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => text.trim_end().to_string(),
            Err(err) => {
                eprintln!("charter: cannot read {}: {}", path.display(), err);
                process::exit(1);
            }
        },
        None => cmd_line.expression.clone().unwrap_or_default(),
    };
    let tokens: Vec<char> = text.chars().collect();

    let rules = arith::rules();
    let grammar = GrammarIndex::build(&rules);

    let chart = match parse(&grammar, arith::START, cmd_line.capacity, tokens.iter().copied()) {
        Ok(chart) => chart,
        Err(err) => {
            eprintln!("charter: {}", err);
            process::exit(1);
        }
    };

    if cmd_line.chart {
        print_chart(&grammar, &chart);
    }

    match find_full_parse(&grammar, arith::START, &chart, tokens.len()) {
        Some(root) => {
            let item = chart.segment(root.set)[root.index];
            print_tree(&grammar, &chart, &tokens, item, root.set, 0);
        }
        None => {
            let consumed = chart.segment_count() - 1;
            eprintln!(
                "charter: input rejected after {} of {} tokens",
                consumed,
                tokens.len()
            );
            let expected = expected_terminals(&grammar, &chart, consumed);
            if !expected.is_empty() {
                eprintln!(
                    "charter: expected one of: {}",
                    expected.iter().map(|sym| format!("{:?}", sym)).join(", ")
                );
            }
            process::exit(1);
        }
    }
}

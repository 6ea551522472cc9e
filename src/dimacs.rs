//! DIMACS CNF parser and writer.
//!
//! Clauses are canonicalised while reading: literals are sorted and
//! deduplicated and tautological clauses (containing a variable in both
//! polarities) are discarded. The header's variable and clause counts are
//! advisory; the formula found in the body wins.
use std::io;

use log::{debug, info};
use thiserror::Error;

use crate::cnf::CnfFormula;
use crate::lit::{Lit, Var};

/// Errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line}: unexpected token in DIMACS CNF input: {token:?}")]
    UnexpectedInput { line: usize, token: String },
    #[error("line {line}: literal index is too large: {index}")]
    LiteralTooLarge { line: usize, index: i64 },
    #[error("line {line}: invalid header syntax: {header:?}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: unterminated clause")]
    UnterminatedClause { line: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Variable and clause count as declared in a DIMACS CNF header.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Parser for DIMACS CNF files.
#[derive(Default)]
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,
    line_number: usize,
    clause_count: usize,
}

impl DimacsParser {
    /// Parse the given input into a [`CnfFormula`].
    pub fn parse(input: impl io::Read) -> Result<CnfFormula, ParserError> {
        use io::BufRead;

        let mut parser = DimacsParser::default();
        let reader = io::BufReader::new(input);

        for line in reader.lines() {
            let line = line?;
            parser.line_number += 1;
            if parser.parse_line(&line)? {
                break;
            }
        }

        if !parser.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: parser.line_number,
            });
        }

        if let Some(header) = parser.header {
            parser.formula.set_var_count(header.var_count);
            if header.clause_count != parser.clause_count {
                debug!(
                    "header declares {} clauses but the formula has {}",
                    header.clause_count, parser.clause_count
                );
            }
        }

        info!(
            "parsed formula with {} variables and {} clauses",
            parser.formula.var_count(),
            parser.clause_count
        );

        Ok(parser.formula)
    }

    /// Parse a single input line. Returns `true` at the `%` end marker some
    /// benchmark files carry.
    fn parse_line(&mut self, line: &str) -> Result<bool, ParserError> {
        let trimmed = line.trim_start();
        match trimmed.chars().next() {
            None | Some('c') => Ok(false),
            Some('%') => Ok(true),
            Some('p') => {
                self.parse_header(trimmed)?;
                Ok(false)
            }
            _ => {
                for token in trimmed.split_whitespace() {
                    let number: i64 =
                        token.parse().map_err(|_| ParserError::UnexpectedInput {
                            line: self.line_number,
                            token: token.to_owned(),
                        })?;
                    if number == 0 {
                        self.finish_clause();
                    } else {
                        if number.unsigned_abs() > Var::max_count() as u64 {
                            return Err(ParserError::LiteralTooLarge {
                                line: self.line_number,
                                index: number,
                            });
                        }
                        self.partial_clause.push(Lit::from_dimacs(number as isize));
                    }
                }
                Ok(false)
            }
        }
    }

    fn parse_header(&mut self, line: &str) -> Result<(), ParserError> {
        let invalid = || ParserError::InvalidHeader {
            line: self.line_number,
            header: line.to_owned(),
        };

        let mut tokens = line.split_whitespace();
        if tokens.next() != Some("p") || tokens.next() != Some("cnf") {
            return Err(invalid());
        }
        let var_count = tokens
            .next()
            .and_then(|token| token.parse().ok())
            .ok_or_else(invalid)?;
        let clause_count = tokens
            .next()
            .and_then(|token| token.parse().ok())
            .ok_or_else(invalid)?;
        if tokens.next().is_some() {
            return Err(invalid());
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });
        Ok(())
    }

    /// Canonicalise the pending clause and add it to the formula.
    ///
    /// Duplicate literals are removed and tautological clauses are dropped
    /// entirely.
    fn finish_clause(&mut self) {
        self.clause_count += 1;
        self.partial_clause.sort_unstable();
        self.partial_clause.dedup();

        let tautology = self
            .partial_clause
            .windows(2)
            .any(|pair| pair[0] == !pair[1]);

        if !tautology {
            self.formula.add_clause(&self.partial_clause);
        }
        self.partial_clause.clear();
    }
}

/// Write a formula in DIMACS CNF format.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    writeln!(target, "p cnf {} {}", formula.var_count(), formula.len())?;
    for clause in formula.iter() {
        for &lit in clause {
            write!(target, "{} ", lit.to_dimacs())?;
        }
        writeln!(target, "0")?;
    }
    Ok(())
}

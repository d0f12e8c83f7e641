#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Reading and writing the DIMACS CNF file format, used by the command line only.
//!
//! The format typically includes:
//! - Comment lines starting with 'c'. Feature-model exports name their variables
//!   with comments of the form `c <index> <name>`; such names are applied to the
//!   resulting [`VariableMap`]. Any other comment is skipped.
//! - A problem line `p cnf <num_variables> <num_clauses>`. Variables above the
//!   declared count are rejected; a missing problem line is tolerated.
//! - Clauses as whitespace separated integers terminated by `0`. A clause may span
//!   several lines.
//! - An optional '%' line marking the end of data.
//!
//! Every clause of the result is tagged [`Provenance::External`]. The writer emits
//! the same name comments, so a written CNF reads back with its names.

use crate::error::{Error, Result};
use crate::sat::clause::Provenance;
use crate::sat::cnf::{Cnf, VariableMap};
use crate::sat::literal::Literal;
use std::io::{BufRead, Write};
use std::path::Path;

/// Parses DIMACS formatted data from a `BufRead` source.
///
/// # Errors
///
/// - [`Error::Io`] if reading fails.
/// - [`Error::Parse`] on a malformed problem line or literal, a variable above the
///   declared count, a clause left unterminated at the end of input, or two
///   variables given the same name.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf> {
    let mut declared: Option<usize> = None;
    let mut names: Vec<(usize, u32, String)> = Vec::new();
    let mut clauses: Vec<Vec<Literal>> = Vec::new();
    let mut current: Vec<Literal> = Vec::new();
    let mut max_var = 0_usize;
    let mut last_line = 0;

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        last_line = line_no;
        let line = line?;
        let mut parts = line.split_whitespace().peekable();

        match parts.peek() {
            Some(&"%") => break,
            None => {}
            Some(&"c") => {
                parts.next();
                if let (Some(index), Some(name), None) = (parts.next(), parts.next(), parts.next()) {
                    if let Ok(var) = index.parse::<u32>() {
                        if var > 0 {
                            names.push((line_no, var, name.to_owned()));
                        }
                    }
                }
            }
            Some(&"p") => {
                let fields: Vec<&str> = parts.collect();
                match fields.as_slice() {
                    ["p", "cnf", vars, _clauses] => {
                        let n = vars.parse::<usize>().map_err(|e| Error::Parse {
                            line: line_no,
                            message: format!("invalid variable count '{vars}': {e}"),
                        })?;
                        declared = Some(n);
                    }
                    _ => {
                        return Err(Error::Parse {
                            line: line_no,
                            message: "expected 'p cnf <variables> <clauses>'".to_owned(),
                        });
                    }
                }
            }
            Some(_) => {
                for token in parts {
                    let value = token.parse::<i32>().map_err(|e| Error::Parse {
                        line: line_no,
                        message: format!("failed to parse literal '{token}': {e}"),
                    })?;
                    if value == 0 {
                        clauses.push(std::mem::take(&mut current));
                        continue;
                    }
                    let lit = Literal::from_i32(value);
                    let var = lit.variable() as usize;
                    if declared.is_some_and(|n| var > n) {
                        return Err(Error::Parse {
                            line: line_no,
                            message: format!("variable {var} exceeds the declared count"),
                        });
                    }
                    max_var = max_var.max(var);
                    current.push(lit);
                }
            }
        }
    }

    if !current.is_empty() {
        return Err(Error::Parse {
            line: last_line,
            message: "clause is not terminated by 0".to_owned(),
        });
    }

    let num_vars = declared.unwrap_or(0).max(max_var);
    let mut variables = VariableMap::anonymous(num_vars);
    for (line, var, name) in names {
        if var as usize <= num_vars && !variables.rename(var, &name) {
            return Err(Error::Parse {
                line,
                message: format!("cannot name variable {var} '{name}': the name is taken"),
            });
        }
    }

    let mut cnf = Cnf::new(variables);
    for clause in clauses {
        cnf.add_clause(clause, Provenance::External);
    }
    Ok(cnf)
}

/// Opens and parses a DIMACS CNF file.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, otherwise as [`parse_dimacs`].
pub fn parse_file(path: &Path) -> Result<Cnf> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(std::io::BufReader::new(file))
}

/// Writes `cnf` as DIMACS, preceded by a `c <index> <name>` line for every
/// variable whose name differs from its index and reads back as one token.
///
/// # Errors
///
/// [`Error::Io`] if writing fails.
pub fn write_dimacs<W: Write>(cnf: &Cnf, mut writer: W) -> Result<()> {
    for (var, name) in cnf.variables().iter() {
        if name != var.to_string() && name.split_whitespace().count() == 1 {
            writeln!(writer, "c {var} {name}")?;
        }
    }
    writeln!(writer, "p cnf {} {}", cnf.num_vars(), cnf.clause_count())?;
    for clause in cnf.iter() {
        for lit in clause.iter() {
            write!(writer, "{} ", lit.to_i32())?;
        }
        writeln!(writer, "0")?;
    }
    writer.flush()?;
    Ok(())
}

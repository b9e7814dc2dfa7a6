/*!
Reading DIMACS CNF into a context.

The reader takes anything which implements [BufRead].
Comment lines (`c …`) are skipped, a problem line (`p cnf <atoms> <clauses>`) sizes the context up front, and every other line contributes zero-terminated clauses of signed integers.
Atoms are created as needed when no problem line precedes the formula.

```rust,ignore
let mut dimacs = vec![];
let _ = dimacs.write(b"
p cnf 2 2
 1  2 0
-1 -2 0
");

ctx.read_dimacs(dimacs.as_slice())?;
```
*/

use std::io::BufRead;

use crate::{
    misc::log::targets,
    types::err::{DimacsError, ErrorKind},
};

use super::{context::Context, literal::SatLiteral};

impl Context {
    /// Reads a DIMACS formula into the context.
    pub fn read_dimacs(&mut self, mut reader: impl BufRead) -> Result<(), ErrorKind> {
        let mut buffer = String::with_capacity(1024);
        let mut line_counter = 0;
        let mut clause_buffer: Vec<SatLiteral> = Vec::new();
        let mut clause_counter = 0_usize;

        loop {
            buffer.clear();
            match reader.read_line(&mut buffer) {
                Ok(0) => break,
                Ok(_) => line_counter += 1,
                Err(_) => return Err(ErrorKind::from(DimacsError::Line(line_counter))),
            }

            let line = buffer.trim();

            match line.chars().next() {
                None => continue,

                Some('c') => continue,

                Some('p') => {
                    let mut details = line.split_whitespace();
                    let atom_count: usize = match details.nth(2) {
                        None => return Err(ErrorKind::from(DimacsError::ProblemSpecification)),
                        Some(string) => string
                            .parse()
                            .map_err(|_| ErrorKind::from(DimacsError::ProblemSpecification))?,
                    };

                    let clause_count: usize = match details.next() {
                        None => return Err(ErrorKind::from(DimacsError::ProblemSpecification)),
                        Some(string) => string
                            .parse()
                            .map_err(|_| ErrorKind::from(DimacsError::ProblemSpecification))?,
                    };

                    while self.atom_count() < atom_count {
                        self.fresh_atom()?;
                    }

                    log::info!(
                        target: targets::SAT,
                        "expecting {atom_count} atoms over {clause_count} clauses",
                    );
                }

                Some(_) => {
                    for field in line.split_whitespace() {
                        let int: i32 = field
                            .parse()
                            .map_err(|_| ErrorKind::from(DimacsError::Line(line_counter)))?;

                        if int == 0 {
                            let clause = std::mem::take(&mut clause_buffer);
                            self.add_clause(clause)?;
                            clause_counter += 1;
                            continue;
                        }

                        while self.atom_count() < int.unsigned_abs() as usize {
                            self.fresh_atom()?;
                        }
                        clause_buffer.push(SatLiteral::from_int(int));
                    }
                }
            }
        }

        // A formula may end without a final zero.
        if !clause_buffer.is_empty() {
            self.add_clause(clause_buffer)?;
            clause_counter += 1;
        }

        log::info!(target: targets::SAT, "read {clause_counter} clauses");
        Ok(())
    }
}

/*!
The satisfiability core --- a conflict-driven clause-learning solver for propositional formulas in conjunctive normal form.

Internally, and at a high level, a solve is viewed in terms of the relationship between a clause database, a valuation, and the trail of assignments forced by the two.
Consequences of the current valuation with respect to the formula are found by [boolean constraint propagation](bcp); a conflict during propagation is [analysed](analysis) by resolution to a clause which asserts some literal at an earlier decision level; and when no consequence remains and the valuation is partial, a [decision](solve) extends it.

The solver is complete: on a ground clause set it reports [Satisfiable](Report::Satisfiable) exactly when a satisfying assignment exists.
An empty clause set is satisfiable; a clause with no literals is not.

Supported techniques, condensed from the usual literature: two-watched-literal propagation, first-UIP clause learning, activity decay with phase saving, and luby-scheduled restarts.
Incremental use is supported --- clauses may be added between solves, and [blocking clauses](Context::add_clause) drive model enumeration.
A terminate callback is checked at every decision, which is how the engine manager cancels a losing racer.

# Example

```rust,ignore
let mut ctx = Context::new(SatConfig::default());

let p = ctx.fresh_atom()?;
let q = ctx.fresh_atom()?;

ctx.add_clause(vec![SatLiteral::new(p, true), SatLiteral::new(q, true)])?;
ctx.add_clause(vec![SatLiteral::new(p, false)])?;

assert_eq!(ctx.solve()?, Report::Satisfiable);
assert_eq!(ctx.value_of(q), Some(true));
```
*/

pub mod analysis;
pub mod bcp;
pub mod clause_db;
pub mod context;
pub mod dimacs;
pub mod literal;
pub mod solve;

pub use clause_db::{ClauseKey, ClauseOk};
pub use context::Context;
pub use literal::{Atom, SatLiteral};

/// High-level reports regarding a solve.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Report {
    /// The formula of the context is satisfiable.
    Satisfiable,

    /// The formula of the context is unsatisfiable.
    Unsatisfiable,

    /// Satisfiability of the formula is unknown --- the solve was interrupted or timed out.
    Unknown,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "Satisfiable"),
            Self::Unsatisfiable => write!(f, "Unsatisfiable"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// The state of a context.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SolveStatus {
    /// The context allows input.
    Input,

    /// The consistency of the database is being determined.
    Solving,

    /// The database is known to be consistent, with a complete valuation.
    Satisfiable,

    /// The database is known to be inconsistent.
    Unsatisfiable,
}

impl From<SolveStatus> for Report {
    fn from(status: SolveStatus) -> Self {
        match status {
            SolveStatus::Satisfiable => Report::Satisfiable,
            SolveStatus::Unsatisfiable => Report::Unsatisfiable,
            SolveStatus::Input | SolveStatus::Solving => Report::Unknown,
        }
    }
}

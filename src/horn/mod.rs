/*!
Horn programs, and the translation of clause sets into them.

A clause with at most one positive literal is Horn, and a set of Horn clauses may be run as a logic program: the positive literal is the head, the negated literals form the body, and a clause with no negated literals is a fact.
An all-negative clause is a denial --- the shape a negated goal takes --- and is what the [resolution engine](crate::engines::sld) refutes.

Translation rejects clause sets which are not Horn; the manager sends those to the satisfiability path instead.
*/

pub mod program;
pub mod translate;

pub use program::{HornAtom, HornClause, HornProgram};
pub use translate::{goal_of_formula, program_of_clauses};

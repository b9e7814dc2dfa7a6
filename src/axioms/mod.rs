/*!
Generated axiom sets.

Equality is treated as a user-level congruence rather than a solver primitive, so proving with equality means widening the problem with axioms generated from its signature:
- the [resolution path](equality::equality_program) receives a depth-bounded `eq_d`/`eq_step`/`eq_fact` Horn program,
- the [satisfiability path](equality::equality_formulas) receives reflexivity, symmetry, transitivity, congruence, and substitution as quantified formulas, clausified like any premise.

Arithmetic over the closed vocabulary is evaluated by [builtins](arithmetic) on ground numerals during resolution.
*/

pub mod arithmetic;
pub mod equality;

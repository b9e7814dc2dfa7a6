/*!
The finite model finder.

Given premises, the finder searches domains of increasing size for an interpretation --- constants, function tables, predicate extensions over `{0..n-1}` --- under which every premise holds.
A counter-example search is the same search over the premises plus the negated goal: any model found witnesses non-entailment.

Two paths cover the domain sizes:
- [enumeration](enumerate) --- signature-driven nested enumeration with lex-leader symmetry breaking and incremental premise checks;
- [grounding](sat_path) --- premises instantiated over the domain, flattened to propositional clauses, and enumerated through the [satisfiability engine](crate::engines::sat) with blocking clauses.

Multi-model requests pass through an [isomorphism filter](iso) for small domains, so the models returned differ structurally and not merely by a renaming of elements.
Free variables in premises are read as implicitly universal everywhere else; here they are skolemized to same-named fresh constants first, following the Mace4 tradition, so the witnesses appear in the model.
*/

pub mod enumerate;
pub mod eval;
pub mod finder;
pub mod iso;
pub mod model;
pub mod sat_path;

pub use finder::{FindOptions, FindOutcome, ModelFinder};
pub use model::Model;

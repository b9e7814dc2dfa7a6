/*!
Skolemization, and the universal drop which follows it.

Each existentially bound variable is replaced by a fresh Skolem name: a constant when no universal encloses the existential, and otherwise a function of the enclosing universal variables.
The existential binder itself is dropped, and every introduction is recorded in the [SkolemEnv] so later stages --- the Horn translator, grounding, the model finder --- can distinguish generated names from user names.

The transformation preserves satisfiability, not equivalence: if the clause set is unsatisfiable then so was the input.

Standardization must run first; the walk relies on binder names being unique.
*/

use std::collections::BTreeMap;

use crate::language::ast::{Atom, Formula, Term};

/// A record of one Skolem introduction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkolemBinding {
    /// The generated name.
    pub name: String,

    /// The universal variables the introduction depends on, outermost first.
    ///
    /// The length of this list is the arity of the Skolem function; empty for a constant.
    pub deps: Vec<String>,
}

/// The environment threaded through clausification.
///
/// One environment spans a whole prove call, so Skolem names stay distinct across the premises and the negated goal.
#[derive(Clone, Debug, Default)]
pub struct SkolemEnv {
    /// Counter for `_vN` standardization names.
    pub var_counter: usize,

    /// Counter for Skolem names.
    pub skolem_counter: usize,

    /// Counter for Tseitin auxiliary predicates.
    pub aux_counter: usize,

    /// Existential variable to its replacement.
    pub bindings: BTreeMap<String, SkolemBinding>,

    /// Generated name to arity.
    pub introduced: BTreeMap<String, usize>,
}

impl SkolemEnv {
    fn fresh(&mut self, deps: &[String]) -> SkolemBinding {
        self.skolem_counter += 1;
        let name = format!("sk{}", self.skolem_counter);
        self.introduced.insert(name.clone(), deps.len());
        SkolemBinding {
            name,
            deps: deps.to_vec(),
        }
    }

    /// Whether `name` was introduced by Skolemization.
    pub fn is_skolem_name(&self, name: &str) -> bool {
        self.introduced.contains_key(name)
    }
}

/// Eliminates the existential quantifiers of `formula`, recording introductions in `env`.
///
/// Expects negation normal form; universal binders are left in place for [drop_universals].
pub fn skolemize(formula: Formula, env: &mut SkolemEnv) -> Formula {
    let mut universals: Vec<String> = Vec::new();
    walk(formula, env, &mut universals)
}

fn walk(formula: Formula, env: &mut SkolemEnv, universals: &mut Vec<String>) -> Formula {
    match formula {
        Formula::Forall { var, body } => {
            universals.push(var.clone());
            let body = walk(*body, env, universals);
            universals.pop();
            Formula::forall(var, body)
        }

        Formula::Exists { var, body } => {
            let binding = env.fresh(universals);
            let replacement = match binding.deps.is_empty() {
                true => Term::constant(binding.name.clone()),
                false => Term::function(
                    binding.name.clone(),
                    binding.deps.iter().map(|dep| Term::var(dep.clone())).collect(),
                ),
            };
            env.bindings.insert(var.clone(), binding);

            let body = substitute(*body, &var, &replacement);
            walk(body, env, universals)
        }

        Formula::And(l, r) => Formula::and(walk(*l, env, universals), walk(*r, env, universals)),
        Formula::Or(l, r) => Formula::or(walk(*l, env, universals), walk(*r, env, universals)),
        Formula::Not(e) => Formula::not(walk(*e, env, universals)),

        // Implications and equivalences do not survive negation normal form.
        other @ (Formula::Implies(_, _) | Formula::Iff(_, _)) => other,

        atom @ Formula::Atom(_) => atom,
    }
}

/// Replaces the variable `var` by `replacement` throughout `formula`.
fn substitute(formula: Formula, var: &str, replacement: &Term) -> Formula {
    match formula {
        Formula::Forall { var: v, body } => {
            Formula::forall(v, substitute(*body, var, replacement))
        }
        Formula::Exists { var: v, body } => {
            Formula::exists(v, substitute(*body, var, replacement))
        }
        Formula::Implies(l, r) => Formula::implies(
            substitute(*l, var, replacement),
            substitute(*r, var, replacement),
        ),
        Formula::Iff(l, r) => Formula::iff(
            substitute(*l, var, replacement),
            substitute(*r, var, replacement),
        ),
        Formula::And(l, r) => Formula::and(
            substitute(*l, var, replacement),
            substitute(*r, var, replacement),
        ),
        Formula::Or(l, r) => Formula::or(
            substitute(*l, var, replacement),
            substitute(*r, var, replacement),
        ),
        Formula::Not(e) => Formula::not(substitute(*e, var, replacement)),
        Formula::Atom(atom) => Formula::Atom(match atom {
            Atom::Predicate { name, args } => Atom::Predicate {
                name,
                args: args
                    .into_iter()
                    .map(|mut term| {
                        term.rename_variable(var, replacement);
                        term
                    })
                    .collect(),
            },
            Atom::Equals(mut l, mut r) => {
                l.rename_variable(var, replacement);
                r.rename_variable(var, replacement);
                Atom::Equals(l, r)
            }
        }),
    }
}

/// Removes the universal binders; the variables they bound become implicit.
pub fn drop_universals(formula: Formula) -> Formula {
    match formula {
        Formula::Forall { body, .. } => drop_universals(*body),
        Formula::Exists { var, body } => Formula::exists(var, drop_universals(*body)),
        Formula::Implies(l, r) => {
            Formula::implies(drop_universals(*l), drop_universals(*r))
        }
        Formula::Iff(l, r) => Formula::iff(drop_universals(*l), drop_universals(*r)),
        Formula::And(l, r) => Formula::and(drop_universals(*l), drop_universals(*r)),
        Formula::Or(l, r) => Formula::or(drop_universals(*l), drop_universals(*r)),
        Formula::Not(e) => Formula::not(drop_universals(*e)),
        atom @ Formula::Atom(_) => atom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clausal::{nnf::to_nnf, standardize::standardize};
    use crate::language::parser::parse;

    fn prepared(source: &str) -> (Formula, SkolemEnv) {
        let mut env = SkolemEnv::default();
        let formula = standardize(to_nnf(parse(source).unwrap()), &mut env.var_counter);
        let formula = skolemize(formula, &mut env);
        (formula, env)
    }

    #[test]
    fn constant_when_unenclosed() {
        let (formula, env) = prepared("exists x P(x)");
        assert_eq!(formula.to_string(), "P(sk1)");
        assert_eq!(env.introduced.get("sk1"), Some(&0));
    }

    #[test]
    fn function_of_enclosing_universals() {
        let (formula, env) = prepared("all x exists y loves(x, y)");
        assert_eq!(formula.to_string(), "all _v1 loves(_v1,sk1(_v1))");
        // Arity equals the count of enclosing universals at the elimination point.
        assert_eq!(env.introduced.get("sk1"), Some(&1));
    }

    #[test]
    fn arity_tracks_nesting_depth() {
        let (_, env) = prepared("all x all y exists z R(x, y, z)");
        assert_eq!(env.introduced.get("sk1"), Some(&2));
    }

    #[test]
    fn existential_outside_universal_stays_constant() {
        let (_, env) = prepared("exists x all y knows(y, x)");
        assert_eq!(env.introduced.get("sk1"), Some(&0));
    }

    #[test]
    fn universals_dropped() {
        let (formula, _) = prepared("all x (P(x) & all y Q(y))");
        let matrix = drop_universals(formula);
        assert_eq!(matrix.to_string(), "(P(_v1) & Q(_v2))");
    }
}

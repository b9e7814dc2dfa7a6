/*!
Variable standardization.

Each binder is assigned a fresh `_vN` name and its bound variable is substituted within its extent only.
The walk keeps a stack of `old → new` renamings scoped by quantifier: entering a binder pushes, leaving restores, so an occurrence under an inner binder which shadows an outer one resolves to the inner renaming, while occurrences outside the inner extent still reach the outer renaming.

The rewrite runs over an explicit work stack rather than by recursion --- the same shape as [distribution](super::distribute) --- with a task per node to visit and a task per node to rebuild, so the input may be arbitrarily deep.
A binder's rebuild task doubles as its scope exit: it fires once the body is rebuilt, which is exactly when the renaming should pop.

After standardization no two distinct binders share a variable name, which frees the later stages from capture concerns.
*/

use crate::language::ast::{Atom, Formula, Term};

enum Task {
    Visit(Formula),
    BuildForall(String),
    BuildExists(String),
    BuildImplies,
    BuildIff,
    BuildAnd,
    BuildOr,
    BuildNot,
}

/// Renames every binder of `formula` to a fresh `_vN`, threading `counter` so distinct calls stay distinct.
pub fn standardize(formula: Formula, counter: &mut usize) -> Formula {
    let mut renamings: Vec<(String, String)> = Vec::new();
    let mut tasks = vec![Task::Visit(formula)];
    let mut results: Vec<Formula> = Vec::new();

    while let Some(task) = tasks.pop() {
        match task {
            Task::Visit(formula) => match formula {
                Formula::Forall { var, body } => {
                    let fresh = fresh_name(counter);
                    renamings.push((var, fresh.clone()));
                    tasks.push(Task::BuildForall(fresh));
                    tasks.push(Task::Visit(*body));
                }

                Formula::Exists { var, body } => {
                    let fresh = fresh_name(counter);
                    renamings.push((var, fresh.clone()));
                    tasks.push(Task::BuildExists(fresh));
                    tasks.push(Task::Visit(*body));
                }

                Formula::Implies(l, r) => {
                    tasks.push(Task::BuildImplies);
                    tasks.push(Task::Visit(*r));
                    tasks.push(Task::Visit(*l));
                }
                Formula::Iff(l, r) => {
                    tasks.push(Task::BuildIff);
                    tasks.push(Task::Visit(*r));
                    tasks.push(Task::Visit(*l));
                }
                Formula::And(l, r) => {
                    tasks.push(Task::BuildAnd);
                    tasks.push(Task::Visit(*r));
                    tasks.push(Task::Visit(*l));
                }
                Formula::Or(l, r) => {
                    tasks.push(Task::BuildOr);
                    tasks.push(Task::Visit(*r));
                    tasks.push(Task::Visit(*l));
                }

                Formula::Not(e) => {
                    tasks.push(Task::BuildNot);
                    tasks.push(Task::Visit(*e));
                }

                Formula::Atom(atom) => {
                    results.push(Formula::Atom(rename_atom(atom, &renamings)));
                }
            },

            Task::BuildForall(fresh) => {
                renamings.pop();
                let body = results.pop().expect("visited binder body");
                results.push(Formula::forall(fresh, body));
            }

            Task::BuildExists(fresh) => {
                renamings.pop();
                let body = results.pop().expect("visited binder body");
                results.push(Formula::exists(fresh, body));
            }

            Task::BuildImplies => {
                let r = results.pop().expect("visited right branch");
                let l = results.pop().expect("visited left branch");
                results.push(Formula::implies(l, r));
            }

            Task::BuildIff => {
                let r = results.pop().expect("visited right branch");
                let l = results.pop().expect("visited left branch");
                results.push(Formula::iff(l, r));
            }

            Task::BuildAnd => {
                let r = results.pop().expect("visited right branch");
                let l = results.pop().expect("visited left branch");
                results.push(Formula::and(l, r));
            }

            Task::BuildOr => {
                let r = results.pop().expect("visited right branch");
                let l = results.pop().expect("visited left branch");
                results.push(Formula::or(l, r));
            }

            Task::BuildNot => {
                let e = results.pop().expect("visited negated formula");
                results.push(Formula::not(e));
            }
        }
    }

    results.pop().expect("one standardized formula")
}

fn fresh_name(counter: &mut usize) -> String {
    *counter += 1;
    format!("_v{counter}")
}

fn rename_atom(atom: Atom, renamings: &[(String, String)]) -> Atom {
    match atom {
        Atom::Predicate { name, args } => Atom::Predicate {
            name,
            args: args
                .into_iter()
                .map(|term| rename_term(term, renamings))
                .collect(),
        },
        Atom::Equals(l, r) => {
            Atom::Equals(rename_term(l, renamings), rename_term(r, renamings))
        }
    }
}

fn rename_term(term: Term, renamings: &[(String, String)]) -> Term {
    match term {
        Term::Variable(name) => {
            // Innermost binder wins.
            for (old, new) in renamings.iter().rev() {
                if *old == name {
                    return Term::var(new.clone());
                }
            }
            Term::Variable(name)
        }
        constant @ Term::Constant(_) => constant,
        Term::Function { name, args } => Term::Function {
            name,
            args: args
                .into_iter()
                .map(|arg| rename_term(arg, renamings))
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse;

    fn binder_names(formula: &Formula, into: &mut Vec<String>) {
        match formula {
            Formula::Forall { var, body } | Formula::Exists { var, body } => {
                into.push(var.clone());
                binder_names(body, into);
            }
            Formula::Implies(l, r)
            | Formula::Iff(l, r)
            | Formula::And(l, r)
            | Formula::Or(l, r) => {
                binder_names(l, into);
                binder_names(r, into);
            }
            Formula::Not(e) => binder_names(e, into),
            Formula::Atom(_) => {}
        }
    }

    #[test]
    fn binders_are_distinct() {
        let mut counter = 0;
        let formula = standardize(
            parse("all x P(x) & all x Q(x) & exists x R(x)").unwrap(),
            &mut counter,
        );

        let mut names = Vec::new();
        binder_names(&formula, &mut names);
        assert_eq!(names.len(), 3);
        let distinct: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn shadowing() {
        // The occurrence of x in P is bound by the outer binder; the occurrence
        // in Q by the inner. After standardization they must differ, and the
        // occurrence in R — outside the inner extent — must match P's.
        let mut counter = 0;
        let formula = standardize(
            parse("all x ((P(x) & exists x Q(x)) & R(x))").unwrap(),
            &mut counter,
        );
        assert_eq!(
            formula.to_string(),
            "all _v1 ((P(_v1) & exists _v2 Q(_v2)) & R(_v1))"
        );
    }

    #[test]
    fn free_variables_untouched() {
        let mut counter = 0;
        let formula = standardize(parse("all x P(x, y)").unwrap(), &mut counter);
        assert_eq!(formula.to_string(), "all _v1 P(_v1,y)");
    }

    #[test]
    fn sibling_scopes_do_not_leak() {
        // The renaming of x must end with its binder, leaving the free x alone.
        let mut counter = 0;
        let formula = standardize(parse("all x P(x) & Q(x)").unwrap(), &mut counter);
        assert_eq!(formula.to_string(), "(all _v1 P(_v1) & Q(x))");
    }

    #[test]
    fn deep_conjunction_chain() {
        // The work stack carries the depth, not the call stack.
        let source = (0..10_000)
            .map(|i| format!("P{i}"))
            .collect::<Vec<_>>()
            .join(" & ");
        let mut counter = 0;

        let formula = standardize(parse(&source).unwrap(), &mut counter);
        assert_eq!(formula.node_count(), 19_999);
    }
}

/*!
Tarskian evaluation of formulas against a finite model.

Quantifiers iterate the domain through an explicit environment, equality compares element values, and terms evaluate by environment lookup for variables, the constants table for constants, and table lookup for function applications.

The evaluator is a small machine over two explicit stacks --- frames of pending work and computed truth values --- rather than a recursive function, so formula depth costs heap and never the call stack.
A quantifier holds one frame which re-queues its body per element, short-circuiting the way the connectives do: a falsified universal or a witnessed existential stops iterating at once.

Evaluation is total over models which interpret the formula's signature; a missing constant or table entry yields `None`, which the search treats as falsity of the enclosing premise.
*/

use std::collections::HashMap;

use crate::language::ast::{Atom, Formula, Term};

use super::model::Model;

enum TermFrame<'t> {
    Eval(&'t Term),
    Apply { name: &'t str, arity: usize },
}

/// The value of `term` in `model` under `env`.
pub fn eval_term(term: &Term, model: &Model, env: &HashMap<String, usize>) -> Option<usize> {
    let mut frames = vec![TermFrame::Eval(term)];
    let mut values: Vec<usize> = Vec::new();

    while let Some(frame) = frames.pop() {
        match frame {
            TermFrame::Eval(term) => match term {
                Term::Variable(name) => values.push(*env.get(name)?),

                Term::Constant(name) => values.push(*model.constants.get(name)?),

                Term::Function { name, args } => {
                    frames.push(TermFrame::Apply {
                        name,
                        arity: args.len(),
                    });
                    // Reversed, so the leftmost argument evaluates first.
                    for arg in args.iter().rev() {
                        frames.push(TermFrame::Eval(arg));
                    }
                }
            },

            TermFrame::Apply { name, arity } => {
                let tuple = values.split_off(values.len() - arity);
                values.push(*model.functions.get(name)?.get(&tuple)?);
            }
        }
    }

    values.pop()
}

enum Frame<'f> {
    Eval(&'f Formula),

    /// The right branch of a connective, entered or short-circuited on the left's value.
    AndRight(&'f Formula),
    OrRight(&'f Formula),
    ImpliesRight(&'f Formula),
    IffRight(&'f Formula),

    /// Combines an equivalence once both sides are valued.
    IffCombine(bool),

    Negate,

    /// One quantifier, mid-iteration; `next` is the element to try after the pending body value.
    Quantifier {
        var: &'f str,
        body: &'f Formula,
        next: usize,
        universal: bool,
        shadowed: Option<usize>,
    },
}

/// Whether `formula` holds in `model` under `env`.
pub fn eval_formula(formula: &Formula, model: &Model, env: &mut HashMap<String, usize>) -> bool {
    let mut frames = vec![Frame::Eval(formula)];
    let mut values: Vec<bool> = Vec::new();

    while let Some(frame) = frames.pop() {
        match frame {
            Frame::Eval(formula) => match formula {
                Formula::Forall { var, body } | Formula::Exists { var, body } => {
                    let universal = matches!(formula, Formula::Forall { .. });
                    if model.domain_size == 0 {
                        values.push(universal);
                        continue;
                    }
                    let shadowed = env.insert(var.clone(), 0);
                    frames.push(Frame::Quantifier {
                        var,
                        body,
                        next: 1,
                        universal,
                        shadowed,
                    });
                    frames.push(Frame::Eval(body));
                }

                Formula::Implies(l, r) => {
                    frames.push(Frame::ImpliesRight(r));
                    frames.push(Frame::Eval(l));
                }

                Formula::Iff(l, r) => {
                    frames.push(Frame::IffRight(r));
                    frames.push(Frame::Eval(l));
                }

                Formula::And(l, r) => {
                    frames.push(Frame::AndRight(r));
                    frames.push(Frame::Eval(l));
                }

                Formula::Or(l, r) => {
                    frames.push(Frame::OrRight(r));
                    frames.push(Frame::Eval(l));
                }

                Formula::Not(e) => {
                    frames.push(Frame::Negate);
                    frames.push(Frame::Eval(e));
                }

                Formula::Atom(atom) => values.push(eval_atom(atom, model, env)),
            },

            Frame::AndRight(r) => {
                let left = values.pop().expect("valued left branch");
                match left {
                    true => frames.push(Frame::Eval(r)),
                    false => values.push(false),
                }
            }

            Frame::OrRight(r) => {
                let left = values.pop().expect("valued left branch");
                match left {
                    true => values.push(true),
                    false => frames.push(Frame::Eval(r)),
                }
            }

            Frame::ImpliesRight(r) => {
                let left = values.pop().expect("valued left branch");
                match left {
                    true => frames.push(Frame::Eval(r)),
                    false => values.push(true),
                }
            }

            Frame::IffRight(r) => {
                let left = values.pop().expect("valued left branch");
                frames.push(Frame::IffCombine(left));
                frames.push(Frame::Eval(r));
            }

            Frame::IffCombine(left) => {
                let right = values.pop().expect("valued right branch");
                values.push(left == right);
            }

            Frame::Negate => {
                let value = values.pop().expect("valued negated formula");
                values.push(!value);
            }

            Frame::Quantifier {
                var,
                body,
                next,
                universal,
                shadowed,
            } => {
                let latest = values.pop().expect("valued quantifier body");

                // A falsified universal or witnessed existential settles it, as
                // does running out of elements; `latest` is the verdict either way.
                let settled = latest != universal || next == model.domain_size;
                if settled {
                    restore(env, var, shadowed);
                    values.push(latest);
                } else {
                    env.insert(var.to_string(), next);
                    frames.push(Frame::Quantifier {
                        var,
                        body,
                        next: next + 1,
                        universal,
                        shadowed,
                    });
                    frames.push(Frame::Eval(body));
                }
            }
        }
    }

    values.pop().expect("one valued formula")
}

fn eval_atom(atom: &Atom, model: &Model, env: &HashMap<String, usize>) -> bool {
    match atom {
        Atom::Equals(l, r) => match (eval_term(l, model, env), eval_term(r, model, env)) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },

        Atom::Predicate { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                match eval_term(arg, model, env) {
                    Some(value) => values.push(value),
                    None => return false,
                }
            }
            model
                .predicates
                .get(name)
                .map_or(false, |extension| extension.contains(&values))
        }
    }
}

fn restore(env: &mut HashMap<String, usize>, var: &str, shadowed: Option<usize>) {
    match shadowed {
        Some(value) => {
            env.insert(var.to_string(), value);
        }
        None => {
            env.remove(var);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse;
    use std::collections::{BTreeMap, BTreeSet};

    fn model() -> Model {
        let mut model = Model::new(2);
        model.constants.insert("zero".to_string(), 0);
        model.constants.insert("one".to_string(), 1);
        model
            .functions
            .insert("swap".to_string(), BTreeMap::from([(vec![0], 1), (vec![1], 0)]));
        model
            .predicates
            .insert("P".to_string(), BTreeSet::from([vec![0]]));
        model
    }

    fn eval(source: &str) -> bool {
        eval_formula(&parse(source).unwrap(), &model(), &mut HashMap::new())
    }

    #[test]
    fn atoms_and_terms() {
        assert!(eval("P(zero)"));
        assert!(!eval("P(one)"));
        assert!(eval("P(swap(one))"));
        assert!(eval("swap(zero) = one"));
    }

    #[test]
    fn nested_function_terms() {
        let term = parse("swap(swap(swap(zero))) = one")
            .unwrap();
        assert!(eval_formula(&term, &model(), &mut HashMap::new()));
    }

    #[test]
    fn quantifiers() {
        assert!(eval("exists x P(x)"));
        assert!(!eval("all x P(x)"));
        assert!(eval("all x (P(x) | P(swap(x)))"));
    }

    #[test]
    fn connectives() {
        assert!(eval("P(zero) & -P(one)"));
        assert!(eval("P(one) -> P(swap(zero))"));
        assert!(eval("P(zero) <-> -P(one)"));
    }

    #[test]
    fn shadowing_in_the_environment() {
        assert!(eval("exists x (P(x) & exists x -P(x))"));
    }

    #[test]
    fn quantifier_environment_restored() {
        // The binder's element must not leak past its extent.
        let formula = parse("all x P(x)").unwrap();
        let mut env = HashMap::new();
        env.insert("x".to_string(), 1);

        eval_formula(&formula, &model(), &mut env);
        assert_eq!(env.get("x"), Some(&1));
    }

    #[test]
    fn deep_connective_chain() {
        // Depth costs frames on the heap, not the call stack.
        let source = (0..10_000)
            .map(|_| "P(zero)")
            .collect::<Vec<_>>()
            .join(" & ");
        assert!(eval(&source));
    }
}

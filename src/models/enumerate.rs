/*!
Signature-driven model enumeration for one domain size.

The search runs as a state machine over three stages --- constants, then function tables, then predicate extensions --- backtracking within each:

1. **Constants.** With symmetry breaking on (the default), the `i`-th constant ranges over `0..=min(max_so_far + 1, n - 1)` --- the lex-leader heuristic, which removes every relabelling of the domain by a bijection before it is ever built.
2. **Functions.** Each table is enumerated entry-wise over the lexicographic listing of `domain^k`, the whole table acting as a base-`n` counter; the outer loop is the Cartesian product across functions.
3. **Predicates.** Each extension is enumerated as a subset of `domain^k`, tuple by tuple.

Premise checks are incremental: each premise pre-computes the predicates it mentions, and the moment the last of them is fully assigned the premise is evaluated against the partial model --- a falsified premise backtracks the whole subtree under the current extension.
Premises mentioning no predicate at all (equality chains, arithmetic over constants) are checked as soon as the function tables close.
*/

use std::collections::BTreeSet;

use crate::{
    engines::CancelFlag,
    generic::deadline::Deadline,
    language::{
        ast::Formula,
        signature::{predicates_used, Signature},
    },
    misc::log::targets,
};

use super::{eval, model::Model};

/// A prepared search problem: premises with their predicate dependencies.
#[derive(Clone, Debug)]
pub struct SearchProblem {
    /// The premises; free variables already skolemized to constants.
    pub premises: Vec<Formula>,

    /// The merged signature of the premises.
    pub signature: Signature,

    /// Per premise, the predicates it mentions.
    dependencies: Vec<BTreeSet<String>>,
}

impl SearchProblem {
    pub fn new(premises: Vec<Formula>, signature: Signature) -> Self {
        let dependencies = premises.iter().map(predicates_used).collect();
        SearchProblem {
            premises,
            signature,
            dependencies,
        }
    }
}

/// How a domain search ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchEnd {
    /// Every assignment was visited or pruned.
    Exhausted,

    /// The collector asked for no more models.
    Collected,

    /// The deadline passed.
    Timeout,

    /// Cancellation was requested.
    Cancelled,
}

/// Searches the domain `{0..n-1}`, handing each satisfying model to `collect`.
///
/// The collector returns whether the search should continue.
pub fn search_domain(
    problem: &SearchProblem,
    n: usize,
    symmetry: bool,
    deadline: &Deadline,
    cancel: &CancelFlag,
    collect: &mut dyn FnMut(Model) -> bool,
) -> SearchEnd {
    let constants: Vec<String> = problem.signature.constants.iter().cloned().collect();
    let functions: Vec<(String, usize)> = problem
        .signature
        .functions
        .iter()
        .map(|(name, arity)| (name.clone(), *arity))
        .collect();
    let predicates: Vec<(String, usize)> = problem
        .signature
        .predicates
        .iter()
        .map(|(name, arity)| (name.clone(), *arity))
        .collect();

    // The stage at which each premise becomes checkable: the greatest index of a
    // predicate it mentions, or none for predicate-free premises.
    let checkable_at: Vec<Option<usize>> = problem
        .dependencies
        .iter()
        .map(|deps| {
            deps.iter()
                .filter_map(|name| predicates.iter().position(|(p, _)| p == name))
                .max()
        })
        .collect();

    let mut search = Search {
        problem,
        n,
        symmetry,
        deadline,
        cancel,
        collect,
        constants,
        functions,
        predicates,
        checkable_at,
        end: None,
    };

    let mut model = Model::new(n);
    for (name, _) in &search.predicates {
        model.predicates.insert(name.clone(), BTreeSet::new());
    }

    search.constants_stage(0, 0, &mut model);
    search.end.unwrap_or(SearchEnd::Exhausted)
}

struct Search<'s> {
    problem: &'s SearchProblem,
    n: usize,
    symmetry: bool,
    deadline: &'s Deadline,
    cancel: &'s CancelFlag,
    collect: &'s mut dyn FnMut(Model) -> bool,

    constants: Vec<String>,
    functions: Vec<(String, usize)>,
    predicates: Vec<(String, usize)>,
    checkable_at: Vec<Option<usize>>,

    end: Option<SearchEnd>,
}

impl Search<'_> {
    fn interrupted(&mut self) -> bool {
        if self.end.is_some() {
            return true;
        }
        if self.cancel.cancelled() {
            self.end = Some(SearchEnd::Cancelled);
            return true;
        }
        if self.deadline.expired() {
            self.end = Some(SearchEnd::Timeout);
            return true;
        }
        false
    }

    fn constants_stage(&mut self, index: usize, next_fresh: usize, model: &mut Model) {
        if self.interrupted() {
            return;
        }

        if index == self.constants.len() {
            self.function_stage(0, model);
            return;
        }

        let cap = match self.symmetry {
            // Lex-leader: an unused element beyond the first fresh one is a relabelling.
            true => next_fresh.min(self.n - 1),
            false => self.n - 1,
        };

        let name = self.constants[index].clone();
        for value in 0..=cap {
            model.constants.insert(name.clone(), value);
            self.constants_stage(index + 1, next_fresh.max(value + 1), model);
            if self.end.is_some() {
                return;
            }
        }
        model.constants.remove(&name);
    }

    fn function_stage(&mut self, index: usize, model: &mut Model) {
        if self.interrupted() {
            return;
        }

        if index == self.functions.len() {
            // Predicate-free premises are determined now.
            if !self.premises_hold(model, None) {
                return;
            }
            self.predicate_stage(0, model);
            return;
        }

        let (name, arity) = self.functions[index].clone();
        let tuples = tuples_of(self.n, arity);
        model.functions.insert(name.clone(), Default::default());
        self.function_entries(index, &name, &tuples, 0, model);
        model.functions.remove(&name);
    }

    fn function_entries(
        &mut self,
        index: usize,
        name: &str,
        tuples: &[Vec<usize>],
        entry: usize,
        model: &mut Model,
    ) {
        if self.interrupted() {
            return;
        }

        if entry == tuples.len() {
            self.function_stage(index + 1, model);
            return;
        }

        for value in 0..self.n {
            model
                .functions
                .get_mut(name)
                .expect("table under construction")
                .insert(tuples[entry].clone(), value);
            self.function_entries(index, name, tuples, entry + 1, model);
            if self.end.is_some() {
                return;
            }
        }
    }

    fn predicate_stage(&mut self, index: usize, model: &mut Model) {
        if self.interrupted() {
            return;
        }

        if index == self.predicates.len() {
            log::trace!(target: targets::MODEL_FINDER, "model found at n={}", self.n);
            if !(self.collect)(model.clone()) {
                self.end = Some(SearchEnd::Collected);
            }
            return;
        }

        let (name, arity) = self.predicates[index].clone();
        let tuples = tuples_of(self.n, arity);
        self.extension_entries(index, &name, &tuples, 0, model);
    }

    fn extension_entries(
        &mut self,
        index: usize,
        name: &str,
        tuples: &[Vec<usize>],
        entry: usize,
        model: &mut Model,
    ) {
        if self.interrupted() {
            return;
        }

        if entry == tuples.len() {
            // The extension is complete; premises waiting on it are determined.
            if !self.premises_hold(model, Some(index)) {
                return;
            }
            self.predicate_stage(index + 1, model);
            return;
        }

        // Tuple out.
        self.extension_entries(index, name, tuples, entry + 1, model);
        if self.end.is_some() {
            return;
        }

        // Tuple in.
        model
            .predicates
            .get_mut(name)
            .expect("extension under construction")
            .insert(tuples[entry].clone());
        self.extension_entries(index, name, tuples, entry + 1, model);
        model
            .predicates
            .get_mut(name)
            .expect("extension under construction")
            .remove(&tuples[entry]);
    }

    /// Evaluates the premises which became checkable at `stage`.
    fn premises_hold(&mut self, model: &Model, stage: Option<usize>) -> bool {
        let mut env = std::collections::HashMap::new();
        for (premise, checkable) in self
            .problem
            .premises
            .iter()
            .zip(self.checkable_at.iter())
        {
            if *checkable == stage && !eval::eval_formula(premise, model, &mut env) {
                return false;
            }
        }
        true
    }
}

/// The lexicographic listing of `domain^arity`.
pub fn tuples_of(n: usize, arity: usize) -> Vec<Vec<usize>> {
    let mut tuples = vec![Vec::new()];
    for _ in 0..arity {
        let mut next = Vec::with_capacity(tuples.len() * n);
        for tuple in &tuples {
            for element in 0..n {
                let mut extended = tuple.clone();
                extended.push(element);
                next.push(extended);
            }
        }
        tuples = next;
    }
    tuples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse;

    fn problem(sources: &[&str]) -> SearchProblem {
        let premises: Vec<Formula> = sources.iter().map(|s| parse(s).unwrap()).collect();
        let signature = Signature::of_all(&premises).unwrap();
        SearchProblem::new(premises, signature)
    }

    fn first_model(problem: &SearchProblem, n: usize) -> Option<Model> {
        let mut found = None;
        let end = search_domain(
            problem,
            n,
            true,
            &Deadline::none(),
            &CancelFlag::default(),
            &mut |model| {
                found = Some(model);
                false
            },
        );
        assert_ne!(end, SearchEnd::Timeout);
        found
    }

    #[test]
    fn tuples_listing() {
        assert_eq!(tuples_of(2, 0), vec![Vec::<usize>::new()]);
        assert_eq!(tuples_of(2, 2).len(), 4);
        assert_eq!(tuples_of(3, 2)[0], vec![0, 0]);
        assert_eq!(tuples_of(3, 2)[8], vec![2, 2]);
    }

    #[test]
    fn one_element_model() {
        let problem = problem(&["exists x P(x)", "all x (P(x) -> Q(x))"]);
        let model = first_model(&problem, 1).unwrap();

        assert!(model.predicates["P"].contains(&vec![0]));
        assert!(model.predicates["Q"].contains(&vec![0]));
    }

    #[test]
    fn unsatisfiable_premises_exhaust() {
        let problem = problem(&["P(athens)", "-P(athens)"]);
        assert!(first_model(&problem, 2).is_none());
    }

    #[test]
    fn lex_leader_pins_the_first_constant() {
        let problem = problem(&["P(athens)"]);
        let model = first_model(&problem, 3).unwrap();

        // With symmetry breaking the first constant lands on element 0.
        assert_eq!(model.constants["athens"], 0);
    }

    #[test]
    fn distinct_constants_need_two_elements() {
        let problem = problem(&["P(athens)", "-P(berlin)"]);

        // One element cannot separate them.
        assert!(first_model(&problem, 1).is_none());

        let model = first_model(&problem, 2).unwrap();
        assert_ne!(model.constants["athens"], model.constants["berlin"]);
    }

    #[test]
    fn functions_are_total() {
        let problem = problem(&["all x P(f(x))"]);
        let model = first_model(&problem, 2).unwrap();

        // One entry per element of the one-argument domain.
        assert_eq!(model.functions["f"].len(), 2);
    }

    #[test]
    fn model_counting_without_symmetry() {
        // Subsets of a two-element domain satisfying "exists x P(x)".
        let problem = problem(&["exists x P(x)"]);
        let mut count = 0;
        search_domain(
            &problem,
            2,
            false,
            &Deadline::none(),
            &CancelFlag::default(),
            &mut |_| {
                count += 1;
                true
            },
        );
        assert_eq!(count, 3);
    }
}

/*!
The model search driver.

Domains are tried at increasing sizes `1, 2, …` up to the requested maximum, under one deadline.
Each size runs either the [nested enumeration](super::enumerate) or, for large domains or on request, the [grounded satisfiability path](super::sat_path); models found are subjected to the [isomorphism filter](super::iso) when several were asked for and the domain is small enough to afford it.

Free variables in premises are skolemized to same-named constants before anything else, so a counter-example's witnesses show up in the interpretation --- `find-counterexample` is exactly a model search over the premises plus the negated goal.
*/

use crate::{
    config::ModelConfig,
    engines::CancelFlag,
    generic::deadline::Deadline,
    language::{
        ast::{Atom, Formula, Term},
        signature::Signature,
    },
    misc::log::targets,
    types::err::{ErrorKind, ModelError},
};

use super::{
    enumerate::{self, SearchEnd, SearchProblem},
    iso,
    model::Model,
    sat_path,
};

/// Options of one search.
#[derive(Clone, Debug)]
pub struct FindOptions {
    /// Search exactly this size, rather than incrementing.
    pub domain_size: Option<usize>,

    /// The largest size the incremental search will try.
    pub max_domain_size: usize,

    /// Take the grounded path regardless of size.
    pub use_sat: bool,

    /// Lex-leader symmetry breaking, and isomorphism filtering of multi-model output.
    pub symmetry: bool,

    /// How many models to return.
    pub count: usize,

    /// Wall-clock bound for the whole search.
    pub deadline: Deadline,

    /// Cooperative cancellation, checked between domain sizes and within each.
    pub cancel: CancelFlag,
}

impl Default for FindOptions {
    fn default() -> Self {
        FindOptions {
            domain_size: None,
            max_domain_size: 8,
            use_sat: false,
            symmetry: true,
            count: 1,
            deadline: Deadline::none(),
            cancel: CancelFlag::default(),
        }
    }
}

/// The result of one search.
#[derive(Clone, Debug, Default)]
pub struct FindOutcome {
    /// The models found, at most the requested count.
    pub models: Vec<Model>,

    /// Whether the deadline cut the search short.
    pub timed_out: bool,
}

/// The finder; stateless between calls.
#[derive(Clone, Debug, Default)]
pub struct ModelFinder {
    pub config: ModelConfig,
}

impl ModelFinder {
    pub fn new(config: ModelConfig) -> Self {
        ModelFinder { config }
    }

    /// Searches for models of `premises`.
    pub fn find_models(
        &self,
        premises: &[Formula],
        options: &FindOptions,
    ) -> Result<FindOutcome, ErrorKind> {
        let ceiling = self.config.max_domain_size.max;
        let (start, end) = match options.domain_size {
            Some(n) => (n, n),
            None => (1, options.max_domain_size),
        };
        if start == 0 || end == 0 || end > ceiling || start > end {
            return Err(ErrorKind::Model(ModelError::InvalidDomain {
                requested: if start == 0 { start } else { end },
                max: ceiling,
            }));
        }

        let premises: Vec<Formula> = premises
            .iter()
            .map(|premise| skolemize_free_variables(premise.clone()))
            .collect();
        let signature = Signature::of_all(&premises)?;
        let problem = SearchProblem::new(premises, signature);

        let mut outcome = FindOutcome::default();

        for n in start..=end {
            if options.deadline.expired() {
                outcome.timed_out = true;
                break;
            }
            if options.cancel.cancelled() {
                break;
            }

            log::debug!(target: targets::MODEL_FINDER, "trying domain size {n}");

            let filtering =
                options.symmetry && options.count > 1 && n <= self.config.iso_max_domain.value;

            if options.use_sat || n >= self.config.sat_threshold.value {
                // Enumeration is quotiented by blocking clauses, not by isomorphism;
                // over-ask so the filter still has enough candidates.
                let ask = match filtering {
                    true => options.count.saturating_mul(8),
                    false => options.count - outcome.models.len(),
                };
                let found = sat_path::search_domain_sat(
                    &problem,
                    n,
                    ask,
                    &options.deadline,
                    &options.cancel,
                )?;
                for model in found {
                    accept(&mut outcome.models, model, filtering, options.count);
                    if outcome.models.len() >= options.count {
                        break;
                    }
                }
            } else {
                let end = enumerate::search_domain(
                    &problem,
                    n,
                    options.symmetry,
                    &options.deadline,
                    &options.cancel,
                    &mut |model| {
                        accept(&mut outcome.models, model, filtering, options.count);
                        outcome.models.len() < options.count
                    },
                );
                if end == SearchEnd::Timeout {
                    outcome.timed_out = true;
                    break;
                }
            }

            if outcome.models.len() >= options.count {
                break;
            }
        }

        Ok(outcome)
    }

    /// Searches for a model of `premises ∪ {¬goal}`; any model witnesses non-entailment.
    pub fn find_counterexample(
        &self,
        premises: &[Formula],
        goal: &Formula,
        options: &FindOptions,
    ) -> Result<FindOutcome, ErrorKind> {
        let mut widened = premises.to_vec();
        widened.push(Formula::not(goal.clone()));
        self.find_models(&widened, options)
    }
}

fn accept(models: &mut Vec<Model>, candidate: Model, filtering: bool, count: usize) {
    if models.len() >= count {
        return;
    }
    if filtering
        && models
            .iter()
            .any(|accepted| iso::isomorphic(accepted, &candidate))
    {
        return;
    }
    models.push(candidate);
}

/// Replaces every free occurrence of a variable with a same-named constant.
///
/// Bound occurrences are untouched, including those of a bound variable sharing a free variable's name.
fn skolemize_free_variables(formula: Formula) -> Formula {
    fn walk(formula: Formula, bound: &mut Vec<String>) -> Formula {
        match formula {
            Formula::Forall { var, body } => {
                bound.push(var.clone());
                let body = walk(*body, bound);
                bound.pop();
                Formula::forall(var, body)
            }
            Formula::Exists { var, body } => {
                bound.push(var.clone());
                let body = walk(*body, bound);
                bound.pop();
                Formula::exists(var, body)
            }
            Formula::Implies(l, r) => Formula::implies(walk(*l, bound), walk(*r, bound)),
            Formula::Iff(l, r) => Formula::iff(walk(*l, bound), walk(*r, bound)),
            Formula::And(l, r) => Formula::and(walk(*l, bound), walk(*r, bound)),
            Formula::Or(l, r) => Formula::or(walk(*l, bound), walk(*r, bound)),
            Formula::Not(e) => Formula::not(walk(*e, bound)),
            Formula::Atom(atom) => Formula::Atom(match atom {
                Atom::Predicate { name, args } => Atom::Predicate {
                    name,
                    args: args.into_iter().map(|t| term(t, bound)).collect(),
                },
                Atom::Equals(l, r) => Atom::Equals(term(l, bound), term(r, bound)),
            }),
        }
    }

    fn term(t: Term, bound: &[String]) -> Term {
        match t {
            Term::Variable(name) => match bound.iter().any(|b| *b == name) {
                true => Term::Variable(name),
                false => Term::Constant(name),
            },
            Term::Constant(_) => t,
            Term::Function { name, args } => Term::Function {
                name,
                args: args.into_iter().map(|a| term(a, bound)).collect(),
            },
        }
    }

    walk(formula, &mut Vec::new())
}

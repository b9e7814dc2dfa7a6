/*!
Model finding through the satisfiability engine.

For a fixed domain size `n` the premises are *grounded*: every quantifier is expanded over the domain, elements appearing as the reserved constants `@0 … @n-1`.
What remains is propositional except for the terms: constants and function applications still name unknown elements.
Each such **cell** --- a constant, or a function over an element tuple --- receives `n` assignment atoms with an exactly-one constraint, and ground clauses are flattened innermost-first: a clause mentioning cell `t` splits into `n` clauses, each conditioned on `t` taking a particular value.
Equalities between elements simplify away during flattening.

The encoded set goes to the [satisfiability engine](crate::engines::sat) with the cell and predicate atoms as the atoms of interest; blocking-clause enumeration then yields as many distinct models as requested, and each satisfying assignment decodes directly into a [Model].

This is the path the finder takes for large domains, where nested enumeration would drown, and it is also available on request.
*/

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    clausal::{
        clause::{Clause, Literal, EQUALITY_PREDICATE},
        Clausifier, ClausifyInput, SkolemEnv,
    },
    engines::{sat, CancelFlag},
    generic::deadline::Deadline,
    language::ast::{Atom, Formula, Term},
    misc::log::targets,
    types::err::ErrorKind,
};

use super::{enumerate::tuples_of, enumerate::SearchProblem, model::Model};

fn element(e: usize) -> Term {
    Term::constant(format!("@{e}"))
}

fn element_of(term: &Term) -> Option<usize> {
    match term {
        Term::Constant(name) => name.strip_prefix('@')?.parse().ok(),
        _ => None,
    }
}

/// Searches the domain `{0..n-1}` through the grounded encoding, returning up to `count` models.
pub fn search_domain_sat(
    problem: &SearchProblem,
    n: usize,
    count: usize,
    deadline: &Deadline,
    cancel: &CancelFlag,
) -> Result<Vec<Model>, ErrorKind> {
    let encoding = Encoding::build(problem, n)?;
    log::debug!(
        target: targets::MODEL_FINDER,
        "grounded n={n}: {} clauses over {} cells",
        encoding.clauses.len(),
        encoding.cells.len(),
    );

    let assignments = sat::enumerate_assignments(
        &encoding.clauses,
        &encoding.interest,
        count,
        deadline,
        cancel,
    )?;

    Ok(assignments
        .iter()
        .map(|assignment| encoding.decode(assignment, n))
        .collect())
}

/// One cell of the encoding: a constant, or a function over an element tuple.
#[derive(Clone, Debug)]
struct Cell {
    term: Term,
    constant: Option<String>,
    function: Option<(String, Vec<usize>)>,
}

struct Encoding {
    clauses: Vec<Clause>,
    cells: Vec<Cell>,
    interest: HashSet<String>,

    /// Atom key of a cell-assignment literal to (cell index, element).
    cell_atoms: HashMap<String, (usize, usize)>,

    /// Atom key of a predicate literal to (name, tuple).
    predicate_atoms: HashMap<String, (String, Vec<usize>)>,
}

impl Encoding {
    fn build(problem: &SearchProblem, n: usize) -> Result<Encoding, ErrorKind> {
        // Cells: constants of the signature, and functions over element tuples.
        let mut cells = Vec::new();
        for constant in &problem.signature.constants {
            cells.push(Cell {
                term: Term::constant(constant.clone()),
                constant: Some(constant.clone()),
                function: None,
            });
        }
        for (function, arity) in &problem.signature.functions {
            for tuple in tuples_of(n, *arity) {
                cells.push(Cell {
                    term: Term::function(
                        function.clone(),
                        tuple.iter().map(|&e| element(e)).collect(),
                    ),
                    constant: None,
                    function: Some((function.clone(), tuple)),
                });
            }
        }

        let cell_literal = |index: usize, e: usize, negated: bool| {
            Literal::new(
                "#val",
                vec![cells[index].term.clone(), element(e)],
                negated,
            )
        };

        let mut cell_atoms = HashMap::new();
        let mut interest = HashSet::new();
        let mut clauses = Vec::new();

        // Exactly one value per cell.
        for (index, _) in cells.iter().enumerate() {
            let mut at_least_one = Vec::with_capacity(n);
            for e in 0..n {
                let literal = cell_literal(index, e, false);
                cell_atoms.insert(literal.atom_key(), (index, e));
                interest.insert(literal.atom_key());
                at_least_one.push(literal);
            }
            for a in 0..n {
                for b in (a + 1)..n {
                    clauses.push(Clause::new(vec![
                        cell_literal(index, a, true),
                        cell_literal(index, b, true),
                    ]));
                }
            }
            clauses.push(Clause::new(at_least_one));
        }

        // Predicate atoms over element tuples.
        let mut predicate_atoms = HashMap::new();
        for (predicate, arity) in &problem.signature.predicates {
            for tuple in tuples_of(n, *arity) {
                let literal = Literal::new(
                    predicate.clone(),
                    tuple.iter().map(|&e| element(e)).collect(),
                    false,
                );
                interest.insert(literal.atom_key());
                predicate_atoms.insert(literal.atom_key(), (predicate.clone(), tuple));
            }
        }

        // Ground the premises over the domain and clausify.
        let clausifier = Clausifier::default();
        let mut env = SkolemEnv::default();
        let mut premise_clauses = Vec::new();
        for premise in &problem.premises {
            let grounded = ground_formula(premise, n, &mut HashMap::new());
            let output = clausifier
                .clausify_into(ClausifyInput::Ast(grounded), &mut env)
                .map_err(ErrorKind::Clausify)?;
            premise_clauses.extend(output.clauses);
        }

        // Flatten cells out of the premise clauses.
        let cell_index: HashMap<String, usize> = cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (cell.term.to_string(), index))
            .collect();

        let mut worklist = premise_clauses;
        while let Some(clause) = worklist.pop() {
            match find_cell_occurrence(&clause) {
                Some(target) => {
                    let index = match cell_index.get(&target.to_string()) {
                        Some(index) => *index,
                        // Every ground term decomposes into signature cells.
                        None => continue,
                    };
                    for e in 0..n {
                        let mut conditioned = clause.clone();
                        for literal in &mut conditioned.literals {
                            for arg in &mut literal.args {
                                replace_term(arg, &target, &element(e));
                            }
                        }
                        conditioned.literals.insert(0, cell_literal(index, e, true));
                        worklist.push(conditioned);
                    }
                }

                None => {
                    if let Some(simplified) = simplify_element_equalities(clause) {
                        clauses.push(simplified);
                    }
                }
            }
        }

        Ok(Encoding {
            clauses,
            cells,
            interest,
            cell_atoms,
            predicate_atoms,
        })
    }

    fn decode(&self, assignment: &BTreeMap<String, bool>, n: usize) -> Model {
        let mut model = Model::new(n);

        for (name, _) in self.predicate_atoms.values() {
            model.predicates.entry(name.clone()).or_default();
        }

        for (key, value) in assignment {
            if !value {
                continue;
            }
            if let Some((cell, e)) = self.cell_atoms.get(key) {
                let cell = &self.cells[*cell];
                if let Some(constant) = &cell.constant {
                    model.constants.insert(constant.clone(), *e);
                }
                if let Some((function, tuple)) = &cell.function {
                    model
                        .functions
                        .entry(function.clone())
                        .or_default()
                        .insert(tuple.clone(), *e);
                }
            } else if let Some((predicate, tuple)) = self.predicate_atoms.get(key) {
                model
                    .predicates
                    .entry(predicate.clone())
                    .or_default()
                    .insert(tuple.clone());
            }
        }

        model
    }
}

/// Expands every quantifier of `formula` over the domain.
fn ground_formula(formula: &Formula, n: usize, env: &mut HashMap<String, usize>) -> Formula {
    match formula {
        Formula::Forall { var, body } => {
            let conjuncts: Vec<Formula> = (0..n)
                .map(|e| {
                    let shadowed = env.insert(var.clone(), e);
                    let grounded = ground_formula(body, n, env);
                    restore(env, var, shadowed);
                    grounded
                })
                .collect();
            Formula::conjoin(conjuncts).unwrap_or(formula_true())
        }

        Formula::Exists { var, body } => {
            let disjuncts: Vec<Formula> = (0..n)
                .map(|e| {
                    let shadowed = env.insert(var.clone(), e);
                    let grounded = ground_formula(body, n, env);
                    restore(env, var, shadowed);
                    grounded
                })
                .collect();
            disjuncts
                .into_iter()
                .reduce(Formula::or)
                .unwrap_or(formula_false())
        }

        Formula::Implies(l, r) => Formula::implies(
            ground_formula(l, n, env),
            ground_formula(r, n, env),
        ),
        Formula::Iff(l, r) => Formula::iff(
            ground_formula(l, n, env),
            ground_formula(r, n, env),
        ),
        Formula::And(l, r) => Formula::and(
            ground_formula(l, n, env),
            ground_formula(r, n, env),
        ),
        Formula::Or(l, r) => Formula::or(
            ground_formula(l, n, env),
            ground_formula(r, n, env),
        ),
        Formula::Not(e) => Formula::not(ground_formula(e, n, env)),

        Formula::Atom(atom) => Formula::Atom(match atom {
            Atom::Predicate { name, args } => Atom::Predicate {
                name: name.clone(),
                args: args.iter().map(|arg| substitute(arg, env)).collect(),
            },
            Atom::Equals(l, r) => Atom::Equals(substitute(l, env), substitute(r, env)),
        }),
    }
}

fn substitute(term: &Term, env: &HashMap<String, usize>) -> Term {
    match term {
        Term::Variable(name) => match env.get(name) {
            Some(&e) => element(e),
            None => term.clone(),
        },
        Term::Constant(_) => term.clone(),
        Term::Function { name, args } => Term::function(
            name.clone(),
            args.iter().map(|arg| substitute(arg, env)).collect(),
        ),
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

// Degenerate quantifier bodies over an empty domain never arise (n >= 1), but the
// grounding stays total with distinguished atoms.
fn formula_true() -> Formula {
    Formula::atom(Atom::proposition("#true"))
}

fn formula_false() -> Formula {
    Formula::not(formula_true())
}

/// The innermost cell occurrence within the clause: a non-element constant, or a function whose arguments are all elements.
fn find_cell_occurrence(clause: &Clause) -> Option<Term> {
    fn find(term: &Term) -> Option<Term> {
        match term {
            Term::Variable(_) => None,
            Term::Constant(_) => match element_of(term) {
                Some(_) => None,
                None => Some(term.clone()),
            },
            Term::Function { args, .. } => {
                for arg in args {
                    if let Some(inner) = find(arg) {
                        return Some(inner);
                    }
                }
                Some(term.clone())
            }
        }
    }

    for literal in &clause.literals {
        // Conditioning literals already name their cell; scanning them would never terminate.
        if literal.predicate == "#val" {
            continue;
        }
        for arg in &literal.args {
            if let Some(target) = find(arg) {
                return Some(target);
            }
        }
    }
    None
}

fn replace_term(term: &mut Term, target: &Term, replacement: &Term) {
    if term == target {
        *term = replacement.clone();
        return;
    }
    if let Term::Function { args, .. } = term {
        for arg in args {
            replace_term(arg, target, replacement);
        }
    }
}

/// Resolves equality literals between elements; `None` when the clause is satisfied outright.
fn simplify_element_equalities(clause: Clause) -> Option<Clause> {
    let mut literals = Vec::with_capacity(clause.size());

    for literal in clause.literals {
        if literal.predicate == EQUALITY_PREDICATE && literal.args.len() == 2 {
            if let (Some(l), Some(r)) = (element_of(&literal.args[0]), element_of(&literal.args[1]))
            {
                let holds = l == r;
                match holds != literal.negated {
                    // The literal is true, so the clause is.
                    true => return None,
                    // The literal is false and drops out.
                    false => continue,
                }
            }
        }
        literals.push(literal);
    }

    Some(Clause::new(literals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{parser::parse, signature::Signature};

    fn problem(sources: &[&str]) -> SearchProblem {
        let premises: Vec<Formula> = sources.iter().map(|s| parse(s).unwrap()).collect();
        let signature = Signature::of_all(&premises).unwrap();
        SearchProblem::new(premises, signature)
    }

    fn models(sources: &[&str], n: usize, count: usize) -> Vec<Model> {
        search_domain_sat(
            &problem(sources),
            n,
            count,
            &Deadline::none(),
            &CancelFlag::default(),
        )
        .unwrap()
    }

    #[test]
    fn one_element_model() {
        let found = models(&["exists x P(x)", "all x (P(x) -> Q(x))"], 1, 1);
        assert_eq!(found.len(), 1);
        assert!(found[0].predicates["P"].contains(&vec![0]));
        assert!(found[0].predicates["Q"].contains(&vec![0]));
    }

    #[test]
    fn constants_are_assigned() {
        let found = models(&["P(athens)", "-P(berlin)"], 2, 1);
        assert_eq!(found.len(), 1);

        let model = &found[0];
        let athens = model.constants["athens"];
        let berlin = model.constants["berlin"];
        assert_ne!(athens, berlin);
        assert!(model.predicates["P"].contains(&vec![athens]));
    }

    #[test]
    fn unsatisfiable_premises_yield_nothing() {
        let found = models(&["P(athens)", "-P(athens)"], 2, 1);
        assert!(found.is_empty());
    }

    #[test]
    fn functions_decode_into_tables() {
        let found = models(&["all x (f(x) = x)"], 2, 1);
        assert_eq!(found.len(), 1);

        let table = &found[0].functions["f"];
        assert_eq!(table.get(&vec![0]), Some(&0));
        assert_eq!(table.get(&vec![1]), Some(&1));
    }

    #[test]
    fn multiple_models_are_distinct() {
        let found = models(&["exists x P(x)"], 2, 8);

        // Three non-empty subsets of a two-element domain.
        assert_eq!(found.len(), 3);
        let extensions: HashSet<String> = found
            .iter()
            .map(|model| format!("{:?}", model.predicates["P"]))
            .collect();
        assert_eq!(extensions.len(), 3);
    }
}

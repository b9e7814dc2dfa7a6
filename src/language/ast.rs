/*!
The formula syntax tree.

A [Formula] is a pure tree --- clausification copies sub-terms freely, and nothing is shared.
Atoms ([Atom]) sit below the connectives and quantifiers, and [terms](Term) sit below atoms.

The [Display] impls give the canonical print: a strict inverse of the parser modulo parenthesisation, used both for round-trip tests and as the identity of ground atoms at the clause level.
Binary connectives print fully parenthesised, terms print without spaces.

# Example

```rust,ignore
let formula = Formula::forall("x", Formula::implies(man_x, mortal_x));
assert_eq!(formula.to_string(), "all x (man(x) -> mortal(x))");
```
*/

use std::collections::HashSet;

/// A term: a variable, a constant, or a function application.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A variable, either quantifier-bound or free-and-implicitly-universal.
    Variable(String),

    /// A constant, including Skolem constants and numerals.
    Constant(String),

    /// A function application.
    Function { name: String, args: Vec<Term> },
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Term::Constant(name.into())
    }

    pub fn function(name: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Function {
            name: name.into(),
            args,
        }
    }

    /// Whether no variable occurs in the term.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Constant(_) => true,
            Term::Function { args, .. } => args.iter().all(Term::is_ground),
        }
    }

    /// Collects the variables of the term into `names`.
    pub fn variables_into(&self, names: &mut HashSet<String>) {
        match self {
            Term::Variable(name) => {
                names.insert(name.clone());
            }
            Term::Constant(_) => {}
            Term::Function { args, .. } => {
                for arg in args {
                    arg.variables_into(names);
                }
            }
        }
    }

    /// Replaces every occurrence of the variable `from` by `to`.
    pub fn rename_variable(&mut self, from: &str, to: &Term) {
        match self {
            Term::Variable(name) => {
                if name == from {
                    *self = to.clone();
                }
            }
            Term::Constant(_) => {}
            Term::Function { args, .. } => {
                for arg in args {
                    arg.rename_variable(from, to);
                }
            }
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Variable(name) | Term::Constant(name) => write!(f, "{name}"),
            Term::Function { name, args } => {
                write!(f, "{name}(")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// An atom: a predicate application or an equality.
///
/// A 0-arity predicate is a proposition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Atom {
    /// `name(t1, …, tn)`, or a bare `name`.
    Predicate { name: String, args: Vec<Term> },

    /// `l = r`, term-level infix.
    Equals(Term, Term),
}

impl Atom {
    pub fn predicate(name: impl Into<String>, args: Vec<Term>) -> Self {
        Atom::Predicate {
            name: name.into(),
            args,
        }
    }

    pub fn proposition(name: impl Into<String>) -> Self {
        Atom::Predicate {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn equals(l: Term, r: Term) -> Self {
        Atom::Equals(l, r)
    }

    /// The terms of the atom, left to right.
    pub fn terms(&self) -> Vec<&Term> {
        match self {
            Atom::Predicate { args, .. } => args.iter().collect(),
            Atom::Equals(l, r) => vec![l, r],
        }
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Atom::Predicate { name, args } => {
                if args.is_empty() {
                    write!(f, "{name}")
                } else {
                    write!(f, "{name}(")?;
                    for (index, arg) in args.iter().enumerate() {
                        if index > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ")")
                }
            }
            Atom::Equals(l, r) => write!(f, "{l} = {r}"),
        }
    }
}

/// A formula of first-order logic with equality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Formula {
    /// `all var body`
    Forall { var: String, body: Box<Formula> },

    /// `exists var body`
    Exists { var: String, body: Box<Formula> },

    /// `l -> r`
    Implies(Box<Formula>, Box<Formula>),

    /// `l <-> r`
    Iff(Box<Formula>, Box<Formula>),

    /// `l & r`
    And(Box<Formula>, Box<Formula>),

    /// `l | r`
    Or(Box<Formula>, Box<Formula>),

    /// `-e`
    Not(Box<Formula>),

    /// An atom.
    Atom(Atom),
}

/// Smart constructors, to keep the boxing out of sight.
impl Formula {
    pub fn forall(var: impl Into<String>, body: Formula) -> Self {
        Formula::Forall {
            var: var.into(),
            body: Box::new(body),
        }
    }

    pub fn exists(var: impl Into<String>, body: Formula) -> Self {
        Formula::Exists {
            var: var.into(),
            body: Box::new(body),
        }
    }

    pub fn implies(l: Formula, r: Formula) -> Self {
        Formula::Implies(Box::new(l), Box::new(r))
    }

    pub fn iff(l: Formula, r: Formula) -> Self {
        Formula::Iff(Box::new(l), Box::new(r))
    }

    pub fn and(l: Formula, r: Formula) -> Self {
        Formula::And(Box::new(l), Box::new(r))
    }

    pub fn or(l: Formula, r: Formula) -> Self {
        Formula::Or(Box::new(l), Box::new(r))
    }

    pub fn not(e: Formula) -> Self {
        Formula::Not(Box::new(e))
    }

    pub fn atom(a: Atom) -> Self {
        Formula::Atom(a)
    }

    /// Folds a non-empty collection of formulas into a conjunction.
    pub fn conjoin(formulas: Vec<Formula>) -> Option<Formula> {
        formulas.into_iter().reduce(Formula::and)
    }
}

impl Formula {
    /// Pre-order traversal with a replacing callback.
    ///
    /// The callback is applied to each node before its children; the node the callback returns is the node whose children are then visited.
    pub fn map_pre_order(self, f: &mut impl FnMut(Formula) -> Formula) -> Formula {
        let replaced = f(self);
        match replaced {
            Formula::Forall { var, body } => Formula::Forall {
                var,
                body: Box::new(body.map_pre_order(f)),
            },
            Formula::Exists { var, body } => Formula::Exists {
                var,
                body: Box::new(body.map_pre_order(f)),
            },
            Formula::Implies(l, r) => {
                Formula::Implies(Box::new(l.map_pre_order(f)), Box::new(r.map_pre_order(f)))
            }
            Formula::Iff(l, r) => {
                Formula::Iff(Box::new(l.map_pre_order(f)), Box::new(r.map_pre_order(f)))
            }
            Formula::And(l, r) => {
                Formula::And(Box::new(l.map_pre_order(f)), Box::new(r.map_pre_order(f)))
            }
            Formula::Or(l, r) => {
                Formula::Or(Box::new(l.map_pre_order(f)), Box::new(r.map_pre_order(f)))
            }
            Formula::Not(e) => Formula::Not(Box::new(e.map_pre_order(f))),
            leaf @ Formula::Atom(_) => leaf,
        }
    }

    /// Visits every atom of the formula.
    pub fn visit_atoms<'f>(&'f self, f: &mut impl FnMut(&'f Atom)) {
        match self {
            Formula::Forall { body, .. } | Formula::Exists { body, .. } => body.visit_atoms(f),
            Formula::Implies(l, r)
            | Formula::Iff(l, r)
            | Formula::And(l, r)
            | Formula::Or(l, r) => {
                l.visit_atoms(f);
                r.visit_atoms(f);
            }
            Formula::Not(e) => e.visit_atoms(f),
            Formula::Atom(atom) => f(atom),
        }
    }

    /// The count of nodes in the tree, atoms included.
    pub fn node_count(&self) -> usize {
        match self {
            Formula::Forall { body, .. } | Formula::Exists { body, .. } => 1 + body.node_count(),
            Formula::Implies(l, r)
            | Formula::Iff(l, r)
            | Formula::And(l, r)
            | Formula::Or(l, r) => 1 + l.node_count() + r.node_count(),
            Formula::Not(e) => 1 + e.node_count(),
            Formula::Atom(_) => 1,
        }
    }

    /// The variables of the formula with an occurrence not bound by an enclosing quantifier.
    pub fn free_variables(&self) -> HashSet<String> {
        let mut free = HashSet::new();
        let mut bound = Vec::new();
        self.free_variables_inner(&mut bound, &mut free);
        free
    }

    fn free_variables_inner(&self, bound: &mut Vec<String>, free: &mut HashSet<String>) {
        match self {
            Formula::Forall { var, body } | Formula::Exists { var, body } => {
                bound.push(var.clone());
                body.free_variables_inner(bound, free);
                bound.pop();
            }
            Formula::Implies(l, r)
            | Formula::Iff(l, r)
            | Formula::And(l, r)
            | Formula::Or(l, r) => {
                l.free_variables_inner(bound, free);
                r.free_variables_inner(bound, free);
            }
            Formula::Not(e) => e.free_variables_inner(bound, free),
            Formula::Atom(atom) => {
                let mut names = HashSet::new();
                for term in atom.terms() {
                    term.variables_into(&mut names);
                }
                for name in names {
                    if !bound.iter().any(|b| *b == name) {
                        free.insert(name);
                    }
                }
            }
        }
    }

    /// Binds every free variable with a universal quantifier, sorted for determinism.
    ///
    /// Free variables are implicitly universal; closure makes the quantification explicit ahead of clausification.
    pub fn universal_closure(self) -> Formula {
        let mut names: Vec<String> = self.free_variables().into_iter().collect();
        names.sort();
        names
            .into_iter()
            .rev()
            .fold(self, |body, name| Formula::forall(name, body))
    }

    /// Whether an equality atom occurs anywhere in the formula.
    pub fn mentions_equality(&self) -> bool {
        let mut found = false;
        self.visit_atoms(&mut |atom| {
            if matches!(atom, Atom::Equals(_, _)) {
                found = true;
            }
        });
        found
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Forall { var, body } => write!(f, "all {var} {}", Parenthesised(body)),
            Formula::Exists { var, body } => write!(f, "exists {var} {}", Parenthesised(body)),
            Formula::Implies(l, r) => write!(f, "({l} -> {r})"),
            Formula::Iff(l, r) => write!(f, "({l} <-> {r})"),
            Formula::And(l, r) => write!(f, "({l} & {r})"),
            Formula::Or(l, r) => write!(f, "({l} | {r})"),
            Formula::Not(e) => write!(f, "-{}", Parenthesised(e)),
            Formula::Atom(atom) => write!(f, "{atom}"),
        }
    }
}

/// Wraps a sub-formula in parentheses unless it is self-delimiting.
struct Parenthesised<'f>(&'f Formula);

impl std::fmt::Display for Parenthesised<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Formula::Atom(Atom::Predicate { .. }) | Formula::Not(_) => write!(f, "{}", self.0),
            _ => write!(f, "({})", self.0),
        }
    }
}

/*!
Clauses, aka. a collection of literals, interpreted as the disjunction of those literals.

A [Literal] is a predicate applied to terms, possibly negated; equality literals use the reserved predicate `=`.
Identity of atoms at the clause level is by canonical print --- two literals clash exactly when their [atom keys](Literal::atom_key) are equal and their signs differ.

- The empty clause is always false (never true).
- A clause containing complementary literals is a tautology, and is dropped by the pipeline.
*/

use crate::language::ast::{Atom, Term};

/// The reserved predicate name for equality literals.
pub const EQUALITY_PREDICATE: &str = "=";

/// Converts an atom of the syntax tree to a literal.
pub fn literal_of_atom(atom: Atom, negated: bool) -> Literal {
    match atom {
        Atom::Predicate { name, args } => Literal::new(name, args, negated),
        Atom::Equals(l, r) => Literal::new(EQUALITY_PREDICATE, vec![l, r], negated),
    }
}

/// An atom or its negation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    /// The predicate name; `=` for equality.
    pub predicate: String,

    /// The argument terms, with their nesting retained.
    pub args: Vec<Term>,

    /// Whether the literal is negated.
    pub negated: bool,
}

impl Literal {
    pub fn new(predicate: impl Into<String>, args: Vec<Term>, negated: bool) -> Self {
        Literal {
            predicate: predicate.into(),
            args,
            negated,
        }
    }

    /// The canonical print of the literal's atom, sign excluded.
    ///
    /// Equality uses the same prefix form as any other predicate, so keys are uniform.
    pub fn atom_key(&self) -> String {
        let mut key = self.predicate.clone();
        if !self.args.is_empty() {
            key.push('(');
            for (index, arg) in self.args.iter().enumerate() {
                if index > 0 {
                    key.push(',');
                }
                key.push_str(&arg.to_string());
            }
            key.push(')');
        }
        key
    }

    /// Whether `self` and `other` are the same atom with opposite signs.
    pub fn complements(&self, other: &Literal) -> bool {
        self.negated != other.negated
            && self.predicate == other.predicate
            && self.args == other.args
    }

    /// The literal with its sign flipped.
    pub fn negate(&self) -> Literal {
        Literal {
            predicate: self.predicate.clone(),
            args: self.args.clone(),
            negated: !self.negated,
        }
    }

    /// Whether no variable occurs in the arguments.
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "-")?;
        }
        if self.predicate == EQUALITY_PREDICATE && self.args.len() == 2 {
            write!(f, "{} = {}", self.args[0], self.args[1])
        } else {
            write!(f, "{}", self.atom_key())
        }
    }
}

/// A disjunction of literals.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Clause {
    pub literals: Vec<Literal>,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Clause { literals }
    }

    /// The empty clause, ⊥.
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Whether the clause contains complementary literals.
    pub fn is_tautology(&self) -> bool {
        for (index, literal) in self.literals.iter().enumerate() {
            for other in &self.literals[index + 1..] {
                if literal.complements(other) {
                    return true;
                }
            }
        }
        false
    }

    /// The count of positive literals.
    pub fn positive_count(&self) -> usize {
        self.literals.iter().filter(|l| !l.negated).count()
    }

    /// Whether the clause has at most one positive literal.
    pub fn is_horn(&self) -> bool {
        self.positive_count() <= 1
    }

    /// The number of literals in the clause.
    pub fn size(&self) -> usize {
        self.literals.len()
    }

    /// Drops duplicate literals, keeping first occurrences in order.
    pub fn dedup(&mut self) {
        let mut seen: Vec<(String, bool)> = Vec::new();
        self.literals.retain(|literal| {
            let key = (literal.atom_key(), literal.negated);
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });
    }

    /// The variable names occurring in the clause.
    pub fn variables(&self) -> std::collections::HashSet<String> {
        let mut names = std::collections::HashSet::new();
        for literal in &self.literals {
            for arg in &literal.args {
                arg.variables_into(&mut names);
            }
        }
        names
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.literals.is_empty() {
            return write!(f, "⊥");
        }
        for (index, literal) in self.literals.iter().enumerate() {
            if index > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{literal}")?;
        }
        Ok(())
    }
}

/// Whether every clause of the set has at most one positive literal.
pub fn all_horn(clauses: &[Clause]) -> bool {
    clauses.iter().all(Clause::is_horn)
}

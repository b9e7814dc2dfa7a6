/*!
Signature extraction --- the predicates, functions, constants, and free variables a formula mentions.

Model search and grounding are driven off the [Signature] of the premise set, and the engine manager inspects it (together with the clause shape) when scoring engines.
Arities are checked during extraction: a predicate or function used at two arities within one input is a parse error.

The module also owns the closed arithmetic vocabulary and the numeral test.
*/

use std::collections::{BTreeMap, BTreeSet};

use crate::types::err::{ParseError, ParseErrorKind, SourceSpan};

use super::ast::{Atom, Formula, Term};

/// The closed vocabulary of arithmetic predicates.
pub const ARITHMETIC_PREDICATES: [&str; 9] = [
    "lt", "gt", "lte", "gte", "plus", "minus", "times", "divide", "mod",
];

/// Whether `name` belongs to the arithmetic vocabulary.
pub fn is_arithmetic_name(name: &str) -> bool {
    ARITHMETIC_PREDICATES.contains(&name)
}

/// Whether `lexeme` is a numeral: `-?\d+(\.\d+)?`.
pub fn is_numeral(lexeme: &str) -> bool {
    let digits = lexeme.strip_prefix('-').unwrap_or(lexeme);
    if digits.is_empty() {
        return false;
    }
    let mut parts = digits.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match parts.next() {
        None => all_digits(whole),
        Some(fraction) => all_digits(whole) && all_digits(fraction),
    }
}

/// The symbols of a formula, or of a set of formulas.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    /// Predicate name to arity.
    pub predicates: BTreeMap<String, usize>,

    /// Function name to arity.
    pub functions: BTreeMap<String, usize>,

    /// Constant names, numerals included.
    pub constants: BTreeSet<String>,

    /// Free variable names --- implicitly universal.
    pub free_variables: BTreeSet<String>,

    /// Whether an equality atom occurs.
    pub has_equality: bool,
}

impl Signature {
    /// The signature of a single formula.
    pub fn of(formula: &Formula) -> Result<Signature, ParseError> {
        let mut signature = Signature::default();
        signature.extend(formula)?;
        Ok(signature)
    }

    /// The merged signature of a set of formulas.
    pub fn of_all<'f>(
        formulas: impl IntoIterator<Item = &'f Formula>,
    ) -> Result<Signature, ParseError> {
        let mut signature = Signature::default();
        for formula in formulas {
            signature.extend(formula)?;
        }
        Ok(signature)
    }

    /// Folds the symbols of `formula` into the signature.
    pub fn extend(&mut self, formula: &Formula) -> Result<(), ParseError> {
        let mut clash: Option<(String, usize, usize)> = None;

        formula.visit_atoms(&mut |atom| {
            match atom {
                Atom::Predicate { name, args } => {
                    record_arity(&mut self.predicates, name, args.len(), &mut clash);
                    for term in args {
                        self.extend_term(term, &mut clash);
                    }
                }
                Atom::Equals(l, r) => {
                    self.has_equality = true;
                    self.extend_term(l, &mut clash);
                    self.extend_term(r, &mut clash);
                }
            };
        });

        for name in formula.free_variables() {
            self.free_variables.insert(name);
        }

        match clash {
            Some((name, first, second)) => Err(ParseError {
                kind: ParseErrorKind::ArityMismatch {
                    name,
                    first,
                    second,
                },
                span: SourceSpan::at("", 0),
                suggestion: None,
                context: formula.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn extend_term(&mut self, term: &Term, clash: &mut Option<(String, usize, usize)>) {
        match term {
            Term::Variable(_) => {}
            Term::Constant(name) => {
                self.constants.insert(name.clone());
            }
            Term::Function { name, args } => {
                record_arity(&mut self.functions, name, args.len(), clash);
                for arg in args {
                    self.extend_term(arg, clash);
                }
            }
        }
    }

    /// Whether the arithmetic vocabulary is mentioned by any predicate or function.
    pub fn mentions_arithmetic(&self) -> bool {
        self.predicates.keys().any(|name| is_arithmetic_name(name))
            || self.functions.keys().any(|name| is_arithmetic_name(name))
    }
}

fn record_arity(
    map: &mut BTreeMap<String, usize>,
    name: &str,
    arity: usize,
    clash: &mut Option<(String, usize, usize)>,
) {
    match map.get(name) {
        Some(&seen) if seen != arity && clash.is_none() => {
            *clash = Some((name.to_string(), seen, arity));
        }
        Some(_) => {}
        None => {
            map.insert(name.to_string(), arity);
        }
    }
}

/// The predicate names a formula mentions, equality excluded.
///
/// The model finder keys its incremental premise checks on this set.
pub fn predicates_used(formula: &Formula) -> BTreeSet<String> {
    let mut used = BTreeSet::new();
    formula.visit_atoms(&mut |atom| {
        if let Atom::Predicate { name, .. } = atom {
            used.insert(name.clone());
        }
    });
    used
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::parser::parse;

    #[test]
    fn extraction() {
        let formula = parse("all x (man(x) -> knows(x, f(socrates)))").unwrap();
        let signature = Signature::of(&formula).unwrap();

        assert_eq!(signature.predicates.get("man"), Some(&1));
        assert_eq!(signature.predicates.get("knows"), Some(&2));
        assert_eq!(signature.functions.get("f"), Some(&1));
        assert!(signature.constants.contains("socrates"));
        assert!(!signature.has_equality);
    }

    #[test]
    fn free_variables_recorded() {
        let formula = parse("P(y)").unwrap();
        let signature = Signature::of(&formula).unwrap();
        assert!(signature.free_variables.contains("y"));
    }

    #[test]
    fn arity_mismatch() {
        let formula = parse("p(a) & p(a, b)").unwrap();
        let error = Signature::of(&formula).unwrap_err();
        assert!(matches!(
            error.kind,
            ParseErrorKind::ArityMismatch { first: 1, second: 2, .. }
        ));
    }

    #[test]
    fn equality_flag() {
        // Single lowercase letters are free variables, not constants.
        let formula = parse("a = b").unwrap();
        let signature = Signature::of(&formula).unwrap();
        assert!(signature.has_equality);
        assert!(signature.constants.is_empty());
        assert!(signature.free_variables.contains("a"));
        assert!(signature.free_variables.contains("b"));
    }

    #[test]
    fn arithmetic_detection() {
        let formula = parse("lt(1, 2)").unwrap();
        let signature = Signature::of(&formula).unwrap();
        assert!(signature.mentions_arithmetic());
    }

    #[test]
    fn numerals() {
        assert!(is_numeral("0"));
        assert!(is_numeral("42"));
        assert!(is_numeral("-3"));
        assert!(is_numeral("23.5"));
        assert!(!is_numeral("a"));
        assert!(!is_numeral("1.")); // A bare trailing point is not a numeral.
        assert!(!is_numeral(""));
    }

    #[test]
    fn predicate_usage() {
        let formula = parse("P(a) & (Q(b) | a = b)").unwrap();
        let used = predicates_used(&formula);
        assert!(used.contains("P"));
        assert!(used.contains("Q"));
        assert_eq!(used.len(), 2);
    }
}

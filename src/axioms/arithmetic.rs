/*!
Builtin evaluation of the arithmetic vocabulary.

The vocabulary is closed: `lt`, `gt`, `lte`, `gte` compare two ground numerals, and `plus`, `minus`, `times`, `divide`, `mod` relate two ground numerals to a third argument, which may be an unbound variable --- in which case the builtin binds it to the computed numeral.

Numerals are carried as constant terms and parsed on use; integral results print without a point, so `plus(1,2,X)` binds `X` to `3` and not `3.0`.
A non-numeral argument, an unbound comparison, or a division by zero fails the goal rather than erroring --- resolution simply abandons the branch.

One extra predicate rides alongside the vocabulary: `ne`, term-level disequality, which the [generated equality program](super::equality) uses to guard its rewrite chains.
It succeeds on two distinct ground terms, and fails on identical or non-ground arguments --- it never enumerates.
`ne` is not part of the arithmetic vocabulary proper: it plays no role in engine scoring or arithmetic detection.
*/

use crate::{
    horn::program::HornAtom,
    language::{ast::Term, signature},
};

/// The outcome of offering an atom to the builtin table.
#[derive(Clone, Debug, PartialEq)]
pub enum BuiltinOutcome {
    /// The predicate is outside the vocabulary; resolve it against the program.
    NotApplicable,

    /// The goal fails.
    Fail,

    /// The goal succeeds with no bindings.
    Succeed,

    /// The goal succeeds, binding a variable to a numeral.
    Bind(String, Term),
}

/// The term-disequality predicate used by generated programs.
pub const NE: &str = "ne";

/// Offers `atom` to the builtin table.
pub fn evaluate(atom: &HornAtom) -> BuiltinOutcome {
    if atom.predicate == NE {
        return disequal(atom);
    }

    if !signature::is_arithmetic_name(&atom.predicate) {
        return BuiltinOutcome::NotApplicable;
    }

    match atom.predicate.as_str() {
        "lt" | "gt" | "lte" | "gte" => compare(atom),
        "plus" | "minus" | "times" | "divide" | "mod" => operate(atom),
        _ => BuiltinOutcome::NotApplicable,
    }
}

fn disequal(atom: &HornAtom) -> BuiltinOutcome {
    if atom.args.len() != 2 {
        return BuiltinOutcome::Fail;
    }
    let (left, right) = (&atom.args[0], &atom.args[1]);

    if left == right {
        return BuiltinOutcome::Fail;
    }
    match left.is_ground() && right.is_ground() {
        true => BuiltinOutcome::Succeed,
        false => BuiltinOutcome::Fail,
    }
}

fn numeral_value(term: &Term) -> Option<f64> {
    match term {
        Term::Constant(name) if signature::is_numeral(name) => name.parse().ok(),
        _ => None,
    }
}

/// Prints a computed value as a numeral, without a point when integral.
fn numeral_term(value: f64) -> Term {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Term::constant(format!("{}", value as i64))
    } else {
        Term::constant(format!("{value}"))
    }
}

fn compare(atom: &HornAtom) -> BuiltinOutcome {
    if atom.args.len() != 2 {
        return BuiltinOutcome::Fail;
    }
    let (Some(left), Some(right)) = (numeral_value(&atom.args[0]), numeral_value(&atom.args[1]))
    else {
        return BuiltinOutcome::Fail;
    };

    let holds = match atom.predicate.as_str() {
        "lt" => left < right,
        "gt" => left > right,
        "lte" => left <= right,
        _ => left >= right,
    };

    match holds {
        true => BuiltinOutcome::Succeed,
        false => BuiltinOutcome::Fail,
    }
}

fn operate(atom: &HornAtom) -> BuiltinOutcome {
    if atom.args.len() != 3 {
        return BuiltinOutcome::Fail;
    }
    let (Some(left), Some(right)) = (numeral_value(&atom.args[0]), numeral_value(&atom.args[1]))
    else {
        return BuiltinOutcome::Fail;
    };

    let result = match atom.predicate.as_str() {
        "plus" => left + right,
        "minus" => left - right,
        "times" => left * right,
        "divide" => {
            if right == 0.0 {
                return BuiltinOutcome::Fail;
            }
            left / right
        }
        _ => {
            if right == 0.0 {
                return BuiltinOutcome::Fail;
            }
            left.rem_euclid(right)
        }
    };

    match &atom.args[2] {
        Term::Variable(name) => BuiltinOutcome::Bind(name.clone(), numeral_term(result)),
        term => match numeral_value(term) {
            Some(given) if given == result => BuiltinOutcome::Succeed,
            _ => BuiltinOutcome::Fail,
        },
    }
}

/*!
Finite models, and their interpretation strings.

A model interprets a signature over the domain `{0..n-1}`: each constant names an element, each function a total table over tuples, each predicate a set of tuples.
The interpretation string is stable and grep-friendly --- tests and clients match on its lines.
*/

use std::collections::{BTreeMap, BTreeSet};

/// A finite interpretation of a signature.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    /// The domain is `0..domain_size`.
    pub domain_size: usize,

    /// Constant interpretations.
    pub constants: BTreeMap<String, usize>,

    /// Function tables: argument tuple to value.
    pub functions: BTreeMap<String, BTreeMap<Vec<usize>, usize>>,

    /// Predicate extensions: the tuples which hold.
    pub predicates: BTreeMap<String, BTreeSet<Vec<usize>>>,
}

impl Model {
    pub fn new(domain_size: usize) -> Self {
        Model {
            domain_size,
            ..Model::default()
        }
    }

    /// The stable interpretation string.
    ///
    /// ```text
    /// Domain size: 2
    /// Domain: {0, 1}
    /// Constants:
    ///   a = 0
    /// Predicates:
    ///   P: {(0)}
    /// ```
    pub fn interpretation(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("Domain size: {}\n", self.domain_size));
        let elements: Vec<String> = (0..self.domain_size).map(|e| e.to_string()).collect();
        out.push_str(&format!("Domain: {{{}}}\n", elements.join(", ")));

        if !self.constants.is_empty() {
            out.push_str("Constants:\n");
            for (name, value) in &self.constants {
                out.push_str(&format!("  {name} = {value}\n"));
            }
        }

        if !self.functions.is_empty() {
            out.push_str("Functions:\n");
            for (name, table) in &self.functions {
                let entries: Vec<String> = table
                    .iter()
                    .map(|(args, value)| format!("({})->{value}", tuple(args)))
                    .collect();
                out.push_str(&format!("  {name}: {{{}}}\n", entries.join(", ")));
            }
        }

        if !self.predicates.is_empty() {
            out.push_str("Predicates:\n");
            for (name, extension) in &self.predicates {
                let entries: Vec<String> = extension
                    .iter()
                    .map(|tuple_values| format!("({})", tuple(tuple_values)))
                    .collect();
                out.push_str(&format!("  {name}: {{{}}}\n", entries.join(", ")));
            }
        }

        out
    }
}

fn tuple(values: &[usize]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

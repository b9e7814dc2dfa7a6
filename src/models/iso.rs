/*!
Isomorphism filtering.

Two models over the same signature and domain size are isomorphic when some permutation of the domain maps the constants, function tables, and predicate extensions of one exactly onto the other.
Multi-model requests keep a list of accepted models and reject a candidate isomorphic to any of them.

Every permutation is tried, so the check is factorial in the domain size; callers only attempt it for small domains.
*/

use super::model::Model;

/// Whether some domain permutation maps `a` onto `b`.
pub fn isomorphic(a: &Model, b: &Model) -> bool {
    if a.domain_size != b.domain_size {
        return false;
    }
    if a.constants.len() != b.constants.len()
        || a.functions.len() != b.functions.len()
        || a.predicates.len() != b.predicates.len()
    {
        return false;
    }

    let mut permutation: Vec<usize> = (0..a.domain_size).collect();
    permutations(&mut permutation, 0, &mut |permutation| {
        apply(a, permutation) == *b
    })
}

/// Visits every permutation of `values[at..]`; true as soon as `found` is.
fn permutations(
    values: &mut Vec<usize>,
    at: usize,
    found: &mut impl FnMut(&[usize]) -> bool,
) -> bool {
    if at == values.len() {
        return found(values);
    }
    for index in at..values.len() {
        values.swap(at, index);
        if permutations(values, at + 1, found) {
            return true;
        }
        values.swap(at, index);
    }
    false
}

/// The model `permutation` carries `model` to.
fn apply(model: &Model, permutation: &[usize]) -> Model {
    let mut mapped = Model::new(model.domain_size);

    for (name, value) in &model.constants {
        mapped.constants.insert(name.clone(), permutation[*value]);
    }

    for (name, table) in &model.functions {
        let mapped_table = table
            .iter()
            .map(|(args, value)| {
                let mapped_args: Vec<usize> = args.iter().map(|&a| permutation[a]).collect();
                (mapped_args, permutation[*value])
            })
            .collect();
        mapped.functions.insert(name.clone(), mapped_table);
    }

    for (name, extension) in &model.predicates {
        let mapped_extension = extension
            .iter()
            .map(|tuple| tuple.iter().map(|&a| permutation[a]).collect())
            .collect();
        mapped.predicates.insert(name.clone(), mapped_extension);
    }

    mapped
}

use entail::language::{ast::Formula, parser::parse, signature::Signature};

mod round_trip {
    use super::*;

    const SOURCES: [&str; 8] = [
        "all x (man(x) -> mortal(x))",
        "exists y (P(y) & -Q(y))",
        "(P | Q) -> (R <-> S)",
        "a = b -> b = a",
        "all x exists y loves(x, y)",
        "-(P & Q) <-> (-P | -Q)",
        "knows(socrates, f(g(plato)))",
        "all x (x = x)",
    ];

    #[test]
    fn print_then_reparse_is_identity() {
        for source in SOURCES {
            let first = parse(source).unwrap();
            let second = parse(&first.to_string()).unwrap();
            assert_eq!(first, second, "round trip failed for: {source}");
        }
    }

    #[test]
    fn printing_is_stable() {
        for source in SOURCES {
            let first = parse(source).unwrap();
            let reprinted = parse(&first.to_string()).unwrap().to_string();
            assert_eq!(first.to_string(), reprinted);
        }
    }
}

mod robustness {
    use super::*;

    #[test]
    fn kiloparen_nesting() {
        let depth = 1_000;
        let mut source = String::with_capacity(2 * depth + 1);
        for _ in 0..depth {
            source.push('(');
        }
        source.push('P');
        for _ in 0..depth {
            source.push(')');
        }

        let formula = parse(&source).unwrap();
        assert_eq!(formula.to_string(), "P");
    }

    #[test]
    fn hundred_kiloparen_nesting() {
        // Far past any default stack; the parser sizes its own.
        let depth = 100_000;
        let mut source = String::with_capacity(2 * depth + 1);
        for _ in 0..depth {
            source.push('(');
        }
        source.push('P');
        for _ in 0..depth {
            source.push(')');
        }

        let formula = parse(&source).unwrap();
        assert_eq!(formula.to_string(), "P");
    }

    #[test]
    fn long_conjunction() {
        let source = (0..500)
            .map(|i| format!("P{i}"))
            .collect::<Vec<_>>()
            .join(" & ");
        let formula = parse(&source).unwrap();
        assert_eq!(formula.node_count(), 999);
    }
}

mod errors {
    use super::*;

    #[test]
    fn no_partial_trees() {
        for source in ["", "P &", "(P", "all", "all x", "p(", "p(a,,b)", "p()"] {
            assert!(parse(source).is_err(), "accepted: {source}");
        }
    }

    #[test]
    fn offsets_point_into_the_source() {
        let error = parse("P & (Q | )").unwrap_err();
        assert!(error.span.start < "P & (Q | )".len());
        assert_eq!(error.context, "P & (Q | )");
    }
}

mod signatures {
    use super::*;

    #[test]
    fn merged_signature_checks_arity_across_formulas() {
        let first = parse("p(a, b)").unwrap();
        let second = parse("p(c)").unwrap();
        let formulas: Vec<Formula> = vec![first, second];
        assert!(Signature::of_all(&formulas).is_err());
    }

    #[test]
    fn skolem_free_signature_is_clean() {
        let formula = parse("all x (edge(x, f(x)) -> exists y edge(x, y))").unwrap();
        let signature = Signature::of(&formula).unwrap();

        assert_eq!(signature.predicates.get("edge"), Some(&2));
        assert_eq!(signature.functions.get("f"), Some(&1));
        assert!(signature.free_variables.is_empty());
    }
}

use entail::{
    language::parser::parse,
    models::{iso, FindOptions, ModelFinder},
};

fn formulas(sources: &[&str]) -> Vec<entail::language::ast::Formula> {
    sources.iter().map(|s| parse(s).unwrap()).collect()
}

mod scenarios {
    use super::*;

    #[test]
    fn one_element_model() {
        let finder = ModelFinder::default();
        let outcome = finder
            .find_models(
                &formulas(&["exists x P(x)", "all x (P(x) -> Q(x))"]),
                &FindOptions::default(),
            )
            .unwrap();

        let model = &outcome.models[0];
        assert_eq!(model.domain_size, 1);
        assert!(model.predicates["P"].contains(&vec![0]));
        assert!(model.predicates["Q"].contains(&vec![0]));
    }

    #[test]
    fn counterexample_needs_two_elements() {
        let finder = ModelFinder::default();
        let outcome = finder
            .find_counterexample(
                &formulas(&["P(a)"]),
                &parse("P(b)").unwrap(),
                &FindOptions::default(),
            )
            .unwrap();

        let model = &outcome.models[0];
        assert!(model.domain_size >= 2);
        assert_eq!(model.constants["a"], 0);
        assert_eq!(model.constants["b"], 1);
        assert_eq!(
            model.predicates["P"],
            std::collections::BTreeSet::from([vec![0]])
        );
    }

    #[test]
    fn interpretation_is_stable() {
        let finder = ModelFinder::default();
        let outcome = finder
            .find_counterexample(
                &formulas(&["P(a)"]),
                &parse("P(b)").unwrap(),
                &FindOptions::default(),
            )
            .unwrap();

        let interpretation = outcome.models[0].interpretation();
        assert!(interpretation.contains("Domain size: 2"));
        assert!(interpretation.contains("Domain: {0, 1}"));
        assert!(interpretation.contains("  a = 0"));
        assert!(interpretation.contains("  b = 1"));
        assert!(interpretation.contains("  P: {(0)}"));
    }
}

mod filtering {
    use super::*;

    #[test]
    fn multi_model_output_is_pairwise_non_isomorphic() {
        let finder = ModelFinder::default();
        let options = FindOptions {
            domain_size: Some(2),
            count: 16,
            ..FindOptions::default()
        };
        let outcome = finder
            .find_models(&formulas(&["exists x P(x)"]), &options)
            .unwrap();

        assert!(outcome.models.len() <= 16);
        for (index, first) in outcome.models.iter().enumerate() {
            for second in &outcome.models[index + 1..] {
                assert!(!iso::isomorphic(first, second));
            }
        }
    }

    #[test]
    fn symmetry_off_returns_relabellings_too() {
        let finder = ModelFinder::default();

        let filtered = finder
            .find_models(
                &formulas(&["exists x P(x)"]),
                &FindOptions {
                    domain_size: Some(2),
                    count: 16,
                    ..FindOptions::default()
                },
            )
            .unwrap();

        let unfiltered = finder
            .find_models(
                &formulas(&["exists x P(x)"]),
                &FindOptions {
                    domain_size: Some(2),
                    count: 16,
                    symmetry: false,
                    ..FindOptions::default()
                },
            )
            .unwrap();

        assert!(unfiltered.models.len() > filtered.models.len());
    }
}

mod paths {
    use super::*;

    #[test]
    fn grounded_path_agrees_on_satisfiability() {
        let premise_sets: [&[&str]; 3] = [
            &["exists x P(x)", "all x (P(x) -> Q(x))"],
            &["P(athens)", "-P(berlin)"],
            &["all x (f(x) = x)", "P(athens)"],
        ];

        let finder = ModelFinder::default();
        for premises in premise_sets {
            let enumerated = finder
                .find_models(&formulas(premises), &FindOptions::default())
                .unwrap();
            let grounded = finder
                .find_models(
                    &formulas(premises),
                    &FindOptions {
                        use_sat: true,
                        ..FindOptions::default()
                    },
                )
                .unwrap();

            assert_eq!(
                enumerated.models.is_empty(),
                grounded.models.is_empty(),
                "paths disagree on {premises:?}",
            );
        }
    }

    #[test]
    fn contradictory_premises_have_no_model_either_way() {
        let finder = ModelFinder::default();
        let premises = formulas(&["P(athens)", "-P(athens)"]);

        for use_sat in [false, true] {
            let outcome = finder
                .find_models(
                    &premises,
                    &FindOptions {
                        use_sat,
                        max_domain_size: 3,
                        ..FindOptions::default()
                    },
                )
                .unwrap();
            assert!(outcome.models.is_empty());
        }
    }
}

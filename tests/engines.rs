use entail::{
    config::Config,
    engines::{
        manager::{EngineChoice, EngineManager},
        ProofOptions, ProofStatus, ProofTask,
    },
    language::parser::parse,
};

fn task(premises: &[&str], goal: &str) -> ProofTask {
    ProofTask {
        premises: premises.iter().map(|s| parse(s).unwrap()).collect(),
        goal: parse(goal).unwrap(),
        options: ProofOptions::default(),
    }
}

fn task_with(premises: &[&str], goal: &str, options: ProofOptions) -> ProofTask {
    ProofTask {
        options,
        ..task(premises, goal)
    }
}

mod scenarios {
    use super::*;

    #[test]
    fn socrates_through_resolution() {
        let manager = EngineManager::new(Config::default());
        let outcome = manager
            .prove(
                &task(
                    &["all x (man(x) -> mortal(x))", "man(socrates)"],
                    "mortal(socrates)",
                ),
                &EngineChoice::Auto,
            )
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
        assert_eq!(outcome.engine, "horn");
    }

    #[test]
    fn disjunctive_syllogism_through_sat() {
        let manager = EngineManager::new(Config::default());
        let outcome = manager
            .prove(&task(&["P | Q", "-P"], "Q"), &EngineChoice::Auto)
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
        assert_eq!(outcome.engine, "sat");
    }

    #[test]
    fn equality_chain() {
        let manager = EngineManager::new(Config::default());
        let options = ProofOptions {
            equality: true,
            ..ProofOptions::default()
        };
        let outcome = manager
            .prove(
                &task_with(&["alpha = beta", "beta = gamma"], "alpha = gamma", options),
                &EngineChoice::Auto,
            )
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
    }

    #[test]
    fn excluded_middle_from_no_premises() {
        let manager = EngineManager::new(Config::default());
        let outcome = manager
            .prove(&task(&[], "P | -P"), &EngineChoice::Auto)
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
        assert_eq!(outcome.engine, "sat");
    }
}

mod agreement {
    use super::*;

    // Horn problems decidable within the default bounds.
    const PROBLEMS: [(&[&str], &str, ProofStatus); 4] = [
        (
            &["all x (man(x) -> mortal(x))", "man(socrates)"],
            "mortal(socrates)",
            ProofStatus::Proved,
        ),
        (
            &["all x (edge(x, x) -> cyclic)", "edge(node, node)"],
            "cyclic",
            ProofStatus::Proved,
        ),
        (&["man(socrates)"], "mortal(socrates)", ProofStatus::Failed),
        (
            &["P(athens)", "all x (P(x) -> Q(x))", "all x (Q(x) -> R(x))"],
            "R(athens)",
            ProofStatus::Proved,
        ),
    ];

    #[test]
    fn resolution_and_refutation_agree_on_horn_problems() {
        let manager = EngineManager::new(Config::default());

        for (premises, goal, expected) in PROBLEMS {
            let by_resolution = manager
                .prove(
                    &task(premises, goal),
                    &EngineChoice::Named("horn".to_string()),
                )
                .unwrap();
            let by_refutation = manager
                .prove(
                    &task(premises, goal),
                    &EngineChoice::Named("sat".to_string()),
                )
                .unwrap();

            assert_eq!(by_resolution.status, expected, "horn on {goal}");
            assert_eq!(by_refutation.status, expected, "sat on {goal}");
        }
    }
}

mod racing {
    use super::*;

    #[test]
    fn race_returns_a_definitive_outcome() {
        let manager = EngineManager::new(Config::default());
        let outcome = manager
            .prove(
                &task(
                    &["all x (man(x) -> mortal(x))", "man(socrates)"],
                    "mortal(socrates)",
                ),
                &EngineChoice::Race,
            )
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
    }

    #[test]
    fn race_survives_an_engine_which_rejects_the_problem() {
        // Resolution rejects the non-Horn premises; the race still settles.
        let manager = EngineManager::new(Config::default());
        let outcome = manager
            .prove(&task(&["P | Q", "-P"], "Q"), &EngineChoice::Race)
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Proved);
        assert_eq!(outcome.engine, "sat");
    }
}

mod limits {
    use super::*;

    #[test]
    fn inference_exhaustion_is_failed_with_the_limit_flagged() {
        // A looping program without the fact it needs.
        let manager = EngineManager::new(Config::default());
        let options = ProofOptions {
            max_inferences: 200,
            ..ProofOptions::default()
        };
        let outcome = manager
            .prove(
                &task_with(
                    &["all x (p(f(x)) -> p(x))"],
                    "p(athens)",
                    options,
                ),
                &EngineChoice::Named("horn".to_string()),
            )
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Failed);
        assert!(outcome.hit_limit);
        assert!(outcome.inference_count <= 200 * 2);
    }

    #[test]
    fn cancellation_reports_timeout() {
        let manager = EngineManager::new(Config::default());
        let options = ProofOptions::default();
        options.cancel.cancel();

        let outcome = manager
            .prove(
                &task_with(&["man(socrates)"], "mortal(socrates)", options),
                &EngineChoice::Named("horn".to_string()),
            )
            .unwrap();

        assert_eq!(outcome.status, ProofStatus::Timeout);
    }
}

use entail::{
    config::Config,
    service::tools::{
        CheckWellFormedRequest, FindCounterexampleRequest, FindModelRequest, FindStatus,
        LogicService, ProveRequest, ProveStatus, QuerySessionRequest, SessionIdRequest,
        SessionPremiseRequest,
    },
};

fn service() -> LogicService {
    LogicService::new(Config::default())
}

mod prove_tool {
    use super::*;

    #[test]
    fn equality_scenario() {
        let response = service().prove(&ProveRequest {
            premises: vec!["alpha = beta".to_string(), "beta = gamma".to_string()],
            goal: "alpha = gamma".to_string(),
            enable_equality: true,
            ..ProveRequest::default()
        });

        assert_eq!(response.result, ProveStatus::Proved);
    }

    #[test]
    fn tautology_scenario() {
        let response = service().prove(&ProveRequest {
            goal: "P | -P".to_string(),
            ..ProveRequest::default()
        });

        assert_eq!(response.result, ProveStatus::Proved);
        assert_eq!(response.engine_used.as_deref(), Some("sat"));
    }

    #[test]
    fn failure_within_bound_is_not_an_error() {
        let response = service().prove(&ProveRequest {
            premises: vec!["all x (p(f(x)) -> p(x))".to_string()],
            goal: "p(athens)".to_string(),
            inference_limit: Some(100),
            engine: Some("horn".to_string()),
            ..ProveRequest::default()
        });

        assert_eq!(response.result, ProveStatus::Failed);
        assert!(response.statistics.unwrap().hit_limit);
    }

    #[test]
    fn trace_lines_follow_the_derivation() {
        let response = service().prove(&ProveRequest {
            premises: vec![
                "all x (man(x) -> mortal(x))".to_string(),
                "man(socrates)".to_string(),
            ],
            goal: "mortal(socrates)".to_string(),
            include_trace: true,
            ..ProveRequest::default()
        });

        let proof = response.proof.unwrap();
        assert!(proof[0].contains("mortal(socrates)"));
        assert!(proof[1].contains("man(socrates)"));
    }
}

mod validation_tool {
    use super::*;

    #[test]
    fn diagnostics_carry_spans_and_suggestions() {
        let response = service().check_well_formed(&CheckWellFormedRequest {
            formulas: vec!["(P & Q".to_string(), "All x P(x)".to_string()],
        });

        assert!(!response.valid);

        let unbalanced = &response.per_formula[0];
        assert!(unbalanced.errors[0].span.is_some());
        assert!(unbalanced
            .suggestions
            .iter()
            .any(|s| s.contains("parentheses")));

        let keyword = &response.per_formula[1];
        assert!(keyword.suggestions.iter().any(|s| s.contains("lowercase")));
    }

    #[test]
    fn free_variables_warn() {
        let response = service().check_well_formed(&CheckWellFormedRequest {
            formulas: vec!["P(x) -> Q(x)".to_string()],
        });

        assert!(response.valid);
        assert!(response.per_formula[0].warnings[0].contains("x"));
    }
}

mod model_tools {
    use super::*;

    #[test]
    fn find_model_and_counterexample() {
        let service = service();

        let model = service.find_model(&FindModelRequest {
            premises: vec![
                "exists x P(x)".to_string(),
                "all x (P(x) -> Q(x))".to_string(),
            ],
            ..FindModelRequest::default()
        });
        assert_eq!(model.result, FindStatus::ModelFound);

        let counterexample = service.find_counterexample(&FindCounterexampleRequest {
            goal: "P(b)".to_string(),
            base: FindModelRequest {
                premises: vec!["P(a)".to_string()],
                ..FindModelRequest::default()
            },
        });
        assert_eq!(counterexample.result, FindStatus::ModelFound);
        assert!(counterexample.interpretation.unwrap().contains("b = 1"));
    }

    #[test]
    fn entailed_goal_yields_no_counterexample() {
        let response = service().find_counterexample(&FindCounterexampleRequest {
            goal: "mortal(socrates)".to_string(),
            base: FindModelRequest {
                premises: vec![
                    "all x (man(x) -> mortal(x))".to_string(),
                    "man(socrates)".to_string(),
                ],
                max_domain_size: Some(4),
                ..FindModelRequest::default()
            },
        });

        assert_eq!(response.result, FindStatus::NoModel);
    }

    #[test]
    fn model_count_is_bounded() {
        let response = service().find_model(&FindModelRequest {
            premises: vec!["exists x P(x)".to_string()],
            domain_size: Some(2),
            count: Some(3),
            ..FindModelRequest::default()
        });

        assert!(response.models.unwrap().len() <= 3);
    }
}

mod session_tools {
    use super::*;

    fn assert_premise(service: &LogicService, id: &str, premise: &str) {
        let response = service.assert_premise(&SessionPremiseRequest {
            session_id: id.to_string(),
            premise: premise.to_string(),
        });
        assert!(response.success, "assert failed for {premise}");
    }

    fn query(service: &LogicService, id: &str, goal: &str) -> ProveStatus {
        service
            .query_session(&QuerySessionRequest {
                session_id: id.to_string(),
                goal: goal.to_string(),
                ..QuerySessionRequest::default()
            })
            .result
    }

    #[test]
    fn replay_after_clear_preserves_verdicts() {
        let service = service();
        let id = service
            .create_session(&Default::default())
            .session_id
            .unwrap();

        let premises = ["all x (man(x) -> mortal(x))", "man(socrates)"];
        for premise in premises {
            assert_premise(&service, &id, premise);
        }
        let before = query(&service, &id, "mortal(socrates)");

        assert!(service
            .clear_session(&SessionIdRequest {
                session_id: id.clone(),
            })
            .success);
        for premise in premises {
            assert_premise(&service, &id, premise);
        }
        let after = query(&service, &id, "mortal(socrates)");

        assert_eq!(before, after);
        assert_eq!(before, ProveStatus::Proved);
    }

    #[test]
    fn retracting_an_absent_premise_is_a_false_no_op() {
        let service = service();
        let id = service
            .create_session(&Default::default())
            .session_id
            .unwrap();

        assert_premise(&service, &id, "man(socrates)");

        let response = service.retract_premise(&SessionPremiseRequest {
            session_id: id.clone(),
            premise: "man(plato)".to_string(),
        });
        assert!(response.success);
        assert_eq!(response.retracted, Some(false));

        // The asserted premise is untouched.
        let listed = service.list_premises(&SessionIdRequest { session_id: id });
        assert_eq!(listed.premises.unwrap().len(), 1);
    }

    #[test]
    fn queries_see_exactly_the_asserted_premises() {
        let service = service();
        let id = service
            .create_session(&Default::default())
            .session_id
            .unwrap();

        assert_premise(&service, &id, "all x (man(x) -> mortal(x))");
        assert_eq!(query(&service, &id, "mortal(socrates)"), ProveStatus::Failed);

        assert_premise(&service, &id, "man(socrates)");
        assert_eq!(query(&service, &id, "mortal(socrates)"), ProveStatus::Proved);

        let retract = service.retract_premise(&SessionPremiseRequest {
            session_id: id.clone(),
            premise: "man(socrates)".to_string(),
        });
        assert_eq!(retract.retracted, Some(true));
        assert_eq!(query(&service, &id, "mortal(socrates)"), ProveStatus::Failed);
    }

    #[test]
    fn unknown_session_is_reported() {
        let response = service().list_premises(&SessionIdRequest {
            session_id: "not-a-session".to_string(),
        });
        assert!(!response.success);
    }
}

/*!
Shape analysis and engine scoring.

Selection looks at three properties of the combined problem `⋀premises ∧ ¬goal`:
whether the arithmetic vocabulary appears, whether equality appears, and whether the clausal form is Horn with a queryable goal.
Scoring then follows a fixed schedule:

- an arithmetic problem adds 100 to an engine with native arithmetic and −1000 to one without;
- a Horn, arithmetic-free problem adds 50 to a Horn-capable engine, with a +20 bonus for the dedicated resolution engine --- simple problems stay snappy;
- otherwise full first-order capability earns 50 and its absence −1000;
- a +1 tie-breaker prefers the more general engine.

The highest score wins; ties fall to registration order.
*/

use crate::{
    clausal::{clause, Clausifier, SkolemEnv},
    horn,
    language::{ast::Formula, signature::Signature},
    types::err::ErrorKind,
};

use super::EngineInfo;

/// The shape of a problem, as far as selection cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProblemShape {
    /// The arithmetic vocabulary appears.
    pub arithmetic: bool,

    /// An equality atom appears.
    pub equality: bool,

    /// The combined clausal form is Horn and the goal is queryable.
    pub horn: bool,
}

/// Analyses `premises` and `goal` for selection.
pub fn analyse(premises: &[Formula], goal: Option<&Formula>) -> Result<ProblemShape, ErrorKind> {
    let signature = Signature::of_all(premises.iter().chain(goal))?;

    let arithmetic = signature.mentions_arithmetic();
    let equality = signature.has_equality;

    let clausifier = Clausifier::default();
    let mut env = SkolemEnv::default();

    let mut formulas: Vec<Formula> = premises.to_vec();
    if let Some(goal) = goal {
        formulas.push(Formula::not(goal.clone().universal_closure()));
    }

    let horn = match clausifier.clausify_all(formulas, &mut env) {
        Ok(output) => {
            clause::all_horn(&output.clauses)
                && goal.map_or(true, |goal| horn::goal_of_formula(goal).is_ok())
        }
        // A blown-up clausification is decided by the engine, not here.
        Err(_) => false,
    };

    Ok(ProblemShape {
        arithmetic,
        equality,
        horn,
    })
}

/// Scores one engine against a shape.
pub fn score(info: &EngineInfo, shape: &ProblemShape) -> i32 {
    let capabilities = info.capabilities;
    let mut score = 0;

    if shape.arithmetic {
        score += match capabilities.native_arithmetic {
            true => 100,
            false => -1000,
        };
    }

    if shape.horn && !shape.arithmetic {
        if capabilities.horn {
            score += 50;
            if info.name == "horn" {
                score += 20;
            }
        }
    } else if !shape.horn {
        score += match capabilities.full_fol {
            true => 50,
            false => -1000,
        };
    }

    if capabilities.full_fol {
        score += 1;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::{sat::SatEngine, sld::SldEngine, Engine};
    use crate::language::parser::parse;

    fn info(engine: &dyn Engine) -> EngineInfo {
        EngineInfo {
            name: engine.name(),
            capabilities: engine.capabilities(),
        }
    }

    fn shape(premises: &[&str], goal: &str) -> ProblemShape {
        let premises: Vec<Formula> = premises.iter().map(|s| parse(s).unwrap()).collect();
        let goal = parse(goal).unwrap();
        analyse(&premises, Some(&goal)).unwrap()
    }

    #[test]
    fn horn_problems_prefer_the_resolution_engine() {
        let shape = shape(&["all x (man(x) -> mortal(x))", "man(socrates)"], "mortal(socrates)");
        assert!(shape.horn);

        let horn = score(&info(&SldEngine::default()), &shape);
        let sat = score(&info(&SatEngine::default()), &shape);
        assert!(horn > sat);
    }

    #[test]
    fn non_horn_problems_prefer_the_satisfiability_engine() {
        let shape = shape(&["P | Q", "-P"], "Q");
        assert!(!shape.horn);

        let horn = score(&info(&SldEngine::default()), &shape);
        let sat = score(&info(&SatEngine::default()), &shape);
        assert!(sat > horn);
    }

    #[test]
    fn arithmetic_detected() {
        let shape = shape(&["lt(1, 2)"], "lt(1, 3)");
        assert!(shape.arithmetic);

        let horn = score(&info(&SldEngine::default()), &shape);
        let sat = score(&info(&SatEngine::default()), &shape);
        assert!(horn > sat);
    }

    #[test]
    fn universal_goals_are_not_queryable() {
        let shape = shape(&["all x P(x)"], "all x P(x)");
        assert!(!shape.horn);
    }
}

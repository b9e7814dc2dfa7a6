/*!
A recursive-descent parser for the formula language.

The grammar, with `iff` left-associative and `impl` right-associative:

```text
formula    ::= iff '.'? EOF
iff        ::= impl ('<->' impl)*
impl       ::= disj ('->' impl)?
disj       ::= conj ('|' conj)*
conj       ::= unary ('&' unary)*
unary      ::= '-' unary | quant | atom
quant      ::= ('all'|'exists') IDENT unary
atom       ::= '(' formula ')' | predOrEq
predOrEq   ::= IDENT ('(' termList ')')? ('=' term)?
term       ::= IDENT ('(' termList ')')?
```

An identifier in term position is classified at parse time:
1. A name on the stack of enclosing quantifier binders is a [Variable](Term::Variable) --- the stack is pushed before a quantifier body is read and popped after, so an inner binder shadows an outer one within its extent.
2. A single lowercase letter is a [Variable](Term::Variable), implicitly universal.
3. Any other lowercase name is a [Constant](Term::Constant), or a [Function](Term::Function) when applied.
4. An uppercase or mixed name is a [Constant](Term::Constant).

Failures abort the parse --- no partial tree is returned.
Each error carries the span, the offending input, and, when the shape of the failure is recognised, a one-line suggestion from a fixed table: unbalanced parentheses, an uppercase quantifier keyword, a trailing connective, an empty argument list, a doubled comma.

Depth is not the stack's problem.
Prefix chains --- negation and quantifiers --- are read by a loop over an explicit wrapper stack rather than by recursion, and the descent which remains (parentheses, right-nested implication) is measured up front: past a fixed nesting estimate the parse moves to a thread whose stack is sized to the input, so a formula nested a hundred thousand parentheses deep parses like any other.
*/

use crate::types::err::{ParseError, ParseErrorKind, SourceSpan};

use super::{
    ast::{Atom, Formula, Term},
    lexer,
    token::{Token, TokenKind},
};

/// Nesting above this estimate moves the parse to a thread with a stack sized to match.
const GUARDED_DEPTH: usize = 500;

/// Stack bytes reserved per level of the nesting estimate on a guarded parse.
const STACK_PER_LEVEL: usize = 2048;

/// Parses `source` to a [Formula].
pub fn parse(source: &str) -> Result<Formula, ParseError> {
    let depth = nesting_estimate(source);
    if depth <= GUARDED_DEPTH {
        return parse_on_this_stack(source);
    }

    // The descent is proportional to the nesting, so deep inputs get a stack to
    // match rather than whatever the calling thread has left.
    let stack_size = depth
        .saturating_mul(STACK_PER_LEVEL)
        .max(32 * 1024 * 1024);
    let owned = source.to_string();
    let spawned = std::thread::Builder::new()
        .name("entail-parse".to_string())
        .stack_size(stack_size)
        .spawn(move || parse_on_this_stack(&owned));

    match spawned {
        Ok(handle) => match handle.join() {
            Ok(result) => result,
            Err(payload) => std::panic::resume_unwind(payload),
        },
        Err(_) => parse_on_this_stack(source),
    }
}

/// An upper estimate of the descent depth `source` will require.
///
/// Parenthesis nesting and implication chains are the two constructs the parser
/// still recurses on; everything prefix is handled iteratively.
fn nesting_estimate(source: &str) -> usize {
    let bytes = source.as_bytes();
    let mut depth = 0_usize;
    let mut deepest = 0_usize;
    let mut arrows = 0_usize;

    for (index, byte) in bytes.iter().enumerate() {
        match byte {
            b'(' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b')' => depth = depth.saturating_sub(1),
            b'>' if index > 0 && bytes[index - 1] == b'-' => arrows += 1,
            _ => {}
        }
    }

    deepest + arrows
}

fn parse_on_this_stack(source: &str) -> Result<Formula, ParseError> {
    let tokens = lexer::lex(source)?;
    let mut parser = Parser {
        source,
        tokens,
        at: 0,
        bound: Vec::new(),
    };
    parser.formula()
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    at: usize,
    /// Names bound by enclosing quantifiers, innermost last.
    bound: Vec<String>,
}

/// One pending wrapper of a prefix chain.
enum Prefix {
    Negation,
    Universal(String),
    Existential(String),
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        &self.tokens[self.at]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.at].clone();
        if self.at + 1 < self.tokens.len() {
            self.at += 1;
        }
        token
    }

    fn take(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(
        &self,
        kind: ParseErrorKind,
        offset: usize,
        suggestion: Option<&'static str>,
    ) -> ParseError {
        ParseError {
            kind,
            span: SourceSpan::at(self.source, offset),
            suggestion,
            context: self.source.to_string(),
        }
    }

    fn unexpected(&self, expected: &'static str, suggestion: Option<&'static str>) -> ParseError {
        let token = self.peek();
        match token.kind {
            TokenKind::Eof => self.error(ParseErrorKind::UnexpectedEnd, token.offset, suggestion),
            _ => self.error(
                ParseErrorKind::UnexpectedToken {
                    found: token.lexeme.clone(),
                    expected,
                },
                token.offset,
                suggestion,
            ),
        }
    }

    fn formula(&mut self) -> Result<Formula, ParseError> {
        let formula = self.iff()?;
        self.take(TokenKind::Dot);
        match self.peek().kind {
            TokenKind::Eof => Ok(formula),
            _ => {
                let token = self.peek();
                Err(self.error(ParseErrorKind::TrailingInput, token.offset, None))
            }
        }
    }

    fn iff(&mut self) -> Result<Formula, ParseError> {
        let mut formula = self.implication()?;
        while self.take(TokenKind::Iff) {
            let right = self.implication()?;
            formula = Formula::iff(formula, right);
        }
        Ok(formula)
    }

    fn implication(&mut self) -> Result<Formula, ParseError> {
        let left = self.disjunction()?;
        if self.take(TokenKind::Implies) {
            // Right-associative.
            let right = self.implication()?;
            Ok(Formula::implies(left, right))
        } else {
            Ok(left)
        }
    }

    fn disjunction(&mut self) -> Result<Formula, ParseError> {
        let mut formula = self.conjunction()?;
        while self.take(TokenKind::Or) {
            let right = self.conjunction()?;
            formula = Formula::or(formula, right);
        }
        Ok(formula)
    }

    fn conjunction(&mut self) -> Result<Formula, ParseError> {
        let mut formula = self.unary()?;
        while self.take(TokenKind::And) {
            let right = self.unary()?;
            formula = Formula::and(formula, right);
        }
        Ok(formula)
    }

    /// Reads a chain of prefixes --- negations and quantifiers --- then an atom.
    ///
    /// The chain is collected on an explicit stack and folded over the atom
    /// afterwards, so a prefix tower of any height costs no call depth.
    /// Every binder in the chain scopes to the same extent, the atom, so the
    /// bound-name pushes all pop together as the wrappers fold.
    fn unary(&mut self) -> Result<Formula, ParseError> {
        let mut prefixes: Vec<Prefix> = Vec::new();

        let mut formula = loop {
            match self.peek().kind {
                TokenKind::Not => {
                    self.advance();
                    prefixes.push(Prefix::Negation);
                }

                TokenKind::Quant => {
                    let keyword = self.advance();

                    let var = match self.peek().kind {
                        TokenKind::Ident => self.advance().lexeme,
                        _ => return Err(self.unexpected("a variable name", None)),
                    };

                    self.bound.push(var.clone());
                    prefixes.push(match keyword.lexeme.as_str() {
                        "all" => Prefix::Universal(var),
                        _ => Prefix::Existential(var),
                    });
                }

                TokenKind::Eof => {
                    let trailing = self.at > 0
                        && matches!(
                            self.tokens[self.at - 1].kind,
                            TokenKind::And
                                | TokenKind::Or
                                | TokenKind::Implies
                                | TokenKind::Iff
                                | TokenKind::Not
                        );
                    let suggestion = match trailing {
                        true => Some("the formula ends with a connective"),
                        false => None,
                    };
                    return Err(self.unexpected("a formula", suggestion));
                }

                _ => break self.atom()?,
            }
        };

        // Innermost wrapper first.
        for prefix in prefixes.into_iter().rev() {
            formula = match prefix {
                Prefix::Negation => Formula::not(formula),
                Prefix::Universal(var) => {
                    self.bound.pop();
                    Formula::forall(var, formula)
                }
                Prefix::Existential(var) => {
                    self.bound.pop();
                    Formula::exists(var, formula)
                }
            };
        }

        Ok(formula)
    }

    fn atom(&mut self) -> Result<Formula, ParseError> {
        match self.peek().kind {
            TokenKind::LParen => {
                self.advance();
                let formula = self.iff()?;
                if !self.take(TokenKind::RParen) {
                    return Err(
                        self.unexpected("')'", Some("check for unbalanced parentheses"))
                    );
                }
                Ok(formula)
            }

            TokenKind::Ident => self.pred_or_eq(),

            _ => Err(self.unexpected("a formula", None)),
        }
    }

    fn pred_or_eq(&mut self) -> Result<Formula, ParseError> {
        let ident = self.advance();

        // `All x …` — a lowercase keyword written with the wrong case.
        if (ident.lexeme.eq_ignore_ascii_case("all") || ident.lexeme.eq_ignore_ascii_case("exists"))
            && self.peek().kind == TokenKind::Ident
        {
            return Err(self.error(
                ParseErrorKind::UnexpectedToken {
                    found: ident.lexeme,
                    expected: "a quantifier keyword",
                },
                ident.offset,
                Some("quantifier keywords are lowercase: 'all' and 'exists'"),
            ));
        }

        let args = match self.peek().kind {
            TokenKind::LParen => Some(self.term_list()?),
            _ => None,
        };

        if self.take(TokenKind::Eq) {
            let left = match args {
                Some(args) => Term::function(ident.lexeme, args),
                None => self.classify(&ident.lexeme),
            };
            let right = self.term()?;
            return Ok(Formula::atom(Atom::equals(left, right)));
        }

        Ok(Formula::atom(Atom::predicate(
            ident.lexeme,
            args.unwrap_or_default(),
        )))
    }

    fn term(&mut self) -> Result<Term, ParseError> {
        let ident = match self.peek().kind {
            TokenKind::Ident => self.advance(),
            _ => return Err(self.unexpected("a term", None)),
        };

        match self.peek().kind {
            TokenKind::LParen => {
                let args = self.term_list()?;
                Ok(Term::function(ident.lexeme, args))
            }
            _ => Ok(self.classify(&ident.lexeme)),
        }
    }

    fn term_list(&mut self) -> Result<Vec<Term>, ParseError> {
        // Caller has peeked the '('.
        self.advance();

        if self.peek().kind == TokenKind::RParen {
            return Err(self.unexpected(
                "a term",
                Some("remove the empty argument list or supply arguments"),
            ));
        }

        let mut terms = vec![self.term()?];
        while self.take(TokenKind::Comma) {
            if self.peek().kind == TokenKind::Comma {
                return Err(self.unexpected("a term", Some("remove the doubled comma")));
            }
            terms.push(self.term()?);
        }

        if !self.take(TokenKind::RParen) {
            return Err(self.unexpected("')'", Some("check for unbalanced parentheses")));
        }

        Ok(terms)
    }

    /// Classifies a bare identifier in term position.
    fn classify(&self, name: &str) -> Term {
        if self.bound.iter().any(|bound| bound == name) {
            return Term::var(name);
        }

        let mut chars = name.chars();
        let first = chars.next().unwrap_or('_');

        if name.len() == 1 && first.is_ascii_lowercase() {
            // Free variables are implicitly universal.
            return Term::var(name);
        }

        Term::constant(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence() {
        // '&' binds tighter than '|', which binds tighter than '->'.
        let formula = parse("P & Q | R -> S").unwrap();
        assert_eq!(formula.to_string(), "(((P & Q) | R) -> S)");
    }

    #[test]
    fn implication_is_right_associative() {
        let formula = parse("P -> Q -> R").unwrap();
        assert_eq!(formula.to_string(), "(P -> (Q -> R))");
    }

    #[test]
    fn iff_is_left_associative() {
        let formula = parse("P <-> Q <-> R").unwrap();
        assert_eq!(formula.to_string(), "((P <-> Q) <-> R)");
    }

    #[test]
    fn quantifier_binds_its_variable() {
        let formula = parse("all x (man(x) -> mortal(x))").unwrap();
        let Formula::Forall { var, body } = formula else {
            panic!("expected a universal");
        };
        assert_eq!(var, "x");
        let Formula::Implies(l, _) = *body else {
            panic!("expected an implication");
        };
        let Formula::Atom(Atom::Predicate { args, .. }) = *l else {
            panic!("expected a predicate");
        };
        assert_eq!(args, vec![Term::var("x")]);
    }

    #[test]
    fn shadowing_inner_binder_wins() {
        let formula = parse("all x (P(x) & exists x Q(x))").unwrap();
        assert_eq!(formula.to_string(), "all x (P(x) & exists x Q(x))");
    }

    #[test]
    fn classification() {
        // socrates: multi-letter lowercase constant; y: single-letter free variable.
        let formula = parse("knows(socrates, y)").unwrap();
        let Formula::Atom(Atom::Predicate { args, .. }) = formula else {
            panic!("expected a predicate");
        };
        assert_eq!(
            args,
            vec![Term::constant("socrates"), Term::var("y")]
        );
    }

    #[test]
    fn uppercase_is_a_constant() {
        let formula = parse("isa(Athens, City)").unwrap();
        let Formula::Atom(Atom::Predicate { args, .. }) = formula else {
            panic!("expected a predicate");
        };
        assert_eq!(args, vec![Term::constant("Athens"), Term::constant("City")]);
    }

    #[test]
    fn equality_is_term_level() {
        let formula = parse("f(a) = b").unwrap();
        let Formula::Atom(Atom::Equals(l, r)) = formula else {
            panic!("expected an equality");
        };
        assert_eq!(l, Term::function("f", vec![Term::constant("a")]));
        assert_eq!(r, Term::constant("b"));
    }

    #[test]
    fn round_trip() {
        for source in [
            "all x (man(x) -> mortal(x))",
            "exists y (P(y) & -Q(y))",
            "(P | Q) -> (R <-> S)",
            "a = b -> b = a",
            "all x exists y loves(x, y)",
        ] {
            let first = parse(source).unwrap();
            let second = parse(&first.to_string()).unwrap();
            assert_eq!(first, second, "round trip failed for {source}");
        }
    }

    #[test]
    fn unbalanced_parens() {
        let error = parse("(P & Q").unwrap_err();
        assert_eq!(error.suggestion, Some("check for unbalanced parentheses"));
    }

    #[test]
    fn trailing_connective() {
        let error = parse("P &").unwrap_err();
        assert_eq!(error.suggestion, Some("the formula ends with a connective"));
    }

    #[test]
    fn uppercase_quantifier() {
        let error = parse("All x P(x)").unwrap_err();
        assert_eq!(
            error.suggestion,
            Some("quantifier keywords are lowercase: 'all' and 'exists'")
        );
    }

    #[test]
    fn empty_argument_list() {
        let error = parse("p()").unwrap_err();
        assert_eq!(
            error.suggestion,
            Some("remove the empty argument list or supply arguments")
        );
    }

    #[test]
    fn doubled_comma() {
        let error = parse("p(a,,b)").unwrap_err();
        assert_eq!(error.suggestion, Some("remove the doubled comma"));
    }

    #[test]
    fn trailing_dot_accepted() {
        assert!(parse("mortal(socrates).").is_ok());
    }

    #[test]
    fn deep_nesting() {
        // The parser must survive deeply nested input without overflowing the stack.
        let depth = 1_000;
        let mut source = String::new();
        for _ in 0..depth {
            source.push('(');
        }
        source.push('P');
        for _ in 0..depth {
            source.push(')');
        }
        assert!(parse(&source).is_ok());
    }

    #[test]
    fn deep_negation_chain_is_iterative() {
        // Prefix chains cost heap, not call depth.
        let depth = 10_000;
        let mut source = "-".repeat(depth);
        source.push('P');

        let mut formula = parse(&source).unwrap();
        let mut counted = 0;
        while let Formula::Not(inner) = formula {
            counted += 1;
            formula = *inner;
        }
        assert_eq!(counted, depth);
    }

    #[test]
    fn quantifier_towers() {
        let depth = 2_000;
        let mut source = String::new();
        for index in 0..depth {
            source.push_str(&format!("all x{index} "));
        }
        source.push_str("P(x0)");

        assert!(parse(&source).is_ok());
    }

    #[test]
    fn nesting_estimate_tracks_parens_and_arrows() {
        assert_eq!(nesting_estimate("P & Q"), 0);
        assert_eq!(nesting_estimate("((P))"), 2);
        assert_eq!(nesting_estimate("P -> Q -> R"), 2);
        assert_eq!(nesting_estimate("(P -> Q)"), 2);
    }
}

/*!
The formula language --- lexer, parser, syntax tree, and signature extraction.

Formulas are written in a Prover9-style human syntax:

```text
all x (man(x) -> mortal(x))
exists y (P(y) & -Q(y))
a = b -> (b = a)
```

The [lexer] turns a source string into a stream of [tokens](token::Token) with byte offsets, the [parser] builds a [Formula](ast::Formula) tree with the grammar's precedence and associativity, classifying each identifier as it goes, and [signature] extracts the predicates, functions, constants, and free variables a formula mentions.

Classification of an identifier in term position follows the Prover9/Mace4 tradition:
1. A name bound by an enclosing quantifier is a variable.
2. A single lowercase letter is a variable --- free variables are implicitly universal.
3. Any other lowercase name is a constant, or a function when applied to arguments.
4. An uppercase or mixed name is a constant.
*/

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod signature;
pub mod token;

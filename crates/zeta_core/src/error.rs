use thiserror::Error;

/// Errors raised while tokenizing, parsing, compiling or evaluating an expression.
///
/// Messages are shown verbatim in the workbench history panel, so every
/// variant renders to a non-empty, user-readable sentence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("malformed number `{literal}`")]
    InvalidNumber { literal: String },

    #[error("unexpected {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("missing closing parenthesis for '(' at position {position}")]
    UnclosedParenthesis { position: usize },

    #[error("expression is longer than {limit} characters")]
    TooLong { limit: usize },

    #[error("expression has more than {limit} tokens")]
    TooManyTokens { limit: usize },

    #[error("expression nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("unknown identifier `{name}`")]
    UnknownIdentifier { name: String },

    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("function `{name}` must be followed by a parenthesised argument")]
    MissingArgument { name: String },

    #[error("expected {expected} variable values but received {found}")]
    VariableCountMismatch { expected: usize, found: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{function} is undefined for argument {argument}")]
    Domain { function: &'static str, argument: f64 },

    #[error("result is not a finite number")]
    NonFinite,

    #[error("internal evaluation error: malformed bytecode")]
    MalformedBytecode,
}

pub type Result<T> = std::result::Result<T, ExpressionError>;

use crate::error::{ExpressionError, Result};
use crate::traits::{Scalar, UnivariateFunction};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// Euler–Mascheroni constant.
pub const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Parenthesis / unary nesting accepted by the parser before it gives up.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Longest accepted input, in characters.
pub const MAX_EXPRESSION_LENGTH: usize = 4096;

/// Most tokens accepted in one expression; bounds the depth of operator chains.
pub const MAX_TOKENS: usize = 1024;

/// Resolves a named constant (`π`, `e`, `γ` and their ASCII spellings).
pub fn constant_value(name: &str) -> Option<f64> {
    match name {
        "π" | "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        "γ" | "gamma" => Some(EULER_GAMMA),
        _ => None,
    }
}

/// Unary functions accepted by the workbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    Sqrt,
    Log,
    Abs,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            "exp" => Some(Function::Exp),
            "sqrt" => Some(Function::Sqrt),
            "log" | "ln" => Some(Function::Log),
            "abs" => Some(Function::Abs),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Sqrt => "sqrt",
            Function::Log => "log",
            Function::Abs => "abs",
        }
    }

    fn opcode(self) -> OpCode {
        match self {
            Function::Sin => OpCode::Sin,
            Function::Cos => OpCode::Cos,
            Function::Tan => OpCode::Tan,
            Function::Exp => OpCode::Exp,
            Function::Sqrt => OpCode::Sqrt,
            Function::Log => OpCode::Log,
            Function::Abs => OpCode::Abs,
        }
    }
}

/// OpCodes for the Stack-based Virtual Machine.
/// The VM operates on a stack of `Scalar` values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    /// Pushes a constant `f64` value onto the stack.
    /// Named constants are folded into this at compile time.
    LoadConst(f64),
    /// Pushes the value of a free variable (by index) onto the stack.
    LoadVar(usize),
    /// Pops top two values (b, a), pushes (a + b).
    Add,
    /// Pops top two values (b, a), pushes (a - b).
    Sub,
    /// Pops top two values (b, a), pushes (a * b).
    Mul,
    /// Pops top two values (b, a), pushes (a / b). Fails when b is zero.
    Div,
    /// Pops top two values (b, a), pushes (a ^ b).
    Pow,
    /// Pops top value (a), pushes -a.
    Neg,
    Sin,
    Cos,
    Tan,
    Exp,
    /// Fails for negative arguments.
    Sqrt,
    /// Natural logarithm. Fails for non-positive arguments.
    Log,
    Abs,
}

/// Represents a compiled sequence of operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bytecode {
    pub ops: Vec<OpCode>,
}

impl Bytecode {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }
}

/// Stack-based Virtual Machine for evaluating expressions.
///
/// The VM is stateless; `execute` takes all necessary context:
/// - `bytecode`: Instructions to run.
/// - `vars`: Free-variable values (read-only).
/// - `stack`: A mutable buffer for intermediate computations.
///
/// Division by zero and out-of-domain `sqrt`/`log` arguments are reported as
/// errors, and a non-finite final value is rejected.
pub struct VM;

impl VM {
    pub fn execute<T: Scalar>(bytecode: &Bytecode, vars: &[T], stack: &mut Vec<T>) -> Result<T> {
        stack.clear();

        for op in &bytecode.ops {
            match *op {
                OpCode::LoadConst(val) => {
                    stack.push(T::from_f64(val).ok_or(ExpressionError::MalformedBytecode)?);
                }
                OpCode::LoadVar(idx) => {
                    let value = vars.get(idx).ok_or(ExpressionError::MalformedBytecode)?;
                    stack.push(*value);
                }
                OpCode::Add => {
                    let (a, b) = pop_pair(stack)?;
                    stack.push(a + b);
                }
                OpCode::Sub => {
                    let (a, b) = pop_pair(stack)?;
                    stack.push(a - b);
                }
                OpCode::Mul => {
                    let (a, b) = pop_pair(stack)?;
                    stack.push(a * b);
                }
                OpCode::Div => {
                    let (a, b) = pop_pair(stack)?;
                    if b == T::zero() {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    stack.push(a / b);
                }
                OpCode::Pow => {
                    let (a, b) = pop_pair(stack)?;
                    stack.push(a.powf(b));
                }
                OpCode::Neg => {
                    let a = pop(stack)?;
                    stack.push(-a);
                }
                OpCode::Sin => {
                    let a = pop(stack)?;
                    stack.push(a.sin());
                }
                OpCode::Cos => {
                    let a = pop(stack)?;
                    stack.push(a.cos());
                }
                OpCode::Tan => {
                    let a = pop(stack)?;
                    stack.push(a.tan());
                }
                OpCode::Exp => {
                    let a = pop(stack)?;
                    stack.push(a.exp());
                }
                OpCode::Sqrt => {
                    let a = pop(stack)?;
                    if a < T::zero() {
                        return Err(domain_error("sqrt", a));
                    }
                    stack.push(a.sqrt());
                }
                OpCode::Log => {
                    let a = pop(stack)?;
                    if a <= T::zero() {
                        return Err(domain_error("log", a));
                    }
                    stack.push(a.ln());
                }
                OpCode::Abs => {
                    let a = pop(stack)?;
                    stack.push(a.abs());
                }
            }
        }

        let result = pop(stack)?;
        if !stack.is_empty() {
            return Err(ExpressionError::MalformedBytecode);
        }
        if !result.is_finite() {
            return Err(ExpressionError::NonFinite);
        }
        Ok(result)
    }
}

fn pop<T: Scalar>(stack: &mut Vec<T>) -> Result<T> {
    stack.pop().ok_or(ExpressionError::MalformedBytecode)
}

fn pop_pair<T: Scalar>(stack: &mut Vec<T>) -> Result<(T, T)> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    Ok((a, b))
}

fn domain_error<T: Scalar>(function: &'static str, argument: T) -> ExpressionError {
    ExpressionError::Domain {
        function,
        argument: argument.to_f64().unwrap_or(f64::NAN),
    }
}

// --- AST & Parser ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn opcode(self) -> OpCode {
        match self {
            BinaryOp::Add => OpCode::Add,
            BinaryOp::Sub => OpCode::Sub,
            BinaryOp::Mul => OpCode::Mul,
            BinaryOp::Div => OpCode::Div,
            BinaryOp::Pow => OpCode::Pow,
        }
    }
}

/// Abstract Syntax Tree nodes for expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// A free variable or a named constant; resolved by the compiler.
    Variable(String),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Neg(Box<Expr>),
    Call(Function, Box<Expr>),
}

/// Compiles an AST (`Expr`) into `Bytecode`.
/// Free variables shadow named constants of the same spelling.
pub struct Compiler {
    pub var_map: HashMap<String, usize>,
}

impl Compiler {
    pub fn new(var_names: &[String]) -> Self {
        let mut var_map = HashMap::new();
        for (i, name) in var_names.iter().enumerate() {
            var_map.insert(name.clone(), i);
        }
        Self { var_map }
    }

    pub fn compile(&self, expr: &Expr) -> Result<Bytecode> {
        let mut ops = Vec::new();
        self.compile_recursive(expr, &mut ops)?;
        Ok(Bytecode { ops })
    }

    fn compile_recursive(&self, expr: &Expr, ops: &mut Vec<OpCode>) -> Result<()> {
        match expr {
            Expr::Number(n) => ops.push(OpCode::LoadConst(*n)),
            Expr::Variable(name) => {
                if let Some(&idx) = self.var_map.get(name) {
                    ops.push(OpCode::LoadVar(idx));
                } else if let Some(value) = constant_value(name) {
                    ops.push(OpCode::LoadConst(value));
                } else {
                    return Err(ExpressionError::UnknownIdentifier { name: name.clone() });
                }
            }
            Expr::Binary(left, op, right) => {
                self.compile_recursive(left, ops)?;
                self.compile_recursive(right, ops)?;
                ops.push(op.opcode());
            }
            Expr::Neg(operand) => {
                self.compile_recursive(operand, ops)?;
                ops.push(OpCode::Neg);
            }
            Expr::Call(func, arg) => {
                self.compile_recursive(arg, ops)?;
                ops.push(func.opcode());
            }
        }
        Ok(())
    }
}

/// Parses a string expression into an AST.
///
/// Precedence, tightest first: unary sign, `^` (right-associative),
/// `* /`, `+ -` (left-associative). `-2^2` is therefore `4`.
pub fn parse(input: &str) -> Result<Expr> {
    if input.chars().count() > MAX_EXPRESSION_LENGTH {
        return Err(ExpressionError::TooLong {
            limit: MAX_EXPRESSION_LENGTH,
        });
    }
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }
    if tokens.len() > MAX_TOKENS {
        return Err(ExpressionError::TooManyTokens { limit: MAX_TOKENS });
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_expression()?;
    if let Some(trailing) = parser.peek() {
        return Err(ExpressionError::UnexpectedToken {
            found: trailing.token.describe(),
            position: trailing.position,
        });
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Identifier(name) => format!("identifier `{name}`"),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Spanned {
    token: Token,
    /// Character offset into the source text.
    position: usize,
}

fn tokenize(input: &str) -> Result<Vec<Spanned>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        let start = pos;
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let token = if c.is_ascii_digit() || c == '.' {
            while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                pos += 1;
            }
            // Exponent part only when digits follow, so `2e` stays number + constant.
            if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
                let mut look = pos + 1;
                if look < chars.len() && (chars[look] == '+' || chars[look] == '-') {
                    look += 1;
                }
                if look < chars.len() && chars[look].is_ascii_digit() {
                    pos = look;
                    while pos < chars.len() && chars[pos].is_ascii_digit() {
                        pos += 1;
                    }
                }
            }
            let literal: String = chars[start..pos].iter().collect();
            let value = literal
                .parse::<f64>()
                .map_err(|_| ExpressionError::InvalidNumber {
                    literal: literal.clone(),
                })?;
            Token::Number(value)
        } else if c.is_alphabetic() || c == '_' {
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                pos += 1;
            }
            Token::Identifier(chars[start..pos].iter().collect())
        } else {
            pos += 1;
            match c {
                '+' => Token::Plus,
                '-' | '−' => Token::Minus,
                '*' => Token::Star,
                '/' => Token::Slash,
                '^' => Token::Caret,
                '(' => Token::LParen,
                ')' => Token::RParen,
                _ => {
                    return Err(ExpressionError::UnexpectedCharacter {
                        ch: c,
                        position: start,
                    })
                }
            }
        };
        tokens.push(Spanned {
            token,
            position: start,
        });
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.peek().map(|spanned| &spanned.token)
    }

    fn consume(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn parse_expression(&mut self) -> Result<Expr> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.consume();
            let right = self.parse_term()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut left = self.parse_power()?;

        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.consume();
            let right = self.parse_power()?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ExpressionError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        Ok(())
    }

    fn parse_power(&mut self) -> Result<Expr> {
        self.enter()?;
        let result = self.parse_power_chain();
        self.depth -= 1;
        result
    }

    fn parse_power_chain(&mut self) -> Result<Expr> {
        let base = self.parse_unary()?;
        if let Some(Token::Caret) = self.peek_token() {
            self.consume();
            let exponent = self.parse_power()?;
            return Ok(Expr::Binary(
                Box::new(base),
                BinaryOp::Pow,
                Box::new(exponent),
            ));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        self.enter()?;
        let result = match self.peek_token() {
            Some(Token::Minus) => {
                self.consume();
                self.parse_unary().map(|expr| Expr::Neg(Box::new(expr)))
            }
            Some(Token::Plus) => {
                self.consume();
                self.parse_unary()
            }
            _ => self.parse_primary(),
        };
        self.depth -= 1;
        result
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(spanned) = self.consume() else {
            return Err(ExpressionError::UnexpectedEnd);
        };
        match spanned.token {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Identifier(name) => {
                let is_call = matches!(self.peek_token(), Some(Token::LParen));
                match (Function::from_name(&name), is_call) {
                    (Some(func), true) => {
                        let open = self.consume().map_or(spanned.position, |t| t.position);
                        let arg = self.parse_expression()?;
                        self.expect_closing(open)?;
                        Ok(Expr::Call(func, Box::new(arg)))
                    }
                    (Some(_), false) => Err(ExpressionError::MissingArgument { name }),
                    (None, true) => Err(ExpressionError::UnknownFunction { name }),
                    (None, false) => Ok(Expr::Variable(name)),
                }
            }
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect_closing(spanned.position)?;
                Ok(expr)
            }
            other => Err(ExpressionError::UnexpectedToken {
                found: other.describe(),
                position: spanned.position,
            }),
        }
    }

    fn expect_closing(&mut self, open_position: usize) -> Result<()> {
        match self.consume() {
            Some(Spanned {
                token: Token::RParen,
                ..
            }) => Ok(()),
            Some(other) => Err(ExpressionError::UnexpectedToken {
                found: other.token.describe(),
                position: other.position,
            }),
            None => Err(ExpressionError::UnclosedParenthesis {
                position: open_position,
            }),
        }
    }
}

// --- Compiled expressions ---

/// An expression compiled against an ordered list of free variables.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    var_names: Vec<String>,
    bytecode: Bytecode,
    // Interior mutability for VM stack to avoid allocation per evaluation.
    stack: RefCell<Vec<f64>>,
}

impl CompiledExpression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    pub fn bytecode(&self) -> &Bytecode {
        &self.bytecode
    }

    /// Evaluates with `vars` given in the order the variables were declared.
    pub fn evaluate(&self, vars: &[f64]) -> Result<f64> {
        if vars.len() != self.var_names.len() {
            return Err(ExpressionError::VariableCountMismatch {
                expected: self.var_names.len(),
                found: vars.len(),
            });
        }
        let mut stack = self.stack.borrow_mut();
        VM::execute(&self.bytecode, vars, &mut stack)
    }
}

impl UnivariateFunction for CompiledExpression {
    fn value_at(&self, x: f64) -> Option<f64> {
        let vars = [x];
        let arity = self.var_names.len().min(1);
        self.evaluate(&vars[..arity]).ok()
    }
}

/// Parses and compiles `expression` against `var_names`.
pub fn compile_expression(expression: &str, var_names: &[String]) -> Result<CompiledExpression> {
    let parsed = parse(expression)?;
    let compiler = Compiler::new(var_names);
    let bytecode = compiler.compile(&parsed)?;
    Ok(CompiledExpression {
        source: expression.to_string(),
        var_names: var_names.to_vec(),
        bytecode,
        stack: RefCell::new(Vec::with_capacity(64)),
    })
}

/// Evaluates a closed expression (no free variables).
pub fn evaluate_expression(expression: &str) -> Result<f64> {
    compile_expression(expression, &[])?.evaluate(&[])
}

/// Outcome of one workbench evaluation, as shown in the history panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub input_text: String,
    pub value: f64,
    pub valid: bool,
    pub error: Option<String>,
}

impl EvaluationResult {
    fn success(input: &str, value: f64) -> Self {
        Self {
            input_text: input.to_string(),
            value,
            valid: true,
            error: None,
        }
    }

    fn failure(input: &str, err: &ExpressionError) -> Self {
        Self {
            input_text: input.to_string(),
            value: 0.0,
            valid: false,
            error: Some(err.to_string()),
        }
    }
}

/// Evaluates user text, converting every failure into an invalid result.
pub fn evaluate(input: &str) -> EvaluationResult {
    match evaluate_expression(input) {
        Ok(value) => EvaluationResult::success(input, value),
        Err(err) => {
            debug!("rejected expression {input:?}: {err}");
            EvaluationResult::failure(input, &err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn value(text: &str) -> f64 {
        evaluate_expression(text).unwrap_or_else(|err| panic!("{text:?} failed: {err}"))
    }

    #[test]
    fn sin_of_quarter_pi_matches_sqrt_half() {
        let result = evaluate("sin(π/4)");
        assert!(result.valid);
        assert!(result.error.is_none());
        assert!((result.value - 0.707_106_78).abs() < 1e-6);
    }

    #[test]
    fn division_by_zero_is_invalid() {
        let result = evaluate("1/0");
        assert!(!result.valid);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.error.as_deref(), Some("division by zero"));
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(value("1 + 2 * 3"), 7.0);
        assert_eq!(value("(1 + 2) * 3"), 9.0);
        assert_eq!(value("10 - 4 - 3"), 3.0);
        assert_eq!(value("8 / 4 / 2"), 1.0);
        assert_eq!(value("2^3^2"), 512.0);
        assert_eq!(value("2 * 3^2"), 18.0);
        assert_eq!(value("-2^2"), 4.0);
        assert_eq!(value("2^-1"), 0.5);
        assert_eq!(value("--3"), 3.0);
        assert_eq!(value("+4 - -1"), 5.0);
    }

    #[test]
    fn constants_and_functions_resolve() {
        assert_relative_eq!(value("π"), std::f64::consts::PI);
        assert_relative_eq!(value("pi"), std::f64::consts::PI);
        assert_relative_eq!(value("e"), std::f64::consts::E);
        assert_relative_eq!(value("γ"), EULER_GAMMA);
        assert_relative_eq!(value("log(e^2)"), 2.0, epsilon = 1e-12);
        assert_relative_eq!(value("ln(e)"), 1.0, epsilon = 1e-12);
        assert_relative_eq!(value("sqrt(16) + abs(-3)"), 7.0);
        assert_relative_eq!(value("cos(0) + exp(0)"), 2.0);
        assert_relative_eq!(value("tan(π/4)"), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn numbers_accept_fractions_and_exponents() {
        assert_eq!(value("1.5e3"), 1500.0);
        assert_eq!(value("2.5E-1"), 0.25);
        assert_eq!(value(".5"), 0.5);
        assert_relative_eq!(value("2*e"), 2.0 * std::f64::consts::E);
    }

    #[test]
    fn domain_errors_are_reported() {
        assert!(matches!(
            evaluate_expression("sqrt(-1)"),
            Err(ExpressionError::Domain { function: "sqrt", .. })
        ));
        assert!(matches!(
            evaluate_expression("log(0)"),
            Err(ExpressionError::Domain { function: "log", .. })
        ));
        assert_eq!(
            evaluate_expression("exp(1000)"),
            Err(ExpressionError::NonFinite)
        );
    }

    #[test]
    fn malformed_input_is_rejected_with_message() {
        for text in ["(1 + 2", "1 + 2)", "", "   ", "2 $ 3", "1 +", "sin 2", "foo(1)", "y + 1", "1..2", "2 3"] {
            let result = evaluate(text);
            assert!(!result.valid, "{text:?} should be invalid");
            let message = result.error.expect("invalid result carries a message");
            assert!(!message.is_empty(), "{text:?} produced an empty message");
        }
        assert_eq!(
            evaluate_expression("(1 + 2"),
            Err(ExpressionError::UnclosedParenthesis { position: 0 })
        );
        assert_eq!(evaluate_expression(""), Err(ExpressionError::Empty));
    }

    #[test]
    fn deeply_nested_input_hits_depth_limit() {
        let text = format!("{}1{}", "(".repeat(300), ")".repeat(300));
        assert_eq!(
            evaluate_expression(&text),
            Err(ExpressionError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH
            })
        );
    }

    #[test]
    fn long_power_chain_is_rejected_without_overflow() {
        let result = evaluate(&vec!["1"; 5_000].join("^"));
        assert!(!result.valid);
        assert_eq!(
            evaluate_expression(&vec!["1"; 5_000].join("^")),
            Err(ExpressionError::TooLong {
                limit: MAX_EXPRESSION_LENGTH
            })
        );
        assert_eq!(
            evaluate_expression(&vec!["1"; 300].join("^")),
            Err(ExpressionError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH
            })
        );
        assert_eq!(evaluate_expression(&vec!["2"; 3].join("^")), Ok(16.0));
    }

    #[test]
    fn long_sum_chain_is_bounded() {
        assert!(!evaluate(&vec!["1"; 20_000].join("+")).valid);
        assert_eq!(
            evaluate_expression(&vec!["1"; 1_000].join("+")),
            Err(ExpressionError::TooManyTokens { limit: MAX_TOKENS })
        );
        assert_eq!(evaluate_expression(&vec!["1"; 500].join("+")), Ok(500.0));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let first = evaluate("sqrt(2) * γ - e^π");
        let second = evaluate("sqrt(2) * γ - e^π");
        assert_eq!(first, second);
    }

    #[test]
    fn compiled_expression_evaluates_variables() {
        let names = vec!["x".to_string(), "y".to_string()];
        let compiled = compile_expression("x^2 + y", &names).expect("should compile");
        assert_eq!(compiled.evaluate(&[3.0, 1.0]), Ok(10.0));
        assert_eq!(
            compiled.evaluate(&[3.0]),
            Err(ExpressionError::VariableCountMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn variables_shadow_constants() {
        let names = vec!["e".to_string()];
        let compiled = compile_expression("e + 1", &names).expect("should compile");
        assert_eq!(compiled.evaluate(&[1.0]), Ok(2.0));
    }

    #[test]
    fn compiler_folds_constants_into_loads() {
        let compiled = compile_expression("-π", &[]).expect("should compile");
        assert_eq!(
            compiled.bytecode().ops,
            vec![OpCode::LoadConst(std::f64::consts::PI), OpCode::Neg]
        );
    }

    #[test]
    fn vm_rejects_truncated_bytecode() {
        let bytecode = Bytecode {
            ops: vec![OpCode::LoadConst(1.0), OpCode::Add],
        };
        let mut stack = Vec::new();
        assert_eq!(
            VM::execute::<f64>(&bytecode, &[], &mut stack),
            Err(ExpressionError::MalformedBytecode)
        );
    }
}

//! Arithmetic expression evaluator for control-rule and weir-shape formulas.
//!
//! Build once (`build`), evaluate many times (`evaluate`) against whatever
//! variable store the caller holds. A private `Lexer`/`Parser` pair whose state
//! lives only for one `build` call emits a `Program` that owns no reference back
//! to the parser.

use thiserror::Error;

/// The eighteen reserved function names, case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Cos,
    Sin,
    Tan,
    Cot,
    Abs,
    Sgn,
    Sqrt,
    Log,
    Exp,
    Asin,
    Acos,
    Atan,
    Acot,
    Sinh,
    Cosh,
    Tanh,
    Coth,
    Log10,
    Step,
}

impl Func {
    fn from_name(name: &str) -> Option<Func> {
        match name.to_ascii_uppercase().as_str() {
            "COS" => Some(Func::Cos),
            "SIN" => Some(Func::Sin),
            "TAN" => Some(Func::Tan),
            "COT" => Some(Func::Cot),
            "ABS" => Some(Func::Abs),
            "SGN" => Some(Func::Sgn),
            "SQRT" => Some(Func::Sqrt),
            "LOG" => Some(Func::Log),
            "EXP" => Some(Func::Exp),
            "ASIN" => Some(Func::Asin),
            "ACOS" => Some(Func::Acos),
            "ATAN" => Some(Func::Atan),
            "ACOT" => Some(Func::Acot),
            "SINH" => Some(Func::Sinh),
            "COSH" => Some(Func::Cosh),
            "TANH" => Some(Func::Tanh),
            "COTH" => Some(Func::Coth),
            "LOG10" => Some(Func::Log10),
            "STEP" => Some(Func::Step),
            _ => None,
        }
    }

    /// Apply the function with the evaluator's protective domain clamping.
    fn apply(self, x: f64) -> f64 {
        match self {
            Func::Cos => x.cos(),
            Func::Sin => x.sin(),
            Func::Tan => x.tan(),
            Func::Cot => {
                let t = x.tan();
                if t.abs() < f64::EPSILON {
                    0.0
                } else {
                    1.0 / t
                }
            }
            Func::Abs => x.abs(),
            Func::Sgn => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Func::Sqrt => {
                if x < 0.0 {
                    0.0
                } else {
                    x.sqrt()
                }
            }
            Func::Log => {
                if x <= 0.0 {
                    0.0
                } else {
                    x.ln()
                }
            }
            Func::Exp => x.exp(),
            Func::Asin => x.asin(),
            Func::Acos => x.acos(),
            Func::Atan => x.atan(),
            Func::Acot => {
                if x.abs() < f64::EPSILON {
                    std::f64::consts::FRAC_PI_2
                } else {
                    (1.0 / x).atan()
                }
            }
            Func::Sinh => x.sinh(),
            Func::Cosh => x.cosh(),
            Func::Tanh => x.tanh(),
            Func::Coth => {
                let t = x.tanh();
                if t.abs() < f64::EPSILON {
                    0.0
                } else {
                    1.0 / t
                }
            }
            Func::Log10 => {
                if x <= 0.0 {
                    0.0
                } else {
                    x.log10()
                }
            }
            Func::Step => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Errors raised while building a [`Program`] from a formula string. Each
/// variant carries the byte offset of the offending token for diagnostics.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("unbalanced parentheses at byte {0}")]
    UnbalancedParens(usize),
    #[error("malformed token at byte {0}")]
    MalformedToken(usize),
    #[error("operator missing an operand at byte {0}")]
    MissingOperand(usize),
    #[error("function at byte {0} must be followed by '('")]
    FunctionMissingParen(usize),
    #[error("exponent at byte {0} must be a (possibly parenthesised) numeric literal")]
    ExponentNotLiteral(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Number(f64),
    Func(Func),
    Var(i32),
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0 }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b) = self.peek_byte() {
            if b == b' ' || b == b'\t' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Tokenize the whole formula, fusing a leading `-` before a digit (when
    /// the previous token is nothing or `(`) into a negative numeric literal.
    fn tokenize(mut self, mut resolve: impl FnMut(&str) -> i32) -> Result<Vec<(Token, usize)>, BuildError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_ws();
            let start = self.pos;
            let Some(b) = self.peek_byte() else { break };
            match b {
                b'(' => {
                    tokens.push((Token::LParen, start));
                    self.pos += 1;
                }
                b')' => {
                    tokens.push((Token::RParen, start));
                    self.pos += 1;
                }
                b'+' => {
                    tokens.push((Token::Plus, start));
                    self.pos += 1;
                }
                b'-' => {
                    let fuses_negative = matches!(tokens.last(), None | Some((Token::LParen, _)))
                        && matches!(self.bytes.get(self.pos + 1), Some(d) if d.is_ascii_digit() || *d == b'.');
                    if fuses_negative {
                        self.pos += 1;
                        let (value, end) = self.scan_number(start)?;
                        tokens.push((Token::Number(-value), start));
                        self.pos = end;
                    } else {
                        tokens.push((Token::Minus, start));
                        self.pos += 1;
                    }
                }
                b'*' => {
                    tokens.push((Token::Star, start));
                    self.pos += 1;
                }
                b'/' => {
                    tokens.push((Token::Slash, start));
                    self.pos += 1;
                }
                b'^' => {
                    tokens.push((Token::Caret, start));
                    self.pos += 1;
                }
                b'0'..=b'9' | b'.' => {
                    let (value, end) = self.scan_number(start)?;
                    tokens.push((Token::Number(value), start));
                    self.pos = end;
                }
                b if b.is_ascii_alphabetic() || b == b'_' => {
                    let end = self.scan_ident_end();
                    let name = &self.src[start..end];
                    if let Some(func) = Func::from_name(name) {
                        tokens.push((Token::Func(func), start));
                    } else {
                        let idx = resolve(name);
                        tokens.push((Token::Var(idx), start));
                    }
                    self.pos = end;
                }
                _ => return Err(BuildError::MalformedToken(start)),
            }
        }
        Ok(tokens)
    }

    fn scan_ident_end(&self) -> usize {
        let mut end = self.pos;
        while let Some(b) = self.bytes.get(end) {
            if b.is_ascii_alphanumeric() || *b == b'_' {
                end += 1;
            } else {
                break;
            }
        }
        end
    }

    /// Scan a number literal starting at `start` (the `-` sign, if fused, has
    /// already been consumed by the caller). Supports an optional decimal
    /// point and a signed exponent `E[+-]?digits`.
    fn scan_number(&self, start: usize) -> Result<(f64, usize), BuildError> {
        let mut end = self.pos;
        let mut saw_digit = false;
        while let Some(b) = self.bytes.get(end) {
            if b.is_ascii_digit() {
                saw_digit = true;
                end += 1;
            } else {
                break;
            }
        }
        if self.bytes.get(end) == Some(&b'.') {
            end += 1;
            while let Some(b) = self.bytes.get(end) {
                if b.is_ascii_digit() {
                    saw_digit = true;
                    end += 1;
                } else {
                    break;
                }
            }
        }
        if !saw_digit {
            return Err(BuildError::MalformedToken(start));
        }
        if matches!(self.bytes.get(end), Some(b'e') | Some(b'E')) {
            let mut exp_end = end + 1;
            if matches!(self.bytes.get(exp_end), Some(b'+') | Some(b'-')) {
                exp_end += 1;
            }
            let exp_digit_start = exp_end;
            while let Some(b) = self.bytes.get(exp_end) {
                if b.is_ascii_digit() {
                    exp_end += 1;
                } else {
                    break;
                }
            }
            if exp_end > exp_digit_start {
                end = exp_end;
            }
        }
        // `start` may point at a fused leading `-`, which is outside the
        // unsigned digit run scanned from `self.pos`; parse that run alone
        // and let the caller apply the sign.
        let numeric_text = &self.src[self.pos..end];
        numeric_text.parse::<f64>().map(|v| (v, end)).map_err(|_| BuildError::MalformedToken(start))
    }
}

/// A node in the expression tree built during parsing.
enum Tree {
    Num(f64),
    Var(i32),
    Neg(Box<Tree>),
    BinOp(BinOpKind, Box<Tree>, Box<Tree>),
    Pow(Box<Tree>, f64),
    Call(Func, Box<Tree>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, usize)>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<(Token, usize)> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn end_offset(&self) -> usize {
        self.tokens.last().map(|(_, p)| *p + 1).unwrap_or(0)
    }

    fn parse_program(mut self) -> Result<Tree, BuildError> {
        let tree = self.parse_expr()?;
        if let Some((_, pos)) = self.peek() {
            return Err(BuildError::UnbalancedParens(pos));
        }
        Ok(tree)
    }

    fn parse_expr(&mut self) -> Result<Tree, BuildError> {
        let mut left = self.parse_term()?;
        loop {
            match self.peek() {
                Some((Token::Plus, _)) => {
                    self.advance();
                    let right = self.parse_term()?;
                    left = Tree::BinOp(BinOpKind::Add, Box::new(left), Box::new(right));
                }
                Some((Token::Minus, _)) => {
                    self.advance();
                    let right = self.parse_term()?;
                    left = Tree::BinOp(BinOpKind::Sub, Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Tree, BuildError> {
        let mut left = self.parse_power()?;
        loop {
            match self.peek() {
                Some((Token::Star, _)) => {
                    self.advance();
                    let right = self.parse_power()?;
                    left = Tree::BinOp(BinOpKind::Mul, Box::new(left), Box::new(right));
                }
                Some((Token::Slash, _)) => {
                    self.advance();
                    let right = self.parse_power()?;
                    left = Tree::BinOp(BinOpKind::Div, Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    /// `unary ('^' exponent)?`, right-associative; the exponent must be a
    /// (possibly parenthesised) numeric literal.
    fn parse_power(&mut self) -> Result<Tree, BuildError> {
        let base = self.parse_unary()?;
        if let Some((Token::Caret, pos)) = self.peek() {
            self.advance();
            let exponent = self.parse_exponent_literal(pos)?;
            return Ok(Tree::Pow(Box::new(base), exponent));
        }
        Ok(base)
    }

    fn parse_exponent_literal(&mut self, caret_pos: usize) -> Result<f64, BuildError> {
        match self.advance() {
            Some((Token::Number(n), _)) => Ok(n),
            Some((Token::LParen, _)) => {
                let value = match self.advance() {
                    Some((Token::Number(n), _)) => n,
                    Some((_, pos)) | None => return Err(BuildError::ExponentNotLiteral(pos.max(caret_pos))),
                };
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(value),
                    Some((_, pos)) => Err(BuildError::UnbalancedParens(pos)),
                    None => Err(BuildError::UnbalancedParens(caret_pos)),
                }
            }
            Some((_, pos)) => Err(BuildError::ExponentNotLiteral(pos)),
            None => Err(BuildError::ExponentNotLiteral(caret_pos)),
        }
    }

    fn parse_unary(&mut self) -> Result<Tree, BuildError> {
        if let Some((Token::Minus, _)) = self.peek() {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(Tree::Neg(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Tree, BuildError> {
        match self.advance() {
            Some((Token::Number(n), _)) => Ok(Tree::Num(n)),
            Some((Token::Var(idx), _)) => Ok(Tree::Var(idx)),
            Some((Token::LParen, pos)) => {
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(inner),
                    _ => Err(BuildError::UnbalancedParens(pos)),
                }
            }
            Some((Token::Func(func), pos)) => {
                match self.advance() {
                    Some((Token::LParen, _)) => {}
                    _ => return Err(BuildError::FunctionMissingParen(pos)),
                }
                let arg = self.parse_expr()?;
                match self.advance() {
                    Some((Token::RParen, _)) => Ok(Tree::Call(func, Box::new(arg))),
                    Some((_, p)) => Err(BuildError::UnbalancedParens(p)),
                    None => Err(BuildError::UnbalancedParens(pos)),
                }
            }
            Some((_, pos)) => Err(BuildError::MissingOperand(pos)),
            None => Err(BuildError::MissingOperand(self.end_offset())),
        }
    }
}

/// One instruction in a built program's postfix form.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Instr {
    Push(f64),
    PushVar(usize),
    Add,
    Sub,
    Mul,
    Div,
    Pow(f64),
    Neg,
    Call(Func),
}

fn emit_postorder(tree: &Tree, out: &mut Vec<Instr>) {
    match tree {
        Tree::Num(n) => out.push(Instr::Push(*n)),
        Tree::Var(idx) => {
            if *idx >= 0 {
                out.push(Instr::PushVar(*idx as usize));
            } else {
                out.push(Instr::Push(0.0));
            }
        }
        Tree::Neg(inner) => {
            emit_postorder(inner, out);
            out.push(Instr::Neg);
        }
        Tree::BinOp(kind, left, right) => {
            emit_postorder(left, out);
            emit_postorder(right, out);
            out.push(match kind {
                BinOpKind::Add => Instr::Add,
                BinOpKind::Sub => Instr::Sub,
                BinOpKind::Mul => Instr::Mul,
                BinOpKind::Div => Instr::Div,
            });
        }
        Tree::Pow(base, exponent) => {
            emit_postorder(base, out);
            out.push(Instr::Pow(*exponent));
        }
        Tree::Call(func, arg) => {
            emit_postorder(arg, out);
            out.push(Instr::Call(*func));
        }
    }
}

/// A built, ready-to-evaluate formula. Owns its postfix storage; dropping it
/// frees everything, no `free()` call needed.
pub struct Program {
    instructions: Vec<Instr>,
}

/// Maximum depth of the evaluation value stack.
const STACK_CAPACITY: usize = 1024;

/// Build a `Program` from a formula string.
///
/// `resolve` maps an identifier (case-insensitive, not one of the eighteen
/// reserved function names) to a non-negative variable index, or a negative
/// number for "unknown" (an unknown variable evaluates to the constant 0).
pub fn build(formula: &str, resolve: impl FnMut(&str) -> i32) -> Result<Program, BuildError> {
    let lexer = Lexer::new(formula);
    let tokens = lexer.tokenize(resolve)?;
    let tree = Parser::new(tokens).parse_program()?;
    let mut instructions = Vec::new();
    emit_postorder(&tree, &mut instructions);
    Ok(Program { instructions })
}

/// Evaluate a built program. `read` supplies the current value of a variable
/// index previously returned by `resolve` during [`build`].
///
/// Never panics and never returns a non-finite value: domain errors in the
/// reserved math functions clip to 0, and a NaN final result is coerced to 0.
pub fn evaluate(program: &Program, mut read: impl FnMut(usize) -> f64) -> f64 {
    let mut stack: Vec<f64> = Vec::with_capacity(STACK_CAPACITY.min(program.instructions.len().max(1)));
    for instr in &program.instructions {
        match *instr {
            Instr::Push(v) => stack.push(v),
            Instr::PushVar(idx) => stack.push(read(idx)),
            Instr::Add => binary(&mut stack, |a, b| a + b),
            Instr::Sub => binary(&mut stack, |a, b| a - b),
            Instr::Mul => binary(&mut stack, |a, b| a * b),
            Instr::Div => binary(&mut stack, |a, b| a / b),
            Instr::Neg => unary(&mut stack, |a| -a),
            Instr::Pow(exp) => unary(&mut stack, |base| if base <= 0.0 { 0.0 } else { base.powf(exp) }),
            Instr::Call(func) => unary(&mut stack, |a| func.apply(a)),
        }
    }
    let result = stack.pop().unwrap_or(0.0);
    if result.is_finite() {
        result
    } else {
        0.0
    }
}

fn binary(stack: &mut Vec<f64>, f: impl Fn(f64, f64) -> f64) {
    let b = stack.pop().unwrap_or(0.0);
    let a = stack.pop().unwrap_or(0.0);
    stack.push(f(a, b));
}

fn unary(stack: &mut Vec<f64>, f: impl Fn(f64) -> f64) {
    let a = stack.pop().unwrap_or(0.0);
    stack.push(f(a));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_vars(_name: &str) -> i32 {
        -1
    }

    #[test]
    fn literal_arithmetic_matches_expected_value() {
        let program = build("2*(3+4)^2 - 1", no_vars).unwrap();
        let result = evaluate(&program, |_| 0.0);
        assert!((result - 97.0).abs() < 1e-9);
    }

    #[test]
    fn step_function_example_evaluates_to_spec_value() {
        let program = build("2*(A+3)^2 - STEP(A)", |name| if name.eq_ignore_ascii_case("A") { 0 } else { -1 }).unwrap();
        let result = evaluate(&program, |idx| if idx == 0 { 5.0 } else { 0.0 });
        assert!((result - 127.0).abs() < 1e-9);
    }

    #[test]
    fn addition_and_multiplication_are_commutative() {
        let a = build("3+4", no_vars).unwrap();
        let b = build("4+3", no_vars).unwrap();
        assert_eq!(evaluate(&a, |_| 0.0), evaluate(&b, |_| 0.0));

        let c = build("3*4", no_vars).unwrap();
        let d = build("4*3", no_vars).unwrap();
        assert_eq!(evaluate(&c, |_| 0.0), evaluate(&d, |_| 0.0));
    }

    #[test]
    fn fused_negative_literal_at_start() {
        let program = build("-5 + 2", no_vars).unwrap();
        assert!((evaluate(&program, |_| 0.0) - (-3.0)).abs() < 1e-9);
    }

    #[test]
    fn fused_negative_literal_after_open_paren() {
        let program = build("(-5)*2", no_vars).unwrap();
        assert!((evaluate(&program, |_| 0.0) - (-10.0)).abs() < 1e-9);
    }

    #[test]
    fn log_of_nonpositive_clips_to_zero() {
        let program = build("LOG(-4)", no_vars).unwrap();
        assert_eq!(evaluate(&program, |_| 0.0), 0.0);
    }

    #[test]
    fn sqrt_of_negative_clips_to_zero() {
        let program = build("SQRT(-9)", no_vars).unwrap();
        assert_eq!(evaluate(&program, |_| 0.0), 0.0);
    }

    #[test]
    fn unbalanced_parens_is_an_error() {
        let err = build("(1+2", no_vars).unwrap_err();
        assert!(matches!(err, BuildError::UnbalancedParens(_)));
    }

    #[test]
    fn function_without_paren_is_an_error() {
        let err = build("SIN 1", no_vars).unwrap_err();
        assert!(matches!(err, BuildError::FunctionMissingParen(_)));
    }

    #[test]
    fn exponent_must_be_a_literal() {
        let err = build("2^A", |_| 0).unwrap_err();
        assert!(matches!(err, BuildError::ExponentNotLiteral(_)));
    }

    #[test]
    fn exponent_may_be_parenthesised_literal() {
        let program = build("2^(3)", no_vars).unwrap();
        assert!((evaluate(&program, |_| 0.0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn trailing_operator_is_missing_operand() {
        let err = build("1+", no_vars).unwrap_err();
        assert!(matches!(err, BuildError::MissingOperand(_)));
    }

    #[test]
    fn unknown_variable_evaluates_to_zero() {
        let program = build("X+1", no_vars).unwrap();
        assert_eq!(evaluate(&program, |_| 99.0), 1.0);
    }

    /// Test-only helper: reconstruct a formula string from a program's own
    /// instructions, sufficient to re-`build` and get a numerically
    /// equivalent program back. Not a general pretty-printer; production code
    /// never needs one.
    fn format_program(program: &Program) -> String {
        let mut stack: Vec<String> = Vec::new();
        for instr in &program.instructions {
            match *instr {
                Instr::Push(v) => stack.push(format!("({v})")),
                Instr::PushVar(_) => stack.push("(0)".to_string()),
                Instr::Add => binary_fmt(&mut stack, '+'),
                Instr::Sub => binary_fmt(&mut stack, '-'),
                Instr::Mul => binary_fmt(&mut stack, '*'),
                Instr::Div => binary_fmt(&mut stack, '/'),
                Instr::Neg => {
                    let a = stack.pop().unwrap();
                    stack.push(format!("(-{a})"));
                }
                Instr::Pow(exp) => {
                    let a = stack.pop().unwrap();
                    stack.push(format!("({a}^({exp}))"));
                }
                Instr::Call(func) => {
                    let a = stack.pop().unwrap();
                    let name = format!("{func:?}").to_uppercase();
                    stack.push(format!("{name}{a}"));
                }
            }
        }
        stack.pop().unwrap_or_default()
    }

    fn binary_fmt(stack: &mut Vec<String>, op: char) {
        let b = stack.pop().unwrap();
        let a = stack.pop().unwrap();
        stack.push(format!("({a}{op}{b})"));
    }

    #[test]
    fn round_trip_through_format_program_is_numerically_equivalent() {
        let original = build("2*(3+4)^2 - 1", no_vars).unwrap();
        let text = format_program(&original);
        let rebuilt = build(&text, no_vars).unwrap();
        let a = evaluate(&original, |_| 0.0);
        let b = evaluate(&rebuilt, |_| 0.0);
        assert!((a - b).abs() < 1e-9);
    }
}

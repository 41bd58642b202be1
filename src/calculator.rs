//! Arithmetic for the calculator widget: a small recursive-descent parser.
//!
//! Grammar:
//!   expr   := term (('+' | '-') term)*
//!   term   := unary (('*' | '/') unary)*
//!   unary  := '-' unary | '+' unary | atom
//!   atom   := number | '(' expr ')'

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
  #[error("empty expression")]
  Empty,
  #[error("unexpected character '{0}' at {1}")]
  UnexpectedChar(char, usize),
  #[error("unexpected end of expression")]
  UnexpectedEnd,
  #[error("invalid number '{0}'")]
  BadNumber(String),
  #[error("division by zero")]
  DivisionByZero,
}

struct Parser<'a> {
  chars: Vec<char>,
  pos: usize,
  src: &'a str,
}

impl<'a> Parser<'a> {
  fn new(src: &'a str) -> Self {
    Self { chars: src.chars().collect(), pos: 0, src }
  }

  fn skip_ws(&mut self) {
    while self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
      self.pos += 1;
    }
  }

  fn peek(&mut self) -> Option<char> {
    self.skip_ws();
    self.chars.get(self.pos).copied()
  }

  fn expr(&mut self) -> Result<f64, CalcError> {
    let mut acc = self.term()?;
    while let Some(op) = self.peek() {
      match op {
        '+' => { self.pos += 1; acc += self.term()?; }
        '-' => { self.pos += 1; acc -= self.term()?; }
        _ => break,
      }
    }
    Ok(acc)
  }

  fn term(&mut self) -> Result<f64, CalcError> {
    let mut acc = self.unary()?;
    while let Some(op) = self.peek() {
      match op {
        '*' => { self.pos += 1; acc *= self.unary()?; }
        '/' => {
          self.pos += 1;
          let rhs = self.unary()?;
          if rhs == 0.0 {
            return Err(CalcError::DivisionByZero);
          }
          acc /= rhs;
        }
        _ => break,
      }
    }
    Ok(acc)
  }

  fn unary(&mut self) -> Result<f64, CalcError> {
    match self.peek() {
      Some('-') => { self.pos += 1; Ok(-self.unary()?) }
      Some('+') => { self.pos += 1; self.unary() }
      _ => self.atom(),
    }
  }

  fn atom(&mut self) -> Result<f64, CalcError> {
    match self.peek() {
      None => Err(CalcError::UnexpectedEnd),
      Some('(') => {
        self.pos += 1;
        let v = self.expr()?;
        match self.peek() {
          Some(')') => { self.pos += 1; Ok(v) }
          Some(c) => Err(CalcError::UnexpectedChar(c, self.pos)),
          None => Err(CalcError::UnexpectedEnd),
        }
      }
      Some(c) if c.is_ascii_digit() || c == '.' => {
        let start = self.pos;
        while self.chars.get(self.pos).is_some_and(|c| c.is_ascii_digit() || *c == '.') {
          self.pos += 1;
        }
        let lit: String = self.chars[start..self.pos].iter().collect();
        lit.parse::<f64>().map_err(|_| CalcError::BadNumber(lit))
      }
      Some(c) => Err(CalcError::UnexpectedChar(c, self.pos)),
    }
  }
}

/// Evaluate an arithmetic expression over `+ - * /`, parentheses and decimals.
pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
  let mut p = Parser::new(expr);
  if p.src.trim().is_empty() {
    return Err(CalcError::Empty);
  }
  let v = p.expr()?;
  match p.peek() {
    None => Ok(v),
    Some(c) => Err(CalcError::UnexpectedChar(c, p.pos)),
  }
}

/// Render like a calculator display: integers without a fractional part.
pub fn format_result(v: f64) -> String {
  if v.fract() == 0.0 && v.abs() < 1e15 {
    format!("{}", v as i64)
  } else {
    format!("{}", v)
  }
}

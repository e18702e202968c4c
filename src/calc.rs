use thiserror::Error;

/// Small arithmetic evaluator behind the /calc command. Recursive descent
/// over a token stream; no dynamic evaluation of anything user-controlled
/// beyond plain math.
#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token near '{0}'")]
    UnexpectedToken(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("unknown constant '{0}'")]
    UnknownConstant(String),
    #[error("division by zero")]
    DivisionByZero,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut number = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        number.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = number
                    .parse()
                    .map_err(|_| CalcError::UnexpectedToken(number.clone()))?;
                tokens.push(Token::Number(value));
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident.to_lowercase()));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => return Err(CalcError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token) -> Result<(), CalcError> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            Some(t) => Err(CalcError::UnexpectedToken(format!("{:?}", t))),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.next();
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.next();
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value /= rhs;
                }
                Some(Token::Percent) => {
                    self.next();
                    let rhs = self.unary()?;
                    if rhs == 0.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    value %= rhs;
                }
                _ => return Ok(value),
            }
        }
    }

    // unary := '-' unary | power
    fn unary(&mut self) -> Result<f64, CalcError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.next();
            return Ok(-self.unary()?);
        }
        self.power()
    }

    // power := primary ('^' unary)?   (right-associative)
    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.next();
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(Token::RParen)?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.next();
                    let arg = self.expr()?;
                    self.expect(Token::RParen)?;
                    apply_function(&name, arg)
                } else {
                    match name.as_str() {
                        "pi" => Ok(std::f64::consts::PI),
                        "e" => Ok(std::f64::consts::E),
                        _ => Err(CalcError::UnknownConstant(name)),
                    }
                }
            }
            Some(token) => Err(CalcError::UnexpectedToken(format!("{:?}", token))),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

fn apply_function(name: &str, arg: f64) -> Result<f64, CalcError> {
    match name {
        "sqrt" => Ok(arg.sqrt()),
        "sin" => Ok(arg.sin()),
        "cos" => Ok(arg.cos()),
        "tan" => Ok(arg.tan()),
        "ln" => Ok(arg.ln()),
        "log" => Ok(arg.log10()),
        "abs" => Ok(arg.abs()),
        "floor" => Ok(arg.floor()),
        "ceil" => Ok(arg.ceil()),
        other => Err(CalcError::UnknownFunction(other.to_string())),
    }
}

pub fn evaluate(input: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(CalcError::UnexpectedEnd);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(CalcError::UnexpectedToken(format!("{:?}", token)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str) -> f64 {
        evaluate(s).unwrap()
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), 7.0);
        assert_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_eq!(eval("10 / 4"), 2.5);
        assert_eq!(eval("10 % 3"), 1.0);
        assert_eq!(eval("2 ^ 10"), 1024.0);
    }

    #[test]
    fn test_unary_minus_and_precedence() {
        assert_eq!(eval("-3 + 5"), 2.0);
        assert_eq!(eval("-(2 + 3)"), -5.0);
        assert_eq!(eval("2 * -3"), -6.0);
        // Right-associative power.
        assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(eval("sqrt(16)"), 4.0);
        assert_eq!(eval("abs(-7)"), 7.0);
        assert_eq!(eval("floor(2.9)"), 2.0);
        assert_eq!(eval("ceil(2.1)"), 3.0);
        assert!((eval("sin(pi)")).abs() < 1e-10);
        assert!((eval("ln(e)") - 1.0).abs() < 1e-10);
        assert_eq!(eval("log(1000)").round(), 3.0);
    }

    #[test]
    fn test_errors() {
        assert_eq!(evaluate("1 / 0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate(""), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("1 +"), Err(CalcError::UnexpectedEnd));
        assert!(matches!(evaluate("1 @ 2"), Err(CalcError::UnexpectedChar('@'))));
        assert!(matches!(
            evaluate("nope(3)"),
            Err(CalcError::UnknownFunction(_))
        ));
        assert!(matches!(
            evaluate("nope"),
            Err(CalcError::UnknownConstant(_))
        ));
        assert!(matches!(evaluate("1 2"), Err(CalcError::UnexpectedToken(_))));
    }
}

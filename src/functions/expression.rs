//! 一元表达式
//!
//! 支持变量 x、数字、常数 pi 和 e、四则运算、乘方 ^、括号以及
//! abs、exp、log、sqrt、sin、cos、tan、floor、ceil 这几个函数。

use crate::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Builtin {
    Abs,
    Exp,
    Log,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Floor,
    Ceil,
}

impl Builtin {
    fn from_name(name: &str) -> Option<Self> {
        let builtin = match name {
            "abs" => Builtin::Abs,
            "exp" => Builtin::Exp,
            "log" => Builtin::Log,
            "sqrt" => Builtin::Sqrt,
            "sin" => Builtin::Sin,
            "cos" => Builtin::Cos,
            "tan" => Builtin::Tan,
            "floor" => Builtin::Floor,
            "ceil" => Builtin::Ceil,
            _ => return None,
        };
        Some(builtin)
    }

    fn apply(self, value: f64) -> f64 {
        match self {
            Builtin::Abs => value.abs(),
            Builtin::Exp => value.exp(),
            Builtin::Log => value.ln(),
            Builtin::Sqrt => value.sqrt(),
            Builtin::Sin => value.sin(),
            Builtin::Cos => value.cos(),
            Builtin::Tan => value.tan(),
            Builtin::Floor => value.floor(),
            Builtin::Ceil => value.ceil(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Variable,
    Constant(f64),
    Negate(Box<Node>),
    Add(Box<Node>, Box<Node>),
    Subtract(Box<Node>, Box<Node>),
    Multiply(Box<Node>, Box<Node>),
    Divide(Box<Node>, Box<Node>),
    Power(Box<Node>, Box<Node>),
    Call(Builtin, Box<Node>),
}

impl Node {
    fn eval(&self, x: f64) -> f64 {
        match self {
            Node::Variable => x,
            Node::Constant(c) => *c,
            Node::Negate(a) => -a.eval(x),
            Node::Add(a, b) => a.eval(x) + b.eval(x),
            Node::Subtract(a, b) => a.eval(x) - b.eval(x),
            Node::Multiply(a, b) => a.eval(x) * b.eval(x),
            Node::Divide(a, b) => a.eval(x) / b.eval(x),
            Node::Power(a, b) => a.eval(x).powf(b.eval(x)),
            Node::Call(f, a) => f.apply(a.eval(x)),
        }
    }
}

/// 解析好的表达式
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Node,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, Error> {
        let mut parser = Parser {
            chars: source.chars().collect(),
            position: 0,
        };
        let root = parser.expression()?;
        parser.skip_whitespace();
        if parser.position < parser.chars.len() {
            return Err(parser.error("多余的字符"));
        }
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.root.eval(x)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// 递归下降：
/// expression = term (("+" | "-") term)*
/// term = unary (("*" | "/") unary)*
/// unary = "-" unary | power
/// power = primary ("^" unary)?
struct Parser {
    chars: Vec<char>,
    position: usize,
}

impl Parser {
    fn error(&self, message: &str) -> Error {
        let source: String = self.chars.iter().collect();
        format!("表达式 {source:?} 在位置 {} 处{message}", self.position).into()
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.chars.len() && self.chars[self.position].is_whitespace() {
            self.position += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.get(self.position).copied()
    }

    fn consume(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expression(&mut self) -> Result<Node, Error> {
        let mut node = self.term()?;
        loop {
            if self.consume('+') {
                node = Node::Add(Box::new(node), Box::new(self.term()?));
            } else if self.consume('-') {
                node = Node::Subtract(Box::new(node), Box::new(self.term()?));
            } else {
                return Ok(node);
            }
        }
    }

    fn term(&mut self) -> Result<Node, Error> {
        let mut node = self.unary()?;
        loop {
            if self.consume('*') {
                node = Node::Multiply(Box::new(node), Box::new(self.unary()?));
            } else if self.consume('/') {
                node = Node::Divide(Box::new(node), Box::new(self.unary()?));
            } else {
                return Ok(node);
            }
        }
    }

    fn unary(&mut self) -> Result<Node, Error> {
        if self.consume('-') {
            return Ok(Node::Negate(Box::new(self.unary()?)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Node, Error> {
        let base = self.primary()?;
        if self.consume('^') {
            return Ok(Node::Power(Box::new(base), Box::new(self.unary()?)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Node, Error> {
        match self.peek() {
            Some('(') => {
                self.position += 1;
                let node = self.expression()?;
                if !self.consume(')') {
                    return Err(self.error("缺少右括号"));
                }
                Ok(node)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() => self.identifier(),
            Some(_) => Err(self.error("出现了无法识别的字符")),
            None => Err(self.error("意外结束")),
        }
    }

    fn number(&mut self) -> Result<Node, Error> {
        let start = self.position;
        while self.position < self.chars.len() {
            let c = self.chars[self.position];
            let exponent_sign = (c == '+' || c == '-')
                && self.position > start
                && matches!(self.chars[self.position - 1], 'e' | 'E');
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || exponent_sign {
                self.position += 1;
            } else {
                break;
            }
        }
        let literal: String = self.chars[start..self.position].iter().collect();
        literal
            .parse::<f64>()
            .map(Node::Constant)
            .map_err(|_| self.error("数字格式错误"))
    }

    fn identifier(&mut self) -> Result<Node, Error> {
        let start = self.position;
        while self.position < self.chars.len() && self.chars[self.position].is_ascii_alphanumeric()
        {
            self.position += 1;
        }
        let name: String = self.chars[start..self.position].iter().collect();
        match name.as_str() {
            "x" => Ok(Node::Variable),
            "pi" => Ok(Node::Constant(std::f64::consts::PI)),
            "e" => Ok(Node::Constant(std::f64::consts::E)),
            _ => {
                let builtin = Builtin::from_name(&name)
                    .ok_or_else(|| self.error(&format!("出现了未知的名称 {name}")))?;
                if !self.consume('(') {
                    return Err(self.error("函数名后面缺少左括号"));
                }
                let argument = self.expression()?;
                if !self.consume(')') {
                    return Err(self.error("缺少右括号"));
                }
                Ok(Node::Call(builtin, Box::new(argument)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Expression;

    #[test]
    fn precedence() {
        let e = Expression::parse("1 + 2 * x ^ 2").unwrap();
        assert_eq!(e.eval(3.0), 19.0);
        let e = Expression::parse("-x^2").unwrap();
        assert_eq!(e.eval(3.0), -9.0);
        let e = Expression::parse("2^3^2").unwrap();
        assert_eq!(e.eval(0.0), 512.0);
        let e = Expression::parse("(1 - x) / 2").unwrap();
        assert_eq!(e.eval(5.0), -2.0);
    }

    #[test]
    fn builtins_and_constants() {
        let e = Expression::parse("abs(x) + sqrt(4) + 1e1").unwrap();
        assert_eq!(e.eval(-3.0), 15.0);
        let e = Expression::parse("log(exp(x))").unwrap();
        assert!((e.eval(2.5) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn errors() {
        assert!(Expression::parse("x +").is_err());
        assert!(Expression::parse("foo(x)").is_err());
        assert!(Expression::parse("(x").is_err());
        assert!(Expression::parse("x y").is_err());
    }
}

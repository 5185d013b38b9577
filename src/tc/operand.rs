use std::fmt::Display;

pub const CHARACTER: char = '.';
pub const POP: char = 'p';
pub const CURRENT: char = 'c';
pub const INPUT: char = 'i';

/// Parsed form of an operand string.
///
/// ```text
/// Value ::= '.' Value | 'p' | 'c' | 'i' | Integer
/// ```
///
/// Parsing is pure, evaluating a `p`, `c` or `i` operand against the stack or stdin is left to
/// the vm.
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum TcOperand {
    Character(Box<TcOperand>),
    Pop,
    Current,
    Input,
    Literal(i64),
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) enum TcOperandError {
    Empty,
    InvalidLiteral(String),
}

impl Display for TcOperandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TcOperandError::Empty => write!(f, "expected a value, but the operand is empty"),
            TcOperandError::InvalidLiteral(text) => {
                write!(f, "invalid integer literal: {:?}", text)
            }
        }
    }
}

impl TcOperand {
    pub(crate) fn parse(text: &str) -> Result<TcOperand, TcOperandError> {
        let mut chars = text.chars();
        match chars.next() {
            None => Err(TcOperandError::Empty),
            Some(CHARACTER) => Ok(TcOperand::Character(Box::new(TcOperand::parse(
                chars.as_str(),
            )?))),
            Some(POP) if text.len() == 1 => Ok(TcOperand::Pop),
            Some(CURRENT) if text.len() == 1 => Ok(TcOperand::Current),
            Some(INPUT) if text.len() == 1 => Ok(TcOperand::Input),
            Some(_) => match text.parse::<i64>() {
                Ok(val) => Ok(TcOperand::Literal(val)),
                Err(_) => Err(TcOperandError::InvalidLiteral(text.to_string())),
            },
        }
    }
}

/// The result of formatting an operand
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TcValue {
    Integer(i64),
    Character(char),
}

impl TcValue {
    pub fn integer(self) -> Option<i64> {
        match self {
            TcValue::Integer(val) => Some(val),
            TcValue::Character(_) => None,
        }
    }
}

impl Display for TcValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TcValue::Integer(val) => write!(f, "{}", val),
            TcValue::Character(character) => write!(f, "{}", character),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
use memmap::Mmap;
use std::error::Error;
use std::fmt::Display;
#[cfg(not(target_arch = "wasm32"))]
use std::fs::File;
#[cfg(not(target_arch = "wasm32"))]
use std::io::ErrorKind;
use std::ops::Deref;
use std::rc::Rc;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsValue;

pub const LINE_FEED: u8 = b'\n';

pub const PRINT: char = '!';
pub const PUSH: char = '#';
pub const POP: char = '&';
pub const ADD: char = '+';
pub const SUBTRACT: char = '-';
pub const MULTIPLY: char = '*';
pub const DIVIDE: char = '/';
pub const MODULO: char = '%';
pub const IF: char = '?';
pub const JUMP: char = '^';
pub const SWAP: char = '$';
pub const COMMENT: char = '~';
pub const LABEL: char = '@';

#[derive(Debug)]
pub(crate) enum TcParseErrorKind {
    #[allow(unused)]
    FileNotFound(String),
    #[allow(unused)]
    FileOpenError(Box<dyn Error>),
    #[allow(unused)]
    MemoryMapError(Box<dyn Error>),
    InvalidEncoding(usize, Box<dyn Error>),
}

impl TcParseErrorKind {
    fn throw<T>(self) -> Result<T, TcParseError> {
        let msg = match &self {
            TcParseErrorKind::FileNotFound(file_name) => {
                format!("could not find file: {}", file_name)
            }
            TcParseErrorKind::FileOpenError(err) => {
                format!("failed to open file, details: {}", err)
            }
            TcParseErrorKind::MemoryMapError(err) => {
                format!("failed to memory map file, details: {}", err)
            }
            TcParseErrorKind::InvalidEncoding(line, err) => {
                format!("source line {} is not valid utf-8, details: {}", line, err)
            }
        };
        Err(TcParseError { msg, kind: self })
    }
}

impl Display for TcParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug)]
#[allow(dead_code)]
pub struct TcParseError {
    pub(crate) msg: String,
    pub(crate) kind: TcParseErrorKind,
}

impl Into<JsValue> for TcParseError {
    fn into(self) -> JsValue {
        JsValue::from(format!("twocol error occurred: {}", self.msg))
    }
}

impl Display for TcParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl Error for TcParseError {}

/// The leading character of a normalized source line
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TcOpcode {
    Print,
    Push,
    Pop,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    If,
    Jump,
    Swap,
    Comment,
    Label,
    Unknown(char),
}

impl TcOpcode {
    pub fn symbol(&self) -> char {
        match self {
            TcOpcode::Print => PRINT,
            TcOpcode::Push => PUSH,
            TcOpcode::Pop => POP,
            TcOpcode::Add => ADD,
            TcOpcode::Subtract => SUBTRACT,
            TcOpcode::Multiply => MULTIPLY,
            TcOpcode::Divide => DIVIDE,
            TcOpcode::Modulo => MODULO,
            TcOpcode::If => IF,
            TcOpcode::Jump => JUMP,
            TcOpcode::Swap => SWAP,
            TcOpcode::Comment => COMMENT,
            TcOpcode::Label => LABEL,
            TcOpcode::Unknown(symbol) => *symbol,
        }
    }
}

impl From<char> for TcOpcode {
    fn from(symbol: char) -> Self {
        match symbol {
            PRINT => TcOpcode::Print,
            PUSH => TcOpcode::Push,
            POP => TcOpcode::Pop,
            ADD => TcOpcode::Add,
            SUBTRACT => TcOpcode::Subtract,
            MULTIPLY => TcOpcode::Multiply,
            DIVIDE => TcOpcode::Divide,
            MODULO => TcOpcode::Modulo,
            IF => TcOpcode::If,
            JUMP => TcOpcode::Jump,
            SWAP => TcOpcode::Swap,
            COMMENT => TcOpcode::Comment,
            LABEL => TcOpcode::Label,
            other => TcOpcode::Unknown(other),
        }
    }
}

/// A single normalized source line. `line_index` is the position in the program after empty
/// lines have been dropped, which is what labels and jumps refer to.
#[wasm_bindgen]
#[derive(Debug, PartialEq, Clone)]
pub struct TcInstruction {
    pub(crate) opcode: TcOpcode,
    pub(crate) operand: Rc<str>,
    pub(crate) line_index: usize,
}

impl TcInstruction {
    pub fn opcode(&self) -> TcOpcode {
        self.opcode
    }

    pub fn operand(&self) -> &str {
        &self.operand
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }
}

impl Display for TcInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.opcode.symbol(), self.operand)
    }
}

#[derive(Debug)]
enum TcSourceBuffer {
    #[cfg(not(target_arch = "wasm32"))]
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for TcSourceBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            #[cfg(not(target_arch = "wasm32"))]
            TcSourceBuffer::Mapped(map) => map,
            TcSourceBuffer::Owned(bytes) => bytes,
        }
    }
}

/// The component responsible for reading the source and normalizing it into instructions
#[wasm_bindgen]
#[derive(Debug)]
pub struct TcParser {
    source: TcSourceBuffer,
    token_index: usize,
    source_line: usize,
    instruction_index: usize,
}

#[wasm_bindgen]
impl TcParser {
    /// Creates a parser over an in-memory source
    pub fn from_source(source: &str) -> TcParser {
        TcParser::with_buffer(TcSourceBuffer::Owned(source.as_bytes().to_vec()))
    }
}

impl TcParser {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(file_name: &str) -> Result<TcParser, TcParseError> {
        let file = match File::open(file_name) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return TcParseErrorKind::FileNotFound(file_name.to_string()).throw()
            }
            Err(err) => return TcParseErrorKind::FileOpenError(Box::new(err)).throw(),
        };
        let len = match file.metadata() {
            Ok(metadata) => metadata.len(),
            Err(err) => return TcParseErrorKind::FileOpenError(Box::new(err)).throw(),
        };
        // zero-length files cannot be mapped
        if len == 0 {
            return Ok(TcParser::with_buffer(TcSourceBuffer::Owned(vec![])));
        }
        let source = unsafe {
            match Mmap::map(&file) {
                Ok(content) => content,
                Err(err) => return TcParseErrorKind::MemoryMapError(Box::new(err)).throw(),
            }
        };

        Ok(TcParser::with_buffer(TcSourceBuffer::Mapped(source)))
    }

    fn with_buffer(source: TcSourceBuffer) -> TcParser {
        TcParser {
            source,
            token_index: 0,
            source_line: 0,
            instruction_index: 0,
        }
    }

    /// Returns the next non-empty line with all whitespace removed, or `None` once the source
    /// is exhausted
    pub fn instruction(&mut self) -> Option<Result<TcInstruction, TcParseError>> {
        while self.token_index < self.source.len() {
            let rest = &self.source[self.token_index..];
            let end = rest
                .iter()
                .position(|token| *token == LINE_FEED)
                .unwrap_or(rest.len());
            let raw = &rest[..end];
            self.token_index += end + 1;
            self.source_line += 1;

            let text = match std::str::from_utf8(raw) {
                Ok(text) => text,
                Err(err) => {
                    return Some(
                        TcParseErrorKind::InvalidEncoding(self.source_line, Box::new(err)).throw(),
                    )
                }
            };
            let line: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            let mut chars = line.chars();
            let opcode = match chars.next() {
                Some(symbol) => TcOpcode::from(symbol),
                None => continue,
            };
            let instr = TcInstruction {
                opcode,
                operand: chars.as_str().into(),
                line_index: self.instruction_index,
            };
            self.instruction_index += 1;

            return Some(Ok(instr));
        }

        None
    }
}

impl Iterator for &mut TcParser {
    type Item = Result<TcInstruction, TcParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.instruction()
    }
}

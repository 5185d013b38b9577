//! A lightweight interpreter for twocol, a line oriented esoteric stack language.
//!
//! Every non-empty source line is a single opcode character followed by an operand:
//!
//! ```text
//! ~ prints "Hi"
//! !.72
//! !.105
//! ```
//!
//! Quirk: jumping to a label resumes execution on the line *after* the label, because the
//! program counter is advanced after every instruction including the jump itself.

pub mod tc;

pub use tc::{
    TcDebugReport, TcInstruction, TcOpcode, TcParseError, TcParser, TcStack, TcValue, TcVm,
    TcVmConfig, TcVmError,
};

pub mod operand;
pub mod parser;
pub mod report;
pub mod stack;
pub mod vm;

pub use operand::TcValue;
pub use parser::{TcInstruction, TcOpcode, TcParseError, TcParser};
pub use report::TcDebugReport;
pub use stack::TcStack;
pub use vm::{TcVm, TcVmConfig, TcVmError};

use crate::tc::operand::{TcOperand, TcValue, CHARACTER};
use crate::tc::parser::{TcInstruction, TcOpcode, TcParseError, TcParser};
use crate::tc::report::TcDebugReport;
use crate::tc::stack::TcStack;
use std::collections::{HashMap, VecDeque};
use std::error::Error;
use std::fmt::Display;
#[cfg(not(target_arch = "wasm32"))]
use std::io::stdin;
use std::io::{stdout, Write};
use std::time::Duration;
use tracing::{debug, info, trace};
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsValue;

/// Printed before reading a line for an `i` operand
pub const PROMPT: &str = "> ";

#[derive(Debug, Clone)]
enum TcSource {
    #[cfg(not(target_arch = "wasm32"))]
    File(String),
    Text(String),
}

/// Configuration options for the virtual machine
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct TcVmConfig {
    source: TcSource,
    raw: bool,
    debug: bool,
    capture_output: bool,
    suppress_output: bool,
    input: VecDeque<String>,
}

#[wasm_bindgen]
impl TcVmConfig {
    /// Creates a new vm config for an in-memory source
    ///
    /// - `source` the twocol source as a String
    /// - `raw` print the normalized instructions of the source to stdout
    /// - `debug` emit a debug event for every executed instruction
    /// - `capture_output` keep printed values in the vm instead of writing them to stdout
    pub fn from_source(source: &str, raw: bool, debug: bool, capture_output: bool) -> TcVmConfig {
        TcVmConfig {
            source: TcSource::Text(source.to_string()),
            raw,
            debug,
            capture_output,
            suppress_output: false,
            input: VecDeque::new(),
        }
    }

    /// Returns a config for an in-memory source, capturing output
    pub fn from_source_captured(source: &str) -> TcVmConfig {
        TcVmConfig::from_source(source, false, false, true)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TcVmConfig {
    /// Creates a new vm config with the given arguments
    ///
    /// - `file_name` the path to the twocol source file on disk
    /// - `raw` print the normalized instructions of the source file to stdout
    /// - `debug` emit a debug event for every executed instruction
    /// - `suppress_output` discard printed values
    pub fn new(file_name: &str, raw: bool, debug: bool, suppress_output: bool) -> TcVmConfig {
        TcVmConfig {
            source: TcSource::File(file_name.to_string()),
            raw,
            debug,
            capture_output: false,
            suppress_output,
            input: VecDeque::new(),
        }
    }

    /// Returns a default vm configuration writing to stdout
    ///
    /// `file_name` - the name of the source file on disk
    pub fn default_output(file_name: &str) -> TcVmConfig {
        TcVmConfig::new(file_name, false, false, false)
    }

    /// Returns a default vm configuration, discarding output
    ///
    /// `file_name` - the name of the source file on disk
    pub fn suppressed(file_name: &str) -> TcVmConfig {
        TcVmConfig::new(file_name, false, false, true)
    }

    /// Returns a default vm configuration, capturing output in the vm
    ///
    /// `file_name` - the name of the source file on disk
    pub fn captured(file_name: &str) -> TcVmConfig {
        TcVmConfig {
            capture_output: true,
            ..TcVmConfig::new(file_name, false, false, false)
        }
    }

    /// Returns a vm configuration emitting a debug event per executed instruction
    ///
    /// `file_name` - the name of the source file on disk
    pub fn debug(file_name: &str) -> TcVmConfig {
        TcVmConfig::new(file_name, false, true, false)
    }

    /// Returns a vm configuration that only prints the normalized program
    ///
    /// `file_name` - the name of the source file on disk
    pub fn raw(file_name: &str) -> TcVmConfig {
        TcVmConfig::new(file_name, true, false, false)
    }
}

impl TcVmConfig {
    /// Queues lines to answer `i` operands with before falling back to stdin
    pub fn with_input(mut self, lines: &[&str]) -> TcVmConfig {
        self.input.extend(lines.iter().map(|line| line.to_string()));
        self
    }
}

#[derive(Debug)]
pub(crate) enum TcVmErrorKind {
    ParseError(TcParseError),
    DispatchLogicError(TcInstruction),
    StackUnderflow(TcInstruction),
    OperandError(TcInstruction, String),
    DivideByZero(TcInstruction),
    NumberOutOfBounds(TcInstruction, i64),
    Overflow(TcInstruction, i64, i64),
    IOError(TcInstruction, String),
    NoInstruction(usize, usize),
}

impl Display for TcVmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl TcVmErrorKind {
    fn throw<T>(self) -> Result<T, TcVmError> {
        let msg = match &self {
            TcVmErrorKind::ParseError(err) => format!("parse error occurred: {}", err.msg),
            TcVmErrorKind::DispatchLogicError(instr) => format!("line {}: instruction was dispatched to the wrong handler, this is a bug in twocol. failed executing: {}", instr.line_index, instr),
            TcVmErrorKind::StackUnderflow(instr) => format!("line {}: tried to reference nonexistent stack value, failed executing: {}", instr.line_index, instr),
            TcVmErrorKind::OperandError(instr, details) => format!("line {}: {}, failed executing: {}", instr.line_index, details, instr),
            TcVmErrorKind::DivideByZero(instr) => format!("line {}: division by zero, failed executing: {}", instr.line_index, instr),
            TcVmErrorKind::NumberOutOfBounds(instr, num) => format!("line {}: number {} is out of bounds for: {}", instr.line_index, num, instr),
            TcVmErrorKind::Overflow(instr, left, right) => format!("line {}: arithmetic overflow with operands {} and {}, failed executing: {}", instr.line_index, left, right, instr),
            TcVmErrorKind::IOError(instr, details) => format!("line {}: io error ({}) when executing: {}", instr.line_index, details, instr),
            TcVmErrorKind::NoInstruction(ip, len) => format!("line {}: no such instruction, the program has {} lines", ip, len),
        };
        Err(TcVmError { msg, kind: self })
    }

    fn instruction(&self) -> Option<&TcInstruction> {
        match self {
            TcVmErrorKind::ParseError(_) | TcVmErrorKind::NoInstruction(..) => None,
            TcVmErrorKind::DispatchLogicError(instr)
            | TcVmErrorKind::StackUnderflow(instr)
            | TcVmErrorKind::OperandError(instr, _)
            | TcVmErrorKind::DivideByZero(instr)
            | TcVmErrorKind::NumberOutOfBounds(instr, _)
            | TcVmErrorKind::Overflow(instr, _, _)
            | TcVmErrorKind::IOError(instr, _) => Some(instr),
        }
    }
}

#[derive(Debug)]
pub struct TcVmError {
    msg: String,
    pub(crate) kind: TcVmErrorKind,
}

impl TcVmError {
    /// The index of the normalized line that failed, `None` for errors raised while loading
    /// the source
    pub fn line_index(&self) -> Option<usize> {
        self.kind.instruction().map(|instr| instr.line_index)
    }
}

impl Into<JsValue> for TcVmError {
    fn into(self) -> JsValue {
        JsValue::from(format!("twocol error occurred: {}", self.msg))
    }
}

impl Display for TcVmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl Error for TcVmError {}

/// Floor division, `None` on overflow. `right` must not be zero.
fn floor_div(left: i64, right: i64) -> Option<i64> {
    let quotient = left.checked_div(right)?;
    if left % right != 0 && ((left < 0) != (right < 0)) {
        return Some(quotient - 1);
    }

    Some(quotient)
}

/// Floor modulo, the result takes the sign of `right`. `right` must not be zero.
fn floor_mod(left: i64, right: i64) -> Option<i64> {
    let rem = left.wrapping_rem(right);
    if rem != 0 && ((rem < 0) != (right < 0)) {
        return Some(rem + right);
    }

    Some(rem)
}

/// The root component for the virtual machine
#[wasm_bindgen]
pub struct TcVm {
    config: TcVmConfig,
    instructions: Vec<TcInstruction>,
    labels: HashMap<i64, usize>,
    stack: TcStack,
    instruction_pointer: usize,
    input: VecDeque<String>,
    output: String,
}

#[wasm_bindgen]
impl TcVm {
    /// Loads and normalizes the source and registers all labels
    ///
    /// - `config` The configuration of the vm
    pub fn new(config: TcVmConfig) -> Result<TcVm, TcVmError> {
        let mut parser = match &config.source {
            #[cfg(not(target_arch = "wasm32"))]
            TcSource::File(file_name) => match TcParser::new(file_name) {
                Ok(content) => content,
                Err(err) => return TcVmErrorKind::ParseError(err).throw(),
            },
            TcSource::Text(source) => TcParser::from_source(source),
        };
        let mut instructions = vec![];
        for instr in &mut parser {
            let instr = match instr {
                Ok(content) => content,
                Err(err) => return TcVmErrorKind::ParseError(err).throw(),
            };
            if config.raw {
                println!("{:>4}  {}", instr.line_index, instr);
            }
            instructions.push(instr);
        }

        let input = config.input.clone();
        let mut vm = TcVm {
            config,
            instructions,
            labels: HashMap::new(),
            stack: TcStack::new(),
            instruction_pointer: 0,
            input,
            output: String::new(),
        };
        // the ir dump only lists the program, label operands may read the stack or stdin
        if !vm.config.raw {
            vm.resolve_labels()?;
        }
        info!(
            instructions = vm.instructions.len(),
            labels = vm.labels.len(),
            "program loaded"
        );

        Ok(vm)
    }

    /// Returns the next instruction to be executed in a `Some` variant. None if the program has
    /// run past its last line.
    pub fn next_instruction(&self) -> Option<usize> {
        if self.instruction_pointer < self.instructions.len() {
            Some(self.instruction_pointer)
        } else {
            None
        }
    }

    /// Executes instructions until the program counter runs past the last line
    pub fn run(&mut self) -> Result<(), TcVmError> {
        while let Some(ip) = self.next_instruction() {
            self.exec(ip)?;
        }

        Ok(())
    }

    /// Resets the stack, the program counter, captured output and queued input without
    /// re-reading the source. Labels are a property of the program and are kept.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.instruction_pointer = 0;
        self.input = self.config.input.clone();
        self.output.clear();
    }

    /// Everything printed so far while output is captured
    pub fn output(&self) -> String {
        self.output.clone()
    }

    /// Executes a single instruction and advances the program counter
    ///
    /// `ip` - the index of the instruction to execute
    pub fn exec(&mut self, ip: usize) -> Result<(), TcVmError> {
        if ip >= self.instructions.len() {
            return TcVmErrorKind::NoInstruction(ip, self.instructions.len()).throw();
        }
        if self.config.debug {
            debug!(
                line = ip,
                instruction = %self.instructions[ip],
                stack = ?self.stack.to_vec(),
                "exec"
            );
        }
        let res = match self.instructions[ip].opcode {
            TcOpcode::Print => self.print(ip),
            TcOpcode::Push => self.push(ip),
            TcOpcode::Pop => self.pop(ip),
            TcOpcode::Add
            | TcOpcode::Subtract
            | TcOpcode::Multiply
            | TcOpcode::Divide
            | TcOpcode::Modulo => self.arithmetic(ip),
            TcOpcode::If => self.branch(ip),
            TcOpcode::Jump => self.jump(ip),
            TcOpcode::Swap => self.swap(ip),
            TcOpcode::Comment | TcOpcode::Label | TcOpcode::Unknown(_) => Ok(()),
        };

        self.instruction_pointer += 1;

        res
    }
}

impl TcVm {
    pub fn instructions(&self) -> &[TcInstruction] {
        &self.instructions
    }

    pub fn stack(&self) -> &TcStack {
        &self.stack
    }

    pub fn labels(&self) -> &HashMap<i64, usize> {
        &self.labels
    }

    /// Snapshot of the final vm state for the debug report
    pub fn report(&self, elapsed: Duration) -> TcDebugReport {
        TcDebugReport {
            stack: self.stack.to_vec(),
            labels: self.labels.iter().map(|(k, v)| (*k, *v)).collect(),
            elapsed,
        }
    }

    fn resolve_labels(&mut self) -> Result<(), TcVmError> {
        for ip in 0..self.instructions.len() {
            let instr = &self.instructions[ip];
            if instr.opcode != TcOpcode::Label || instr.operand.contains(CHARACTER) {
                continue;
            }
            let label = self.integer(ip)?;
            trace!(label, line = ip, "registered label");
            // last declaration wins
            self.labels.insert(label, ip);
        }

        Ok(())
    }

    fn instr(&self, ip: usize) -> TcInstruction {
        self.instructions[ip].clone()
    }

    /// Formats the operand of the instruction at `ip`
    fn format(&mut self, ip: usize) -> Result<TcValue, TcVmError> {
        let operand = match TcOperand::parse(&self.instructions[ip].operand) {
            Ok(operand) => operand,
            Err(err) => return TcVmErrorKind::OperandError(self.instr(ip), err.to_string()).throw(),
        };

        self.evaluate(ip, &operand)
    }

    /// Formats the operand of the instruction at `ip`, which must yield an integer
    fn integer(&mut self, ip: usize) -> Result<i64, TcVmError> {
        match self.format(ip)? {
            TcValue::Integer(val) => Ok(val),
            TcValue::Character(character) => TcVmErrorKind::OperandError(
                self.instr(ip),
                format!("expected an integer, got character {:?}", character),
            )
            .throw(),
        }
    }

    fn evaluate(&mut self, ip: usize, operand: &TcOperand) -> Result<TcValue, TcVmError> {
        match operand {
            TcOperand::Character(inner) => match self.evaluate(ip, inner)? {
                TcValue::Integer(code) => {
                    match u32::try_from(code).ok().and_then(char::from_u32) {
                        Some(character) => Ok(TcValue::Character(character)),
                        None => TcVmErrorKind::NumberOutOfBounds(self.instr(ip), code).throw(),
                    }
                }
                TcValue::Character(character) => TcVmErrorKind::OperandError(
                    self.instr(ip),
                    format!("expected an integer after '.', got character {:?}", character),
                )
                .throw(),
            },
            TcOperand::Pop => match self.stack.pop_at(0) {
                Some(val) => Ok(TcValue::Integer(val)),
                None => TcVmErrorKind::StackUnderflow(self.instr(ip)).throw(),
            },
            TcOperand::Current => match self.stack.peek(0) {
                Some(val) => Ok(TcValue::Integer(val)),
                None => TcVmErrorKind::StackUnderflow(self.instr(ip)).throw(),
            },
            TcOperand::Input => self.read_integer(ip).map(TcValue::Integer),
            TcOperand::Literal(val) => Ok(TcValue::Integer(*val)),
        }
    }

    fn read_integer(&mut self, ip: usize) -> Result<i64, TcVmError> {
        let line = match self.input.pop_front() {
            Some(line) => line,
            None => self.read_line(ip)?,
        };
        let trimmed = line.trim();
        match trimmed.parse::<i64>() {
            Ok(val) => Ok(val),
            Err(_) => TcVmErrorKind::OperandError(
                self.instr(ip),
                format!("expected an integer as input, got {:?}", trimmed),
            )
            .throw(),
        }
    }

    /// The input prompt is only shown while printed values reach stdout
    fn prompts(&self) -> bool {
        !self.config.suppress_output && !self.config.capture_output
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn read_line(&mut self, ip: usize) -> Result<String, TcVmError> {
        if self.prompts() {
            let mut out = stdout();
            if let Err(err) = write!(out, "{}", PROMPT).and_then(|_| out.flush()) {
                return TcVmErrorKind::IOError(self.instr(ip), err.to_string()).throw();
            }
        }
        let mut input_text = String::new();
        match stdin().read_line(&mut input_text) {
            Ok(0) => TcVmErrorKind::IOError(self.instr(ip), "unexpected end of input".to_string())
                .throw(),
            Ok(_) => Ok(input_text),
            Err(err) => TcVmErrorKind::IOError(self.instr(ip), err.to_string()).throw(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn read_line(&mut self, ip: usize) -> Result<String, TcVmError> {
        TcVmErrorKind::IOError(self.instr(ip), "stdin is not available".to_string()).throw()
    }

    fn print(&mut self, ip: usize) -> Result<(), TcVmError> {
        let value = self.format(ip)?;
        if self.config.suppress_output {
            return Ok(());
        }
        if self.config.capture_output {
            self.output.push_str(&value.to_string());

            return Ok(());
        }
        let mut out = stdout();
        match write!(out, "{}", value).and_then(|_| out.flush()) {
            Ok(val) => Ok(val),
            Err(err) => TcVmErrorKind::IOError(self.instr(ip), err.to_string()).throw(),
        }
    }

    fn push(&mut self, ip: usize) -> Result<(), TcVmError> {
        if self.instructions[ip].operand.contains(CHARACTER) {
            return Ok(());
        }
        let val = self.integer(ip)?;
        self.stack.push_front(val);

        Ok(())
    }

    fn pop(&mut self, ip: usize) -> Result<(), TcVmError> {
        if self.stack.pop_at(0).is_some() {
            return Ok(());
        }

        TcVmErrorKind::StackUnderflow(self.instr(ip)).throw()
    }

    fn arithmetic(&mut self, ip: usize) -> Result<(), TcVmError> {
        let left = match self.stack.pop_at(1) {
            Some(val) => val,
            None => return TcVmErrorKind::StackUnderflow(self.instr(ip)).throw(),
        };
        let right = match self.stack.pop_at(0) {
            Some(val) => val,
            None => return TcVmErrorKind::StackUnderflow(self.instr(ip)).throw(),
        };
        let opcode = self.instructions[ip].opcode;
        if right == 0 && matches!(opcode, TcOpcode::Divide | TcOpcode::Modulo) {
            return TcVmErrorKind::DivideByZero(self.instr(ip)).throw();
        }
        let result = match opcode {
            TcOpcode::Add => left.checked_add(right),
            TcOpcode::Subtract => left.checked_sub(right),
            TcOpcode::Multiply => left.checked_mul(right),
            TcOpcode::Divide => floor_div(left, right),
            TcOpcode::Modulo => floor_mod(left, right),
            _ => return TcVmErrorKind::DispatchLogicError(self.instr(ip)).throw(),
        };

        match result {
            Some(val) => {
                self.stack.push_front(val);

                Ok(())
            }
            None => TcVmErrorKind::Overflow(self.instr(ip), left, right).throw(),
        }
    }

    /// `?value` skips the next line if the top of the stack equals the value, `?` skips it if
    /// the two topmost values are equal
    fn branch(&mut self, ip: usize) -> Result<(), TcVmError> {
        let operand = self.instructions[ip].operand.clone();
        let equal = if operand.is_empty() {
            match (self.stack.peek(0), self.stack.peek(1)) {
                (Some(top), Some(second)) => top == second,
                _ => return TcVmErrorKind::StackUnderflow(self.instr(ip)).throw(),
            }
        } else {
            if operand.contains(CHARACTER) {
                return Ok(());
            }
            // the top is read before the operand is formatted, `?p` compares the top with itself
            let top = match self.stack.peek(0) {
                Some(val) => val,
                None => return TcVmErrorKind::StackUnderflow(self.instr(ip)).throw(),
            };
            top == self.integer(ip)?
        };
        if equal {
            self.instruction_pointer += 1;
        }

        Ok(())
    }

    /// Moves the program counter onto the label line. `exec` advances past it afterwards, so
    /// execution resumes on the line after the label.
    fn jump(&mut self, ip: usize) -> Result<(), TcVmError> {
        if self.instructions[ip].operand.contains(CHARACTER) {
            return Ok(());
        }
        let label = self.integer(ip)?;
        if let Some(index) = self.labels.get(&label) {
            self.instruction_pointer = *index;
        }

        Ok(())
    }

    fn swap(&mut self, ip: usize) -> Result<(), TcVmError> {
        let index = if self.instructions[ip].operand.is_empty() {
            1
        } else {
            let index = self.integer(ip)?;
            match usize::try_from(index) {
                Ok(index) => index,
                Err(_) => return TcVmErrorKind::StackUnderflow(self.instr(ip)).throw(),
            }
        };
        match self.stack.swap(0, index) {
            Some(()) => Ok(()),
            None => TcVmErrorKind::StackUnderflow(self.instr(ip)).throw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{floor_div, floor_mod, TcVm, TcVmConfig, TcVmError, TcVmErrorKind};

    fn run_source(source: &str) -> Result<TcVm, TcVmError> {
        let mut vm = TcVm::new(TcVmConfig::from_source_captured(source))?;
        vm.run()?;

        Ok(vm)
    }

    fn expect_error(source: &str) -> TcVmError {
        match run_source(source) {
            Ok(vm) => panic!("expected an error, final stack was {:?}", vm.stack().to_vec()),
            Err(err) => err,
        }
    }

    #[test]
    fn floor_arithmetic() {
        assert_eq!(floor_div(7, 2), Some(3));
        assert_eq!(floor_div(-7, 2), Some(-4));
        assert_eq!(floor_div(7, -2), Some(-4));
        assert_eq!(floor_div(-7, -2), Some(3));
        assert_eq!(floor_div(6, -3), Some(-2));
        assert_eq!(floor_div(i64::MIN, -1), None);
        assert_eq!(floor_mod(-7, 2), Some(1));
        assert_eq!(floor_mod(7, -2), Some(-1));
        assert_eq!(floor_mod(-7, -2), Some(-1));
        assert_eq!(floor_mod(6, -3), Some(0));
        assert_eq!(floor_mod(i64::MIN, -1), Some(0));
    }

    #[test]
    fn interpret_stack() -> Result<(), TcVmError> {
        let mut vm = TcVm::new(TcVmConfig::captured("tc/interpret_stack.tc"))?;

        vm.run()?;

        assert_eq!(vm.stack().to_vec(), vec![3, 3, 2]);
        assert!(vm.output().is_empty());

        Ok(())
    }

    #[test]
    fn interpret_arithmetic() -> Result<(), TcVmError> {
        let mut vm = TcVm::new(TcVmConfig::captured("tc/interpret_arithmetic.tc"))?;

        vm.run()?;

        assert_eq!(vm.stack().to_vec(), vec![-1, 1, -4, 3]);

        Ok(())
    }

    #[test]
    fn interpret_hello_world() -> Result<(), TcVmError> {
        let mut vm = TcVm::new(TcVmConfig::captured("tc/hello_world.tc"))?;

        vm.run()?;

        assert_eq!(vm.output(), "Hello, World!\n");
        assert!(vm.stack().is_empty());

        Ok(())
    }

    #[test]
    fn interpret_countdown() -> Result<(), TcVmError> {
        let mut vm = TcVm::new(TcVmConfig::captured("tc/countdown.tc"))?;

        vm.run()?;

        assert_eq!(vm.output(), "5\n4\n3\n2\n1\n");
        assert!(vm.stack().is_empty());
        assert_eq!(vm.labels().get(&1), Some(&2));

        Ok(())
    }

    #[test]
    fn reset_reruns_program() -> Result<(), TcVmError> {
        let mut vm = TcVm::new(TcVmConfig::captured("tc/countdown.tc"))?;

        vm.run()?;
        vm.reset();
        assert_eq!(vm.next_instruction(), Some(0));
        assert!(vm.output().is_empty());
        vm.run()?;

        assert_eq!(vm.output(), "5\n4\n3\n2\n1\n");

        Ok(())
    }

    #[test]
    fn sequential_execution() -> Result<(), TcVmError> {
        let vm = run_source("#1\n!c\n#2\n!c\n#3\n!c")?;

        assert_eq!(vm.output(), "123");
        assert_eq!(vm.stack().to_vec(), vec![3, 2, 1]);

        Ok(())
    }

    #[test]
    fn print_integers_and_characters() -> Result<(), TcVmError> {
        let vm = run_source("!72\n!.72\n#105\n!.p\n!-3")?;

        assert_eq!(vm.output(), "72Hi-3");
        assert!(vm.stack().is_empty());

        Ok(())
    }

    #[test]
    fn operand_reads() -> Result<(), TcVmError> {
        let vm = run_source("#4\n#c\n#p\n#p\n#c")?;

        assert_eq!(vm.stack().to_vec(), vec![4, 4, 4]);

        Ok(())
    }

    #[test]
    fn push_ignores_character_operands() -> Result<(), TcVmError> {
        let vm = run_source("#.65\n#1\n#.p")?;

        assert_eq!(vm.stack().to_vec(), vec![1]);

        Ok(())
    }

    #[test]
    fn arithmetic_operand_order() -> Result<(), TcVmError> {
        assert_eq!(run_source("#10\n#3\n-")?.stack().to_vec(), vec![7]);
        assert_eq!(run_source("#9\n#10\n#3\n-")?.stack().to_vec(), vec![7, 9]);
        assert_eq!(run_source("#6\n#7\n*")?.stack().to_vec(), vec![42]);
        assert_eq!(run_source("#7\n#2\n/")?.stack().to_vec(), vec![3]);
        assert_eq!(run_source("#-7\n#2\n/")?.stack().to_vec(), vec![-4]);
        assert_eq!(run_source("#-7\n#2\n%")?.stack().to_vec(), vec![1]);

        Ok(())
    }

    #[test]
    fn swap_stack() -> Result<(), TcVmError> {
        assert_eq!(
            run_source("#3\n#2\n#1\n$")?.stack().to_vec(),
            vec![2, 1, 3]
        );
        assert_eq!(
            run_source("#3\n#2\n#1\n$2")?.stack().to_vec(),
            vec![3, 2, 1]
        );
        // the index is formatted first, so `$p` swaps within the remaining stack
        assert_eq!(
            run_source("#3\n#2\n#1\n#1\n$p")?.stack().to_vec(),
            vec![2, 1, 3]
        );

        Ok(())
    }

    #[test]
    fn if_compares_top_two() -> Result<(), TcVmError> {
        let vm = run_source("#5\n#5\n?\n!1\n!2")?;
        assert_eq!(vm.output(), "2");
        assert_eq!(vm.stack().to_vec(), vec![5, 5]);

        let vm = run_source("#5\n#6\n?\n!1\n!2")?;
        assert_eq!(vm.output(), "12");

        Ok(())
    }

    #[test]
    fn if_compares_top_with_value() -> Result<(), TcVmError> {
        assert_eq!(run_source("#5\n?5\n!1\n!2")?.output(), "2");
        assert_eq!(run_source("#5\n?4\n!1\n!2")?.output(), "12");
        // character operands never skip
        assert_eq!(run_source("#65\n?.65\n!1\n!2")?.output(), "12");
        // `?p` reads the top before popping it
        let vm = run_source("#1\n#5\n?p\n!1\n!2")?;
        assert_eq!(vm.output(), "2");
        assert_eq!(vm.stack().to_vec(), vec![1]);

        Ok(())
    }

    #[test]
    fn jump_resumes_after_label() -> Result<(), TcVmError> {
        let mut vm = TcVm::new(TcVmConfig::from_source_captured("@1\n#3\n^1\n!3"))?;

        assert_eq!(vm.labels().get(&1), Some(&0));
        for _ in 0..3 {
            let ip = vm.next_instruction().unwrap();
            vm.exec(ip)?;
        }

        assert_eq!(vm.next_instruction(), Some(1));
        assert_eq!(vm.stack().to_vec(), vec![3]);

        Ok(())
    }

    #[test]
    fn jump_forward_reference() -> Result<(), TcVmError> {
        let vm = run_source("^7\n!1\n@7\n!2")?;

        assert_eq!(vm.output(), "2");

        Ok(())
    }

    #[test]
    fn jump_without_label_is_noop() -> Result<(), TcVmError> {
        assert_eq!(run_source("^3\n!1\n^.3\n!2")?.output(), "12");

        Ok(())
    }

    #[test]
    fn label_resolution() -> Result<(), TcVmError> {
        let vm = TcVm::new(TcVmConfig::from_source_captured(
            "@1\n\n  @2\n@.3\n@1\n~@4",
        ))?;

        assert_eq!(vm.labels().len(), 2);
        assert_eq!(vm.labels().get(&1), Some(&3));
        assert_eq!(vm.labels().get(&2), Some(&1));

        Ok(())
    }

    #[test]
    fn comments_and_unknown_opcodes_are_inert() -> Result<(), TcVmError> {
        let vm = run_source("~!1\nx!2\n@5\n!3")?;

        assert_eq!(vm.output(), "3");
        assert!(vm.stack().is_empty());

        Ok(())
    }

    #[test]
    fn read_input() -> Result<(), TcVmError> {
        let config = TcVmConfig::from_source_captured("#i\n#i\n+\n!p").with_input(&["3", " 4 "]);
        let mut vm = TcVm::new(config)?;

        vm.run()?;

        assert_eq!(vm.output(), "7");

        Ok(())
    }

    #[test]
    fn stack_underflow_reports_line() {
        let err = expect_error("#1\n\n&\n&");
        assert!(matches!(err.kind, TcVmErrorKind::StackUnderflow(_)));
        assert_eq!(err.line_index(), Some(2));
        assert!(err.to_string().starts_with("line 2:"));

        let err = expect_error("#1\n+");
        assert!(matches!(err.kind, TcVmErrorKind::StackUnderflow(_)));
        assert_eq!(err.line_index(), Some(1));

        let err = expect_error("!p");
        assert!(matches!(err.kind, TcVmErrorKind::StackUnderflow(_)));

        let err = expect_error("#1\n$3");
        assert!(matches!(err.kind, TcVmErrorKind::StackUnderflow(_)));

        let err = expect_error("#1\n?");
        assert!(matches!(err.kind, TcVmErrorKind::StackUnderflow(_)));
    }

    #[test]
    fn divide_by_zero() {
        let err = expect_error("#1\n#0\n/");
        assert!(matches!(err.kind, TcVmErrorKind::DivideByZero(_)));
        assert_eq!(err.line_index(), Some(2));

        let err = expect_error("#1\n#0\n%");
        assert!(matches!(err.kind, TcVmErrorKind::DivideByZero(_)));
    }

    #[test]
    fn operand_errors() {
        let err = expect_error("#1\n#abc");
        assert!(matches!(err.kind, TcVmErrorKind::OperandError(..)));
        assert_eq!(err.line_index(), Some(1));

        assert!(matches!(
            expect_error("!").kind,
            TcVmErrorKind::OperandError(..)
        ));
        assert!(matches!(
            expect_error("!..65").kind,
            TcVmErrorKind::OperandError(..)
        ));
        assert!(matches!(
            expect_error("#1\n#2\n$.1").kind,
            TcVmErrorKind::OperandError(..)
        ));
        assert!(matches!(
            expect_error("#1\n#2\n$-1").kind,
            TcVmErrorKind::StackUnderflow(_)
        ));
        assert!(matches!(
            expect_error("!.-1").kind,
            TcVmErrorKind::NumberOutOfBounds(..)
        ));
        assert!(matches!(
            expect_error("#9223372036854775807\n#1\n+").kind,
            TcVmErrorKind::Overflow(..)
        ));
    }

    #[test]
    fn invalid_input() {
        let config = TcVmConfig::from_source_captured("#i").with_input(&["seven"]);
        let mut vm = match TcVm::new(config) {
            Ok(vm) => vm,
            Err(err) => panic!("failed to load program: {}", err),
        };

        match vm.run() {
            Err(err) => assert!(matches!(err.kind, TcVmErrorKind::OperandError(..))),
            Ok(()) => panic!("expected an operand error"),
        }
    }

    #[test]
    fn label_pass_errors() {
        let err = match TcVm::new(TcVmConfig::from_source_captured("#1\n@p")) {
            Err(err) => err,
            Ok(_) => panic!("expected the label pass to fail"),
        };

        assert!(matches!(err.kind, TcVmErrorKind::StackUnderflow(_)));
        assert_eq!(err.line_index(), Some(1));
    }

    #[test]
    fn missing_source_file() {
        let err = match TcVm::new(TcVmConfig::captured("tc/does_not_exist.tc")) {
            Err(err) => err,
            Ok(_) => panic!("expected a missing file error"),
        };

        assert!(matches!(err.kind, TcVmErrorKind::ParseError(_)));
        assert_eq!(err.line_index(), None);
    }

    #[test]
    fn suppressed_output_is_discarded() -> Result<(), TcVmError> {
        let mut vm = TcVm::new(TcVmConfig::suppressed("tc/hello_world.tc"))?;
        vm.run()?;
        assert!(vm.output().is_empty());

        let config = TcVmConfig {
            suppress_output: true,
            ..TcVmConfig::from_source("@0\n!.65\n^0", false, false, false)
        };
        let mut vm = TcVm::new(config)?;
        for _ in 0..3000 {
            let ip = vm.next_instruction().unwrap();
            vm.exec(ip)?;
        }
        assert!(vm.output().is_empty());

        Ok(())
    }

    #[test]
    fn prompt_only_when_printing_to_stdout() -> Result<(), TcVmError> {
        let vm = TcVm::new(TcVmConfig::from_source("#i", false, false, false))?;
        assert!(vm.prompts());
        assert!(!TcVm::new(TcVmConfig::from_source_captured("#i"))?.prompts());
        let config = TcVmConfig {
            suppress_output: true,
            ..TcVmConfig::from_source("#i", false, false, false)
        };
        assert!(!TcVm::new(config)?.prompts());

        Ok(())
    }

    #[test]
    fn skip_past_last_line_halts() -> Result<(), TcVmError> {
        let vm = run_source("#1\n?1\n!9")?;

        assert!(vm.output().is_empty());
        assert_eq!(vm.next_instruction(), None);
        assert_eq!(vm.stack().to_vec(), vec![1]);

        Ok(())
    }

    #[test]
    fn negative_swap_index_underflows() {
        let err = expect_error("#1\n#2\n$-1");

        assert!(matches!(err.kind, TcVmErrorKind::StackUnderflow(_)));
        assert_eq!(err.line_index(), Some(2));
    }

    #[test]
    fn raw_config_skips_label_pass() -> Result<(), TcVmError> {
        let vm = TcVm::new(TcVmConfig::from_source("#1\n@p\n@i\n@3", true, false, true))?;

        assert_eq!(vm.instructions().len(), 4);
        assert!(vm.labels().is_empty());
        assert!(vm.stack().is_empty());

        Ok(())
    }

    #[test]
    fn exec_out_of_range() -> Result<(), TcVmError> {
        let mut vm = TcVm::new(TcVmConfig::from_source_captured("#1"))?;

        match vm.exec(5) {
            Err(err) => {
                assert!(matches!(err.kind, TcVmErrorKind::NoInstruction(5, 1)));
                assert_eq!(err.line_index(), None);
            }
            Ok(()) => panic!("expected exec past the program to fail"),
        }
        assert_eq!(vm.next_instruction(), Some(0));

        Ok(())
    }
}

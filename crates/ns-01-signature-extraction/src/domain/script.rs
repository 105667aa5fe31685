//! # Script Tokenizer
//!
//! Splits a legacy script into opcodes and push-data elements.
//!
//! ## Push Encodings
//!
//! | Opcode | Meaning |
//! |--------|---------|
//! | `0x00` | push empty |
//! | `0x01..=0x4b` | push the next `opcode` bytes |
//! | `0x4c` | next byte is the length |
//! | `0x4d` | next 2 bytes (little-endian) are the length |
//! | `0x4e` | next 4 bytes (little-endian) are the length |
//!
//! Every other opcode carries no data. The tokenizer stops at the first
//! error; elements produced before the error remain valid.

use super::errors::ScriptError;

const OP_0: u8 = 0x00;
const OP_PUSHBYTES_75: u8 = 0x4b;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;

/// One element of a tokenized script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// A data push (possibly empty).
    Push(&'a [u8]),
    /// A non-push opcode.
    Op(u8),
}

impl<'a> Instruction<'a> {
    /// Pushed bytes, if this is a push.
    pub fn push_data(&self) -> Option<&'a [u8]> {
        match self {
            Instruction::Push(data) => Some(data),
            Instruction::Op(_) => None,
        }
    }
}

/// Iterator over the instructions of a script.
#[derive(Debug, Clone)]
pub struct ScriptTokenizer<'a> {
    script: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> ScriptTokenizer<'a> {
    /// Start tokenizing `script` from its first byte.
    pub fn new(script: &'a [u8]) -> Self {
        Self {
            script,
            offset: 0,
            done: false,
        }
    }

    /// Byte offset of the next instruction.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn read_length(&mut self, opcode_offset: usize, opcode: u8, width: usize) -> Result<usize, ScriptError> {
        let start = self.offset;
        let end = start + width;
        let bytes = self
            .script
            .get(start..end)
            .ok_or(ScriptError::TruncatedLength {
                offset: opcode_offset,
                opcode,
                needed: width,
            })?;
        self.offset = end;

        let mut le = [0u8; 4];
        le[..width].copy_from_slice(bytes);
        Ok(u32::from_le_bytes(le) as usize)
    }

    fn read_push(&mut self, opcode_offset: usize, len: usize) -> Result<&'a [u8], ScriptError> {
        let start = self.offset;
        let available = self.script.len().saturating_sub(start);
        if len > available {
            return Err(ScriptError::TruncatedPush {
                offset: opcode_offset,
                declared: len,
                available,
            });
        }
        self.offset = start + len;
        Ok(&self.script[start..start + len])
    }

    fn step(&mut self) -> Result<Instruction<'a>, ScriptError> {
        let opcode_offset = self.offset;
        let opcode = self.script[opcode_offset];
        self.offset += 1;

        let len = match opcode {
            OP_0 => return Ok(Instruction::Push(&[])),
            1..=OP_PUSHBYTES_75 => opcode as usize,
            OP_PUSHDATA1 => self.read_length(opcode_offset, opcode, 1)?,
            OP_PUSHDATA2 => self.read_length(opcode_offset, opcode, 2)?,
            OP_PUSHDATA4 => self.read_length(opcode_offset, opcode, 4)?,
            _ => return Ok(Instruction::Op(opcode)),
        };
        self.read_push(opcode_offset, len).map(Instruction::Push)
    }
}

impl<'a> Iterator for ScriptTokenizer<'a> {
    type Item = Result<Instruction<'a>, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.script.len() {
            return None;
        }
        let item = self.step();
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

//! The SPIR-V front-end. Parsing runs in three sub-passes over the word
//! stream: a scan that registers every instruction and result, a processing
//! pass that builds the use graph and the specialization table, and the
//! schedule computation.

use crate::error::ParseError;
use crate::shader::graph::{self, Instruction, UseNode, NONE};
use crate::shader::{Shader, SpecConstant, SpecSlot};
use crate::spv::*;
use crate::utility::SaHashMap;
use smallvec::SmallVec;
use tracing::debug;

/// Decodes and parses `bytes` into a [`Shader`].
pub(crate) fn parse(bytes: &[u8]) -> Result<Shader, ParseError> {
    if bytes.len() % 4 != 0 {
        return Err(ParseError::ShortInput);
    }

    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    let mut parser = Parser::new(words)?;

    parser.scan()?;
    parser.process()?;

    Ok(parser.finish())
}

struct Parser {
    words: Vec<u32>,
    id_bound: u32,
    instructions: Vec<Instruction>,
    results: Vec<u32>,
    use_nodes: Vec<UseNode>,
    decorations: Vec<u32>,
    phis: Vec<u32>,
    out_degrees: Vec<u32>,
    in_degrees: Vec<u32>,
    spec_constants: Vec<SpecConstant>,
    spec_slots: SaHashMap<u32, SpecSlot>,
    default_switch_constant: u32,
    saw_switch: bool,
}

impl Parser {
    /// Validates the module header and sizes the result table.
    fn new(words: Vec<u32>) -> Result<Self, ParseError> {
        if words.len() < HEADER_WORDS as usize {
            return Err(ParseError::ShortInput);
        }

        if words[0] != MAGIC {
            return Err(ParseError::BadMagic(words[0]));
        }

        if words[1] > VERSION_MAX {
            return Err(ParseError::UnsupportedVersion {
                found: words[1],
                max: VERSION_MAX,
            });
        }

        let id_bound = words[3];

        Ok(Self {
            words,
            id_bound,
            instructions: Vec::new(),
            results: vec![NONE; id_bound as usize],
            use_nodes: Vec::new(),
            decorations: Vec::new(),
            phis: Vec::new(),
            out_degrees: Vec::new(),
            in_degrees: Vec::new(),
            spec_constants: Vec::new(),
            spec_slots: SaHashMap::default(),
            default_switch_constant: NONE,
            saw_switch: false,
        })
    }

    /// Sub-pass 1: walks the word stream, checks instruction framing and
    /// opcode support, and registers every produced result.
    fn scan(&mut self) -> Result<(), ParseError> {
        let len = self.words.len() as u32;
        let mut offset = HEADER_WORDS;

        while offset < len {
            let word = self.words[offset as usize];
            let op = opcode(word);
            let count = word_count(word);

            if count == 0 || offset + count > len {
                return Err(ParseError::ShortInput);
            }

            if !is_supported(op) {
                return Err(ParseError::UnsupportedOpcode(op));
            }

            let index = self.instructions.len() as u32;
            let result_word = match result_layout(op) {
                ResultLayout::None => None,
                ResultLayout::Result => Some(1),
                ResultLayout::TypedResult => Some(2),
            };

            if let Some(rel) = result_word {
                if count <= rel {
                    return Err(ParseError::ShortInput);
                }

                let id = self.words[(offset + rel) as usize];

                if id >= self.id_bound {
                    return Err(ParseError::UndefinedId(id));
                }

                if self.results[id as usize] != NONE {
                    return Err(ParseError::DuplicateResult(id));
                }

                self.results[id as usize] = index;
            }

            match op {
                OP_DECORATE | OP_MEMBER_DECORATE => self.decorations.push(index),
                OP_PHI => self.phis.push(index),
                OP_SWITCH => self.saw_switch = true,
                _ => {}
            }

            self.instructions.push(Instruction {
                word_index: offset,
                use_head: NONE,
            });

            offset += count;
        }

        Ok(())
    }

    /// Sub-pass 2: registers every use edge, computes degrees, collects the
    /// specialization table, and remembers the default switch constant.
    fn process(&mut self) -> Result<(), ParseError> {
        self.out_degrees = vec![0; self.instructions.len()];
        self.in_degrees = vec![0; self.instructions.len()];

        for index in 0..self.instructions.len() as u32 {
            let off = self.instructions[index as usize].word_index as usize;
            let word = self.words[off];
            let op = opcode(word);
            let count = word_count(word) as usize;

            if result_layout(op) == ResultLayout::TypedResult {
                let producer = self.resolve(self.words[off + 1], index, false)?;
                self.add_result_use(producer, index);
            }

            if let Some(layout) = operand_layout(op) {
                let mut positions: SmallVec<[u32; 8]> = SmallVec::new();
                for_each_id_operand(&self.words[off..off + count], layout, |rel| {
                    positions.push(rel)
                });

                let forward = allows_forward_operands(op);

                for rel in positions {
                    let id = self.words[off + rel as usize];
                    let producer = self.resolve(id, index, forward)?;
                    self.add_result_use(producer, index);
                }
            }

            if let Some(layout) = label_layout(op) {
                let mut positions: SmallVec<[u32; 4]> = SmallVec::new();
                for_each_label_operand(&self.words[off..off + count], layout, |rel| {
                    positions.push(rel)
                });

                for rel in positions {
                    let id = self.words[off + rel as usize];
                    let producer = self.resolve_label(id)?;
                    self.add_label_use(producer, index);
                }
            }

            match op {
                // phi predecessors are not uses, but they must still name
                // labels that exist somewhere in the module
                OP_PHI => {
                    let mut pos = 4;

                    while pos < count {
                        self.resolve_label(self.words[off + pos])?;
                        pos += 2;
                    }
                }
                OP_CONSTANT if self.default_switch_constant == NONE => {
                    if self.is_int32_type(self.words[off + 1]) {
                        self.default_switch_constant = self.words[off + 2];
                    }
                }
                OP_DECORATE | OP_MEMBER_DECORATE => {
                    self.process_decoration(index, op, off, count)?;
                }
                _ => {}
            }
        }

        if self.saw_switch && self.default_switch_constant == NONE {
            return Err(ParseError::MissingSwitchConstant);
        }

        Ok(())
    }

    fn process_decoration(
        &mut self,
        index: u32,
        op: u16,
        off: usize,
        count: usize,
    ) -> Result<(), ParseError> {
        let target = self.words[off + 1];
        let producer = self.resolve_any(target)?;

        if op != OP_DECORATE || count < 4 || self.words[off + 2] != DECORATION_SPEC_ID {
            return Ok(());
        }

        let spec_off = self.instructions[producer as usize].word_index as usize;
        let spec_word = self.words[spec_off];
        let spec_op = opcode(spec_word);

        let values: SmallVec<[u32; 2]> = match spec_op {
            OP_SPEC_CONSTANT_TRUE => SmallVec::from_slice(&[1]),
            OP_SPEC_CONSTANT_FALSE => SmallVec::from_slice(&[0]),
            OP_SPEC_CONSTANT => {
                let end = spec_off + word_count(spec_word) as usize;
                SmallVec::from_slice(&self.words[spec_off + 3..end])
            }
            // OpSpecConstantComposite / OpSpecConstantOp never get this far
            // (they fail the opcode scan), but a SpecId on anything else is
            // just as unusable
            other => return Err(ParseError::UnsupportedOpcode(other)),
        };

        let spec_id = self.words[off + 3];

        self.spec_slots.insert(
            spec_id,
            SpecSlot {
                target_id: target,
                decoration: index,
            },
        );
        self.spec_constants.push(SpecConstant { spec_id, values });

        Ok(())
    }

    /// Sub-pass 3: computes the evaluation schedule and assembles the
    /// immutable [`Shader`].
    fn finish(self) -> Shader {
        let schedule = graph::schedule(&self.instructions, &self.use_nodes);

        debug!(
            instructions = self.instructions.len(),
            results = self.results.iter().filter(|&&r| r != NONE).count(),
            spec_constants = self.spec_constants.len(),
            "parsed SPIR-V module"
        );

        Shader {
            words: self.words,
            instructions: self.instructions,
            results: self.results,
            use_nodes: self.use_nodes,
            decorations: self.decorations,
            phis: self.phis,
            out_degrees: self.out_degrees,
            in_degrees: self.in_degrees,
            schedule,
            spec_constants: self.spec_constants,
            spec_slots: self.spec_slots,
            default_switch_constant: self.default_switch_constant,
        }
    }

    /// Resolves a value or type operand. Most consumers may only reference
    /// results produced earlier in the stream.
    fn resolve(&self, id: u32, consumer: u32, allow_forward: bool) -> Result<u32, ParseError> {
        let producer = self.resolve_any(id)?;

        if !allow_forward && producer >= consumer {
            return Err(ParseError::UndefinedId(id));
        }

        Ok(producer)
    }

    /// Resolves an id against the whole module, for operands that may
    /// legally reference forward.
    fn resolve_any(&self, id: u32) -> Result<u32, ParseError> {
        if id >= self.id_bound {
            return Err(ParseError::UndefinedId(id));
        }

        match self.results[id as usize] {
            NONE => Err(ParseError::UndefinedId(id)),
            producer => Ok(producer),
        }
    }

    /// Resolves a label operand: defined anywhere, and actually an `OpLabel`.
    fn resolve_label(&self, id: u32) -> Result<u32, ParseError> {
        let producer = self.resolve_any(id)?;
        let off = self.instructions[producer as usize].word_index as usize;

        if opcode(self.words[off]) != OP_LABEL {
            return Err(ParseError::UndefinedId(id));
        }

        Ok(producer)
    }

    fn is_int32_type(&self, ty: u32) -> bool {
        let Ok(producer) = self.resolve_any(ty) else {
            return false;
        };

        let off = self.instructions[producer as usize].word_index as usize;
        let word = self.words[off];

        opcode(word) == OP_TYPE_INT && word_count(word) >= 3 && self.words[off + 2] == 32
    }

    fn add_result_use(&mut self, producer: u32, consumer: u32) {
        self.push_node(producer, consumer);
        self.out_degrees[producer as usize] += 1;
    }

    fn add_label_use(&mut self, producer: u32, consumer: u32) {
        self.push_node(producer, consumer);
        self.in_degrees[producer as usize] += 1;
    }

    fn push_node(&mut self, producer: u32, consumer: u32) {
        self.use_nodes.push(UseNode {
            consumer,
            next: self.instructions[producer as usize].use_head,
        });
        self.instructions[producer as usize].use_head = self.use_nodes.len() as u32 - 1;
    }
}

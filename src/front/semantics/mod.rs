// ----------------------------
// File: src/front/semantics/mod.rs
// ----------------------------
//! Symbols and scope accounting.
//!
//! All symbols of one compilation live in a single arena; contexts and
//! evaluation results refer to them by index. A function frame tracks the
//! parameter area, a stack of local scopes and the frame-size high-water
//! mark. Slot offsets are fixed at declaration time; a slot's runtime
//! address is `stack_depth - offset` bytes above `$sp`, resolved after the
//! whole body has been walked.

pub mod const_eval;
pub mod types;

use thiserror::Error;

use crate::back::code::{Code, TAB};
use crate::front::token::Location;
use self::types::Type;

pub const STACK_ALIGNMENT: i32 = 4;

#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct CompileError {
    pub location: Location,
    pub message: String,
}

impl CompileError {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self { location, message: message.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolId(u32);

#[derive(Debug, Clone)]
pub enum SymbolKind {
    /// Global data, addressed by label.
    Field,
    /// Code label with a signature. Carries no data operations.
    Function { param_types: Vec<Type> },
    /// A slot in the enclosing function's frame.
    Variable { offset: i32 },
    /// Placeholder for the result of a void expression.
    Void,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub location: Location,
    pub kind: SymbolKind,
}

impl Symbol {
    fn readable_name(&self) -> String {
        if self.name.is_empty() {
            "result".to_string()
        } else {
            format!("symbol \"{}\"", self.name)
        }
    }

    fn invalid_void(&self) -> CompileError {
        CompileError::new(self.location, "type of result is \"void\"")
    }

    fn not_a_variable(&self) -> CompileError {
        CompileError::new(self.location, format!("{} is not a variable", self.readable_name()))
    }

    fn not_indexable(&self) -> CompileError {
        CompileError::new(
            self.location,
            format!("{} of type {} is not indexable", self.readable_name(), self.ty),
        )
    }

    /// Load the symbol's value into `reg`. Arrays load their base address.
    pub fn load_value(&self, reg: &str) -> Result<Code, CompileError> {
        match &self.kind {
            SymbolKind::Field => {
                if self.ty.is_array() {
                    return self.load_address(reg);
                }
                Ok(Code::line(format!("{}lw {}, {}", TAB, reg, self.name)))
            }
            SymbolKind::Variable { offset } => {
                if self.ty.is_array() {
                    return self.load_address(reg);
                }
                let mut code = Code::new();
                code.push_slot(format!("{}lw {}, ", TAB, reg), *offset, "($sp)");
                Ok(code)
            }
            SymbolKind::Function { .. } => Err(self.not_a_variable()),
            SymbolKind::Void => Err(self.invalid_void()),
        }
    }

    pub fn save_value(&self, reg: &str) -> Result<Code, CompileError> {
        if self.ty.is_array() {
            return Err(CompileError::new(
                self.location,
                format!("{} of type \"{}\" is not assignable", self.readable_name(), self.ty),
            ));
        }
        match &self.kind {
            SymbolKind::Field => Ok(Code::line(format!("{}sw {}, {}", TAB, reg, self.name))),
            SymbolKind::Variable { offset } => {
                let mut code = Code::new();
                code.push_slot(format!("{}sw {}, ", TAB, reg), *offset, "($sp)");
                Ok(code)
            }
            SymbolKind::Function { .. } => Err(self.not_a_variable()),
            SymbolKind::Void => Err(self.invalid_void()),
        }
    }

    pub fn load_address(&self, reg: &str) -> Result<Code, CompileError> {
        match &self.kind {
            SymbolKind::Field | SymbolKind::Function { .. } => {
                Ok(Code::line(format!("{}la {}, {}", TAB, reg, self.name)))
            }
            SymbolKind::Variable { offset } => {
                let mut code = Code::new();
                code.push_slot(format!("{}addu {}, $sp, ", TAB, reg), *offset, "");
                Ok(code)
            }
            SymbolKind::Void => Err(self.invalid_void()),
        }
    }

    /// Load element `index_reg` of an array or pointer into `dest_reg`.
    /// The index register is clobbered.
    pub fn load_element(&self, index_reg: &str, dest_reg: &str) -> Result<Code, CompileError> {
        self.element_access(index_reg, |code, address| match address {
            ElementAddress::Global { width } => {
                let op = if width == 1 { "lb" } else { "lw" };
                code.push(format!("{}{} {}, {}({})", TAB, op, dest_reg, self.name, index_reg));
            }
            ElementAddress::Stack { offset, width } => {
                let op = if width == 1 { "lb" } else { "lw" };
                code.push_slot(format!("{}{} {}, ", TAB, op, dest_reg), offset, format!("({})", index_reg));
            }
            ElementAddress::Indirect { width } => {
                let op = if width == 1 { "lb" } else { "lw" };
                code.push(format!("{}{} {}, ({})", TAB, op, dest_reg, index_reg));
            }
        })
    }

    /// Store `source_reg` into element `index_reg`. The index register is
    /// clobbered.
    pub fn save_element(&self, index_reg: &str, source_reg: &str) -> Result<Code, CompileError> {
        self.element_access(index_reg, |code, address| match address {
            ElementAddress::Global { width } => {
                let op = if width == 1 { "sb" } else { "sw" };
                code.push(format!("{}{} {}, {}({})", TAB, op, source_reg, self.name, index_reg));
            }
            ElementAddress::Stack { offset, width } => {
                let op = if width == 1 { "sb" } else { "sw" };
                code.push_slot(format!("{}{} {}, ", TAB, op, source_reg), offset, format!("({})", index_reg));
            }
            ElementAddress::Indirect { width } => {
                let op = if width == 1 { "sb" } else { "sw" };
                code.push(format!("{}{} {}, ({})", TAB, op, source_reg, index_reg));
            }
        })
    }

    /// Shared addressing logic for element loads and stores: scale the index
    /// for word-wide elements, turn it into an effective address, then let
    /// the caller emit the access itself.
    fn element_access(
        &self,
        index_reg: &str,
        emit: impl FnOnce(&mut Code, ElementAddress),
    ) -> Result<Code, CompileError> {
        let element = match (&self.kind, &self.ty) {
            (SymbolKind::Field, Type::Array(element, _)) => *element,
            (SymbolKind::Variable { .. }, Type::Array(element, _))
            | (SymbolKind::Variable { .. }, Type::Pointer(element)) => *element,
            (SymbolKind::Void, _) => return Err(self.invalid_void()),
            _ => return Err(self.not_indexable()),
        };

        let width = element.width();
        if width != 1 && width != 4 {
            return Err(CompileError::new(self.location, "unsupported type width"));
        }

        let mut code = Code::new();
        if width == 4 {
            code.push(format!("{}mul {}, {}, {}", TAB, index_reg, index_reg, width));
        }
        let address = match &self.kind {
            SymbolKind::Field => ElementAddress::Global { width },
            SymbolKind::Variable { offset } => {
                if self.ty.is_array() {
                    code.push(format!("{}addu {}, $sp, {}", TAB, index_reg, index_reg));
                    ElementAddress::Stack { offset: *offset, width }
                } else {
                    // pointer: fetch the base into a scratch register first
                    code.append(self.load_value("$t0")?);
                    code.push(format!("{}addu {}, $t0, {}", TAB, index_reg, index_reg));
                    ElementAddress::Indirect { width }
                }
            }
            SymbolKind::Function { .. } | SymbolKind::Void => unreachable!("filtered above"),
        };
        emit(&mut code, address);
        Ok(code)
    }
}

enum ElementAddress {
    /// `name(index)` — global array addressed by label.
    Global { width: u32 },
    /// `slot(index)` — frame-resident array, index already rebased on `$sp`.
    Stack { offset: i32, width: u32 },
    /// `(index)` — pointer target, index already rebased on the pointer.
    Indirect { width: u32 },
}

/// Owns every symbol of one compilation.
#[derive(Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn alloc_void(&mut self, location: Location) -> SymbolId {
        self.alloc(Symbol {
            name: "void".to_string(),
            ty: Type::Void,
            location,
            kind: SymbolKind::Void,
        })
    }
}

impl std::ops::Index<SymbolId> for SymbolArena {
    type Output = Symbol;

    fn index(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }
}

/// Temporary-slot accounting for one expression nesting level. Forked on
/// entry to a subexpression so sibling temporaries may overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprScope {
    depth: i32,
}

impl ExprScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fork(&self) -> Self {
        *self
    }
}

#[derive(Debug, Default)]
struct LocalScope {
    symbols: Vec<SymbolId>,
    context_depth: i32,
    break_label: Option<String>,
    continue_label: Option<String>,
}

/// Stack accounting and name resolution for one function body.
#[derive(Debug)]
pub struct Frame {
    pub epilogue_label: String,
    pub return_type: Type,
    /// Final frame size once the body walk is complete; a high-water mark
    /// over every scope depth and expression temporary.
    pub stack_depth: i32,
    param_depth: i32,
    params: Vec<SymbolId>,
    scopes: Vec<LocalScope>,
}

impl Frame {
    pub fn new(function_name: &str, return_type: Type) -> Self {
        Self {
            epilogue_label: format!("${}_epilogue", function_name),
            return_type,
            stack_depth: 0,
            param_depth: 0,
            params: Vec::new(),
            scopes: Vec::new(),
        }
    }

    fn cumulative_depth(&self) -> i32 {
        self.param_depth + self.scopes.iter().map(|s| s.context_depth).sum::<i32>()
    }

    fn update_stack_depth(&mut self, extra: i32) {
        self.stack_depth = self.stack_depth.max(self.cumulative_depth() + extra);
    }

    pub fn declare_parameter(
        &mut self,
        arena: &mut SymbolArena,
        name: &str,
        ty: Type,
        location: Location,
    ) -> Result<SymbolId, CompileError> {
        if self.params.iter().any(|&id| arena[id].name == name) {
            return Err(CompileError::new(
                location,
                format!("redeclaration of function parameter \"{}\"", name),
            ));
        }
        let id = arena.alloc(Symbol {
            name: name.to_string(),
            ty,
            location,
            kind: SymbolKind::Variable { offset: self.param_depth },
        });
        self.params.push(id);
        self.param_depth += ty.aligned_width() as i32;
        self.update_stack_depth(0);
        Ok(id)
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(LocalScope::default());
    }

    /// A scope that owns break (and, for loops, continue) targets.
    pub fn push_labeled_scope(&mut self, break_label: String, continue_label: Option<String>) {
        self.scopes.push(LocalScope {
            break_label: Some(break_label),
            continue_label,
            ..LocalScope::default()
        });
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn declare_variable(
        &mut self,
        arena: &mut SymbolArena,
        name: &str,
        ty: Type,
        location: Location,
    ) -> Result<SymbolId, CompileError> {
        let current = self
            .scopes
            .last()
            .expect("declaration outside any scope");
        if current.symbols.iter().any(|&id| arena[id].name == name) {
            return Err(CompileError::new(
                location,
                format!("redeclaration of local variable \"{}\"", name),
            ));
        }
        let aligned = ty.aligned_width() as i32;
        let offset = self.cumulative_depth() + aligned - STACK_ALIGNMENT;
        let id = arena.alloc(Symbol {
            name: name.to_string(),
            ty,
            location,
            kind: SymbolKind::Variable { offset },
        });
        let current = self.scopes.last_mut().expect("declaration outside any scope");
        current.symbols.push(id);
        current.context_depth += aligned;
        self.update_stack_depth(0);
        Ok(id)
    }

    /// Allocate a nameless temporary above the expression scope's depth.
    /// Every temporary takes one aligned slot.
    pub fn new_temp(
        &mut self,
        arena: &mut SymbolArena,
        expr: &mut ExprScope,
        ty: Type,
        location: Location,
    ) -> SymbolId {
        let offset = self.cumulative_depth() + expr.depth;
        let id = arena.alloc(Symbol {
            name: String::new(),
            ty,
            location,
            kind: SymbolKind::Variable { offset },
        });
        expr.depth += STACK_ALIGNMENT;
        self.update_stack_depth(expr.depth);
        id
    }

    /// Innermost declaration wins; parameters come after every open scope.
    pub fn lookup(&self, arena: &SymbolArena, name: &str) -> Option<SymbolId> {
        for scope in self.scopes.iter().rev() {
            if let Some(&id) = scope.symbols.iter().find(|&&id| arena[id].name == name) {
                return Some(id);
            }
        }
        self.params.iter().copied().find(|&id| arena[id].name == name)
    }

    pub fn break_label(&self) -> Option<&str> {
        self.scopes.iter().rev().find_map(|s| s.break_label.as_deref())
    }

    pub fn continue_label(&self) -> Option<&str> {
        self.scopes.iter().rev().find_map(|s| s.continue_label.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::types::ValueType;
    use super::*;

    fn frame_with_arena() -> (Frame, SymbolArena) {
        (Frame::new("f", Type::Void), SymbolArena::new())
    }

    #[test]
    fn parameter_slots_are_packed_in_declaration_order() {
        let (mut frame, mut arena) = frame_with_arena();
        let ra = frame
            .declare_parameter(&mut arena, "$saved_ra", Type::INT, Location::builtin())
            .unwrap();
        let fp = frame
            .declare_parameter(&mut arena, "$saved_fp", Type::INT, Location::builtin())
            .unwrap();
        let a = frame.declare_parameter(&mut arena, "a", Type::CHAR, Location::default()).unwrap();
        assert!(matches!(arena[ra].kind, SymbolKind::Variable { offset: 0 }));
        assert!(matches!(arena[fp].kind, SymbolKind::Variable { offset: 4 }));
        // char still takes an aligned slot
        assert!(matches!(arena[a].kind, SymbolKind::Variable { offset: 8 }));
        assert_eq!(frame.stack_depth, 12);
    }

    #[test]
    fn duplicate_parameter_is_rejected() {
        let (mut frame, mut arena) = frame_with_arena();
        frame.declare_parameter(&mut arena, "a", Type::INT, Location::default()).unwrap();
        let err = frame
            .declare_parameter(&mut arena, "a", Type::INT, Location::point(1, 9))
            .unwrap_err();
        assert_eq!(err.location, Location::point(1, 9));
        assert!(err.message.contains("redeclaration of function parameter"));
    }

    #[test]
    fn local_slots_reserve_aligned_widths() {
        let (mut frame, mut arena) = frame_with_arena();
        frame.push_scope();
        let x = frame.declare_variable(&mut arena, "x", Type::INT, Location::default()).unwrap();
        let a = frame
            .declare_variable(&mut arena, "a", Type::Array(ValueType::Char, 6), Location::default())
            .unwrap();
        // offset = cumulative + aligned - 4
        assert!(matches!(arena[x].kind, SymbolKind::Variable { offset: 0 }));
        assert!(matches!(arena[a].kind, SymbolKind::Variable { offset: 8 }));
        assert_eq!(frame.stack_depth, 12);
        assert_eq!(frame.stack_depth % 4, 0);
    }

    #[test]
    fn sibling_scopes_reuse_slots_and_keep_the_high_water_mark() {
        let (mut frame, mut arena) = frame_with_arena();
        frame.push_scope();
        frame.push_scope();
        frame.declare_variable(&mut arena, "x", Type::INT, Location::default()).unwrap();
        frame.declare_variable(&mut arena, "y", Type::INT, Location::default()).unwrap();
        frame.pop_scope();
        frame.push_scope();
        let z = frame.declare_variable(&mut arena, "z", Type::INT, Location::default()).unwrap();
        // the sibling block starts over at the same depth
        assert!(matches!(arena[z].kind, SymbolKind::Variable { offset: 0 }));
        assert_eq!(frame.stack_depth, 8);
    }

    #[test]
    fn shadowing_in_an_inner_scope_is_allowed() {
        let (mut frame, mut arena) = frame_with_arena();
        frame.push_scope();
        let outer = frame.declare_variable(&mut arena, "x", Type::INT, Location::default()).unwrap();
        frame.push_scope();
        let inner = frame.declare_variable(&mut arena, "x", Type::CHAR, Location::default()).unwrap();
        assert_eq!(frame.lookup(&arena, "x"), Some(inner));
        frame.pop_scope();
        assert_eq!(frame.lookup(&arena, "x"), Some(outer));
    }

    #[test]
    fn duplicate_in_the_same_scope_is_rejected() {
        let (mut frame, mut arena) = frame_with_arena();
        frame.push_scope();
        frame.declare_variable(&mut arena, "x", Type::INT, Location::default()).unwrap();
        let err = frame
            .declare_variable(&mut arena, "x", Type::INT, Location::point(3, 5))
            .unwrap_err();
        assert_eq!(err.location, Location::point(3, 5));
        assert!(err.message.contains("redeclaration of local variable"));
    }

    #[test]
    fn forked_expression_scopes_overlap_sibling_temporaries() {
        let (mut frame, mut arena) = frame_with_arena();
        frame.push_scope();
        let mut outer = ExprScope::new();

        let mut inner = outer.fork();
        let t1 = frame.new_temp(&mut arena, &mut inner, Type::INT, Location::default());
        let t2 = frame.new_temp(&mut arena, &mut inner, Type::INT, Location::default());
        // the result temporary starts where the children's scratch began
        let result = frame.new_temp(&mut arena, &mut outer, Type::INT, Location::default());
        assert!(matches!(arena[t1].kind, SymbolKind::Variable { offset: 0 }));
        assert!(matches!(arena[t2].kind, SymbolKind::Variable { offset: 4 }));
        assert!(matches!(arena[result].kind, SymbolKind::Variable { offset: 0 }));
        assert_eq!(frame.stack_depth, 8);
    }

    #[test]
    fn break_and_continue_labels_climb_the_scope_chain() {
        let (mut frame, _) = frame_with_arena();
        frame.push_scope();
        assert_eq!(frame.break_label(), None);
        frame.push_labeled_scope("$L1_end".into(), Some("$L1_loop".into()));
        frame.push_scope();
        frame.push_labeled_scope("$L2_end".into(), None); // switch: break only
        assert_eq!(frame.break_label(), Some("$L2_end"));
        assert_eq!(frame.continue_label(), Some("$L1_loop"));
        frame.pop_scope();
        assert_eq!(frame.break_label(), Some("$L1_end"));
    }

    #[test]
    fn void_symbol_rejects_every_data_operation() {
        let mut arena = SymbolArena::new();
        let id = arena.alloc_void(Location::default());
        assert!(arena[id].load_value("$v0").is_err());
        assert!(arena[id].save_value("$v0").is_err());
        assert!(arena[id].load_address("$v0").is_err());
        assert!(arena[id].load_element("$v0", "$v0").is_err());
        assert!(arena[id].save_element("$v1", "$v0").is_err());
    }

    #[test]
    fn global_array_loads_decay_to_addresses() {
        let symbol = Symbol {
            name: "buffer".into(),
            ty: Type::Array(ValueType::Char, 8),
            location: Location::default(),
            kind: SymbolKind::Field,
        };
        assert_eq!(symbol.load_value("$v0").unwrap().resolve(0), "    la $v0, buffer\n");
        let err = symbol.save_value("$v0").unwrap_err();
        assert!(err.message.contains("is not assignable"));
    }

    #[test]
    fn word_elements_scale_the_index() {
        let global = Symbol {
            name: "table".into(),
            ty: Type::Array(ValueType::Int, 4),
            location: Location::default(),
            kind: SymbolKind::Field,
        };
        assert_eq!(
            global.load_element("$v0", "$v0").unwrap().resolve(0),
            "    mul $v0, $v0, 4\n    lw $v0, table($v0)\n"
        );

        let local = Symbol {
            name: "a".into(),
            ty: Type::Array(ValueType::Int, 4),
            location: Location::default(),
            kind: SymbolKind::Variable { offset: 16 },
        };
        assert_eq!(
            local.save_element("$v1", "$v0").unwrap().resolve(24),
            "    mul $v1, $v1, 4\n    addu $v1, $sp, $v1\n    sw $v0, 8($v1)\n"
        );
    }

    #[test]
    fn pointer_elements_indirect_through_the_loaded_base() {
        let pointer = Symbol {
            name: "p".into(),
            ty: Type::Pointer(ValueType::Char),
            location: Location::default(),
            kind: SymbolKind::Variable { offset: 8 },
        };
        assert_eq!(
            pointer.load_element("$v0", "$v0").unwrap().resolve(16),
            "    lw $t0, 8($sp)\n    addu $v0, $t0, $v0\n    lb $v0, ($v0)\n"
        );
    }

    #[test]
    fn functions_carry_no_data_operations() {
        let function = Symbol {
            name: "f".into(),
            ty: Type::Void,
            location: Location::default(),
            kind: SymbolKind::Function { param_types: vec![] },
        };
        assert!(function.load_value("$v0").is_err());
        assert!(function.save_value("$v0").is_err());
        assert!(function.load_element("$v0", "$v0").is_err());
    }
}

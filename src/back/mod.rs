// ----------------------------
// File: src/back/mod.rs
// ----------------------------
//! MIPS code generation over the typed AST.
//!
//! Integral expressions evaluate into freshly allocated stack temporaries;
//! logical expressions emit branches to caller-supplied labels. Statements
//! stitch those together with labels drawn from the compilation-wide
//! counter. Function bodies are walked once to settle the frame size, then
//! the buffered code is resolved to plain text.

pub mod code;

use std::collections::HashMap;

use tracing::debug;

use crate::front::ast::{
    BinaryOp, Block, Definition, Expr, FieldDefinition, FieldValue, FunctionDefinition,
    IntegralExpr, LValue, LogicalExpr, LogicalOp, MainDefinition, Program, RelationalOp,
    Statement, SwitchStatement, UnaryOp,
};
use crate::front::semantics::const_eval::precompute;
use crate::front::semantics::types::Type;
use crate::front::semantics::{CompileError, ExprScope, Frame, Symbol, SymbolArena, SymbolId, SymbolKind};
use crate::front::token::Location;
use code::{Code, TAB};

/// Receives warnings as `(location, message, kind)`.
pub type DiagnosticSink<'a> = &'a dyn Fn(Location, &str, &str);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Data,
    Text,
}

/// Compile a whole program to assembly text. The runtime stub is appended
/// by the driver afterwards.
pub fn compile_program(program: &Program, sink: DiagnosticSink) -> Result<String, CompileError> {
    Codegen::new(sink).run(program)
}

struct Codegen<'a> {
    arena: SymbolArena,
    globals: HashMap<String, SymbolId>,
    section: Section,
    labels: u32,
    sink: DiagnosticSink<'a>,
}

impl<'a> Codegen<'a> {
    fn new(sink: DiagnosticSink<'a>) -> Self {
        Self {
            arena: SymbolArena::new(),
            globals: HashMap::new(),
            section: Section::Text,
            labels: 0,
            sink,
        }
    }

    fn run(&mut self, program: &Program) -> Result<String, CompileError> {
        self.declare_builtins();

        let mut out = String::from(".data\n.align 2 # word align\n\n");
        out += ".text\n";
        out += TAB;
        out += "j main # entry point\n\n";

        for definition in &program.definitions {
            out += &self.compile_definition(definition)?;
        }
        Ok(out)
    }

    /// Runtime entry points, usable from source code by name. Their bodies
    /// live in the runtime stub.
    fn declare_builtins(&mut self) {
        let builtins: &[(&str, Type, &[Type])] = &[
            ("print_string", Type::Void, &[Type::CHAR_POINTER]),
            ("print_char", Type::Void, &[Type::CHAR]),
            ("print_int", Type::Void, &[Type::INT]),
            ("read_string", Type::Void, &[Type::CHAR_POINTER, Type::INT]),
            ("read_char", Type::CHAR, &[]),
            ("read_int", Type::INT, &[]),
            ("exit", Type::Void, &[]),
            ("exit2", Type::Void, &[Type::INT]),
            ("$out_of_bounds_error", Type::Void, &[Type::INT]),
        ];
        for (name, ty, params) in builtins {
            let id = self.arena.alloc(Symbol {
                name: name.to_string(),
                ty: *ty,
                location: Location::builtin(),
                kind: SymbolKind::Function { param_types: params.to_vec() },
            });
            self.globals.insert(name.to_string(), id);
        }
    }

    fn new_label(&mut self) -> String {
        self.labels += 1;
        format!("$L{}", self.labels)
    }

    fn declare_global(&mut self, symbol: Symbol, what: &str) -> Result<SymbolId, CompileError> {
        if self.globals.contains_key(&symbol.name) {
            return Err(CompileError::new(
                symbol.location,
                format!("redeclaration of {} \"{}\"", what, symbol.name),
            ));
        }
        let name = symbol.name.clone();
        let id = self.arena.alloc(symbol);
        self.globals.insert(name, id);
        Ok(id)
    }

    /// Innermost frame slot first, then the global namespace.
    fn resolve(&self, frame: &Frame, name: &str) -> Option<SymbolId> {
        frame.lookup(&self.arena, name).or_else(|| self.globals.get(name).copied())
    }

    fn switch_section(&mut self, section: Section, out: &mut Code) {
        if self.section != section {
            self.section = section;
            out.push(match section {
                Section::Data => ".data",
                Section::Text => ".text",
            });
        }
    }

    // ---- definitions ----

    fn compile_definition(&mut self, definition: &Definition) -> Result<String, CompileError> {
        match definition {
            Definition::Field(field) => self.compile_field(field),
            Definition::Function(function) => self.compile_function(function),
            Definition::Main(main) => self.compile_main(main),
        }
    }

    fn compile_field(&mut self, field: &FieldDefinition) -> Result<String, CompileError> {
        self.declare_global(
            Symbol {
                name: field.name.clone(),
                ty: field.ty,
                location: field.location,
                kind: SymbolKind::Field,
            },
            "global variable",
        )?;

        let mut out = Code::new();
        self.switch_section(Section::Data, &mut out);
        out.push_label(&field.name);
        match (&field.ty, &field.value) {
            (Type::Value(v), Some(FieldValue::Scalar(value))) => {
                out.push(format!("{}{}", TAB, v.allocation(*value)));
            }
            (Type::Value(v), None) => {
                out.push(format!("{}{}", TAB, v.allocation(0)));
            }
            (Type::Array(_, _), Some(FieldValue::Literal(literal))) => {
                out.push(format!("{}.asciiz \"{}\"", TAB, escape_asm(literal)));
                let padding = field.ty.width() as i32 - literal.len() as i32 - 1;
                if padding > 0 {
                    out.push(format!("{}.space {}", TAB, padding));
                }
            }
            (Type::Array(_, _), None) => {
                out.push(format!("{}.space {}", TAB, field.ty.width()));
            }
            // construction-time validation leaves no other combination
            _ => {
                return Err(CompileError::new(
                    field.location,
                    format!("global variable \"{}\" has an invalid initializer", field.name),
                ))
            }
        }
        Ok(out.resolve(0) + "\n")
    }

    fn compile_function(&mut self, function: &FunctionDefinition) -> Result<String, CompileError> {
        let param_types: Vec<Type> = function.params.iter().map(|p| p.ty).collect();
        self.declare_global(
            Symbol {
                name: function.name.clone(),
                ty: function.return_type,
                location: function.location,
                kind: SymbolKind::Function { param_types },
            },
            "function",
        )?;

        let mut frame = Frame::new(&function.name, function.return_type);

        // two synthetic slots always head the frame
        let saved_ra = frame.declare_parameter(
            &mut self.arena,
            "$saved_ra",
            Type::INT,
            function.location,
        )?;
        let saved_fp = frame.declare_parameter(
            &mut self.arena,
            "$saved_fp",
            Type::INT,
            function.location,
        )?;
        let mut param_ids = Vec::new();
        for param in &function.params {
            param_ids.push(frame.declare_parameter(
                &mut self.arena,
                &param.name,
                param.ty,
                param.location,
            )?);
        }

        let body_code = self.compile_block(&mut frame, &function.body)?;
        debug!(target: "mcc::codegen", "function {}: frame size {}", function.name, frame.stack_depth);

        let mut out = Code::new();
        self.switch_section(Section::Text, &mut out);
        out.push_label(&function.name);

        // prologue
        out.push(format!("{}addu $sp, $sp, {}", TAB, -frame.stack_depth));
        out.append(self.arena[saved_ra].save_value("$ra")?);
        out.append(self.arena[saved_fp].save_value("$fp")?);
        out.push(format!("{}move $fp, $sp", TAB));
        for (i, &id) in param_ids.iter().enumerate() {
            out.append(self.arena[id].save_value(&format!("$a{}", i))?);
        }

        out.append(body_code);

        // epilogue
        out.push_label(&frame.epilogue_label);
        out.push(format!("{}move $sp, $fp", TAB));
        out.append(self.arena[saved_ra].load_value("$ra")?);
        out.append(self.arena[saved_fp].load_value("$fp")?);
        out.push(format!("{}addu $sp, $sp, {}", TAB, frame.stack_depth));
        out.push(format!("{}jr $ra", TAB));

        Ok(out.resolve(frame.stack_depth) + "\n")
    }

    /// `main` is entered from the runtime and never returns through `$ra`,
    /// so it keeps neither `$ra` nor `$fp` and terminates by jumping into
    /// the runtime exit.
    fn compile_main(&mut self, main: &MainDefinition) -> Result<String, CompileError> {
        self.declare_global(
            Symbol {
                name: "main".to_string(),
                ty: main.return_type,
                location: main.location,
                kind: SymbolKind::Function { param_types: Vec::new() },
            },
            "function",
        )?;

        let mut frame = Frame::new("main", main.return_type);
        let body_code = self.compile_block(&mut frame, &main.body)?;
        debug!(target: "mcc::codegen", "function main: frame size {}", frame.stack_depth);

        let mut out = Code::new();
        self.switch_section(Section::Text, &mut out);
        out.push(".globl main");
        out.push_label("main");

        out.push(format!("{}addu $sp, $sp, {}", TAB, -frame.stack_depth));
        out.push(format!("{}move $fp, $sp", TAB));

        out.append(body_code);

        out.push_label(&frame.epilogue_label);
        out.push(format!("{}move $sp, $fp", TAB));
        out.push(format!("{}addu $sp, $sp, {}", TAB, frame.stack_depth));
        let exit = if main.return_type == Type::Void { "exit" } else { "exit2" };
        let exit = self
            .resolve(&frame, exit)
            .ok_or_else(|| CompileError::new(main.location, format!("undefined symbol \"{}\"", exit)))?;
        out.push(format!("{}j {}", TAB, self.arena[exit].name));

        Ok(out.resolve(frame.stack_depth) + "\n")
    }

    // ---- statements ----

    fn compile_block(&mut self, frame: &mut Frame, block: &Block) -> Result<Code, CompileError> {
        frame.push_scope();
        let result = self.compile_statements(frame, &block.statements);
        frame.pop_scope();
        result
    }

    fn compile_statements(
        &mut self,
        frame: &mut Frame,
        statements: &[Statement],
    ) -> Result<Code, CompileError> {
        let mut out = Code::new();
        for statement in statements {
            out.append(self.compile_statement(frame, statement)?);
        }
        Ok(out)
    }

    fn compile_statement(&mut self, frame: &mut Frame, statement: &Statement) -> Result<Code, CompileError> {
        match statement {
            Statement::Empty { .. } => Ok(Code::new()),

            Statement::Expression(Expr::Integral(exp)) => {
                let mut es = ExprScope::new();
                Ok(self.eval_integral(frame, &mut es, exp)?.0)
            }

            // a logical expression used for effect joins both targets on one label
            Statement::Expression(Expr::Logical(exp)) => {
                let label = self.new_label();
                let mut es = ExprScope::new();
                let mut out = self.eval_logical(frame, &mut es, exp, &label, &label)?;
                out.push(format!("{}{}:", TAB, label));
                Ok(out)
            }

            Statement::Declaration { name, ty, location } => {
                frame.declare_variable(&mut self.arena, name, *ty, *location)?;
                Ok(Code::new())
            }

            Statement::Block(block) => self.compile_block(frame, block),

            Statement::IfElse { condition, then_block, else_block, .. } => {
                let label = self.new_label();
                let (then_label, else_label, end_label) =
                    (format!("{}_then", label), format!("{}_else", label), format!("{}_end", label));

                let mut es = ExprScope::new();
                let mut out = self.eval_logical(frame, &mut es, condition, &then_label, &else_label)?;
                out.push_label(&then_label);
                out.append(self.compile_block(frame, then_block)?);
                out.push(format!("{}b {}", TAB, end_label));
                out.push_label(&else_label);
                out.append(self.compile_block(frame, else_block)?);
                out.push_label(&end_label);
                Ok(out)
            }

            Statement::While { condition, body, .. } => {
                let label = self.new_label();
                let (loop_label, body_label, end_label) =
                    (format!("{}_loop", label), format!("{}_body", label), format!("{}_end", label));

                frame.push_labeled_scope(end_label.clone(), Some(loop_label.clone()));
                let mut es = ExprScope::new();
                let mut out = Code::new();
                out.push_label(&loop_label);
                out.append(self.eval_logical(frame, &mut es, condition, &body_label, &end_label)?);
                out.push_label(&body_label);
                let body_code = self.compile_block(frame, body);
                frame.pop_scope();
                out.append(body_code?);
                out.push(format!("{}b {}", TAB, loop_label));
                out.push_label(&end_label);
                Ok(out)
            }

            Statement::For { initializer, condition, step, body, .. } => {
                let label = self.new_label();
                let loop_label = format!("{}_loop", label);
                let body_label = format!("{}_body", label);
                let step_label = format!("{}_step", label);
                let end_label = format!("{}_end", label);

                // initializer and step run in the loop's own scope, so
                // loop-scoped declarations shadow outer names
                frame.push_labeled_scope(end_label.clone(), Some(step_label.clone()));
                let result = (|| -> Result<Code, CompileError> {
                    let mut es = ExprScope::new();
                    let mut out = Code::new();
                    for init in initializer {
                        out.append(self.compile_statement(frame, init)?);
                    }
                    out.push_label(&loop_label);
                    out.append(self.eval_logical(frame, &mut es, condition, &body_label, &end_label)?);
                    out.push_label(&body_label);
                    out.append(self.compile_block(frame, body)?);
                    out.push_label(&step_label);
                    out.append(self.compile_statement(frame, step)?);
                    out.push(format!("{}b {}", TAB, loop_label));
                    out.push_label(&end_label);
                    Ok(out)
                })();
                frame.pop_scope();
                result
            }

            Statement::Switch(switch) => self.compile_switch(frame, switch),

            Statement::Continue { location } => {
                match frame.continue_label() {
                    Some(label) => Ok(Code::line(format!("{}b {}", TAB, label))),
                    None => Err(CompileError::new(*location, "no outer loop exists")),
                }
            }

            Statement::Break { location } => {
                match frame.break_label() {
                    Some(label) => Ok(Code::line(format!("{}b {}", TAB, label))),
                    None => Err(CompileError::new(*location, "no outer loop or switch statement exists")),
                }
            }

            Statement::Return { exp, location } => self.compile_return(frame, exp.as_ref(), *location),
        }
    }

    fn compile_switch(&mut self, frame: &mut Frame, switch: &SwitchStatement) -> Result<Code, CompileError> {
        let exp = switch
            .exp
            .as_ref()
            .ok_or_else(|| CompileError::new(switch.location, "switch statement has no expression"))?;

        let label = self.new_label();
        let case_label = format!("{}_case", label);
        let default_label = format!("{}_default", label);
        let end_label = format!("{}_end", label);

        let mut es = ExprScope::new();
        let (mut out, scrutinee) = self.eval_integral(frame, &mut es, exp)?;

        frame.push_labeled_scope(end_label.clone(), None);
        let result = (|| -> Result<Code, CompileError> {
            out.append(self.arena[scrutinee].load_value("$v0")?);
            for (i, case) in switch.cases.iter().enumerate() {
                if let Some(value) = case.value {
                    out.push(format!("{}beq $v0, {}, {}{}", TAB, value, case_label, i));
                }
            }
            // no default case means the dispatch falls straight to the end
            let has_default = switch.cases.iter().any(|c| c.value.is_none());
            out.push(format!("{}b {}", TAB, if has_default { &default_label } else { &end_label }));

            // bodies in declaration order; fall-through between cases is implicit
            for (i, case) in switch.cases.iter().enumerate() {
                match case.value {
                    Some(_) => out.push_label(&format!("{}{}", case_label, i)),
                    None => out.push_label(&default_label),
                }
                out.append(self.compile_statements(frame, &case.body)?);
            }
            out.push_label(&end_label);
            Ok(out)
        })();
        frame.pop_scope();
        result
    }

    fn compile_return(
        &mut self,
        frame: &mut Frame,
        exp: Option<&IntegralExpr>,
        location: Location,
    ) -> Result<Code, CompileError> {
        let return_type = frame.return_type;
        let mut out = Code::new();
        if let (Some(exp), true) = (exp, return_type.is_value()) {
            match precompute(exp) {
                Some(mut value) => {
                    if return_type == Type::CHAR {
                        value &= 0xff;
                    }
                    out.push(format!("{}li $v0, {}", TAB, value));
                }
                None => {
                    let mut es = ExprScope::new();
                    let (code, symbol) = self.eval_integral(frame, &mut es, exp)?;
                    out.append(code);
                    out.append(self.arena[symbol].load_value("$v0")?);
                    if return_type == Type::CHAR {
                        out.push(format!("{}and $v0, $v0, 0xff", TAB));
                    }
                }
            }
        } else if !(exp.is_none() && return_type == Type::Void) {
            return Err(CompileError::new(
                location,
                "return value type does not match function return type",
            ));
        }
        out.push(format!("{}b {}", TAB, frame.epilogue_label));
        Ok(out)
    }

    // ---- expressions ----

    /// Evaluate to a value. The emitted code leaves the value in a stack
    /// slot named by the returned symbol.
    fn eval_integral(
        &mut self,
        frame: &mut Frame,
        es: &mut ExprScope,
        exp: &IntegralExpr,
    ) -> Result<(Code, SymbolId), CompileError> {
        match exp {
            IntegralExpr::Constant { value, location } => {
                let symbol = frame.new_temp(&mut self.arena, es, Type::INT, *location);
                let mut code = Code::line(format!("{}li $v0, {}", TAB, value));
                code.append(self.arena[symbol].save_value("$v0")?);
                Ok((code, symbol))
            }

            IntegralExpr::Variable { name, location } => {
                let symbol = self
                    .resolve(frame, name)
                    .ok_or_else(|| undefined_symbol(*location, name))?;
                Ok((Code::new(), symbol))
            }

            IntegralExpr::ArrayAccess { name, index, location } => {
                let symbol = self
                    .resolve(frame, name)
                    .ok_or_else(|| undefined_symbol(*location, name))?;

                let mut inner = es.fork();
                let (mut code, index_symbol) = self.eval_integral(frame, &mut inner, index)?;

                if self.arena[symbol].ty.is_array() {
                    code.append(self.bounds_check(frame, symbol, index_symbol, index, *location)?);
                }

                let temp = frame.new_temp(&mut self.arena, es, Type::INT, *location);
                code.append(self.arena[index_symbol].load_value("$v0")?);
                code.append(self.arena[symbol].load_element("$v0", "$v0")?);
                code.append(self.arena[temp].save_value("$v0")?);
                Ok((code, temp))
            }

            IntegralExpr::Unary { op, exp, location } => {
                let mut inner = es.fork();
                let (mut code, child) = self.eval_integral(frame, &mut inner, exp)?;

                let symbol = frame.new_temp(&mut self.arena, es, Type::INT, *location);
                let instruction = match op {
                    UnaryOp::Plus => "move",
                    UnaryOp::Negate => "negu",
                    UnaryOp::Complement => "not",
                };
                code.append(self.arena[child].load_value("$v0")?);
                code.push(format!("{}{} $v0, $v0", TAB, instruction));
                code.append(self.arena[symbol].save_value("$v0")?);
                Ok((code, symbol))
            }

            IntegralExpr::Binary { op, exp1, exp2, location } => {
                if precompute(exp2) == Some(0) {
                    (self.sink)(*location, "divide by zero", "warning");
                }

                let mut inner = es.fork();
                let (code1, symbol1) = self.eval_integral(frame, &mut inner, exp1)?;
                let (code2, symbol2) = self.eval_integral(frame, &mut inner, exp2)?;

                let symbol = frame.new_temp(&mut self.arena, es, Type::INT, *location);
                let instruction = match op {
                    BinaryOp::Add => "addu",
                    BinaryOp::Sub => "subu",
                    BinaryOp::Mul => "mul",
                    BinaryOp::Div => "divu",
                    BinaryOp::And => "and",
                    BinaryOp::Or => "or",
                    BinaryOp::Xor => "xor",
                };
                let mut code = code1;
                code.append(code2);
                code.append(self.arena[symbol1].load_value("$v0")?);
                code.append(self.arena[symbol2].load_value("$v1")?);
                code.push(format!("{}{} $v0, $v0, $v1", TAB, instruction));
                code.append(self.arena[symbol].save_value("$v0")?);
                Ok((code, symbol))
            }

            IntegralExpr::Assignment { target, exp, .. } => {
                let mut inner = es.fork();
                let (mut code, value) = self.eval_integral(frame, &mut inner, exp)?;
                code.append(self.assign(frame, &mut inner, target, value)?);
                // the value of an assignment is the assigned value
                Ok((code, value))
            }

            IntegralExpr::Call { name, args, location } => self.eval_call(frame, es, name, args, *location),

            IntegralExpr::Cast { exp, location } => {
                let set_label = self.new_label();
                let clear_label = self.new_label();
                let join_label = self.new_label();
                let mut code = self.eval_logical(frame, es, exp, &set_label, &clear_label)?;

                let symbol = frame.new_temp(&mut self.arena, es, Type::INT, *location);
                code.push_label(&set_label);
                code.push(format!("{}li $v0, 1", TAB));
                code.push(format!("{}b {}", TAB, join_label));
                code.push_label(&clear_label);
                code.push(format!("{}move $v0, $zero", TAB));
                code.push_label(&join_label);
                code.append(self.arena[symbol].save_value("$v0")?);
                Ok((code, symbol))
            }
        }
    }

    fn eval_call(
        &mut self,
        frame: &mut Frame,
        es: &mut ExprScope,
        name: &str,
        args: &[IntegralExpr],
        location: Location,
    ) -> Result<(Code, SymbolId), CompileError> {
        let symbol = self
            .resolve(frame, name)
            .ok_or_else(|| CompileError::new(location, format!("function \"{}\" is not defined", name)))?;
        let (return_type, param_types) = match &self.arena[symbol] {
            Symbol { ty, kind: SymbolKind::Function { param_types }, .. } => (*ty, param_types.clone()),
            _ => {
                return Err(CompileError::new(
                    location,
                    format!("symbol \"{}\" is not a function", name),
                ))
            }
        };

        if param_types.len() != args.len() {
            return Err(CompileError::new(location, "incorrect number of arguments"));
        }

        let mut inner = es.fork();
        let mut symbols = Vec::new();
        let mut code = Code::new();
        for (arg, param_type) in args.iter().zip(&param_types) {
            let (arg_code, arg_symbol) = self.eval_integral(frame, &mut inner, arg)?;
            let arg_type = self.arena[arg_symbol].ty;
            if !param_type.compatible_with(&arg_type) {
                return Err(CompileError::new(
                    location,
                    format!(
                        "argument of type {} is not compatible with type {}",
                        param_type, arg_type
                    ),
                ));
            }
            symbols.push(arg_symbol);
            code.append(arg_code);
        }

        for (i, (&arg_symbol, param_type)) in symbols.iter().zip(&param_types).enumerate() {
            let reg = format!("$a{}", i);
            code.append(self.arena[arg_symbol].load_value(&reg)?);
            if *param_type == Type::CHAR {
                code.push(format!("{}and {}, {}, 0xff", TAB, reg, reg));
            }
        }

        code.push(format!("{}jal {}", TAB, name));

        let result = if return_type == Type::Void {
            self.arena.alloc_void(location)
        } else {
            let temp = frame.new_temp(&mut self.arena, es, Type::INT, location);
            code.append(self.arena[temp].save_value("$v0")?);
            temp
        };
        Ok((code, result))
    }

    /// Store `value` into an assignment target.
    fn assign(
        &mut self,
        frame: &mut Frame,
        es: &mut ExprScope,
        target: &LValue,
        value: SymbolId,
    ) -> Result<Code, CompileError> {
        match target {
            LValue::Variable { name, location } => {
                let symbol = self
                    .resolve(frame, name)
                    .ok_or_else(|| undefined_symbol(*location, name))?;
                let mut code = self.arena[value].load_value("$v0")?;
                code.append(self.arena[symbol].save_value("$v0")?);
                Ok(code)
            }
            LValue::ArrayAccess { name, index, location } => {
                let symbol = self
                    .resolve(frame, name)
                    .ok_or_else(|| undefined_symbol(*location, name))?;

                let (mut code, index_symbol) = self.eval_integral(frame, es, index)?;
                if self.arena[symbol].ty.is_array() {
                    code.append(self.bounds_check(frame, symbol, index_symbol, index, *location)?);
                }
                code.append(self.arena[value].load_value("$v0")?);
                code.append(self.arena[index_symbol].load_value("$v1")?);
                code.append(self.arena[symbol].save_element("$v1", "$v0")?);
                Ok(code)
            }
        }
    }

    /// The static-and-dynamic guard pair in front of every array element
    /// access. Pointer accesses carry no known size and skip both.
    fn bounds_check(
        &mut self,
        frame: &Frame,
        array: SymbolId,
        index_symbol: SymbolId,
        index: &IntegralExpr,
        location: Location,
    ) -> Result<Code, CompileError> {
        let size = match self.arena[array].ty {
            Type::Array(_, size) => size,
            _ => return Ok(Code::new()),
        };

        if let Some(value) = precompute(index) {
            if value < 0 || value >= size as i32 {
                return Err(CompileError::new(location, "array index is out of bounds"));
            }
        }

        let trap = self
            .resolve(frame, "$out_of_bounds_error")
            .ok_or_else(|| undefined_symbol(location, "$out_of_bounds_error"))?;
        let error_label = self.new_label();
        let end_label = self.new_label();
        let mut code = Code::new();
        code.push(format!("{}# runtime array index bounds check", TAB));
        code.append(self.arena[index_symbol].load_value("$t0")?);
        code.push(format!("{}bltz $t0, {}", TAB, error_label));
        code.push(format!("{}bgeu $t0, {}, {}", TAB, size, error_label));
        code.push(format!("{}b {}", TAB, end_label));
        code.push_label(&error_label);
        code.push(format!("{}jal {}", TAB, self.arena[trap].name));
        code.push_label(&end_label);
        Ok(code)
    }

    /// Evaluate for control flow: the emitted code jumps to exactly one of
    /// the two labels and produces no value.
    fn eval_logical(
        &mut self,
        frame: &mut Frame,
        es: &mut ExprScope,
        exp: &LogicalExpr,
        true_label: &str,
        false_label: &str,
    ) -> Result<Code, CompileError> {
        match exp {
            LogicalExpr::Not { exp, .. } => {
                self.eval_logical(frame, es, exp, false_label, true_label)
            }

            LogicalExpr::Binary { op, exp1, exp2, .. } => {
                let inner_label = self.new_label();
                let mut code = match op {
                    LogicalOp::And => {
                        self.eval_logical(frame, es, exp1, &inner_label, false_label)?
                    }
                    LogicalOp::Or => self.eval_logical(frame, es, exp1, true_label, &inner_label)?,
                };
                code.push_label(&inner_label);
                code.append(self.eval_logical(frame, es, exp2, true_label, false_label)?);
                Ok(code)
            }

            LogicalExpr::Relational { op, exp1, exp2, .. } => {
                let mut inner = es.fork();
                let (code1, symbol1) = self.eval_integral(frame, &mut inner, exp1)?;
                let (code2, symbol2) = self.eval_integral(frame, &mut inner, exp2)?;

                let instruction = match op {
                    RelationalOp::Equal => "beq",
                    RelationalOp::NotEqual => "bne",
                    RelationalOp::Less => "blt",
                    RelationalOp::LessEqual => "ble",
                    RelationalOp::Greater => "bgt",
                    RelationalOp::GreaterEqual => "bge",
                };
                let mut code = code1;
                code.append(code2);
                code.append(self.arena[symbol1].load_value("$v0")?);
                code.append(self.arena[symbol2].load_value("$v1")?);
                code.push(format!("{}{} $v0, $v1, {}", TAB, instruction, true_label));
                code.push(format!("{}b {}", TAB, false_label));
                Ok(code)
            }

            LogicalExpr::Cast { exp, .. } => {
                let mut inner = es.fork();
                let (mut code, symbol) = self.eval_integral(frame, &mut inner, exp)?;
                code.append(self.arena[symbol].load_value("$v0")?);
                code.push(format!("{}beq $v0, $zero, {}", TAB, false_label));
                code.push(format!("{}b {}", TAB, true_label));
                Ok(code)
            }
        }
    }
}

fn undefined_symbol(location: Location, name: &str) -> CompileError {
    CompileError::new(location, format!("undefined symbol \"{}\"", name))
}

/// Escape a decoded string literal for an `.asciiz` directive.
fn escape_asm(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in literal.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out
}

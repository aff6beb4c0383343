// ----------------------------
// File: src/front/ast.rs
// ----------------------------
//! The typed AST produced by the parser.
//!
//! Expressions come in two evaluation styles. An integral expression emits
//! code leaving a 32-bit value in a stack temporary; a logical expression
//! emits control flow only, jumping to one of two caller-supplied labels.
//! The two explicit `Cast` variants bridge the styles and are inserted at
//! construction time wherever a parent demands the style its child does not
//! supply. Everything here is immutable once built, except that
//! `SwitchStatement` is populated incrementally while its body is parsed.

use std::fmt;

use super::semantics::const_eval::precompute;
use super::semantics::types::{Type, ValueType};
use super::token::{Location, SyntaxError};

const INDENT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
    Complement,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Plus => write!(f, "+"),
            UnaryOp::Negate => write!(f, "-"),
            UnaryOp::Complement => write!(f, "~"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Xor,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "&&"),
            LogicalOp::Or => write!(f, "||"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOp {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelationalOp::Equal => "==",
            RelationalOp::NotEqual => "!=",
            RelationalOp::Less => "<",
            RelationalOp::LessEqual => "<=",
            RelationalOp::Greater => ">",
            RelationalOp::GreaterEqual => ">=",
        };
        write!(f, "{}", s)
    }
}

/// Either evaluation style.
#[derive(Debug, Clone)]
pub enum Expr {
    Integral(IntegralExpr),
    Logical(LogicalExpr),
}

impl Expr {
    pub fn location(&self) -> Location {
        match self {
            Expr::Integral(e) => e.location(),
            Expr::Logical(e) => e.location(),
        }
    }

    /// Coerce to integral style, inserting a cast around logical children.
    pub fn into_integral(self) -> IntegralExpr {
        match self {
            Expr::Integral(e) => e,
            Expr::Logical(e) => IntegralExpr::Cast { location: e.location(), exp: Box::new(e) },
        }
    }

    /// Coerce to logical style, inserting a cast around integral children.
    pub fn into_logical(self) -> LogicalExpr {
        match self {
            Expr::Logical(e) => e,
            Expr::Integral(e) => LogicalExpr::Cast { location: e.location(), exp: Box::new(e) },
        }
    }
}

/// Assignment targets.
#[derive(Debug, Clone)]
pub enum LValue {
    Variable { name: String, location: Location },
    ArrayAccess { name: String, index: Box<IntegralExpr>, location: Location },
}

impl LValue {
    pub fn location(&self) -> Location {
        match self {
            LValue::Variable { location, .. } | LValue::ArrayAccess { location, .. } => *location,
        }
    }

    fn tree(&self, indent: usize) -> String {
        match self {
            LValue::Variable { name, .. } => format!("{:indent$}{}\n", "", name),
            LValue::ArrayAccess { name, index, .. } => {
                format!("{:indent$}{}[ ]\n{}", "", name, index.tree(indent + INDENT))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum IntegralExpr {
    Constant {
        value: i32,
        location: Location,
    },
    Variable {
        name: String,
        location: Location,
    },
    ArrayAccess {
        name: String,
        index: Box<IntegralExpr>,
        location: Location,
    },
    Unary {
        op: UnaryOp,
        exp: Box<IntegralExpr>,
        location: Location,
    },
    Binary {
        op: BinaryOp,
        exp1: Box<IntegralExpr>,
        exp2: Box<IntegralExpr>,
        location: Location,
    },
    Assignment {
        target: LValue,
        exp: Box<IntegralExpr>,
        location: Location,
    },
    Call {
        name: String,
        args: Vec<IntegralExpr>,
        location: Location,
    },
    /// Materializes a logical expression as 1 or 0.
    Cast {
        exp: Box<LogicalExpr>,
        location: Location,
    },
}

impl IntegralExpr {
    pub fn location(&self) -> Location {
        match self {
            IntegralExpr::Constant { location, .. }
            | IntegralExpr::Variable { location, .. }
            | IntegralExpr::ArrayAccess { location, .. }
            | IntegralExpr::Unary { location, .. }
            | IntegralExpr::Binary { location, .. }
            | IntegralExpr::Assignment { location, .. }
            | IntegralExpr::Call { location, .. }
            | IntegralExpr::Cast { location, .. } => *location,
        }
    }

    pub fn unary(op: UnaryOp, exp: Expr, op_location: Location) -> IntegralExpr {
        let location = op_location.to(exp.location());
        IntegralExpr::Unary { op, exp: Box::new(exp.into_integral()), location }
    }

    pub fn binary(op: BinaryOp, exp1: Expr, exp2: Expr) -> IntegralExpr {
        let location = exp1.location().to(exp2.location());
        IntegralExpr::Binary {
            op,
            exp1: Box::new(exp1.into_integral()),
            exp2: Box::new(exp2.into_integral()),
            location,
        }
    }

    pub fn assignment(target: LValue, exp: Expr) -> IntegralExpr {
        let location = target.location().to(exp.location());
        IntegralExpr::Assignment { target, exp: Box::new(exp.into_integral()), location }
    }

    /// A call may pass at most four arguments.
    pub fn call(name: String, args: Vec<Expr>, location: Location) -> Result<IntegralExpr, SyntaxError> {
        if args.len() > 4 {
            let excess = args[4].location().to(args[args.len() - 1].location());
            return Err(SyntaxError::new(
                excess,
                "more than 4 arguments cannot be passed in a function call",
            ));
        }
        let args = args.into_iter().map(Expr::into_integral).collect();
        Ok(IntegralExpr::Call { name, args, location })
    }

    pub fn tree(&self, indent: usize) -> String {
        match self {
            IntegralExpr::Constant { value, .. } => format!("{:indent$}{}\n", "", value),
            IntegralExpr::Variable { name, .. } => format!("{:indent$}{}\n", "", name),
            IntegralExpr::ArrayAccess { name, index, .. } => {
                format!("{:indent$}{}[ ]\n{}", "", name, index.tree(indent + INDENT))
            }
            IntegralExpr::Unary { op, exp, .. } => {
                format!("{:indent$}unary operator {}\n{}", "", op, exp.tree(indent + INDENT))
            }
            IntegralExpr::Binary { op, exp1, exp2, .. } => format!(
                "{:indent$}binary operator {}\n{}{}",
                "",
                op,
                exp1.tree(indent + INDENT),
                exp2.tree(indent + INDENT)
            ),
            IntegralExpr::Assignment { target, exp, .. } => format!(
                "{:indent$}assignment =\n{}{}",
                "",
                target.tree(indent + INDENT),
                exp.tree(indent + INDENT)
            ),
            IntegralExpr::Call { name, args, .. } => {
                let mut out = format!("{:indent$}call {}\n", "", name);
                for arg in args {
                    out += &arg.tree(indent + INDENT);
                }
                out
            }
            IntegralExpr::Cast { exp, .. } => {
                format!("{:indent$}cast to int\n{}", "", exp.tree(indent + INDENT))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum LogicalExpr {
    Not {
        exp: Box<LogicalExpr>,
        location: Location,
    },
    Binary {
        op: LogicalOp,
        exp1: Box<LogicalExpr>,
        exp2: Box<LogicalExpr>,
        location: Location,
    },
    Relational {
        op: RelationalOp,
        exp1: Box<IntegralExpr>,
        exp2: Box<IntegralExpr>,
        location: Location,
    },
    /// Branches on whether an integral expression is non-zero.
    Cast {
        exp: Box<IntegralExpr>,
        location: Location,
    },
}

impl LogicalExpr {
    pub fn location(&self) -> Location {
        match self {
            LogicalExpr::Not { location, .. }
            | LogicalExpr::Binary { location, .. }
            | LogicalExpr::Relational { location, .. }
            | LogicalExpr::Cast { location, .. } => *location,
        }
    }

    pub fn not(exp: Expr, op_location: Location) -> LogicalExpr {
        let location = op_location.to(exp.location());
        LogicalExpr::Not { exp: Box::new(exp.into_logical()), location }
    }

    pub fn binary(op: LogicalOp, exp1: Expr, exp2: Expr) -> LogicalExpr {
        let location = exp1.location().to(exp2.location());
        LogicalExpr::Binary {
            op,
            exp1: Box::new(exp1.into_logical()),
            exp2: Box::new(exp2.into_logical()),
            location,
        }
    }

    pub fn relational(op: RelationalOp, exp1: Expr, exp2: Expr) -> LogicalExpr {
        let location = exp1.location().to(exp2.location());
        LogicalExpr::Relational {
            op,
            exp1: Box::new(exp1.into_integral()),
            exp2: Box::new(exp2.into_integral()),
            location,
        }
    }

    pub fn tree(&self, indent: usize) -> String {
        match self {
            LogicalExpr::Not { exp, .. } => {
                format!("{:indent$}unary operator !\n{}", "", exp.tree(indent + INDENT))
            }
            LogicalExpr::Binary { op, exp1, exp2, .. } => format!(
                "{:indent$}binary operator {}\n{}{}",
                "",
                op,
                exp1.tree(indent + INDENT),
                exp2.tree(indent + INDENT)
            ),
            LogicalExpr::Relational { op, exp1, exp2, .. } => format!(
                "{:indent$}relational operator {}\n{}{}",
                "",
                op,
                exp1.tree(indent + INDENT),
                exp2.tree(indent + INDENT)
            ),
            LogicalExpr::Cast { exp, .. } => {
                format!("{:indent$}cast to bool\n{}", "", exp.tree(indent + INDENT))
            }
        }
    }
}

impl Expr {
    pub fn tree(&self, indent: usize) -> String {
        match self {
            Expr::Integral(e) => e.tree(indent),
            Expr::Logical(e) => e.tree(indent),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub location: Location,
}

impl Block {
    pub fn single(statement: Statement) -> Block {
        let location = statement.location();
        Block { statements: vec![statement], location }
    }

    pub fn empty(location: Location) -> Block {
        Block { statements: Vec::new(), location }
    }

    pub fn tree(&self, indent: usize) -> String {
        let mut out = format!("{:indent$}block\n", "");
        for s in &self.statements {
            out += &s.tree(indent + INDENT);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub enum Statement {
    Empty {
        location: Location,
    },
    Expression(Expr),
    Declaration {
        name: String,
        ty: Type,
        location: Location,
    },
    Block(Block),
    IfElse {
        condition: LogicalExpr,
        then_block: Block,
        else_block: Block,
        location: Location,
    },
    While {
        condition: LogicalExpr,
        body: Block,
        location: Location,
    },
    For {
        initializer: Vec<Statement>,
        condition: LogicalExpr,
        step: Box<Statement>,
        body: Block,
        location: Location,
    },
    Switch(SwitchStatement),
    Continue {
        location: Location,
    },
    Break {
        location: Location,
    },
    Return {
        exp: Option<IntegralExpr>,
        location: Location,
    },
}

impl Statement {
    pub fn location(&self) -> Location {
        match self {
            Statement::Empty { location }
            | Statement::Declaration { location, .. }
            | Statement::IfElse { location, .. }
            | Statement::While { location, .. }
            | Statement::For { location, .. }
            | Statement::Continue { location }
            | Statement::Break { location }
            | Statement::Return { location, .. } => *location,
            Statement::Expression(e) => e.location(),
            Statement::Block(b) => b.location,
            Statement::Switch(s) => s.location,
        }
    }

    pub fn return_value(exp: Expr, location: Location) -> Statement {
        Statement::Return { exp: Some(exp.into_integral()), location }
    }

    pub fn tree(&self, indent: usize) -> String {
        match self {
            Statement::Empty { .. } => format!("{:indent$}empty statement\n", ""),
            Statement::Expression(e) => e.tree(indent),
            Statement::Declaration { name, ty, .. } => {
                format!("{:indent$}{} : {}\n", "", name, ty)
            }
            Statement::Block(b) => b.tree(indent),
            Statement::IfElse { condition, then_block, else_block, .. } => {
                let inner = indent + INDENT;
                format!(
                    "{:indent$}if\n{:inner$}condition\n{}{:inner$}then\n{}{:inner$}else\n{}",
                    "",
                    "",
                    condition.tree(indent + 2 * INDENT),
                    "",
                    then_block.tree(indent + 2 * INDENT),
                    "",
                    else_block.tree(indent + 2 * INDENT)
                )
            }
            Statement::While { condition, body, .. } => {
                let inner = indent + INDENT;
                format!(
                    "{:indent$}while\n{:inner$}condition\n{}{:inner$}do\n{}",
                    "",
                    "",
                    condition.tree(indent + 2 * INDENT),
                    "",
                    body.tree(indent + 2 * INDENT)
                )
            }
            Statement::For { initializer, condition, step, body, .. } => {
                let inner = indent + INDENT;
                let mut out = format!("{:indent$}for\n{:inner$}init\n", "", "");
                for i in initializer {
                    out += &i.tree(indent + 2 * INDENT);
                }
                out += &format!("{:inner$}condition\n", "");
                out += &condition.tree(indent + 2 * INDENT);
                out += &format!("{:inner$}step\n", "");
                out += &step.tree(indent + 2 * INDENT);
                out += &format!("{:inner$}do\n", "");
                out += &body.tree(indent + 2 * INDENT);
                out
            }
            Statement::Switch(s) => s.tree(indent),
            Statement::Continue { .. } => format!("{:indent$}continue\n", ""),
            Statement::Break { .. } => format!("{:indent$}break\n", ""),
            Statement::Return { exp, .. } => {
                let mut out = format!("{:indent$}return\n", "");
                if let Some(e) = exp {
                    out += &e.tree(indent + INDENT);
                }
                out
            }
        }
    }
}

/// One `case` (or `default`, when `value` is absent) arm and the statements
/// that follow it up to the next arm. Fall-through is implicit.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub value: Option<i32>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct SwitchStatement {
    pub exp: Option<IntegralExpr>,
    pub cases: Vec<SwitchCase>,
    pub location: Location,
}

impl SwitchStatement {
    pub fn new(location: Location) -> Self {
        Self { exp: None, cases: Vec::new(), location }
    }

    pub fn set_expression(&mut self, exp: Expr) {
        self.exp = Some(exp.into_integral());
    }

    /// Case values must be compile-time constants, unique within the switch.
    pub fn add_case(&mut self, value_exp: Expr, location: Location) -> Result<(), SyntaxError> {
        let integral = value_exp.into_integral();
        let value = precompute(&integral).ok_or_else(|| {
            SyntaxError::new(location, "case value must be a compile-time constant expression")
        })?;
        if self.cases.iter().any(|c| c.value == Some(value)) {
            return Err(SyntaxError::new(location, "redeclaration of a case with the same value"));
        }
        self.cases.push(SwitchCase { value: Some(value), body: Vec::new() });
        Ok(())
    }

    pub fn add_default_case(&mut self, location: Location) -> Result<(), SyntaxError> {
        if self.cases.iter().any(|c| c.value.is_none()) {
            return Err(SyntaxError::new(location, "redeclaration of the default case"));
        }
        self.cases.push(SwitchCase { value: None, body: Vec::new() });
        Ok(())
    }

    pub fn add_statement(&mut self, statement: Statement) -> Result<(), SyntaxError> {
        match self.cases.last_mut() {
            Some(case) => {
                case.body.push(statement);
                Ok(())
            }
            None => Err(SyntaxError::new(
                statement.location(),
                "no case declared before this statement",
            )),
        }
    }

    pub fn tree(&self, indent: usize) -> String {
        let inner = indent + INDENT;
        let mut out = format!("{:indent$}switch\n{:inner$}on\n", "", "");
        if let Some(exp) = &self.exp {
            out += &exp.tree(indent + 2 * INDENT);
        }
        for case in &self.cases {
            match case.value {
                Some(v) => out += &format!("{:inner$}case {}\n", "", v),
                None => out += &format!("{:inner$}default\n", ""),
            }
            for s in &case.body {
                out += &s.tree(indent + 2 * INDENT);
            }
        }
        out
    }
}

/// How a global was initialized in the source.
#[derive(Debug, Clone)]
pub enum FieldInitializer {
    Expression(Expr),
    Literal(String, Location),
}

/// The initializer after construction-time validation.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Scalar(i32),
    Literal(String),
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: Type,
    pub value: Option<FieldValue>,
    pub location: Location,
}

impl FieldDefinition {
    pub fn new(
        name: String,
        ty: Type,
        initializer: Option<FieldInitializer>,
        location: Location,
    ) -> Result<Self, SyntaxError> {
        let value = match initializer {
            None => None,
            Some(FieldInitializer::Expression(exp)) => {
                let location = location.to(exp.location());
                if !ty.is_value() {
                    return Err(SyntaxError::new(
                        location,
                        "an array can only be initialized by a string literal",
                    ));
                }
                let integral = exp.into_integral();
                let value = precompute(&integral).ok_or_else(|| {
                    SyntaxError::new(
                        location,
                        "value assigned to a global variable must be a constant expression",
                    )
                })?;
                Some(FieldValue::Scalar(value))
            }
            Some(FieldInitializer::Literal(literal, literal_location)) => {
                let location = location.to(literal_location);
                match ty {
                    Type::Array(ValueType::Char, _) => {
                        if literal.len() as u32 + 1 > ty.width() {
                            return Err(SyntaxError::new(
                                location,
                                "the assigned string literal does not fit in the array",
                            ));
                        }
                        Some(FieldValue::Literal(literal))
                    }
                    _ => {
                        return Err(SyntaxError::new(
                            location,
                            "a string literal can only initialize an array of characters",
                        ))
                    }
                }
            }
        };
        Ok(Self { name, ty, value, location })
    }

    pub fn tree(&self, indent: usize) -> String {
        let mut out = format!("{:indent$}variable {} : {}", "", self.name, self.ty);
        match &self.value {
            Some(FieldValue::Scalar(v)) => out += &format!(" = {}", v),
            Some(FieldValue::Literal(s)) => out += &format!(" = \"{}\"", s),
            None => {}
        }
        out + "\n"
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Parameter>,
    pub body: Block,
    pub location: Location,
}

impl FunctionDefinition {
    /// A function may declare at most four parameters.
    pub fn new(
        name: String,
        return_type: Type,
        params: Vec<Parameter>,
        body: Block,
        location: Location,
    ) -> Result<Self, SyntaxError> {
        if params.len() > 4 {
            let excess = params[4].location.to(params[params.len() - 1].location);
            return Err(SyntaxError::new(
                excess,
                "a function definition cannot have more than 4 input parameters",
            ));
        }
        Ok(Self { name, return_type, params, body, location })
    }

    pub fn tree(&self, indent: usize) -> String {
        let inner = indent + INDENT;
        let mut out = format!("{:indent$}function {} : {}\n", "", self.name, self.return_type);
        if !self.params.is_empty() {
            out += &format!("{:inner$}parameters\n", "");
            for p in &self.params {
                out += &format!("{:w$}{} : {}\n", "", p.name, p.ty, w = indent + 2 * INDENT);
            }
        }
        out += &format!("{:inner$}body\n", "");
        out += &self.body.tree(indent + 2 * INDENT);
        out
    }
}

/// The entry function. Unlike a regular function it has no parameters and
/// terminates by jumping into the runtime instead of returning.
#[derive(Debug, Clone)]
pub struct MainDefinition {
    pub return_type: Type,
    pub body: Block,
    pub location: Location,
}

impl MainDefinition {
    pub fn tree(&self, indent: usize) -> String {
        let inner = indent + INDENT;
        format!(
            "{:indent$}function main : {}\n{:inner$}body\n{}",
            "",
            self.return_type,
            "",
            self.body.tree(indent + 2 * INDENT)
        )
    }
}

#[derive(Debug, Clone)]
pub enum Definition {
    Field(FieldDefinition),
    Function(FunctionDefinition),
    Main(MainDefinition),
}

impl Definition {
    pub fn tree(&self, indent: usize) -> String {
        match self {
            Definition::Field(f) => f.tree(indent),
            Definition::Function(f) => f.tree(indent),
            Definition::Main(m) => m.tree(indent),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Program {
    pub definitions: Vec<Definition>,
}

impl Program {
    pub fn tree(&self) -> String {
        let mut out = String::from("program\n");
        for d in &self.definitions {
            out += &d.tree(INDENT);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front::semantics::types::ValueType;

    fn constant(value: i32) -> Expr {
        Expr::Integral(IntegralExpr::Constant { value, location: Location::default() })
    }

    #[test]
    fn coercion_wraps_only_the_opposite_style() {
        let int = constant(1).into_integral();
        assert!(matches!(int, IntegralExpr::Constant { .. }));

        let logical = constant(1).into_logical();
        assert!(matches!(logical, LogicalExpr::Cast { .. }));

        let relation = LogicalExpr::relational(RelationalOp::Less, constant(1), constant(2));
        let back = Expr::Logical(relation).into_integral();
        assert!(matches!(back, IntegralExpr::Cast { .. }));
    }

    #[test]
    fn call_rejects_a_fifth_argument() {
        let args = (0..5).map(constant).collect();
        let err = IntegralExpr::call("f".into(), args, Location::default()).unwrap_err();
        assert!(err.message.contains("more than 4 arguments"));

        let args = (0..4).map(constant).collect();
        assert!(IntegralExpr::call("f".into(), args, Location::default()).is_ok());
    }

    #[test]
    fn function_rejects_a_fifth_parameter() {
        let param = |name: &str| Parameter {
            name: name.into(),
            ty: Type::INT,
            location: Location::point(1, 10),
        };
        let body = Block::empty(Location::default());
        let err = FunctionDefinition::new(
            "f".into(),
            Type::Void,
            vec![param("a"), param("b"), param("c"), param("d"), param("e")],
            body,
            Location::default(),
        )
        .unwrap_err();
        assert!(err.message.contains("more than 4 input parameters"));
    }

    #[test]
    fn switch_case_values_must_be_unique_constants() {
        let mut switch = SwitchStatement::new(Location::default());
        switch.set_expression(constant(0));
        switch.add_case(constant(1), Location::point(2, 1)).unwrap();
        let err = switch.add_case(constant(1), Location::point(3, 1)).unwrap_err();
        assert_eq!(err.location, Location::point(3, 1));
        assert!(err.message.contains("redeclaration of a case"));

        // constant-folded values collide too
        let sum = Expr::Integral(IntegralExpr::binary(BinaryOp::Add, constant(0), constant(1)));
        assert!(switch.add_case(sum, Location::point(4, 1)).is_err());

        let variable = Expr::Integral(IntegralExpr::Variable {
            name: "x".into(),
            location: Location::default(),
        });
        let err = switch.add_case(variable, Location::point(5, 1)).unwrap_err();
        assert!(err.message.contains("compile-time constant"));
    }

    #[test]
    fn switch_allows_one_default_and_requires_a_leading_case() {
        let mut switch = SwitchStatement::new(Location::default());
        let err = switch
            .add_statement(Statement::Break { location: Location::default() })
            .unwrap_err();
        assert!(err.message.contains("no case declared"));

        switch.add_default_case(Location::default()).unwrap();
        switch.add_statement(Statement::Break { location: Location::default() }).unwrap();
        let err = switch.add_default_case(Location::point(9, 1)).unwrap_err();
        assert!(err.message.contains("redeclaration of the default case"));
    }

    #[test]
    fn global_scalar_initializer_must_be_constant() {
        let folded = Expr::Integral(IntegralExpr::binary(
            BinaryOp::Add,
            constant(2),
            Expr::Integral(IntegralExpr::binary(BinaryOp::Mul, constant(3), constant(4))),
        ));
        let field = FieldDefinition::new(
            "x".into(),
            Type::INT,
            Some(FieldInitializer::Expression(folded)),
            Location::default(),
        )
        .unwrap();
        assert!(matches!(field.value, Some(FieldValue::Scalar(14))));

        let variable = Expr::Integral(IntegralExpr::Variable {
            name: "y".into(),
            location: Location::default(),
        });
        let err = FieldDefinition::new(
            "x".into(),
            Type::INT,
            Some(FieldInitializer::Expression(variable)),
            Location::default(),
        )
        .unwrap_err();
        assert!(err.message.contains("constant expression"));
    }

    #[test]
    fn string_initializers_must_fit_a_char_array() {
        let init = |s: &str| Some(FieldInitializer::Literal(s.into(), Location::default()));

        let ok = FieldDefinition::new(
            "s".into(),
            Type::Array(ValueType::Char, 6),
            init("hi"),
            Location::default(),
        )
        .unwrap();
        assert!(matches!(ok.value, Some(FieldValue::Literal(_))));

        // length 2 plus the NUL does not fit in 2 bytes
        let err = FieldDefinition::new(
            "s".into(),
            Type::Array(ValueType::Char, 2),
            init("hi"),
            Location::default(),
        )
        .unwrap_err();
        assert!(err.message.contains("does not fit"));

        let err = FieldDefinition::new(
            "a".into(),
            Type::Array(ValueType::Int, 4),
            init("hi"),
            Location::default(),
        )
        .unwrap_err();
        assert!(err.message.contains("array of characters"));
    }
}

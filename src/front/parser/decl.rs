// ----------------------------
// File: src/front/parser/decl.rs
// ----------------------------
//! Parsing of top-level definitions, types and declarations.

use tracing::debug;

use super::Parser;
use crate::front::ast::{
    Definition, FieldDefinition, FieldInitializer, FunctionDefinition, MainDefinition, Parameter,
    Statement,
};
use crate::front::semantics::const_eval::precompute;
use crate::front::semantics::types::{Type, ValueType};
use crate::front::token::{Location, SyntaxError, Token, TokenKind as K};

impl Parser {
    pub(super) fn parse_definition(&mut self) -> Result<Definition, SyntaxError> {
        let token = match self.ts.peek() {
            Some(t) => t.clone(),
            None => {
                return Err(SyntaxError::new(
                    self.ts.location(),
                    "expected definition but found end of input",
                ))
            }
        };
        let value_type = match token.kind {
            K::Void => {
                self.ts.bump();
                None
            }
            K::Int | K::Char => Some(self.parse_value_type()?.0),
            other => {
                return Err(SyntaxError::new(
                    token.location,
                    format!("expected definition but found {}", other.describe()),
                ))
            }
        };
        let (name, name_location) = self.ts.expect_identifier()?;
        let location = token.location.to(name_location);

        if self.ts.check(&K::LeftParen) {
            let return_type = value_type.map(Type::Value).unwrap_or(Type::Void);
            self.parse_function(return_type, name, location)
        } else {
            match value_type {
                Some(value_type) => self.parse_field(value_type, name, location),
                None => Err(SyntaxError::new(
                    location,
                    format!("variable \"{}\" cannot be declared \"void\"", name),
                )),
            }
        }
    }

    fn parse_field(
        &mut self,
        value_type: ValueType,
        name: String,
        location: Location,
    ) -> Result<Definition, SyntaxError> {
        debug!(target: "mcc::parse", "global variable {}", name);
        let ty = self.parse_array_suffix(value_type)?;

        let initializer = if self.ts.eat(&K::Assign) {
            match self.ts.peek() {
                Some(Token { kind: K::StringLiteral(_), .. }) => {
                    let token = self.ts.bump().expect("peeked token");
                    match token.kind {
                        K::StringLiteral(literal) => {
                            Some(FieldInitializer::Literal(literal, token.location))
                        }
                        _ => unreachable!(),
                    }
                }
                _ => Some(FieldInitializer::Expression(self.parse_expression()?)),
            }
        } else {
            None
        };
        self.ts.expect(&K::Semicolon)?;

        let field = FieldDefinition::new(name, ty, initializer, location)?;
        Ok(Definition::Field(field))
    }

    fn parse_function(
        &mut self,
        return_type: Type,
        name: String,
        location: Location,
    ) -> Result<Definition, SyntaxError> {
        debug!(target: "mcc::parse", "function {}", name);
        self.ts.expect(&K::LeftParen)?;
        let mut params = Vec::new();
        if !self.ts.check(&K::RightParen) {
            loop {
                params.push(self.parse_parameter()?);
                if !self.ts.eat(&K::Comma) {
                    break;
                }
            }
        }
        self.ts.expect(&K::RightParen)?;
        let body = self.parse_block()?;

        if name == "main" {
            if let Some(param) = params.first() {
                return Err(SyntaxError::new(
                    param.location,
                    "function \"main\" cannot declare parameters",
                ));
            }
            return Ok(Definition::Main(MainDefinition { return_type, body, location }));
        }
        let function = FunctionDefinition::new(name, return_type, params, body, location)?;
        Ok(Definition::Function(function))
    }

    /// `type name`, `type* name` — pointers appear only here.
    fn parse_parameter(&mut self) -> Result<Parameter, SyntaxError> {
        let (value_type, type_location) = self.parse_value_type()?;
        let ty = if self.ts.eat(&K::Star) {
            Type::Pointer(value_type)
        } else {
            Type::Value(value_type)
        };
        let (name, name_location) = self.ts.expect_identifier()?;
        Ok(Parameter { name, ty, location: type_location.to(name_location) })
    }

    /// `type name` or `type name[size]`, without the trailing semicolon so
    /// for-loop initializers can share it.
    pub(super) fn parse_local_declaration(&mut self) -> Result<Statement, SyntaxError> {
        let (value_type, type_location) = self.parse_value_type()?;
        let (name, name_location) = self.ts.expect_identifier()?;
        let ty = self.parse_array_suffix(value_type)?;
        if self.ts.check(&K::Assign) {
            return Err(SyntaxError::new(
                self.ts.location(),
                "a local variable declaration cannot have an initializer",
            ));
        }
        Ok(Statement::Declaration { name, ty, location: type_location.to(name_location) })
    }

    fn parse_value_type(&mut self) -> Result<(ValueType, Location), SyntaxError> {
        match self.ts.peek() {
            Some(Token { kind: K::Int, location }) => {
                let location = *location;
                self.ts.bump();
                Ok((ValueType::Int, location))
            }
            Some(Token { kind: K::Char, location }) => {
                let location = *location;
                self.ts.bump();
                Ok((ValueType::Char, location))
            }
            Some(t) => Err(SyntaxError::new(
                t.location,
                format!("expected a type but found {}", t.kind.describe()),
            )),
            None => Err(SyntaxError::new(self.ts.location(), "expected a type but found end of input")),
        }
    }

    /// `[size]` turns a value type into an array type. The size must be a
    /// positive compile-time constant.
    fn parse_array_suffix(&mut self, value_type: ValueType) -> Result<Type, SyntaxError> {
        if !self.ts.eat(&K::LeftBracket) {
            return Ok(Type::Value(value_type));
        }
        let size_exp = self.parse_expression()?;
        let size_location = size_exp.location();
        self.ts.expect(&K::RightBracket)?;

        let size = precompute(&size_exp.into_integral()).filter(|&s| s > 0).ok_or_else(|| {
            SyntaxError::new(size_location, "array size must be a positive compile-time constant")
        })?;
        Ok(Type::Array(value_type, size as u32))
    }
}

// ----------------------------
// File: src/front/parser/stmt.rs
// ----------------------------
//! Parsing of statements: blocks, control flow, jumps and local
//! declarations.

use super::Parser;
use crate::front::ast::{Block, Statement, SwitchStatement};
use crate::front::token::{SyntaxError, TokenKind as K};

impl Parser {
    pub(super) fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        let token = match self.ts.peek() {
            Some(t) => t.clone(),
            None => {
                return Err(SyntaxError::new(
                    self.ts.location(),
                    "expected statement but found end of input",
                ))
            }
        };
        match token.kind {
            K::Semicolon => {
                self.ts.bump();
                Ok(Statement::Empty { location: token.location })
            }
            K::LeftBrace => Ok(Statement::Block(self.parse_block()?)),
            K::Int | K::Char => {
                let declaration = self.parse_local_declaration()?;
                self.ts.expect(&K::Semicolon)?;
                Ok(declaration)
            }
            K::If => self.parse_if(),
            K::While => self.parse_while(),
            K::For => self.parse_for(),
            K::Switch => self.parse_switch(),
            K::Break => {
                self.ts.bump();
                self.ts.expect(&K::Semicolon)?;
                Ok(Statement::Break { location: token.location })
            }
            K::Continue => {
                self.ts.bump();
                self.ts.expect(&K::Semicolon)?;
                Ok(Statement::Continue { location: token.location })
            }
            K::Return => {
                self.ts.bump();
                if self.ts.eat(&K::Semicolon) {
                    Ok(Statement::Return { exp: None, location: token.location })
                } else {
                    let exp = self.parse_expression()?;
                    self.ts.expect(&K::Semicolon)?;
                    Ok(Statement::return_value(exp, token.location))
                }
            }
            _ => {
                let exp = self.parse_expression()?;
                self.ts.expect(&K::Semicolon)?;
                Ok(Statement::Expression(exp))
            }
        }
    }

    pub(super) fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let open = self.ts.expect(&K::LeftBrace)?;
        let mut statements = Vec::new();
        while !self.ts.check(&K::RightBrace) {
            if self.ts.at_end() {
                return Err(SyntaxError::new(self.ts.location(), "expected \"}\" but found end of input"));
            }
            statements.push(self.parse_statement()?);
        }
        let close = self.ts.expect(&K::RightBrace)?;
        Ok(Block { statements, location: open.location.to(close.location) })
    }

    /// A loop or branch body: a block, or a single statement wrapped in one.
    fn parse_body(&mut self) -> Result<Block, SyntaxError> {
        match self.parse_statement()? {
            Statement::Block(block) => Ok(block),
            statement => Ok(Block::single(statement)),
        }
    }

    fn parse_if(&mut self) -> Result<Statement, SyntaxError> {
        let token = self.ts.expect(&K::If)?;
        self.ts.expect(&K::LeftParen)?;
        let condition = self.parse_expression()?;
        self.ts.expect(&K::RightParen)?;
        let then_block = self.parse_body()?;
        let else_block = if self.ts.eat(&K::Else) {
            self.parse_body()?
        } else {
            Block::empty(token.location)
        };
        Ok(Statement::IfElse {
            condition: condition.into_logical(),
            then_block,
            else_block,
            location: token.location,
        })
    }

    fn parse_while(&mut self) -> Result<Statement, SyntaxError> {
        let token = self.ts.expect(&K::While)?;
        self.ts.expect(&K::LeftParen)?;
        let condition = self.parse_expression()?;
        self.ts.expect(&K::RightParen)?;
        let body = self.parse_body()?;
        Ok(Statement::While {
            condition: condition.into_logical(),
            body,
            location: token.location,
        })
    }

    fn parse_for(&mut self) -> Result<Statement, SyntaxError> {
        let token = self.ts.expect(&K::For)?;
        self.ts.expect(&K::LeftParen)?;

        // comma-separated declarations and expressions, possibly none
        let mut initializer = Vec::new();
        if !self.ts.check(&K::Semicolon) {
            loop {
                if self.ts.check(&K::Int) || self.ts.check(&K::Char) {
                    initializer.push(self.parse_local_declaration()?);
                } else {
                    initializer.push(Statement::Expression(self.parse_expression()?));
                }
                if !self.ts.eat(&K::Comma) {
                    break;
                }
            }
        }
        self.ts.expect(&K::Semicolon)?;

        let condition = self.parse_expression()?;
        self.ts.expect(&K::Semicolon)?;

        let step = Statement::Expression(self.parse_expression()?);
        self.ts.expect(&K::RightParen)?;

        let body = self.parse_body()?;
        Ok(Statement::For {
            initializer,
            condition: condition.into_logical(),
            step: Box::new(step),
            body,
            location: token.location,
        })
    }

    fn parse_switch(&mut self) -> Result<Statement, SyntaxError> {
        let token = self.ts.expect(&K::Switch)?;
        let mut switch = SwitchStatement::new(token.location);

        self.ts.expect(&K::LeftParen)?;
        switch.set_expression(self.parse_expression()?);
        self.ts.expect(&K::RightParen)?;

        self.ts.expect(&K::LeftBrace)?;
        loop {
            let token = match self.ts.peek() {
                Some(t) => t.clone(),
                None => {
                    return Err(SyntaxError::new(
                        self.ts.location(),
                        "expected \"}\" but found end of input",
                    ))
                }
            };
            match token.kind {
                K::RightBrace => {
                    self.ts.bump();
                    break;
                }
                K::Case => {
                    self.ts.bump();
                    let value = self.parse_expression()?;
                    let location = token.location.to(value.location());
                    self.ts.expect(&K::Colon)?;
                    switch.add_case(value, location)?;
                }
                K::Default => {
                    self.ts.bump();
                    let colon = self.ts.expect(&K::Colon)?;
                    switch.add_default_case(token.location.to(colon.location))?;
                }
                _ => switch.add_statement(self.parse_statement()?)?,
            }
        }
        Ok(Statement::Switch(switch))
    }
}

// ----------------------------
// File: src/front/parser/mod.rs
// ----------------------------
//! Recursive-descent parser producing the typed AST directly; integral/
//! logical coercions are inserted by the node constructors as the tree is
//! built.

mod decl;
mod expr;
mod stmt;
mod stream;

pub use stream::TokenStream;

use crate::front::ast::Program;
use crate::front::token::{Location, SyntaxError, Token};

pub struct Parser {
    ts: TokenStream,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, end: Location) -> Self {
        Self { ts: TokenStream::new(tokens, end) }
    }

    pub fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let mut definitions = Vec::new();
        while !self.ts.at_end() {
            definitions.push(self.parse_definition()?);
        }
        Ok(Program { definitions })
    }
}

/// Parse a whole token buffer into a program.
pub fn parse_program(tokens: Vec<Token>, end: Location) -> Result<Program, SyntaxError> {
    Parser::new(tokens, end).parse_program()
}

#[cfg(test)]
mod tests {
    use crate::front::ast::{Definition, FieldValue, IntegralExpr, LogicalExpr, Statement};
    use crate::front::lexer::{end_location, tokenize};
    use crate::front::semantics::types::{Type, ValueType};
    use crate::front::token::SyntaxError;

    fn parse(source: &str) -> Result<crate::front::ast::Program, SyntaxError> {
        super::parse_program(tokenize(source).unwrap(), end_location(source))
    }

    #[test]
    fn global_scalar_folds_its_initializer() {
        let program = parse("int x = 2 + 3 * 4;").unwrap();
        match &program.definitions[0] {
            Definition::Field(f) => {
                assert_eq!(f.name, "x");
                assert_eq!(f.ty, Type::INT);
                assert!(matches!(f.value, Some(FieldValue::Scalar(14))));
            }
            other => panic!("expected a field, got {:?}", other),
        }
    }

    #[test]
    fn global_array_sizes_must_be_positive_constants() {
        let program = parse("char s[6];").unwrap();
        match &program.definitions[0] {
            Definition::Field(f) => assert_eq!(f.ty, Type::Array(ValueType::Char, 6)),
            other => panic!("expected a field, got {:?}", other),
        }
        assert!(parse("int a[0];").is_err());
        assert!(parse("int a[-1];").is_err());
        assert!(parse("int n; int a[n];").is_err());
    }

    #[test]
    fn oversize_string_initializer_is_rejected() {
        let err = parse("char s[2] = \"hi\";").unwrap_err();
        assert!(err.message.contains("does not fit"));
        assert!(parse("char s[3] = \"hi\";").is_ok());
    }

    #[test]
    fn main_may_not_declare_parameters() {
        assert!(matches!(
            parse("void main() { }").unwrap().definitions[0],
            Definition::Main(_)
        ));
        let err = parse("int main(int argc) { }").unwrap_err();
        assert!(err.message.contains("main"));
    }

    #[test]
    fn functions_take_value_and_pointer_parameters() {
        let program = parse("void f(int a, char* s) { }").unwrap();
        match &program.definitions[0] {
            Definition::Function(f) => {
                assert_eq!(f.params.len(), 2);
                assert_eq!(f.params[0].ty, Type::INT);
                assert_eq!(f.params[1].ty, Type::CHAR_POINTER);
            }
            other => panic!("expected a function, got {:?}", other),
        }
    }

    #[test]
    fn a_fifth_parameter_is_a_syntax_error() {
        let err = parse("void f(int a, int b, int c, int d, int e) { }").unwrap_err();
        assert!(err.message.contains("more than 4 input parameters"));
    }

    #[test]
    fn duplicate_case_value_errors_at_the_second_case() {
        let err = parse(
            "void main() { int x; switch (x) { case 1: break; case 1: break; } }",
        )
        .unwrap_err();
        assert!(err.message.contains("redeclaration of a case"));
        assert_eq!(err.location.line, 1);

        let err = parse("void main() { int x; switch (x) { x = 1; } }").unwrap_err();
        assert!(err.message.contains("no case declared"));
    }

    #[test]
    fn conditions_become_logical_expressions() {
        let program = parse("void main() { int a; if (a) a = 1; }").unwrap();
        let main = match &program.definitions[0] {
            Definition::Main(m) => m,
            other => panic!("expected main, got {:?}", other),
        };
        match &main.body.statements[1] {
            Statement::IfElse { condition, .. } => {
                assert!(matches!(condition, LogicalExpr::Cast { .. }));
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn logical_operands_in_arithmetic_are_cast_back() {
        let program = parse("void main() { int a; a = (a < 1) + 1; }").unwrap();
        let main = match &program.definitions[0] {
            Definition::Main(m) => m,
            other => panic!("expected main, got {:?}", other),
        };
        match &main.body.statements[1] {
            Statement::Expression(e) => {
                let assignment = e.clone().into_integral();
                match assignment {
                    IntegralExpr::Assignment { exp, .. } => match *exp {
                        IntegralExpr::Binary { exp1, .. } => {
                            assert!(matches!(*exp1, IntegralExpr::Cast { .. }));
                        }
                        other => panic!("expected binary, got {:?}", other),
                    },
                    other => panic!("expected assignment, got {:?}", other),
                }
            }
            other => panic!("expected expression, got {:?}", other),
        }
    }

    #[test]
    fn assignment_targets_are_restricted() {
        assert!(parse("void main() { int a; a = 1; }").is_ok());
        assert!(parse("void main() { int a[4]; a[1] = 1; }").is_ok());
        let err = parse("void main() { int a; 1 = a; }").unwrap_err();
        assert!(err.message.contains("assignment target"));
    }

    #[test]
    fn local_initializers_are_rejected() {
        let err = parse("void main() { int a = 1; }").unwrap_err();
        assert!(err.message.contains("initializer"));
    }

    #[test]
    fn string_literals_cannot_appear_in_expressions() {
        let err = parse("void main() { print_string(\"hi\"); }").unwrap_err();
        assert!(err.message.contains("string literal"));
    }

    #[test]
    fn a_fifth_call_argument_is_a_syntax_error() {
        let err = parse("void main() { f(1, 2, 3, 4, 5); }").unwrap_err();
        assert!(err.message.contains("more than 4 arguments"));
    }

    #[test]
    fn for_loops_may_declare_their_counters() {
        let program = parse("void main() { for (int i, i = 0; i < 3; i = i + 1) { } }").unwrap();
        let main = match &program.definitions[0] {
            Definition::Main(m) => m,
            other => panic!("expected main, got {:?}", other),
        };
        match &main.body.statements[0] {
            Statement::For { initializer, .. } => assert_eq!(initializer.len(), 2),
            other => panic!("expected for, got {:?}", other),
        }
    }

    #[test]
    fn ast_dump_matches_the_tree_shape() {
        let program = parse("int x = 14; void main() { return; }").unwrap();
        let tree = program.tree();
        assert!(tree.starts_with("program\n"));
        assert!(tree.contains("  variable x : int = 14\n"));
        assert!(tree.contains("  function main : void\n"));
        assert!(tree.contains("    body\n"));
        assert!(tree.contains("      block\n"));
        assert!(tree.contains("        return\n"));
    }
}

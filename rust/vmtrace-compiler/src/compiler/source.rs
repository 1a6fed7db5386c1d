//! Parsing and printing of JavaScript source via swc, with comments kept alongside the tree.

use std::cell::RefCell;
use std::fmt;
use std::io;
use std::rc::Rc;

use swc_core::common::comments::SingleThreadedComments;
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, SourceMap, Spanned};
use swc_core::ecma::ast::Program;
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config, Emitter};
use swc_core::ecma::parser::{Parser, StringInput, Syntax};

/// A parsed program together with the comment store and source map it was parsed against.
pub struct SourceProgram {
    pub program: Program,
    comments: SingleThreadedComments,
    source_map: Lrc<SourceMap>,
}

impl fmt::Debug for SourceProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceProgram")
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Parse `source` as a script or module.
///
/// Recoverable syntax errors are treated the same as fatal ones: the whole run fails
/// and every error is returned with its 1-based line and column.
pub fn parse(source: &str) -> Result<SourceProgram, Vec<ParseError>> {
    let source_map: Lrc<SourceMap> = Default::default();
    let file = source_map.new_source_file(FileName::Anon.into(), source.to_string());
    let comments = SingleThreadedComments::default();

    let mut parser = Parser::new(
        Syntax::default(),
        StringInput::from(&*file),
        Some(&comments),
    );
    let parsed = parser.parse_program();
    let mut errors: Vec<ParseError> = parser
        .take_errors()
        .into_iter()
        .map(|err| to_parse_error(&source_map, &err))
        .collect();

    match parsed {
        Ok(program) if errors.is_empty() => Ok(SourceProgram {
            program,
            comments,
            source_map,
        }),
        Ok(_) => Err(errors),
        Err(err) => {
            errors.push(to_parse_error(&source_map, &err));
            Err(errors)
        }
    }
}

fn to_parse_error(
    source_map: &SourceMap,
    err: &swc_core::ecma::parser::error::Error,
) -> ParseError {
    let loc = source_map.lookup_char_pos(err.span().lo);
    ParseError {
        line: loc.line,
        column: loc.col.0 + 1,
        message: err.kind().msg().into_owned(),
    }
}

/// Print the program back to JavaScript. Comments from the input are emitted at the
/// positions they were attached to; synthesized nodes carry no comments.
///
/// The emitter takes comments out of the store it is given, so it prints from a copy and
/// `source` can be printed any number of times.
pub fn print(source: &SourceProgram) -> io::Result<String> {
    let comments = {
        let (leading, trailing) = source.comments.borrow_all();
        SingleThreadedComments::from_leading_and_trailing(
            Rc::new(RefCell::new(leading.clone())),
            Rc::new(RefCell::new(trailing.clone())),
        )
    };
    let mut buf = Vec::new();
    {
        let mut emitter = Emitter {
            cfg: Config::default(),
            cm: source.source_map.clone(),
            comments: Some(&comments),
            wr: JsWriter::new(source.source_map.clone(), "\n", &mut buf, None),
        };
        emitter.emit_program(&source.program)?;
    }
    String::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_print_keeps_comments() {
        let source = "// header\nvar a = 1; /* tail */\n";
        let parsed = parse(source).expect("should parse");
        let printed = print(&parsed).expect("should print");
        assert!(printed.contains("// header"), "printed: {}", printed);
        assert!(printed.contains("/* tail */"), "printed: {}", printed);
        assert!(printed.contains("var a = 1;"), "printed: {}", printed);
    }

    #[test]
    fn printing_twice_keeps_comments() {
        let source = "function run() {\n    // main loop\n    while (true) {}\n}\n";
        let parsed = parse(source).expect("should parse");
        let first = print(&parsed).expect("should print");
        let second = print(&parsed).expect("should print again");
        assert!(first.contains("// main loop"), "printed: {}", first);
        assert_eq!(second, first);
    }

    #[test]
    fn parse_reports_position() {
        let errors = parse("var a = ;\n").expect_err("should fail");
        assert!(!errors.is_empty());
        assert_eq!(errors[0].line, 1);
        assert!(errors[0].column >= 1);
    }

    #[test]
    fn parses_modules() {
        let parsed = parse("export const x = 1;\n").expect("should parse");
        assert!(matches!(parsed.program, Program::Module(_)));
    }
}

//! Source positions and spans, threaded through every token and AST node.

use std::rc::Rc;

/// An immutable snapshot of a location within a source file.
///
/// `index` is the byte offset into `source`; `line`/`column` are 1-based.
/// `source` is shared (via `Rc`) across every position produced while
/// lexing the same file, so cloning a `Position` never copies the text.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub index: usize,
    pub line: usize,
    pub column: usize,
    pub file: Rc<str>,
    pub source: Rc<str>,
}

impl Position {
    pub fn start_of(file: Rc<str>, source: Rc<str>) -> Self {
        Self {
            index: 0,
            line: 1,
            column: 1,
            file,
            source,
        }
    }

    /// Advance past `ch`, updating line/column bookkeeping.
    pub fn advance(&mut self, ch: Option<char>) {
        self.index += 1;
        self.column += 1;

        if ch == Some('\n') {
            self.line += 1;
            self.column = 1;
        }
    }
}

/// A start/end pair of positions, carried by every token and AST node.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A span covering just `pos` (used for single-character tokens).
    pub fn point(pos: Position) -> Self {
        let mut end = pos.clone();
        end.advance(None);
        Self { start: pos, end }
    }

    /// Merge two spans into one covering both (e.g. lhs and rhs of a BinOp).
    pub fn merge(&self, other: &Span) -> Span {
        Span::new(self.start.clone(), other.end.clone())
    }
}

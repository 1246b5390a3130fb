//! Error kinds shared by every stage of the pipeline, and their rendering.

use std::error::Error;
use std::fmt::{self, Display};

use colored::Colorize;

use crate::position::Span;

/// One frame of a runtime traceback: the display name of the call (e.g. a
/// function name or `<program>`) and the position of the call site.
#[derive(Debug, Clone)]
pub struct TraceFrame {
    pub display_name: String,
    pub call_site: Span,
}

#[derive(Debug, Clone)]
pub enum SpylangError {
    IllegalCharacter { span: Span, detail: String },
    ExpectedCharacter { span: Span, detail: String },
    InvalidSyntax { span: Span, detail: String },
    Runtime { span: Span, detail: String, trace: Vec<TraceFrame> },
    KeyboardInterrupt { detail: String },
}

impl SpylangError {
    pub fn illegal_character(span: Span, ch: char) -> Self {
        SpylangError::IllegalCharacter {
            span,
            detail: format!("'{ch}'"),
        }
    }

    pub fn expected_character(span: Span, detail: impl Into<String>) -> Self {
        SpylangError::ExpectedCharacter {
            span,
            detail: detail.into(),
        }
    }

    pub fn invalid_syntax(span: Span, detail: impl Into<String>) -> Self {
        SpylangError::InvalidSyntax {
            span,
            detail: detail.into(),
        }
    }

    pub fn runtime(span: Span, detail: impl Into<String>) -> Self {
        SpylangError::Runtime {
            span,
            detail: detail.into(),
            trace: Vec::new(),
        }
    }

    /// Prepend a call frame to the traceback (called as the error unwinds
    /// back out through each enclosing function call).
    pub fn with_frame(mut self, frame: TraceFrame) -> Self {
        if let SpylangError::Runtime { trace, .. } = &mut self {
            trace.push(frame);
        }
        self
    }

    fn tag(&self) -> &'static str {
        match self {
            SpylangError::IllegalCharacter { .. } => {
                "Agent Error: unauthorized character detected"
            }
            SpylangError::ExpectedCharacter { .. } => "Agent Error: expected character missing",
            SpylangError::InvalidSyntax { .. } => "Agent Error: syntax anomaly detected",
            SpylangError::Runtime { .. } => "Agent Error: runtime breach detected",
            SpylangError::KeyboardInterrupt { .. } => "Agent Error: mission aborted by user",
        }
    }

    fn span(&self) -> Option<&Span> {
        match self {
            SpylangError::IllegalCharacter { span, .. }
            | SpylangError::ExpectedCharacter { span, .. }
            | SpylangError::InvalidSyntax { span, .. }
            | SpylangError::Runtime { span, .. } => Some(span),
            SpylangError::KeyboardInterrupt { .. } => None,
        }
    }

    fn detail(&self) -> &str {
        match self {
            SpylangError::IllegalCharacter { detail, .. }
            | SpylangError::ExpectedCharacter { detail, .. }
            | SpylangError::InvalidSyntax { detail, .. }
            | SpylangError::Runtime { detail, .. }
            | SpylangError::KeyboardInterrupt { detail } => detail,
        }
    }
}

impl Display for SpylangError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tag(), self.detail())?;

        let Some(span) = self.span() else {
            return Ok(());
        };

        write!(
            f,
            "\n  File \"{}\", line {}",
            span.start.file, span.start.line
        )?;

        if let SpylangError::Runtime { trace, .. } = self {
            if !trace.is_empty() {
                write!(f, "\n\nMission traceback (most recent call last):")?;
                for frame in trace.iter().rev() {
                    write!(
                        f,
                        "\n  File \"{}\", line {}, in {}",
                        frame.call_site.start.file, frame.call_site.start.line, frame.display_name
                    )?;
                }
            }
        }

        write!(f, "\n\n{}", underline_span(span))
    }
}

impl Error for SpylangError {}

/// Render the offending line, with a caret (`^`) underline covering the
/// span's column range, preceded by the previous source line for context.
fn underline_span(span: &Span) -> String {
    let source = span.start.source.as_ref();
    let lines: Vec<&str> = source.split('\n').collect();

    let line_idx = span.start.line.saturating_sub(1);
    let prev_line = if line_idx > 0 { lines[line_idx - 1] } else { "" };
    let this_line = lines.get(line_idx).copied().unwrap_or("");

    let col_start = span.start.column.saturating_sub(1);
    let col_end = if span.end.line == span.start.line {
        span.end.column.saturating_sub(1).max(col_start + 1)
    } else {
        this_line.len()
    };

    let margin = format!("{}", span.start.line).len();
    let blank_margin = " ".repeat(margin);
    let padding = " ".repeat(col_start.min(this_line.len()));
    let carets = "^".repeat(col_end.saturating_sub(col_start).max(1)).red();

    format!(
        "{blank_margin} | {prev_line}\n{line} | {this_line}\n{blank_margin} | {padding}{carets}",
        line = span.start.line
    )
}

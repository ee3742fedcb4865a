//! Graph input formats: Matrix Market (`.mtx`), plain edge lists
//! (`.edges`, `.txt`), and METIS (`.graph`).
//!
//! Each format has a text parser plus a thin file wrapper; [`read_graph`]
//! dispatches on the file extension. All parsers produce the CSR builder's
//! edge-list input, so format quirks (1-based ids, comment syntax, offset
//! auto-detection) stay out of the core.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::graph::{Graph, GraphError};

// ============================================================================
// Errors
// ============================================================================

/// Errors encountered while reading a graph file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// I/O failure (file not found, unreadable).
    Io(String),
    /// No header line was found before the data.
    MissingHeader,
    /// The header line is malformed or unsupported.
    BadHeader {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// A token could not be parsed as a vertex id.
    BadToken {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },
    /// A vertex id was negative.
    NegativeVertex {
        /// 1-based line number.
        line: usize,
        /// The parsed value.
        value: i64,
    },
    /// The input ended before the declared entry count was reached.
    TruncatedInput {
        /// Entries declared by the header.
        expected: usize,
        /// Entries actually present.
        got: usize,
    },
    /// The edge list violated a graph invariant.
    Graph(GraphError),
}

impl From<GraphError> for ParseError {
    fn from(e: GraphError) -> Self {
        ParseError::Graph(e)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io(msg) => write!(f, "I/O error: {msg}"),
            ParseError::MissingHeader => write!(f, "no header line before data"),
            ParseError::BadHeader { line, text } => {
                write!(f, "bad header at line {line}: {text:?}")
            }
            ParseError::BadToken { line, token } => {
                write!(f, "bad vertex token at line {line}: {token:?}")
            }
            ParseError::NegativeVertex { line, value } => {
                write!(f, "negative vertex id {value} at line {line}")
            }
            ParseError::TruncatedInput { expected, got } => {
                write!(f, "input truncated: header declared {expected} entries, found {got}")
            }
            ParseError::Graph(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ParseError {}

// ============================================================================
// Dispatch
// ============================================================================

/// Reads a graph file, choosing the parser from the extension:
/// `.mtx` is Matrix Market, `.graph` is METIS, anything else is treated
/// as a whitespace edge list.
///
/// # Errors
/// Returns an error if the file is unreadable or malformed.
pub fn read_graph(path: impl AsRef<Path>) -> Result<Graph, ParseError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ParseError::Io(e.to_string()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("mtx") => parse_mtx(&text),
        Some("graph") => parse_metis(&text),
        _ => parse_edges(&text),
    }
}

// ============================================================================
// Matrix Market
// ============================================================================

/// Parses a symmetric Matrix Market file: `%` comments, a `rows cols nnz`
/// header, then `nnz` lines of `u v [weight]` with 1-based ids. Weights
/// are ignored.
///
/// # Errors
/// Returns an error on a missing or non-square header, bad ids, or fewer
/// entries than the header declares.
pub fn parse_mtx(text: &str) -> Result<Graph, ParseError> {
    let mut lines = numbered_data_lines(text, "%");

    let (line_no, header) = lines.next().ok_or(ParseError::MissingHeader)?;
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(ParseError::BadHeader {
            line: line_no,
            text: header.to_owned(),
        });
    }
    let rows = parse_count(fields[0], line_no)?;
    let cols = parse_count(fields[1], line_no)?;
    let m = parse_count(fields[2], line_no)?;
    if rows != cols {
        return Err(ParseError::BadHeader {
            line: line_no,
            text: header.to_owned(),
        });
    }

    let mut edges = Vec::with_capacity(m);
    for (line_no, line) in lines.by_ref().take(m) {
        let mut it = line.split_whitespace();
        let u = parse_vertex(it.next(), line_no)?;
        let v = parse_vertex(it.next(), line_no)?;
        edges.push((u, v));
    }
    if edges.len() < m {
        return Err(ParseError::TruncatedInput {
            expected: m,
            got: edges.len(),
        });
    }

    Ok(Graph::from_edge_list(rows, &edges, 1)?)
}

// ============================================================================
// Edge list
// ============================================================================

/// Parses a whitespace-separated edge list: one `u v` pair per line,
/// `%`/`#` comment lines skipped. The index offset is auto-detected: if
/// any endpoint is 0 the list is 0-based, otherwise 1-based. The vertex
/// count is the largest corrected id plus one.
///
/// # Errors
/// Returns an error on missing or non-numeric tokens or negative ids.
pub fn parse_edges(text: &str) -> Result<Graph, ParseError> {
    let mut edges: Vec<(u32, u32)> = Vec::new();
    let mut min_id = u32::MAX;
    let mut max_id = 0u32;

    for (line_no, line) in numbered_data_lines(text, "%") {
        if line.starts_with('#') {
            continue;
        }
        let mut it = line.split_whitespace();
        let u = parse_vertex(it.next(), line_no)?;
        let v = parse_vertex(it.next(), line_no)?;
        min_id = min_id.min(u).min(v);
        max_id = max_id.max(u).max(v);
        edges.push((u, v));
    }

    if edges.is_empty() {
        return Ok(Graph::from_edge_list(0, &[], 0)?);
    }
    let offset = if min_id == 0 { 0 } else { 1 };
    let n = (max_id - offset) as usize + 1;
    Ok(Graph::from_edge_list(n, &edges, offset)?)
}

// ============================================================================
// METIS
// ============================================================================

/// Parses a METIS graph file: `%` comments, an `n m [fmt]` header, then
/// one line per vertex listing its 1-based neighbors. Only the unweighted
/// format (`fmt` absent or `0`) is supported.
///
/// # Errors
/// Returns an error on a malformed or weighted header, bad ids, or fewer
/// vertex lines than the header declares.
pub fn parse_metis(text: &str) -> Result<Graph, ParseError> {
    // Blank lines are meaningful here (isolated vertices), so split raw
    // lines and only strip comments.
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.starts_with('%'));

    let (line_no, header) = loop {
        match lines.next() {
            Some((no, l)) if !l.is_empty() => break (no, l),
            Some(_) => continue,
            None => return Err(ParseError::MissingHeader),
        }
    };
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() < 2 || fields.len() > 3 {
        return Err(ParseError::BadHeader {
            line: line_no,
            text: header.to_owned(),
        });
    }
    let n = parse_count(fields[0], line_no)?;
    let _m = parse_count(fields[1], line_no)?;
    if let Some(&fmt) = fields.get(2) {
        if !fmt.trim_start_matches('0').is_empty() {
            return Err(ParseError::BadHeader {
                line: line_no,
                text: header.to_owned(),
            });
        }
    }

    let mut edges = Vec::new();
    let mut seen = 0usize;
    for (line_no, line) in lines {
        if seen == n {
            break;
        }
        let v = seen as u32;
        seen += 1;
        for token in line.split_whitespace() {
            let w = parse_vertex(Some(token), line_no)?;
            if w == 0 {
                return Err(ParseError::BadToken {
                    line: line_no,
                    token: token.to_owned(),
                });
            }
            edges.push((v, w - 1));
        }
    }
    if seen < n {
        return Err(ParseError::TruncatedInput {
            expected: n,
            got: seen,
        });
    }

    Ok(Graph::from_edge_list(n, &edges, 0)?)
}

// ============================================================================
// Token helpers
// ============================================================================

/// Non-empty lines with 1-based numbers, comment prefix stripped out.
fn numbered_data_lines<'a>(
    text: &'a str,
    comment: &'a str,
) -> impl Iterator<Item = (usize, &'a str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(move |(_, l)| !l.is_empty() && !l.starts_with(comment))
}

fn parse_count(token: &str, line: usize) -> Result<usize, ParseError> {
    token.parse::<usize>().map_err(|_| ParseError::BadToken {
        line,
        token: token.to_owned(),
    })
}

fn parse_vertex(token: Option<&str>, line: usize) -> Result<u32, ParseError> {
    let token = token.ok_or_else(|| ParseError::BadToken {
        line,
        token: String::new(),
    })?;
    let value = token.parse::<i64>().map_err(|_| ParseError::BadToken {
        line,
        token: token.to_owned(),
    })?;
    if value < 0 {
        return Err(ParseError::NegativeVertex { line, value });
    }
    u32::try_from(value).map_err(|_| ParseError::BadToken {
        line,
        token: token.to_owned(),
    })
}

// ============================================================================
// Tests
// ============================================================================

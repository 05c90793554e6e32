//! DOT-like dependency graph grammar.
//!
//! Accepted input is a small subset of Graphviz DOT, enough for hand-written
//! claim graphs:
//!
//! ```text
//! graph  := [ "strict" ] ( "digraph" | "graph" ) [ id ] "{" stmt* "}"
//!         | stmt*
//! stmt   := node ( "->" node )* [ attrs ] [ ";" ]
//!         | ( "node" | "edge" | "graph" ) attrs [ ";" ]
//!         | id "=" id [ ";" ]
//! node   := id [ ":" id [ ":" id ] ]
//! attrs  := "[" ( id [ "=" id ] [ "," | ";" ] )* "]"
//! id     := "quoted \"string\"" | [A-Za-z0-9_.] [A-Za-z0-9_.:]*
//! ```
//!
//! `//`, `#` line comments and `/* */` block comments are skipped. A lone id
//! declares a standalone node; `a -> b -> c` declares the edges `a -> b` and
//! `b -> c`. Attributes and graph-level assignments are accepted and ignored.
//! Ports (`"a":n -> b`) are dropped; the edge stays on the node. Bare ids may
//! contain `:` after the first character, so write ports on quoted ids.
//! A leading byte-order mark is ignored.

use claimcheck_kernel::{Edge, Graph};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}, column {column}: {message}")]
pub struct DotError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Id { value: String, quoted: bool },
    Arrow,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Equals,
    Colon,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Id { value, .. } => write!(f, "identifier {value:?}"),
            TokenKind::Arrow => f.write_str("`->`"),
            TokenKind::LBrace => f.write_str("`{`"),
            TokenKind::RBrace => f.write_str("`}`"),
            TokenKind::LBracket => f.write_str("`[`"),
            TokenKind::RBracket => f.write_str("`]`"),
            TokenKind::Semi => f.write_str("`;`"),
            TokenKind::Comma => f.write_str("`,`"),
            TokenKind::Equals => f.write_str("`=`"),
            TokenKind::Colon => f.write_str("`:`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    line: usize,
    column: usize,
}

fn is_bare_id_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.')
}

fn is_bare_id_char(c: char) -> bool {
    is_bare_id_start(c) || c == ':'
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> DotError {
        DotError {
            line,
            column,
            message: message.into(),
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn tokens(mut self) -> Result<Vec<Token>, DotError> {
        let mut out = Vec::new();
        while let Some(c) = self.peek() {
            let (line, column) = (self.line, self.column);
            let simple = match c {
                '{' => Some(TokenKind::LBrace),
                '}' => Some(TokenKind::RBrace),
                '[' => Some(TokenKind::LBracket),
                ']' => Some(TokenKind::RBracket),
                ';' => Some(TokenKind::Semi),
                ',' => Some(TokenKind::Comma),
                '=' => Some(TokenKind::Equals),
                ':' => Some(TokenKind::Colon),
                _ => None,
            };
            if let Some(kind) = simple {
                self.bump();
                out.push(Token { kind, line, column });
                continue;
            }

            if c.is_whitespace() {
                self.bump();
            } else if c == '#' || (c == '/' && self.peek_second() == Some('/')) {
                self.skip_line();
            } else if c == '/' && self.peek_second() == Some('*') {
                self.bump();
                self.bump();
                loop {
                    match self.bump() {
                        Some('*') if self.peek() == Some('/') => {
                            self.bump();
                            break;
                        }
                        Some(_) => {}
                        None => return Err(self.error(line, column, "unterminated block comment")),
                    }
                }
            } else if c == '-' {
                self.bump();
                match self.bump() {
                    Some('>') => out.push(Token {
                        kind: TokenKind::Arrow,
                        line,
                        column,
                    }),
                    Some('-') => {
                        return Err(self.error(
                            line,
                            column,
                            "undirected edge `--` is not supported; use `->`",
                        ));
                    }
                    _ => return Err(self.error(line, column, "expected `->`")),
                }
            } else if c == '"' {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some('"') => break,
                        Some('\\') if self.peek() == Some('"') => {
                            self.bump();
                            value.push('"');
                        }
                        Some(other) => value.push(other),
                        None => return Err(self.error(line, column, "unterminated quoted string")),
                    }
                }
                out.push(Token {
                    kind: TokenKind::Id {
                        value,
                        quoted: true,
                    },
                    line,
                    column,
                });
            } else if is_bare_id_start(c) {
                let mut value = String::new();
                while let Some(next) = self.peek().filter(|next| is_bare_id_char(*next)) {
                    value.push(next);
                    self.bump();
                }
                out.push(Token {
                    kind: TokenKind::Id {
                        value,
                        quoted: false,
                    },
                    line,
                    column,
                });
            } else {
                return Err(self.error(line, column, format!("unexpected character {c:?}")));
            }
        }
        Ok(out)
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: (usize, usize),
}

impl Parser {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|token| &token.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|token| &token.kind)
    }

    fn peek_keyword(&self, offset: usize, keywords: &[&str]) -> bool {
        matches!(
            self.peek_at(offset),
            Some(TokenKind::Id { value, quoted: false })
                if keywords.iter().any(|k| value.eq_ignore_ascii_case(k))
        )
    }

    fn next(&mut self) -> Option<TokenKind> {
        let token = self.tokens.get(self.pos)?.kind.clone();
        self.pos += 1;
        Some(token)
    }

    fn error_here(&self, message: impl Into<String>) -> DotError {
        let (line, column) = self
            .tokens
            .get(self.pos)
            .map(|token| (token.line, token.column))
            .unwrap_or(self.end);
        DotError {
            line,
            column,
            message: message.into(),
        }
    }

    fn unexpected(&self, expected: &str) -> DotError {
        match self.peek() {
            Some(found) => self.error_here(format!("expected {expected}, found {found}")),
            None => self.error_here(format!("expected {expected}, found end of input")),
        }
    }

    fn expect_id(&mut self) -> Result<String, DotError> {
        match self.peek() {
            Some(TokenKind::Id { value, .. }) => {
                let value = value.clone();
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse(mut self) -> Result<Graph, DotError> {
        let mut graph = Graph::new();
        let has_header = self.peek_keyword(0, &["digraph", "graph", "strict"])
            && !matches!(self.peek_at(1), Some(TokenKind::LBracket));
        if has_header {
            self.eat_keyword("strict");
            if !self.peek_keyword(0, &["digraph", "graph"]) {
                return Err(self.unexpected("`digraph`"));
            }
            self.pos += 1;
            if matches!(self.peek(), Some(TokenKind::Id { .. })) {
                self.pos += 1;
            }
            if !self.eat(&TokenKind::LBrace) {
                return Err(self.unexpected("`{`"));
            }
            self.statements(&mut graph, true)?;
            if self.peek().is_some() {
                return Err(self.unexpected("end of input"));
            }
        } else {
            self.statements(&mut graph, false)?;
        }
        Ok(graph)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(0, &[keyword]) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn statements(&mut self, graph: &mut Graph, braced: bool) -> Result<(), DotError> {
        loop {
            match self.peek() {
                None if braced => return Err(self.unexpected("`}`")),
                None => return Ok(()),
                Some(TokenKind::RBrace) if braced => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(TokenKind::Semi) => {
                    self.pos += 1;
                }
                Some(TokenKind::LBrace) => {
                    return Err(self.error_here("subgraphs are not supported"));
                }
                Some(TokenKind::Id { .. }) => self.statement(graph)?,
                Some(_) => return Err(self.unexpected("a statement")),
            }
        }
    }

    fn statement(&mut self, graph: &mut Graph) -> Result<(), DotError> {
        if self.peek_keyword(0, &["node", "edge", "graph"])
            && matches!(self.peek_at(1), Some(TokenKind::LBracket))
        {
            self.pos += 1;
            return self.attributes();
        }
        if matches!(self.peek_at(1), Some(TokenKind::Equals)) {
            self.pos += 2;
            self.expect_id()?;
            return Ok(());
        }

        let mut chain = vec![self.node_id()?];
        while self.eat(&TokenKind::Arrow) {
            chain.push(self.node_id()?);
        }
        if matches!(self.peek(), Some(TokenKind::LBracket)) {
            self.attributes()?;
        }

        if chain.len() == 1 {
            graph.add_node(chain.remove(0));
        } else {
            for pair in chain.windows(2) {
                graph.add_edge(Edge::new(pair[0].clone(), pair[1].clone()));
            }
        }
        Ok(())
    }

    /// Node id with an optional `:port[:compass]` suffix, which is discarded.
    fn node_id(&mut self) -> Result<String, DotError> {
        let id = self.expect_id()?;
        for _ in 0..2 {
            if !self.eat(&TokenKind::Colon) {
                break;
            }
            self.expect_id()?;
        }
        if matches!(self.peek(), Some(TokenKind::Colon)) {
            return Err(self.error_here("a node takes at most a port and a compass point"));
        }
        Ok(id)
    }

    fn attributes(&mut self) -> Result<(), DotError> {
        if !self.eat(&TokenKind::LBracket) {
            return Err(self.unexpected("`[`"));
        }
        loop {
            match self.next() {
                Some(TokenKind::RBracket) => return Ok(()),
                Some(TokenKind::Id { .. }) => {
                    if self.eat(&TokenKind::Equals) {
                        self.expect_id()?;
                    }
                    if !self.eat(&TokenKind::Comma) {
                        self.eat(&TokenKind::Semi);
                    }
                }
                Some(_) => {
                    self.pos -= 1;
                    return Err(self.unexpected("an attribute or `]`"));
                }
                None => return Err(self.unexpected("`]`")),
            }
        }
    }
}

/// Parse DOT-like text into a graph.
pub fn parse_dot(text: &str) -> Result<Graph, DotError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lexer = Lexer::new(text);
    let end = text.lines().enumerate().last().map_or((1, 1), |(index, line)| {
        (index + 1, line.chars().count() + 1)
    });
    let tokens = lexer.tokens()?;
    Parser {
        tokens,
        pos: 0,
        end,
    }
    .parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(graph: &Graph) -> Vec<(String, String)> {
        graph
            .edges()
            .map(|edge| (edge.source.clone(), edge.target.clone()))
            .collect()
    }

    #[test]
    fn parses_quoted_edges_and_standalone_nodes() {
        let graph = parse_dot(
            r#"digraph psi {
                rankdir = LR;
                node [shape=box, style="rounded"];
                "Psi.Budget" -> "Psi.Lower";
                "Psi.Lower" -> "AntiSim.Main" [label="uses"];
                "Lk.Standalone";
            }"#,
        )
        .expect("graph should parse");
        assert_eq!(
            graph.nodes().collect::<Vec<_>>(),
            vec!["AntiSim.Main", "Lk.Standalone", "Psi.Budget", "Psi.Lower"]
        );
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn parses_headerless_statements_and_chains() {
        let graph = parse_dot("A -> B -> C\nB -> C;\n// trailing comment\n# pragma\n")
            .expect("graph should parse");
        assert_eq!(
            edges(&graph),
            vec![
                ("A".to_string(), "B".to_string()),
                ("B".to_string(), "C".to_string())
            ]
        );
    }

    #[test]
    fn quoted_ids_may_contain_escaped_quotes_and_keywords() {
        let graph = parse_dot(r#"strict digraph { "node" -> "say \"hi\"" /* c */ }"#)
            .expect("graph should parse");
        assert_eq!(
            edges(&graph),
            vec![("node".to_string(), "say \"hi\"".to_string())]
        );
    }

    #[test]
    fn empty_input_is_empty_graph() {
        assert!(parse_dot("").expect("empty parses").is_empty());
        assert!(parse_dot("digraph G {}").expect("empty body parses").is_empty());
    }

    #[test]
    fn errors_carry_positions() {
        let err = parse_dot("digraph {\n  \"A\" -> ;\n}").expect_err("must fail");
        assert_eq!((err.line, err.column), (2, 10));
        insta::assert_snapshot!(err.to_string(), @"line 2, column 10: expected an identifier, found `;`");

        let err = parse_dot("digraph {\n  \"A\" -> \"B\";\n").expect_err("must fail");
        assert_eq!(err.message, "expected `}`, found end of input");

        let err = parse_dot("\"A").expect_err("must fail");
        assert_eq!(err.message, "unterminated quoted string");

        let err = parse_dot("A -- B").expect_err("must fail");
        assert_eq!((err.line, err.column), (1, 3));
    }

    #[test]
    fn ports_stay_on_their_node() {
        let graph = parse_dot(r#"digraph { "Psi.A":n -> "Psi.B":s:w; "Psi.B" -> "Psi.A":e }"#)
            .expect("graph should parse");
        assert_eq!(graph.nodes().collect::<Vec<_>>(), vec!["Psi.A", "Psi.B"]);
        assert_eq!(
            edges(&graph),
            vec![
                ("Psi.A".to_string(), "Psi.B".to_string()),
                ("Psi.B".to_string(), "Psi.A".to_string())
            ]
        );

        let err = parse_dot(r#""Psi.A":n:s:w -> "Psi.B""#).expect_err("must fail");
        assert_eq!((err.line, err.column), (1, 12));

        let err = parse_dot("digraph { :n -> B }").expect_err("must fail");
        assert_eq!(err.message, "expected a statement, found `:`");
    }

    #[test]
    fn bare_ids_keep_inner_colons() {
        let graph = parse_dot("Bridge:MachineTree -> Bridge:MachineCircuit:Cor")
            .expect("graph should parse");
        assert_eq!(
            edges(&graph),
            vec![(
                "Bridge:MachineTree".to_string(),
                "Bridge:MachineCircuit:Cor".to_string()
            )]
        );
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let graph = parse_dot("\u{feff}digraph { \"Psi.A\" -> \"Psi.B\"; }")
            .expect("graph should parse");
        assert_eq!(
            edges(&graph),
            vec![("Psi.A".to_string(), "Psi.B".to_string())]
        );
    }

    #[test]
    fn subgraphs_are_rejected() {
        let err = parse_dot("digraph { { A } }").expect_err("must fail");
        assert_eq!(err.message, "subgraphs are not supported");
    }
}

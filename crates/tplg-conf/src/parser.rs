//! Recursive-descent reader for the ALSA configuration syntax.
//!
//! Supported:
//! - `key value`, with optional `=` and optional `;` or `,` terminators
//! - dotted keys (`SectionMixer."Master".index 0`) that create nested
//!   compounds
//! - `{ ... }` compounds, merged when the same key is opened twice
//! - `[ ... ]` arrays whose members are keyed `"0"`, `"1"`, ...
//! - double- or single-quoted strings with `\n`, `\t`, `\\` and quote
//!   escapes
//! - `#` comments to end of line

use tracing::debug;

use crate::error::{ConfError, ConfResult};
use crate::node::{ConfNode, ConfValue};

/// Parse a whole document into a root compound with an empty id.
pub fn parse_str(text: &str) -> ConfResult<ConfNode> {
    let mut parser = Parser::new(text);
    let children = parser.parse_body(None)?;
    debug!(nodes = children.len(), lines = parser.line, "configuration parsed");
    Ok(ConfNode {
        id: String::new(),
        value: ConfValue::Compound(children),
        line: 1,
    })
}

fn is_special(byte: u8) -> bool {
    matches!(
        byte,
        b'{' | b'}' | b'[' | b']' | b'=' | b';' | b',' | b'#' | b'"' | b'\''
    )
}

struct Parser<'src> {
    source: &'src [u8],
    pos: usize,
    line: u32,
}

impl<'src> Parser<'src> {
    fn new(text: &'src str) -> Self {
        Self {
            source: text.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    // -----------------------------------------------------------------------
    // Character-level helpers
    // -----------------------------------------------------------------------

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
        }
        Some(byte)
    }

    /// Skip whitespace, comments and (optionally) `;`/`,` separators.
    fn skip_trivia(&mut self, separators: bool) {
        while let Some(byte) = self.peek() {
            match byte {
                b'#' => {
                    while self.peek().is_some_and(|b| b != b'\n') {
                        self.bump();
                    }
                }
                b';' | b',' if separators => {
                    self.bump();
                }
                b if b.is_ascii_whitespace() => {
                    self.bump();
                }
                _ => break,
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tokens
    // -----------------------------------------------------------------------

    fn quoted(&mut self) -> ConfResult<String> {
        let start_line = self.line;
        let Some(quote) = self.bump() else {
            return Err(ConfError::UnexpectedEof { expected: "string" });
        };
        let mut out = Vec::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ConfError::Unterminated {
                        line: start_line,
                        what: "string",
                    })
                }
                Some(b) if b == quote => break,
                Some(b'\\') => match self.bump() {
                    Some(b'n') => out.push(b'\n'),
                    Some(b't') => out.push(b'\t'),
                    Some(b'r') => out.push(b'\r'),
                    Some(other) => out.push(other),
                    None => {
                        return Err(ConfError::Unterminated {
                            line: start_line,
                            what: "string",
                        })
                    }
                },
                Some(b) => out.push(b),
            }
        }
        String::from_utf8(out).map_err(|_| ConfError::syntax(start_line, "string is not valid UTF-8"))
    }

    /// A bare word. `stop_at_dot` is set when reading a key segment.
    fn bare(&mut self, stop_at_dot: bool) -> ConfResult<String> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() || is_special(byte) || (stop_at_dot && byte == b'.') {
                break;
            }
            self.bump();
        }
        if start == self.pos {
            return Err(match self.peek() {
                Some(byte) => ConfError::syntax(
                    self.line,
                    format!("unexpected '{}'", char::from(byte)),
                ),
                None => ConfError::UnexpectedEof { expected: "identifier" },
            });
        }
        std::str::from_utf8(&self.source[start..self.pos])
            .map(str::to_string)
            .map_err(|_| ConfError::syntax(self.line, "identifier is not valid UTF-8"))
    }

    /// A possibly dotted key: `a`, `a.b`, `a."b c".d`.
    fn key(&mut self) -> ConfResult<Vec<String>> {
        let mut path = Vec::new();
        loop {
            let segment = match self.peek() {
                Some(b'"' | b'\'') => self.quoted()?,
                _ => self.bare(true)?,
            };
            path.push(segment);
            if self.peek() == Some(b'.') {
                self.bump();
            } else {
                return Ok(path);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// Parse `key value` pairs until `close` (or end of input at top level).
    fn parse_body(&mut self, close: Option<u8>) -> ConfResult<Vec<ConfNode>> {
        let open_line = self.line;
        let mut nodes = Vec::new();
        loop {
            self.skip_trivia(true);
            match (self.peek(), close) {
                (None, None) => return Ok(nodes),
                (None, Some(_)) => {
                    return Err(ConfError::Unterminated {
                        line: open_line,
                        what: "compound",
                    })
                }
                (Some(byte), Some(close)) if byte == close => {
                    self.bump();
                    return Ok(nodes);
                }
                _ => {}
            }

            let line = self.line;
            let path = self.key()?;
            self.skip_trivia(false);
            if self.peek() == Some(b'=') {
                self.bump();
                self.skip_trivia(false);
            }
            let value = self.value()?;
            insert_path(&mut nodes, &path, value, line);
        }
    }

    fn parse_array(&mut self) -> ConfResult<Vec<ConfNode>> {
        let open_line = self.line;
        let mut items = Vec::new();
        loop {
            self.skip_trivia(true);
            match self.peek() {
                None => {
                    return Err(ConfError::Unterminated {
                        line: open_line,
                        what: "array",
                    })
                }
                Some(b']') => {
                    self.bump();
                    return Ok(items);
                }
                _ => {}
            }
            let line = self.line;
            let value = self.value()?;
            items.push(ConfNode {
                id: items.len().to_string(),
                value,
                line,
            });
        }
    }

    fn value(&mut self) -> ConfResult<ConfValue> {
        match self.peek() {
            None => Err(ConfError::UnexpectedEof { expected: "value" }),
            Some(b'{') => {
                self.bump();
                Ok(ConfValue::Compound(self.parse_body(Some(b'}'))?))
            }
            Some(b'[') => {
                self.bump();
                Ok(ConfValue::Array(self.parse_array()?))
            }
            Some(b'"' | b'\'') => Ok(ConfValue::String(self.quoted()?)),
            Some(_) => Ok(ConfValue::String(self.bare(false)?)),
        }
    }
}

/// Place `value` at `path` below `nodes`, creating intermediate compounds
/// and merging into existing ones.
fn insert_path(nodes: &mut Vec<ConfNode>, path: &[String], value: ConfValue, line: u32) {
    let Some((id, rest)) = path.split_first() else {
        return;
    };
    let position = nodes.iter().position(|n| n.id == *id);

    if rest.is_empty() {
        match position {
            Some(i) => merge_into(&mut nodes[i], value, line),
            None => nodes.push(ConfNode {
                id: id.clone(),
                value,
                line,
            }),
        }
        return;
    }

    let index = match position {
        Some(i) if matches!(nodes[i].value, ConfValue::Compound(_)) => i,
        Some(i) => {
            nodes[i].value = ConfValue::Compound(Vec::new());
            nodes[i].line = line;
            i
        }
        None => {
            nodes.push(ConfNode {
                id: id.clone(),
                value: ConfValue::Compound(Vec::new()),
                line,
            });
            nodes.len() - 1
        }
    };
    if let Some(children) = nodes[index].children_mut() {
        insert_path(children, rest, value, line);
    }
}

/// Compounds merge child by child; anything else replaces the old value.
fn merge_into(node: &mut ConfNode, value: ConfValue, line: u32) {
    node.line = line;
    match (&mut node.value, value) {
        (ConfValue::Compound(existing), ConfValue::Compound(incoming)) => {
            for child in incoming {
                let child_line = child.line;
                insert_path(existing, std::slice::from_ref(&child.id), child.value, child_line);
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ConfigNode;
    use proptest::prelude::*;

    #[test]
    fn parses_nested_sections() {
        let root = parse_str(
            r#"
            # a mixer
            SectionMixer."Master Playback Volume" {
                index "1"
                channel.FL { reg 0; shift 0 }
                max 31
                tlv "vol_tlv"
            }
            "#,
        )
        .unwrap();
        let mixer = root
            .lookup(["SectionMixer", "Master Playback Volume"])
            .unwrap();
        assert!(mixer.is_compound());
        assert_eq!(mixer.child("index").unwrap().string_value(), Some("1"));
        assert_eq!(mixer.child("max").unwrap().string_value(), Some("31"));
        let fl = mixer.lookup(["channel", "FL"]).unwrap();
        assert_eq!(fl.child("shift").unwrap().string_value(), Some("0"));
    }

    #[test]
    fn arrays_are_numbered() {
        let root = parse_str(r#"SectionText."modes" { values [ "off" "low", high ] }"#).unwrap();
        let values = root.lookup(["SectionText", "modes", "values"]).unwrap();
        let ids: Vec<&str> = values.children().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
        assert_eq!(values.string_list(), vec!["off", "low", "high"]);
    }

    #[test]
    fn repeated_compounds_merge() {
        let root = parse_str(
            r#"
            SectionWidget."a" { type pga }
            SectionWidget."b" { type mixer }
            SectionWidget."a" { no_pm "true" }
            "#,
        )
        .unwrap();
        let widgets = root.child("SectionWidget").unwrap();
        assert_eq!(widgets.children().len(), 2);
        let a = widgets.child("a").unwrap();
        assert_eq!(a.child("type").unwrap().string_value(), Some("pga"));
        assert_eq!(a.child("no_pm").unwrap().string_value(), Some("true"));
    }

    #[test]
    fn equals_and_escapes() {
        let root = parse_str(r#"name = "say \"hi\"\n"; other='x'"#).unwrap();
        assert_eq!(root.child("name").unwrap().string_value(), Some("say \"hi\"\n"));
        assert_eq!(root.child("other").unwrap().string_value(), Some("x"));
    }

    #[test]
    fn bare_values_keep_dots() {
        let root = parse_str("SectionGraph.g { index 0 lines [ \"a, b, c\" ] }\nratio 1.5").unwrap();
        assert_eq!(root.child("ratio").unwrap().string_value(), Some("1.5"));
        let lines = root.lookup(["SectionGraph", "g", "lines", "0"]).unwrap();
        assert_eq!(lines.string_value(), Some("a, b, c"));
    }

    #[test]
    fn reports_unterminated_compound() {
        let err = parse_str("SectionData.\"x\" {\n bytes \"0x01\"\n").unwrap_err();
        assert_eq!(
            err,
            ConfError::Unterminated {
                line: 1,
                what: "compound"
            }
        );
    }

    #[test]
    fn reports_stray_brace_with_line() {
        let err = parse_str("a 1\nb 2\n}\n").unwrap_err();
        assert!(matches!(err, ConfError::Syntax { line: 3, .. }));
    }

    #[test]
    fn reports_missing_value() {
        assert_eq!(
            parse_str("key").unwrap_err(),
            ConfError::UnexpectedEof { expected: "value" }
        );
    }

    proptest! {
        #[test]
        fn quoted_values_survive(value in "[a-zA-Z0-9 _.:-]{0,40}") {
            let text = format!("SectionData.\"d\" {{ bytes \"{value}\" }}");
            let root = parse_str(&text).unwrap();
            let node = root.lookup(["SectionData", "d", "bytes"]).unwrap();
            prop_assert_eq!(node.string_value(), Some(value.as_str()));
        }
    }
}

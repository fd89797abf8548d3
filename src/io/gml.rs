//! Reading and writing forbidden-pair graphs in GML, as produced by NetworkX.
//!
//! Only the subset needed for family graphs is interpreted: `node` blocks with `id`, `label` and
//! `name`, and `edge` blocks with `source` and `target`. Other keys are parsed and ignored.
use super::{Error, FamilyGraph};
use crate::forbidden::ForbiddenPairSet;
use crate::types::{ParticipantId, Roster};

use std::collections::HashMap;
use std::fmt::Write;

/// Serialize a family graph. Node ids are participant ids.
pub fn to_string(graph: &FamilyGraph) -> String {
    let mut out = String::new();
    // writing to a String cannot fail
    let _ = write_graph(&mut out, graph);
    out
}

fn write_graph(out: &mut String, graph: &FamilyGraph) -> std::fmt::Result {
    writeln!(out, "graph [")?;
    for (id, name) in graph.roster.iter() {
        writeln!(out, "  node [")?;
        writeln!(out, "    id {}", id.0)?;
        writeln!(out, "    label \"{}\"", id.0)?;
        writeln!(out, "    name \"{}\"", escape(name))?;
        writeln!(out, "  ]")?;
    }
    for (a, b) in graph.forbidden.pairs() {
        writeln!(out, "  edge [")?;
        writeln!(out, "    source {}", a.0)?;
        writeln!(out, "    target {}", b.0)?;
        writeln!(out, "  ]")?;
    }
    writeln!(out, "]")
}

/// Parse a GML document holding a single `graph`.
pub fn from_str(input: &str) -> Result<FamilyGraph, Error> {
    let document = Parser::new(input).document()?;

    let graph = document
        .into_iter()
        .find_map(|(key, value)| match (key.as_str(), value) {
            ("graph", Value::List(items)) => Some(items),
            _ => None,
        })
        .ok_or(Error::MissingGraph)?;

    let mut roster = Roster::default();
    let mut ids: HashMap<i64, ParticipantId> = HashMap::new();
    let mut edges = vec![];

    for (key, value) in graph {
        match (key.as_str(), value) {
            ("node", Value::List(attributes)) => {
                let id = int_attribute(&attributes, "id").ok_or(Error::MissingAttribute {
                    block: "node",
                    attribute: "id",
                })?;
                let name = str_attribute(&attributes, "name")
                    .or_else(|| str_attribute(&attributes, "label"))
                    .map(str::to_string)
                    .unwrap_or_else(|| id.to_string());

                if ids.contains_key(&id) {
                    return Err(Error::DuplicateNode(id));
                }
                ids.insert(id, roster.push(name));
            }
            ("edge", Value::List(attributes)) => {
                let source = int_attribute(&attributes, "source").ok_or(
                    Error::MissingAttribute {
                        block: "edge",
                        attribute: "source",
                    },
                )?;
                let target = int_attribute(&attributes, "target").ok_or(
                    Error::MissingAttribute {
                        block: "edge",
                        attribute: "target",
                    },
                )?;
                edges.push((source, target));
            }
            _ => {}
        }
    }

    let pairs = edges
        .into_iter()
        .map(|(source, target)| {
            let a = ids.get(&source).ok_or(Error::UnknownNode(source))?;
            let b = ids.get(&target).ok_or(Error::UnknownNode(target))?;
            Ok((*a, *b))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    // endpoints come from `ids`, so they are always in range
    let forbidden = ForbiddenPairSet::from_pairs(roster.len(), pairs)?;
    Ok(FamilyGraph { roster, forbidden })
}

fn int_attribute(attributes: &[(String, Value)], key: &str) -> Option<i64> {
    attributes.iter().find_map(|(k, v)| match v {
        Value::Int(i) if k == key => Some(*i),
        Value::Real(x) if k == key && x.fract() == 0.0 => Some(*x as i64),
        _ => None,
    })
}

fn str_attribute<'a>(attributes: &'a [(String, Value)], key: &str) -> Option<&'a str> {
    attributes.iter().find_map(|(k, v)| match v {
        Value::Str(s) if k == key => Some(s.as_str()),
        _ => None,
    })
}

/// Escape `&`, `"` and anything outside printable ASCII as character references.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '&' || c == '"' || !(' '..='~').contains(&c) {
            let _ = write!(out, "&#{};", c as u32);
        } else {
            out.push(c);
        }
    }
    out
}

/// Decode numeric and the common named character references. Unknown references are kept as is.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let decoded = rest.find(';').and_then(|end| {
            let entity = &rest[1..end];
            let c = match entity {
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "lt" => Some('<'),
                "gt" => Some('>'),
                _ => {
                    let code = if let Some(hex) = entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                }
            };
            c.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

////////////////////////////////////////////////////////////////////////////////
// Parsing

#[derive(Clone, PartialEq, Debug)]
enum Value {
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<(String, Value)>),
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            input,
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Syntax {
            line: self.line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == '#' {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
            } else if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn document(&mut self) -> Result<Vec<(String, Value)>, Error> {
        let items = self.items()?;
        if self.peek().is_some() {
            return Err(self.error("unexpected ']'"));
        }
        Ok(items)
    }

    /// Key-value pairs up to a closing bracket or the end of input.
    fn items(&mut self) -> Result<Vec<(String, Value)>, Error> {
        let mut items = vec![];
        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some(']') => return Ok(items),
                Some(_) => {
                    let key = self.key()?;
                    self.skip_whitespace();
                    let value = self.value()?;
                    items.push((key, value));
                }
            }
        }
    }

    fn key(&mut self) -> Result<String, Error> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            Some(c) => return Err(self.error(format!("expected a key, found {c:?}"))),
            None => return Err(self.error("expected a key, found end of input")),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.bump();
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn value(&mut self) -> Result<Value, Error> {
        match self.peek() {
            Some('[') => {
                self.bump();
                let items = self.items()?;
                match self.bump() {
                    Some(']') => Ok(Value::List(items)),
                    _ => Err(self.error("unclosed '['")),
                }
            }
            Some('"') => {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != '"') {
                    self.bump();
                }
                let raw = &self.input[start..self.pos];
                match self.bump() {
                    Some('"') => Ok(Value::Str(unescape(raw))),
                    _ => Err(self.error("unterminated string")),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) => Err(self.error(format!("expected a value, found {c:?}"))),
            None => Err(self.error("expected a value, found end of input")),
        }
    }

    fn number(&mut self) -> Result<Value, Error> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.'))
        {
            self.bump();
        }
        let text = &self.input[start..self.pos];

        if let Ok(i) = text.parse::<i64>() {
            Ok(Value::Int(i))
        } else if let Ok(x) = text.parse::<f64>() {
            Ok(Value::Real(x))
        } else {
            Err(self.error(format!("invalid number {text:?}")))
        }
    }
}

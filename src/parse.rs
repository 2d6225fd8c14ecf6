//! Reads the textual representation back into values.
//!
//! Anything `repr` writes is accepted, except the `{...}` style markers of
//! cyclic graphs, which cannot be inverted. Factory variants name their
//! factory, so reading them requires a [`FactoryRegistry`] that knows it.

use std::collections::HashMap;
use std::str::Chars;

use pest::Parser;
use pest::error::LineColLocation;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::error::{MunchError, Result};
use crate::container::Munch;
use crate::policy::Factory;
use crate::value::{Dict, Key, List, Tuple, Value};

#[derive(Parser)]
#[grammar = "src/repr.pest"]
struct ReprParser;

/// Factories known by name, used to rebuild `DefaultFactoryMunch(name, ..)`.
#[derive(Clone, Debug, Default)]
pub struct FactoryRegistry {
    factories: HashMap<String, Factory>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    /// `list`, `dict`, `Munch` and `RecursiveMunch`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Factory::list());
        registry.register(Factory::dict());
        registry.register(Factory::munch());
        registry.register(Factory::recursive());
        registry
    }
    /// Registers `factory` under its own name, replacing any earlier one.
    pub fn register(&mut self, factory: Factory) {
        self.factories.insert(factory.name().to_owned(), factory);
    }
    pub fn get(&self, name: &str) -> Option<Factory> {
        self.factories.get(name).cloned()
    }
}

fn parse_error(message: impl Into<String>) -> MunchError {
    MunchError::Parse {
        message: message.into(),
        line: None,
        col: None,
    }
}

fn inner_error(rule: Rule) -> MunchError {
    parse_error(format!("malformed {:?}", rule))
}

pub struct ReprReader<'r> {
    registry: &'r FactoryRegistry,
}

impl<'r> ReprReader<'r> {
    pub fn new(registry: &'r FactoryRegistry) -> Self {
        Self { registry }
    }

    pub fn read(&self, text: &str) -> Result<Value> {
        let mut pairs = ReprParser::parse(Rule::document, text).map_err(|e| {
            let (line, col) = match e.line_col {
                LineColLocation::Pos((l, c)) => (l, c),
                LineColLocation::Span((l, c), _) => (l, c),
            };
            MunchError::Parse {
                message: e.variant.message().into_owned(),
                line: Some(line),
                col: Some(col),
            }
        })?;
        let document = pairs.next().ok_or_else(|| parse_error("empty input"))?;
        let value = document
            .into_inner()
            .next()
            .ok_or_else(|| parse_error("empty input"))?;
        self.value(value)
    }

    fn value(&self, pair: Pair<Rule>) -> Result<Value> {
        match pair.as_rule() {
            Rule::none => Ok(Value::None),
            Rule::boolean => Ok(Value::Bool(pair.as_str() == "True")),
            Rule::integer => integer(pair.as_str()).map(Value::Int),
            Rule::float => pair
                .as_str()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| parse_error(format!("bad float '{}': {}", pair.as_str(), e))),
            Rule::string => string(pair).map(Value::Str),
            Rule::list => pair
                .into_inner()
                .map(|item| self.value(item))
                .collect::<Result<Vec<_>>>()
                .map(|items| Value::List(List::from(items))),
            Rule::tuple => pair
                .into_inner()
                .map(|item| self.value(item))
                .collect::<Result<Vec<_>>>()
                .map(|items| Value::Tuple(Tuple::new(items))),
            Rule::named_tuple => self.named_tuple(pair),
            Rule::dict => {
                let dict = Dict::new();
                for (key, value) in self.entries(pair)? {
                    dict.insert(key, value);
                }
                Ok(Value::Dict(dict))
            }
            Rule::plain_munch => {
                let mut inner = pair.into_inner();
                let munch = match inner.next().map(|t| t.as_str()) {
                    Some("AutoMunch") => Munch::auto(),
                    _ => Munch::new(),
                };
                self.fill(&munch, inner.next())
            }
            Rule::default_munch => {
                let mut inner = pair.into_inner();
                let default = inner.next().ok_or_else(|| inner_error(Rule::default_munch))?;
                let munch = Munch::with_default(self.value(default)?);
                self.fill(&munch, inner.next())
            }
            Rule::factory_munch => {
                let mut inner = pair.into_inner();
                let name = inner
                    .next()
                    .ok_or_else(|| inner_error(Rule::factory_munch))?
                    .as_str();
                let factory = self
                    .registry
                    .get(name)
                    .ok_or_else(|| parse_error(format!("unknown factory '{}'", name)))?;
                self.fill(&Munch::with_factory(factory), inner.next())
            }
            Rule::recursive_munch => {
                let munch = Munch::recursive();
                let body = pair.into_inner().find(|p| p.as_rule() == Rule::dict);
                self.fill(&munch, body)
            }
            other => Err(inner_error(other)),
        }
    }

    fn named_tuple(&self, pair: Pair<Rule>) -> Result<Value> {
        let mut inner = pair.into_inner();
        let name = inner
            .next()
            .ok_or_else(|| inner_error(Rule::named_tuple))?
            .as_str();
        let mut fields = Vec::new();
        let mut items = Vec::new();
        for field in inner {
            let mut parts = field.into_inner();
            let (Some(field_name), Some(item)) = (parts.next(), parts.next()) else {
                return Err(inner_error(Rule::field));
            };
            fields.push(field_name.as_str());
            items.push(self.value(item)?);
        }
        Tuple::named(name, &fields, items).map(Value::Tuple)
    }

    fn entries(&self, dict: Pair<Rule>) -> Result<Vec<(Key, Value)>> {
        let mut entries = Vec::new();
        for entry in dict.into_inner() {
            let mut parts = entry.into_inner();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                return Err(inner_error(Rule::entry));
            };
            let key = match key.as_rule() {
                Rule::boolean => Key::Bool(key.as_str() == "True"),
                Rule::integer => Key::Int(integer(key.as_str())?),
                _ => Key::Str(string(key)?),
            };
            entries.push((key, self.value(value)?));
        }
        Ok(entries)
    }

    fn fill(&self, munch: &Munch, body: Option<Pair<Rule>>) -> Result<Value> {
        if let Some(body) = body {
            for (key, value) in self.entries(body)? {
                munch.set_item(key, value)?;
            }
        }
        Ok(Value::Munch(munch.clone()))
    }
}

/// Reads a representation, resolving factories from the default registry.
pub fn parse_repr(text: &str) -> Result<Value> {
    ReprReader::new(&FactoryRegistry::with_defaults()).read(text)
}

fn integer(text: &str) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|e| parse_error(format!("bad integer '{}': {}", text, e)))
}

fn string(pair: Pair<Rule>) -> Result<String> {
    let raw = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
    unescape(raw)
}

fn unescape(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('a') => out.push('\u{07}'),
            Some('b') => out.push('\u{08}'),
            Some('f') => out.push('\u{0c}'),
            Some('v') => out.push('\u{0b}'),
            Some(c @ ('\\' | '\'' | '"')) => out.push(c),
            Some('x') => out.push(hex(&mut chars, 2)?),
            Some('u') => out.push(hex(&mut chars, 4)?),
            Some('U') => out.push(hex(&mut chars, 8)?),
            // line continuation
            Some('\n') => (),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => return Err(parse_error("dangling backslash")),
        }
    }
    Ok(out)
}

fn hex(chars: &mut Chars, width: usize) -> Result<char> {
    let digits: String = chars.by_ref().take(width).collect();
    if digits.len() != width {
        return Err(parse_error(format!("truncated escape '{}'", digits)));
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| parse_error(format!("bad escape '{}'", digits)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_are_decoded() {
        assert_eq!(unescape(r"a\nb\x41é\\").expect("valid"), "a\nbA\u{e9}\\");
        assert!(unescape(r"\x4").is_err());
    }

    #[test]
    fn errors_carry_a_position() {
        match parse_repr("{'a': }") {
            Err(MunchError::Parse { line, col, .. }) => {
                assert_eq!(line, Some(1));
                assert!(col.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

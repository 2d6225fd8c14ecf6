//! Python-literal rendering of values, the `repr` of a munch.
//!
//! An object already being rendered further up the stack is written as
//! `{...}`, `[...]` or `(...)`, so cyclic graphs render in finite text. A
//! munch met again keeps only its type name: `DefaultMunch({...})`.

use std::fmt::Write;

use crate::container::{Munch, Variant};
use crate::value::{Key, Value};

pub fn repr(value: &Value) -> String {
    let mut writer = ReprWriter::default();
    writer.value(value);
    writer.out
}

pub fn key_repr(key: &Key) -> String {
    match key {
        Key::Bool(b) => bool_repr(*b).to_owned(),
        Key::Int(i) => i.to_string(),
        Key::Str(s) => str_repr(s),
    }
}

fn bool_repr(b: bool) -> &'static str {
    if b { "True" } else { "False" }
}

/// Single quotes unless the text holds a single quote and no double quote.
pub fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Shortest round-trip digits, positional for exponents in -4..16 and
/// scientific with a signed two digit exponent otherwise.
pub fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_owned();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let scientific = format!("{:e}", f);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    if !(-4..16).contains(&exponent) {
        return format!(
            "{}{}e{}{:02}",
            sign,
            mantissa,
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        );
    }
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let body = if exponent < 0 {
        format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
    } else {
        let point = exponent as usize + 1;
        if digits.len() <= point {
            format!("{}{}.0", digits, "0".repeat(point - digits.len()))
        } else {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
    };
    format!("{}{}", sign, body)
}

#[derive(Default)]
struct ReprWriter {
    // identities of the containers currently being written
    active: Vec<usize>,
    out: String,
}

impl ReprWriter {
    fn value(&mut self, value: &Value) {
        match value {
            Value::None => self.out.push_str("None"),
            Value::Bool(b) => self.out.push_str(bool_repr(*b)),
            Value::Int(i) => {
                let _ = write!(self.out, "{}", i);
            }
            Value::Float(f) => self.out.push_str(&float_repr(*f)),
            Value::Str(s) => self.out.push_str(&str_repr(s)),
            Value::List(list) => {
                if self.enter(list.identity(), "[...]") {
                    self.sequence('[', &list.to_vec(), ']');
                    self.active.pop();
                }
            }
            Value::Tuple(tuple) => {
                if self.enter(tuple.identity(), "(...)") {
                    match (tuple.name(), tuple.fields()) {
                        (Some(name), Some(fields)) => {
                            self.out.push_str(name);
                            self.out.push('(');
                            for (i, (field, item)) in fields.iter().zip(tuple.items()).enumerate() {
                                if i > 0 {
                                    self.out.push_str(", ");
                                }
                                self.out.push_str(field);
                                self.out.push('=');
                                self.value(item);
                            }
                            self.out.push(')');
                        }
                        _ if tuple.len() == 1 => {
                            self.out.push('(');
                            self.value(&tuple.items()[0]);
                            self.out.push_str(",)");
                        }
                        _ => self.sequence('(', tuple.items(), ')'),
                    }
                    self.active.pop();
                }
            }
            Value::Dict(dict) => {
                if self.enter(dict.identity(), "{...}") {
                    self.mapping(dict.items());
                    self.active.pop();
                }
            }
            Value::Munch(munch) => self.munch(munch),
        }
    }

    // false when the object is already on the stack and the marker was written
    fn enter(&mut self, id: usize, marker: &str) -> bool {
        if self.active.contains(&id) {
            self.out.push_str(marker);
            return false;
        }
        self.active.push(id);
        true
    }

    fn sequence(&mut self, open: char, items: &[Value], close: char) {
        self.out.push(open);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.value(item);
        }
        self.out.push(close);
    }

    fn mapping(&mut self, items: Vec<(Key, Value)>) {
        self.out.push('{');
        for (i, (key, value)) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&key_repr(key));
            self.out.push_str(": ");
            self.value(value);
        }
        self.out.push('}');
    }

    // the munch is on the stack before its default is written, so a default
    // reaching back to the munch ends in the marker too
    fn munch(&mut self, munch: &Munch) {
        self.out.push_str(munch.type_name());
        self.out.push('(');
        if !self.enter(munch.identity(), "{...})") {
            return;
        }
        match munch.variant() {
            Variant::DefaultMunch => {
                let default = munch.default_value().unwrap_or_default();
                self.value(&default);
                self.out.push_str(", ");
            }
            Variant::DefaultFactoryMunch | Variant::RecursiveMunch => {
                if let Some(factory) = munch.default_factory() {
                    self.out.push_str(factory.name());
                    self.out.push_str(", ");
                }
            }
            Variant::Munch | Variant::AutoMunch => (),
        }
        self.mapping(munch.items());
        self.active.pop();
        self.out.push(')');
    }
}

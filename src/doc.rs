use std::fmt;

/// A value in a structured source document. Maps preserve key order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
}

#[derive(Debug, thiserror::Error)]
#[error("line {line}: {msg}")]
pub struct ParseError {
    pub line: usize,
    pub msg: String,
}

fn err<T>(line: usize, msg: impl Into<String>) -> Result<T, ParseError> {
    Err(ParseError {
        line,
        msg: msg.into(),
    })
}

impl Value {
    /// Map lookup, `None` for non-maps and missing keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_f(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
    pub fn entries(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn f_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).and_then(Value::as_f).unwrap_or(default)
    }
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn as_vec2(&self) -> Option<[f64; 2]> {
        self.components(["x", "y"])
    }
    pub fn as_vec3(&self) -> Option<[f64; 3]> {
        self.components(["x", "y", "z"])
    }
    pub fn as_vec4(&self) -> Option<[f64; 4]> {
        self.components(["x", "y", "z", "w"])
    }
    pub fn as_rgba(&self) -> Option<[f64; 4]> {
        self.components(["r", "g", "b", "a"])
    }

    /// Fixed-arity numeric vector, accepted either as `[..]` or as a map with
    /// the given component keys.
    fn components<const N: usize>(&self, keys: [&str; N]) -> Option<[f64; N]> {
        let mut out = [0.; N];
        match self {
            Value::List(items) if items.len() == N => {
                for (o, item) in out.iter_mut().zip(items) {
                    *o = item.as_f()?;
                }
            }
            Value::Map(_) => {
                for (o, k) in out.iter_mut().zip(keys) {
                    *o = self.get(k)?.as_f()?;
                }
            }
            _ => return None,
        }
        Some(out)
    }
}

/// Parse an indentation-structured key/value document.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut lines = vec![];
    for (i, raw) in text.lines().enumerate() {
        let stripped = strip_comment(raw);
        let trimmed = stripped.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let indent = stripped.len() - trimmed.len();
        if stripped[..indent].contains('\t') {
            return err(i + 1, "tabs are not allowed in indentation");
        }
        lines.push((i + 1, indent, trimmed.trim_end().to_string()));
    }
    if lines.is_empty() {
        return Ok(Value::Null);
    }
    let mut p = Parser { lines, pos: 0 };
    let first_indent = p.lines[0].1;
    let v = p.block(first_indent)?;
    if let Some(&(no, _, _)) = p.peek() {
        return err(no, "trailing content outside the document root");
    }
    Ok(v)
}

struct Parser {
    // (line number, indent, content)
    lines: Vec<(usize, usize, String)>,
    pos: usize,
}

fn is_list_item(text: &str) -> bool {
    text == "-" || (text.starts_with('-') && text[1..].starts_with(' '))
}

/// Split `key: rest` at the first top-level colon followed by a space or end
/// of line. Returns `None` if the line is not shaped like a map entry.
fn split_entry(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut quote = None;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '{') => depth += 1,
            (None, ']' | '}') => depth = depth.saturating_sub(1),
            (None, ':') if depth == 0 => {
                let rest = &text[i + 1..];
                if rest.is_empty() || rest.starts_with(' ') {
                    return Some((text[..i].trim(), rest.trim()));
                }
            }
            _ => {}
        }
    }
    None
}

impl Parser {
    fn peek(&self) -> Option<&(usize, usize, String)> {
        self.lines.get(self.pos)
    }

    fn block(&mut self, indent: usize) -> Result<Value, ParseError> {
        match self.peek() {
            Some((_, _, text)) if is_list_item(text) => self.list(indent),
            Some(_) => self.map(indent),
            None => Ok(Value::Null),
        }
    }

    fn list(&mut self, indent: usize) -> Result<Value, ParseError> {
        let mut items = vec![];
        while let Some((no, ind, text)) = self.peek().cloned() {
            if ind < indent || !is_list_item(&text) {
                break;
            }
            if ind > indent {
                return err(no, "unexpected indentation");
            }
            if text == "-" {
                self.pos += 1;
                let item = match self.peek() {
                    Some(&(_, child, _)) if child > indent => self.block(child)?,
                    _ => Value::Null,
                };
                items.push(item);
                continue;
            }
            let rest = text[1..].trim_start();
            let offset = text.len() - rest.len();
            if split_entry(rest).is_some() {
                // First map entry shares the item line; re-indent it so the
                // remaining entries parse as one block.
                self.lines[self.pos] = (no, ind + offset, rest.to_string());
                items.push(self.map(ind + offset)?);
            } else {
                self.pos += 1;
                items.push(inline(rest, no)?);
            }
        }
        Ok(Value::List(items))
    }

    fn map(&mut self, indent: usize) -> Result<Value, ParseError> {
        let mut entries = vec![];
        while let Some((no, ind, text)) = self.peek().cloned() {
            if ind < indent {
                break;
            }
            if ind > indent {
                return err(no, "unexpected indentation");
            }
            let Some((key, rest)) = split_entry(&text) else {
                return err(no, format!("expected `key: value`, found `{text}`"));
            };
            self.pos += 1;
            let v = if rest.is_empty() {
                match self.peek() {
                    Some(&(_, child, _)) if child > indent => self.block(child)?,
                    _ => Value::Null,
                }
            } else {
                inline(rest, no)?
            };
            entries.push((key.to_string(), v));
        }
        Ok(Value::Map(entries))
    }
}

/// Parse an inline value: scalar, `[..]` list or `{..}` map.
fn inline(s: &str, no: usize) -> Result<Value, ParseError> {
    let s = s.trim();
    if let Some(body) = s.strip_prefix('[') {
        let Some(body) = body.strip_suffix(']') else {
            return err(no, format!("unterminated `[` in `{s}`"));
        };
        let mut items = vec![];
        for part in split_top_level(body) {
            items.push(inline(part, no)?);
        }
        return Ok(Value::List(items));
    }
    if let Some(body) = s.strip_prefix('{') {
        let Some(body) = body.strip_suffix('}') else {
            return err(no, format!("unterminated `{{` in `{s}`"));
        };
        let mut entries = vec![];
        for part in split_top_level(body) {
            let Some((key, rest)) = split_entry(part.trim()) else {
                return err(no, format!("expected `key: value`, found `{part}`"));
            };
            entries.push((key.to_string(), inline(rest, no)?));
        }
        return Ok(Value::Map(entries));
    }
    Ok(scalar(s))
}

fn scalar(s: &str) -> Value {
    match s {
        "" | "null" | "~" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return Value::Str(s[1..s.len() - 1].to_string());
        }
    }
    if let Ok(n) = s.parse::<f64>() {
        return Value::Num(n);
    }
    Value::Str(s.to_string())
}

/// Split on top-level commas, ignoring separators nested in brackets or
/// quotes. Empty input yields no parts.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '{') => depth += 1,
            (None, ']' | '}') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if !s[start..].trim().is_empty() || !parts.is_empty() {
        parts.push(&s[start..]);
    }
    parts
}

/// Truncate at an unquoted `#` that starts the line or follows whitespace.
fn strip_comment(raw: &str) -> &str {
    let mut quote = None;
    let mut prev_ws = true;
    for (i, c) in raw.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') if prev_ws => return &raw[..i],
            _ => {}
        }
        prev_ws = c.is_whitespace();
    }
    raw
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => write!(f, "{n}"),
            Value::Str(s) => {
                if needs_quotes(s) {
                    write!(f, "\"{s}\"")
                } else {
                    write!(f, "{s}")
                }
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.parse::<f64>().is_ok()
        || matches!(s, "true" | "false" | "null" | "~")
        || s.contains([':', ',', '#', '[', ']', '{', '}', '"', '\''])
        || s.starts_with(' ')
        || s.ends_with(' ')
}

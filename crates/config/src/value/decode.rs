//! Ordered literal decoding of raw option text.
//!
//! Attempts, in order: keyword (`True`, `False`, `None`), integer, float,
//! structured literal (quoted string, list, tuple, dict). Anything else is
//! returned as the original string.

use super::Value;

/// Nesting limit for structured literals; deeper input decodes as a string.
const MAX_DEPTH: usize = 32;

/// Decode raw text into a `Value`, falling back to the text unchanged.
pub fn decode(raw: &str) -> Value {
    let mut parser = Parser::new(raw.trim());
    match parser.literal(0) {
        Some(value) if parser.at_end() => value,
        _ => Value::Str(raw.to_string()),
    }
}

fn keyword(token: &str) -> Option<Value> {
    match token {
        "True" => Some(Value::Bool(true)),
        "False" => Some(Value::Bool(false)),
        "None" => Some(Value::Null),
        _ => None,
    }
}

fn split_sign(token: &str) -> (bool, &str) {
    if let Some(rest) = token.strip_prefix('-') {
        (true, rest)
    } else {
        (false, token.strip_prefix('+').unwrap_or(token))
    }
}

/// Underscores may only separate digits.
fn valid_underscores(digits: &str) -> bool {
    !digits.starts_with('_') && !digits.ends_with('_') && !digits.contains("__")
}

fn parse_int(token: &str) -> Option<i64> {
    let (negative, body) = split_sign(token);
    let lower = body.to_ascii_lowercase();
    let (radix, digits) = match lower.get(..2) {
        Some("0x") => (16, &lower[2..]),
        Some("0o") => (8, &lower[2..]),
        Some("0b") => (2, &lower[2..]),
        _ => (10, lower.as_str()),
    };

    if digits.is_empty() || !valid_underscores(digits) {
        return None;
    }
    if !digits.chars().all(|c| c == '_' || c.is_digit(radix)) {
        return None;
    }
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    // `007` is not an integer literal; `0` and `00` are.
    if radix == 10 && cleaned.len() > 1 && cleaned.starts_with('0') && cleaned.contains(|c| c != '0')
    {
        return None;
    }

    let magnitude = i128::from_str_radix(&cleaned, radix).ok()?;
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn parse_float(token: &str) -> Option<f64> {
    let (negative, body) = split_sign(token);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };

    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };
    if fraction.is_none() && exponent.is_none() {
        return None;
    }

    let digit_run = |s: &str| {
        s.is_empty() || (valid_underscores(s) && s.chars().all(|c| c == '_' || c.is_ascii_digit()))
    };
    if !digit_run(whole) || !fraction.is_none_or(digit_run) {
        return None;
    }
    if whole.is_empty() && fraction.is_none_or(str::is_empty) {
        return None;
    }
    if let Some(exp) = exponent {
        let (_, exp_digits) = split_sign(exp);
        if exp_digits.is_empty() || !digit_run(exp_digits) {
            return None;
        }
    }

    let cleaned: String = body.chars().filter(|c| *c != '_').collect();
    let value: f64 = cleaned.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn scalar(token: &str) -> Option<Value> {
    keyword(token)
        .or_else(|| parse_int(token).map(Value::Int))
        .or_else(|| parse_float(token).map(Value::Float))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos == self.src.len()
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn literal(&mut self, depth: usize) -> Option<Value> {
        if depth > MAX_DEPTH {
            return None;
        }
        self.skip_ws();
        match self.peek()? {
            '[' => {
                self.bump();
                self.sequence(']', depth).map(|(items, _)| Value::List(items))
            }
            '(' => {
                self.bump();
                let (mut items, trailing_comma) = self.sequence(')', depth)?;
                // `(1)` is a parenthesized scalar, `(1,)` is a tuple.
                if items.len() == 1 && !trailing_comma {
                    items.pop()
                } else {
                    Some(Value::List(items))
                }
            }
            '{' => {
                self.bump();
                self.dict(depth)
            }
            quote @ ('\'' | '"') => {
                self.bump();
                self.string(quote).map(Value::Str)
            }
            _ => {
                let token = self.token();
                scalar(token)
            }
        }
    }

    /// A bare token runs until whitespace or a structural character.
    fn token(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | ']' | ')' | '}' | '[' | '(' | '{'))
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Items up to `close`. Returns the items and whether a trailing comma was seen.
    fn sequence(&mut self, close: char, depth: usize) -> Option<(Vec<Value>, bool)> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            if self.eat(close) {
                return Some((items, trailing_comma));
            }
            items.push(self.literal(depth + 1)?);
            trailing_comma = self.eat(',');
            if !trailing_comma {
                return self.eat(close).then_some((items, false));
            }
        }
    }

    fn dict(&mut self, depth: usize) -> Option<Value> {
        let mut entries: Vec<(String, Value)> = Vec::new();
        loop {
            if self.eat('}') {
                return Some(Value::Map(entries));
            }
            let Value::Str(key) = self.literal(depth + 1)? else {
                return None;
            };
            if !self.eat(':') {
                return None;
            }
            let value = self.literal(depth + 1)?;
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
            if !self.eat(',') {
                return self.eat('}').then_some(Value::Map(entries));
            }
        }
    }

    fn string(&mut self, quote: char) -> Option<String> {
        let mut out = String::new();
        loop {
            match self.bump()? {
                c if c == quote => return Some(out),
                '\n' => return None,
                '\\' => match self.bump()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    c @ ('\\' | '\'' | '"') => out.push(c),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                c => out.push(c),
            }
        }
    }
}

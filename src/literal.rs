//! Parser for quoted structural literals as they appear in exported text columns.
//!
//! Accepts single- or double-quoted strings, integers, floats, `True`/`False`/`None`,
//! lists, tuples (read as lists) and dicts. The whole input must be consumed; anything
//! else (including JSON's `null`/`true`/`false`) yields `None` so the caller can try
//! the next parser.

use crate::data::SemanticValue;

const MAX_DEPTH: usize = 64;

pub fn parse_literal(input: &str) -> Option<SemanticValue> {
    let mut parser = LiteralParser {
        chars: input.chars().collect(),
        pos: 0,
    };
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    if parser.pos == parser.chars.len() {
        Some(value)
    } else {
        None
    }
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_value(&mut self, depth: usize) -> Option<SemanticValue> {
        if depth > MAX_DEPTH {
            return None;
        }
        self.skip_whitespace();
        match self.peek()? {
            '\'' | '"' => self.parse_string().map(SemanticValue::Text),
            '[' => {
                self.pos += 1;
                self.parse_sequence(']', depth).map(SemanticValue::List)
            }
            '(' => {
                self.pos += 1;
                self.parse_tuple(depth)
            }
            '{' => {
                self.pos += 1;
                self.parse_dict(depth)
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.parse_number(),
            c if c.is_ascii_alphabetic() => self.parse_keyword(),
            _ => None,
        }
    }

    fn parse_keyword(&mut self) -> Option<SemanticValue> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let word = self.chars[start..self.pos].iter().collect::<String>();
        match word.as_str() {
            "None" => Some(SemanticValue::Null),
            "True" => Some(SemanticValue::Boolean(true)),
            "False" => Some(SemanticValue::Boolean(false)),
            _ => None,
        }
    }

    fn parse_number(&mut self) -> Option<SemanticValue> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        let int_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.pos += 1;
        }
        let int_digits = self.chars[int_start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect::<String>();
        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some('-' | '+')) {
                self.pos += 1;
            }
            let exp_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            if exp_start == self.pos {
                return None;
            }
        }
        let text = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect::<String>();

        if is_float {
            let parsed = text.parse::<f64>().ok()?;
            return Some(SemanticValue::Text(parsed.to_string()));
        }
        if int_digits.is_empty() {
            return None;
        }
        // Leading zeros are not valid in decimal integer literals ("007", "2023-01-05").
        if int_digits.len() > 1 && int_digits.starts_with('0') && int_digits.chars().any(|c| c != '0') {
            return None;
        }
        match text.parse::<i64>() {
            Ok(value) => Some(SemanticValue::Integer(value)),
            Err(_) => Some(SemanticValue::Text(text.trim_start_matches('+').to_string())),
        }
    }

    fn parse_string(&mut self) -> Option<String> {
        let quote = self.bump()?;
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
                    '\\' => out.push('\\'),
                    '\'' => out.push('\''),
                    '"' => out.push('"'),
                    '\n' => {}
                    'x' => out.push(self.parse_hex_escape(2)?),
                    'u' => out.push(self.parse_hex_escape(4)?),
                    'U' => out.push(self.parse_hex_escape(8)?),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                c => out.push(c),
            }
        }
    }

    fn parse_hex_escape(&mut self, width: usize) -> Option<char> {
        let end = self.pos.checked_add(width)?;
        let digits = self.chars.get(self.pos..end)?.iter().collect::<String>();
        self.pos = end;
        let code = u32::from_str_radix(&digits, 16).ok()?;
        char::from_u32(code)
    }

    fn parse_sequence(&mut self, close: char, depth: usize) -> Option<Vec<SemanticValue>> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Some(items);
        }
        loop {
            items.push(self.parse_value(depth + 1)?);
            if self.eat(',') {
                if self.eat(close) {
                    return Some(items);
                }
                continue;
            }
            if self.eat(close) {
                return Some(items);
            }
            return None;
        }
    }

    fn parse_tuple(&mut self, depth: usize) -> Option<SemanticValue> {
        if self.eat(')') {
            return Some(SemanticValue::List(Vec::new()));
        }
        let first = self.parse_value(depth + 1)?;
        if self.eat(')') {
            // A parenthesised single value is not a tuple.
            return Some(first);
        }
        if !self.eat(',') {
            return None;
        }
        let mut items = vec![first];
        if self.eat(')') {
            return Some(SemanticValue::List(items));
        }
        items.extend(self.parse_sequence(')', depth)?);
        Some(SemanticValue::List(items))
    }

    fn parse_dict(&mut self, depth: usize) -> Option<SemanticValue> {
        let mut entries: Vec<(String, SemanticValue)> = Vec::new();
        if self.eat('}') {
            return Some(SemanticValue::Mapping(entries));
        }
        loop {
            let key = match self.parse_value(depth + 1)? {
                SemanticValue::Text(s) => s,
                SemanticValue::Integer(i) => i.to_string(),
                SemanticValue::Null => "null".to_string(),
                SemanticValue::Boolean(true) => "True".to_string(),
                SemanticValue::Boolean(false) => "False".to_string(),
                _ => return None,
            };
            if !self.eat(':') {
                return None;
            }
            let value = self.parse_value(depth + 1)?;
            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
            if self.eat(',') {
                if self.eat('}') {
                    return Some(SemanticValue::Mapping(entries));
                }
                continue;
            }
            if self.eat('}') {
                return Some(SemanticValue::Mapping(entries));
            }
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SemanticValue {
        SemanticValue::Text(s.to_string())
    }

    #[test]
    fn parses_quoted_scalars() {
        assert_eq!(parse_literal("'abc'"), Some(text("abc")));
        assert_eq!(parse_literal(r#""it\'s""#), Some(text("it's")));
        assert_eq!(parse_literal("42"), Some(SemanticValue::Integer(42)));
        assert_eq!(parse_literal("-7"), Some(SemanticValue::Integer(-7)));
        assert_eq!(parse_literal("1.5"), Some(text("1.5")));
        assert_eq!(parse_literal("None"), Some(SemanticValue::Null));
        assert_eq!(parse_literal("True"), Some(SemanticValue::Boolean(true)));
        assert_eq!(parse_literal("False"), Some(SemanticValue::Boolean(false)));
    }

    #[test]
    fn parses_nested_containers() {
        let parsed = parse_literal("{'a': [1, 'x', None], 'b': (2, 3), 'c': {}}").unwrap();
        assert_eq!(
            parsed,
            SemanticValue::Mapping(vec![
                (
                    "a".into(),
                    SemanticValue::List(vec![
                        SemanticValue::Integer(1),
                        text("x"),
                        SemanticValue::Null
                    ])
                ),
                (
                    "b".into(),
                    SemanticValue::List(vec![SemanticValue::Integer(2), SemanticValue::Integer(3)])
                ),
                ("c".into(), SemanticValue::Mapping(vec![])),
            ])
        );
        assert_eq!(
            parse_literal("[1, 2,]"),
            Some(SemanticValue::List(vec![
                SemanticValue::Integer(1),
                SemanticValue::Integer(2)
            ]))
        );
    }

    #[test]
    fn later_duplicate_keys_win_in_place() {
        assert_eq!(
            parse_literal("{'a': 1, 'b': 2, 'a': 3}"),
            Some(SemanticValue::Mapping(vec![
                ("a".into(), SemanticValue::Integer(3)),
                ("b".into(), SemanticValue::Integer(2)),
            ]))
        );
    }

    #[test]
    fn rejects_bare_words_json_keywords_and_dates() {
        assert_eq!(parse_literal("hello"), None);
        assert_eq!(parse_literal("null"), None);
        assert_eq!(parse_literal(r#"{"a": null}"#), None);
        assert_eq!(parse_literal("2023-01-05"), None);
        assert_eq!(parse_literal("007"), None);
        assert_eq!(parse_literal("[1, 2"), None);
        assert_eq!(parse_literal("'unterminated"), None);
        assert_eq!(parse_literal(""), None);
    }
}

//! Balanced-delimiter scanning
//!
//! Expressions embedded in a grammar (`${…}`, call arguments, keyword slots) are opaque to
//! it; they only have to be cut out correctly. The scanners here track `()`, `[]`, `{}`
//! nesting and skip over quoted strings (`"`, `'`, `` ` ``) with backslash escapes.

fn closer(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

fn is_quote(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '`')
}

/// Index of the closing quote of the string opened at `open`
fn skip_string(chars: &[char], open: usize) -> Option<usize> {
    let quote = chars[open];
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            ch if ch == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Index of `close` matching an opener that sits right before `start`
pub fn balanced(chars: &[char], start: usize, close: char) -> Option<usize> {
    let mut expected = vec![close];
    let mut i = start;
    while i < chars.len() {
        let ch = chars[i];
        if is_quote(ch) {
            i = skip_string(chars, i)?;
        } else if let Some(inner) = closer(ch) {
            expected.push(inner);
        } else if Some(&ch) == expected.last() {
            expected.pop();
            if expected.is_empty() {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Index of the first character of `stops` found outside any nesting or string
pub fn until_top_level(chars: &[char], start: usize, stops: &[char]) -> Option<usize> {
    let mut depth: Vec<char> = Vec::new();
    let mut i = start;
    while i < chars.len() {
        let ch = chars[i];
        if depth.is_empty() && stops.contains(&ch) {
            return Some(i);
        }
        if is_quote(ch) {
            i = skip_string(chars, i)?;
        } else if let Some(inner) = closer(ch) {
            depth.push(inner);
        } else if Some(&ch) == depth.last() {
            depth.pop();
        }
        i += 1;
    }
    None
}

/// Splits raw call arguments on top-level commas
pub fn split_arguments(source: &str) -> Vec<String> {
    let chars: Vec<char> = source.chars().collect();
    let mut args = Vec::new();
    let mut start = 0;
    while start <= chars.len() {
        let end = until_top_level(&chars, start, &[',']).unwrap_or(chars.len());
        let arg: String = chars[start..end].iter().collect();
        args.push(arg.trim().to_string());
        start = end + 1;
    }
    if args.len() == 1 && args[0].is_empty() {
        args.clear();
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(source: &str) -> Vec<char> {
        source.chars().collect()
    }

    #[test]
    fn test_balanced_respects_nesting_and_strings() {
        let source = chars("(a(b)[c] ')' \"(\")x");
        assert_eq!(balanced(&source, 1, ')'), Some(16));
        assert_eq!(balanced(&chars("(a"), 1, ')'), None);
        assert_eq!(balanced(&chars("{'\\''}"), 1, '}'), Some(5));
    }

    #[test]
    fn test_until_top_level_skips_nested_stops() {
        let source = chars("f(a, b), c");
        assert_eq!(until_top_level(&source, 0, &[',']), Some(7));
        assert_eq!(until_top_level(&source, 0, &[';']), None);
        assert_eq!(until_top_level(&chars("x)"), 0, &[')']), Some(1));
    }

    #[test]
    fn test_split_arguments() {
        assert_eq!(split_arguments("a, f(b, c), 'x,y'"), vec!["a", "f(b, c)", "'x,y'"]);
        assert_eq!(split_arguments("  "), Vec::<String>::new());
        assert_eq!(split_arguments("one"), vec!["one"]);
    }
}

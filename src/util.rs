//! Shared utility helpers.

/// Convert an identifier to exported Go camel case (`user_id` -> `UserId`, `idEQ` -> `IdEQ`).
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = true;
    for ch in s.chars() {
        if ch == '_' || ch == '-' || ch == ' ' || ch == '.' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Split a camel-case or snake-case identifier into lower-case words joined by `sep`.
pub fn to_delimited(s: &str, sep: char) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for ch in s.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !out.is_empty() && !out.ends_with(sep) {
                out.push(sep);
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !out.ends_with(sep) {
            out.push(sep);
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.extend(ch.to_lowercase());
    }
    out
}

/// Strip backtick, double-quote or bracket identifier quoting.
#[inline]
pub fn unquote_identifier(s: &str) -> &str {
    let s = s.trim();
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'`' && last == b'`')
            || (first == b'"' && last == b'"')
            || (first == b'[' && last == b']')
        {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Split a possibly qualified, possibly quoted object name into its unquoted parts.
pub fn object_name_parts(name: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for ch in name.chars() {
        match quote {
            Some(q) if ch == q => {
                quote = None;
                current.push(ch);
            }
            Some(_) => current.push(ch),
            None if ch == '`' || ch == '"' => {
                quote = Some(ch);
                current.push(ch);
            }
            None if ch == '[' => {
                quote = Some(']');
                current.push(ch);
            }
            None if ch == '.' => {
                parts.push(unquote_identifier(&current).to_string());
                current.clear();
            }
            None => current.push(ch),
        }
    }
    parts.push(unquote_identifier(&current).to_string());
    parts
}

/// Last part of a qualified object name (`db`.`users` -> `users`).
pub fn last_name_part(name: &str) -> String {
    object_name_parts(name).pop().unwrap_or_default()
}

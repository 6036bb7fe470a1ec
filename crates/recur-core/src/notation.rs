//! Plain-text rendering of the `<sup>`/`<sub>` markup used in
//! complexity strings, for terminals and other non-HTML consumers.

/// Convert `<sup>`/`<sub>` markup to caret/underscore notation.
///
/// `n<sup>2</sup>` becomes `n^2`, `n<sup>log<sub>2</sub>(3)</sup>` becomes
/// `n^(log_2(3))`. Any other tag is left as-is.
pub fn to_plain_text(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        match open_tag(tail) {
            Some((tag, body_start)) => {
                let close = format!("</{tag}>");
                match matching_close(&tail[body_start..], tag) {
                    Some(body_len) => {
                        let inner = to_plain_text(&tail[body_start..body_start + body_len]);
                        push_script(&mut out, tag, &inner);
                        rest = &tail[body_start + body_len + close.len()..];
                    }
                    None => {
                        out.push_str(&tail[..body_start]);
                        rest = &tail[body_start..];
                    }
                }
            }
            None => {
                out.push('<');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn open_tag(s: &str) -> Option<(&'static str, usize)> {
    ["sup", "sub"].into_iter().find_map(|tag| {
        let open = format!("<{tag}>");
        s.starts_with(&open).then_some((tag, open.len()))
    })
}

/// Byte length of the body up to the close tag that balances the opening one.
fn matching_close(body: &str, tag: &str) -> Option<usize> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut depth = 0usize;
    let mut i = 0;

    while i < body.len() {
        let s = &body[i..];
        if s.starts_with(&close) {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
            i += close.len();
        } else if s.starts_with(&open) {
            depth += 1;
            i += open.len();
        } else {
            i += s.chars().next().map_or(1, char::len_utf8);
        }
    }
    None
}

fn push_script(out: &mut String, tag: &str, inner: &str) {
    let marker = if tag == "sup" { '^' } else { '_' };
    out.push(marker);
    if inner.chars().all(char::is_alphanumeric) && !inner.is_empty() {
        out.push_str(inner);
    } else {
        out.push('(');
        out.push_str(inner);
        out.push(')');
    }
}

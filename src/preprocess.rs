//! Macro expansion that runs before compilation.
//!
//! A macro is `@<name> <args...>;` on one line:
//!
//!   @include <path>;         replaced by the contents of <path>
//!   @define  <name> <value>; removed; <name> is replaced by <value> in
//!                            every line that does not start with `@`
//!
//! Unknown macros are removed. Macros are handled one at a time in textual
//! order, rescanning after each, so included text is expanded as well.

use anyhow::{Context, Result, anyhow};

/// More includes than this in one expansion means a cycle.
const MAX_INCLUDES: usize = 64;

#[derive(Debug, PartialEq, Eq)]
struct Macro {
    start: usize,
    end: usize,
    name: String,
    args: Vec<String>,
}

/// Expands every macro in `source`, using `load` to read included paths.
pub fn expand<F>(source: &str, mut load: F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut code = source.to_string();
    let mut includes = 0;

    while let Some(mac) = find_macro(&code) {
        match mac.name.as_str() {
            "include" => {
                includes += 1;
                if includes > MAX_INCLUDES {
                    return Err(anyhow!(
                        "more than {MAX_INCLUDES} includes; is a file including itself?"
                    ));
                }
                let path = mac
                    .args
                    .first()
                    .ok_or_else(|| anyhow!("`@include` needs a path"))?;
                let text = load(path).with_context(|| format!("Including {path}"))?;
                code.replace_range(mac.start..mac.end, &text);
            }
            "define" => {
                let (name, value) = match mac.args.as_slice() {
                    [name, value, ..] => (name.clone(), value.clone()),
                    _ => return Err(anyhow!("`@define` needs a name and a value")),
                };
                code.replace_range(mac.start..mac.end, "");
                code = code
                    .split('\n')
                    .map(|line| {
                        if line.starts_with('@') {
                            line.to_string()
                        } else {
                            replace_word(line, &name, &value)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
            }
            _ => code.replace_range(mac.start..mac.end, ""),
        }
    }

    Ok(code)
}

/// Finds the first `@<lowercase> <args>;` that does not span lines.
fn find_macro(code: &str) -> Option<Macro> {
    for (start, _) in code.match_indices('@') {
        let rest = &code[start + 1..];
        let name_len = rest
            .find(|c: char| !c.is_ascii_lowercase())
            .unwrap_or(rest.len());
        if name_len == 0 || !rest[name_len..].starts_with(' ') {
            continue;
        }
        let body = &rest[name_len + 1..];
        let Some(semi) = body.find([';', '\n']) else {
            continue;
        };
        if !body[semi..].starts_with(';') {
            continue;
        }
        return Some(Macro {
            start,
            end: start + 1 + name_len + 1 + semi + 1,
            name: rest[..name_len].to_string(),
            args: body[..semi].split_whitespace().map(str::to_string).collect(),
        });
    }
    None
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replaces whole-identifier occurrences of `name` in `line`.
fn replace_word(line: &str, name: &str, value: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for (pos, _) in line.match_indices(name) {
        let before = line[..pos].chars().next_back();
        let after = line[pos + name.len()..].chars().next();
        if before.is_some_and(is_ident_char) || after.is_some_and(is_ident_char) {
            continue;
        }
        out.push_str(&line[last..pos]);
        out.push_str(value);
        last = pos + name.len();
    }
    out.push_str(&line[last..]);
    out
}

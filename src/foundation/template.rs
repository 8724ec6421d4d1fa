use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Substitute `{token}` placeholders in `template` from `args`.
///
/// Unknown tokens are left untouched so callers can run several
/// substitution passes over the same string (shared arguments first,
/// per-job arguments later). Token matching is case-sensitive.
pub fn expand_tokens(template: &str, args: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match tail[1..].find(['{', '}']) {
            Some(idx) if tail.as_bytes()[1 + idx] == b'}' => {
                let key = &tail[1..1 + idx];
                match args.get(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&tail[..idx + 2]),
                }
                rest = &tail[idx + 2..];
            }
            _ => {
                // Unterminated or nested opening brace: emit literally.
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Split a flat command-line string into argv entries.
///
/// Honors single and double quotes (quotes group, are stripped, and do not
/// nest). Whitespace outside quotes separates arguments; empty runs are
/// dropped. This mirrors how the encoder command template is written: the
/// output path and input-list arguments are quoted inside the template.
pub fn split_command_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                } else {
                    current.push(ch);
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    in_arg = true;
                }
                c if c.is_whitespace() => {
                    if in_arg {
                        args.push(std::mem::take(&mut current));
                        in_arg = false;
                    }
                }
                c => {
                    current.push(c);
                    in_arg = true;
                }
            },
        }
    }

    if in_arg {
        args.push(current);
    }
    args
}

/// Lexically normalize a path: make it absolute against the current
/// directory, collapse `.`/`..` components, and use the platform separator
/// throughout. Does not touch the filesystem beyond reading the current
/// directory, so it works for paths that do not exist yet.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/template.rs"]
mod tests;

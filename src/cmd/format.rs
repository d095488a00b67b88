/*!
format.rs

Human output helpers for `sensu-runbook` (stdout summary only; protocol
progress goes through `tracing` on stderr).

  - StyleOptions::detect() -> StyleOptions (tty / NO_COLOR / NO_EMOJI / COLUMNS)
  - color(role, text, &StyleOptions) -> String
  - emoji(tag, &StyleOptions) -> &'static str
  - box_header(title, subtitle_opt, &StyleOptions) -> String
  - kv_table(rows, &StyleOptions) -> String

JSON output never goes through these helpers.
*/

use std::borrow::Cow;
use std::io::IsTerminal;

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        let tty = std::io::stdout().is_terminal();
        StyleOptions {
            use_color: tty && std::env::var_os("NO_COLOR").is_none(),
            use_emoji: std::env::var_os("NO_EMOJI").is_none(),
            term_width: width,
        }
    }

    /// No color, no emoji.
    #[cfg(test)]
    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width: 100,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color / Emoji                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Warning,
    Error,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",
        Role::Secondary => "38;5;250",
        Role::Accent => "38;5;213",
        Role::Success => "38;5;82",
        Role::Warning => "38;5;214",
        Role::Error => "38;5;196",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "warn" => "⚠",
        "info" => "ℹ",
        _ => "",
    }
}

/* -------------------------------------------------------------------------- */
/* Box Header                                                                 */
/* -------------------------------------------------------------------------- */

/// Single-line boxed title. Long content is truncated to the terminal width.
pub fn box_header(
    title: impl AsRef<str>,
    subtitle: Option<impl AsRef<str>>,
    style: &StyleOptions,
) -> String {
    let title = color(Role::Primary, title.as_ref(), style);
    let inner = match subtitle {
        Some(s) => format!("{title}  {}", color(Role::Secondary, s.as_ref(), style)),
        None => title,
    };

    let max_inner = style.term_width.saturating_sub(4).max(10);
    let inner = if display_width(&inner) > max_inner {
        truncate_ellipsis(&strip_ansi(&inner), max_inner)
    } else {
        inner
    };
    let width = display_width(&inner);

    let bar = "─".repeat(width + 2);
    format!("┌{bar}┐\n│ {inner} │\n└{bar}┘")
}

/* -------------------------------------------------------------------------- */
/* Key / Value Table                                                          */
/* -------------------------------------------------------------------------- */

/// Two-column `KEY  value` listing with keys padded to a common width.
pub fn kv_table(rows: &[(&str, String)], style: &StyleOptions) -> String {
    let key_width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    rows.iter()
        .map(|(k, v)| {
            let pad = " ".repeat(key_width - k.chars().count());
            format!("  {}{pad}  {v}", color(Role::Accent, k, style))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/* -------------------------------------------------------------------------- */
/* Text Helpers                                                               */
/* -------------------------------------------------------------------------- */

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".into();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

fn strip_ansi(s: &str) -> Cow<'_, str> {
    // scans for ESC '[' ... final letter
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for n in chars.by_ref() {
                if n.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_header_plain() {
        let style = StyleOptions::plain();
        let b = box_header("sensu-runbook OK", Some("job-1"), &style);
        let lines: Vec<&str> = b.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "│ sensu-runbook OK  job-1 │");
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
    }

    #[test]
    fn box_header_truncates_long_titles() {
        let style = StyleOptions {
            term_width: 40,
            ..StyleOptions::plain()
        };
        let b = box_header("x".repeat(200), None::<&str>, &style);
        assert!(b.lines().nth(1).unwrap().contains('…'));
    }

    #[test]
    fn kv_table_aligns_keys() {
        let style = StyleOptions::plain();
        let t = kv_table(
            &[("job", "abc".to_string()), ("namespace", "default".to_string())],
            &style,
        );
        assert_eq!(t, "  job        abc\n  namespace  default");
    }

    #[test]
    fn strip_ansi_removes_sequences() {
        let style = StyleOptions {
            use_color: true,
            ..StyleOptions::plain()
        };
        let colored = color(Role::Error, "RED", &style);
        assert_eq!(strip_ansi(&colored), "RED");
    }

    #[test]
    fn truncate() {
        assert_eq!(truncate_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_ellipsis("abc", 4), "abc");
    }

    #[test]
    fn no_emoji_when_disabled() {
        assert_eq!(emoji("success", &StyleOptions::plain()), "");
    }
}

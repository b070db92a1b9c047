use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("ANSI escape regex is valid"));

/// `manage_messages` -> `Manage Messages`, `manage_guild` -> `Manage Server`.
pub fn humanize_permission(name: &str) -> String {
    name.to_lowercase()
        .replace('_', " ")
        .replace("guild", "server")
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}

/// `a`, `a and b`, `a, b and c`.
pub fn join_with_and(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

pub fn permission_list(names: &[String]) -> String {
    join_with_and(&names.iter().map(|name| humanize_permission(name)).collect_vec())
}

/// The two lines under a usage string that point at a parameter.
#[derive(Debug, PartialEq, Eq)]
pub struct ArgumentPointer {
    pub separator: String,
    pub indicator: String,
}

/// Carets sized to the parameter plus its brackets, offset to one column before
/// the parameter's `<name>` / `[name]` token in `usage`.
///
/// When only the bare name occurs, its position is used instead. A parameter
/// that doesn't occur in `usage` at all, or occurs at the very start, gets an
/// empty separator.
pub fn argument_pointer(usage: &str, parameter: &str) -> ArgumentPointer {
    let offset = [format!("<{parameter}>"), format!("[{parameter}]")]
        .iter()
        .find_map(|token| usage.find(token.as_str()))
        .or_else(|| usage.find(parameter))
        .map(|byte_index| usage[..byte_index].chars().count())
        .unwrap_or(0)
        .saturating_sub(1);

    ArgumentPointer {
        separator: " ".repeat(offset),
        indicator: "^".repeat(parameter.chars().count() + 2),
    }
}

pub fn missing_argument_diagram(usage: &str, parameter: &str, explanation: &str) -> String {
    let ArgumentPointer {
        separator,
        indicator,
    } = argument_pointer(usage, parameter);

    format!("```\n{usage}\n{separator}{indicator}\n{explanation}\n```")
}

/// Cuts `text` to at most `max` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_owned(),
    }
}

/// Drops terminal colour and style sequences.
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Breaks up triple backticks so `text` can't close the code block it's put in.
pub fn fence_safe(text: &str) -> String {
    text.replace("```", "`\u{200b}`\u{200b}`")
}

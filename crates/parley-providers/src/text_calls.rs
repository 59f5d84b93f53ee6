//! Text tool-call grammar: tool calls written as plain text.
//!
//! Models without native function calling sometimes answer with a call
//! expression instead of a structured tool call. Four encodings are accepted:
//!
//! | encoding        | example                                               |
//! |-----------------|-------------------------------------------------------|
//! | fenced, wrapped | ```` ```tool_code\nprint(default_api.search(q='x'))\n``` ```` |
//! | fenced, direct  | ```` ```\nsearch(q='x')\n``` ````                      |
//! | bare, wrapped   | `print(default_api.search(q='x'))`                    |
//! | bare, direct    | `search(q='x')` (at least one argument)               |
//!
//! The direct forms also accept a `default_api.` prefix without `print(`.
//!
//! Extraction and stripping are both driven by [`scan`], so a span is removed
//! from the text if and only if it was turned into an invocation.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use parley_core::types::{ToolInvocation, ToolParams};

/// `key='value'`, `key="value"` or `key=123`.
const ARG: &str = r#"[A-Za-z_]\w*\s*=\s*(?:'[^']*'|"[^"]*"|-?\d+(?:\.\d+)?)"#;
const NAME: &str = r"[A-Za-z_]\w*";

/// Which textual form a call was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallEncoding {
    FencedWrapped,
    FencedDirect,
    BareWrapped,
    BareDirect,
}

struct CallRule {
    encoding: CallEncoding,
    regex: Regex,
}

/// Rules in priority order: a span claimed by an earlier rule is never
/// re-matched by a later one (a fenced block contains a bare call).
static RULES: LazyLock<Vec<CallRule>> = LazyLock::new(|| {
    let args = format!(r"\s*(?:{ARG}(?:\s*,\s*{ARG})*\s*,?)?\s*");
    let args_required = format!(r"\s*{ARG}(?:\s*,\s*{ARG})*\s*,?\s*");
    let fence_open = r"```[\w-]*[ \t]*\n?\s*";
    let fence_close = r"\s*```";

    let rule = |encoding, pattern: String| CallRule {
        encoding,
        regex: Regex::new(&pattern).expect("invalid text tool-call pattern"),
    };

    vec![
        rule(
            CallEncoding::FencedWrapped,
            format!(r"{fence_open}print\(\s*default_api\.({NAME})\(({args})\)\s*\){fence_close}"),
        ),
        rule(
            CallEncoding::FencedDirect,
            format!(r"{fence_open}(?:default_api\.)?({NAME})\(({args})\){fence_close}"),
        ),
        rule(
            CallEncoding::BareWrapped,
            format!(r"print\(\s*default_api\.({NAME})\(({args})\)\s*\)"),
        ),
        rule(
            CallEncoding::BareDirect,
            format!(r"\b(?:default_api\.)?({NAME})\(({args_required})\)"),
        ),
    ]
});

static KV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_]\w*)\s*=\s*(?:'([^']*)'|"([^"]*)"|(-?\d+(?:\.\d+)?))"#)
        .expect("invalid argument pattern")
});

// ─────────────────────────────────────────────
// Scanning
// ─────────────────────────────────────────────

/// One call expression found in text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextCall {
    pub encoding: CallEncoding,
    /// Byte range of the whole matched expression.
    pub start: usize,
    pub end: usize,
    pub name: String,
    /// Raw argument list between the parentheses.
    pub raw_args: String,
    /// Whether `name` is a registered tool.
    pub registered: bool,
}

/// Find every call expression in `text`, ordered by position.
///
/// Matches naming unregistered tools are still reported (with
/// `registered == false`) so that neither extraction nor stripping touches them.
pub fn scan(text: &str, is_known: &dyn Fn(&str) -> bool) -> Vec<TextCall> {
    let mut calls: Vec<TextCall> = Vec::new();

    for rule in RULES.iter() {
        for caps in rule.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let overlaps = calls
                .iter()
                .any(|c| whole.start() < c.end && c.start < whole.end());
            if overlaps {
                continue;
            }
            let name = caps.get(1).map_or("", |m| m.as_str());
            calls.push(TextCall {
                encoding: rule.encoding,
                start: whole.start(),
                end: whole.end(),
                name: name.to_string(),
                raw_args: caps.get(2).map_or("", |m| m.as_str()).to_string(),
                registered: is_known(name),
            });
        }
    }

    calls.sort_by_key(|c| c.start);
    calls
}

/// Turn every registered call in `text` into a [`ToolInvocation`] with a fresh id.
pub fn extract(text: &str, is_known: &dyn Fn(&str) -> bool) -> Vec<ToolInvocation> {
    scan(text, is_known)
        .into_iter()
        .filter(|c| c.registered)
        .map(|c| {
            debug!(tool = %c.name, encoding = ?c.encoding, "extracted text tool call");
            ToolInvocation::from_params(new_call_id(), &c.name, &parse_args(&c.raw_args))
        })
        .collect()
}

/// Remove every span [`extract`] would turn into an invocation; leave the rest as is.
pub fn strip(text: &str, is_known: &dyn Fn(&str) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for call in scan(text, is_known).into_iter().filter(|c| c.registered) {
        out.push_str(&text[cursor..call.start]);
        cursor = call.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Parse `key='value'` pairs. Later duplicates overwrite earlier ones.
pub fn parse_args(raw: &str) -> ToolParams {
    let mut params = ToolParams::new();
    for caps in KV.captures_iter(raw) {
        let key = caps[1].to_string();
        let value = if let Some(v) = caps.get(2).or_else(|| caps.get(3)) {
            Value::String(v.as_str().to_string())
        } else {
            let number = caps.get(4).map_or("0", |m| m.as_str());
            number
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| number.parse::<f64>().map(Value::from))
                .unwrap_or_else(|_| Value::String(number.to_string()))
        };
        params.insert(key, value);
    }
    params
}

/// Synthetic id for a call that had none on the wire.
pub fn new_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn known(name: &str) -> bool {
        matches!(name, "search_web" | "send_email" | "list_files")
    }

    fn single(text: &str) -> ToolInvocation {
        let calls = extract(text, &known);
        assert_eq!(calls.len(), 1, "expected one call in {text:?}");
        calls.into_iter().next().unwrap()
    }

    #[test]
    fn test_fenced_wrapped() {
        let text = "Let me look.\n```tool_code\nprint(default_api.search_web(query='rust lifetimes'))\n```\nOne moment.";
        let call = single(text);
        assert_eq!(call.name, "search_web");
        assert_eq!(call.params().unwrap().get("query"), Some(&json!("rust lifetimes")));
        assert_eq!(strip(text, &known), "Let me look.\n\nOne moment.");
    }

    #[test]
    fn test_fenced_direct() {
        let text = "```python\nsend_email(to=\"a@b.c\", subject='Hi')\n```";
        let call = single(text);
        assert_eq!(call.name, "send_email");
        let params = call.params().unwrap();
        assert_eq!(params.get("to"), Some(&json!("a@b.c")));
        assert_eq!(params.get("subject"), Some(&json!("Hi")));
        assert_eq!(strip(text, &known), "");
    }

    #[test]
    fn test_bare_wrapped() {
        let text = "Sure: print(default_api.list_files(path='/tmp')) done";
        let call = single(text);
        assert_eq!(call.name, "list_files");
        assert_eq!(strip(text, &known), "Sure:  done");
    }

    #[test]
    fn test_bare_direct() {
        let text = "I'll run search_web(query=\"weather\", limit=3) now.";
        let call = single(text);
        let params = call.params().unwrap();
        assert_eq!(params.get("query"), Some(&json!("weather")));
        assert_eq!(params.get("limit"), Some(&json!(3)));
        assert_eq!(strip(text, &known), "I'll run  now.");
    }

    #[test]
    fn test_bare_direct_with_namespace_prefix() {
        let text = "Looking: default_api.search_web(query='x') ok";
        let call = single(text);
        assert_eq!(call.name, "search_web");
        assert_eq!(strip(text, &known), "Looking:  ok");

        let fenced = "```\ndefault_api.list_files(path='.')\n```";
        assert_eq!(single(fenced).name, "list_files");
        assert_eq!(strip(fenced, &known), "");
    }

    #[test]
    fn test_fenced_call_not_double_counted() {
        let text = "```\nprint(default_api.search_web(query='x'))\n```";
        let calls = scan(text, &known);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].encoding, CallEncoding::FencedWrapped);
    }

    #[test]
    fn test_wrapped_without_args() {
        let call = single("print(default_api.list_files())");
        assert!(call.params().unwrap().is_empty());
    }

    #[test]
    fn test_bare_direct_requires_args() {
        assert!(extract("You could call list_files() yourself.", &known).is_empty());
    }

    #[test]
    fn test_unregistered_tool_ignored_and_untouched() {
        let texts = [
            "```tool_code\nprint(default_api.launch_rockets(target='moon'))\n```",
            "```\nlaunch_rockets(target='moon')\n```",
            "print(default_api.launch_rockets(target='moon'))",
            "please launch_rockets(target='moon')",
        ];
        for text in texts {
            assert!(extract(text, &known).is_empty(), "{text}");
            assert_eq!(strip(text, &known), text);
        }
    }

    #[test]
    fn test_unregistered_wrapper_hides_inner_registered_name() {
        // The bare-direct rule must not fire inside a rejected wrapped call.
        let text = "print(default_api.unknown_tool(note='search_web(query=1)'))";
        assert!(extract(text, &known).is_empty());
        assert_eq!(strip(text, &known), text);
    }

    #[test]
    fn test_extract_and_strip_agree() {
        let texts = [
            "plain prose with no calls",
            "search_web(query='a') and then send_email(to='b')",
            "mixed launch_rockets(x='1') with list_files(path='.')",
            "```\nsearch_web(query='a')\n```",
        ];
        for text in texts {
            let calls = extract(text, &known);
            let stripped = strip(text, &known);
            assert_eq!(calls.is_empty(), stripped == text, "{text}");
            let removed: usize = scan(text, &known)
                .iter()
                .filter(|c| c.registered)
                .map(|c| c.end - c.start)
                .sum();
            assert_eq!(stripped.len(), text.len() - removed);
        }
    }

    #[test]
    fn test_multiple_calls_in_order() {
        let text = "send_email(to='x') then search_web(query='y')";
        let names: Vec<String> = extract(text, &known).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["send_email", "search_web"]);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let params = parse_args("query='first', query=\"second\"");
        assert_eq!(params.get("query"), Some(&json!("second")));
    }

    #[test]
    fn test_parse_float_and_negative() {
        let params = parse_args("lat=-12.5, zoom=4");
        assert_eq!(params.get("lat"), Some(&json!(-12.5)));
        assert_eq!(params.get("zoom"), Some(&json!(4)));
    }

    #[test]
    fn test_call_ids_unique() {
        let a = single("search_web(query='a')");
        let b = single("search_web(query='a')");
        assert!(a.id.starts_with("call_"));
        assert_ne!(a.id, b.id);
    }
}

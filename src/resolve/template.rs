//! `{{ name }}` placeholder expansion.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{StageError, StageResult};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid placeholder regex")
});

/// Replaces every `{{ name }}` in `text` with the matching variable.
///
/// Everything outside placeholders, including backslashes and trailing
/// newlines, is copied verbatim.
///
/// # Errors
///
/// Returns [`StageError::Templating`] for an undefined variable, or for a
/// `{{` that does not open a simple placeholder.
pub fn expand(text: &str, vars: &BTreeMap<String, String>) -> StageResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let name = name.as_str();
        check_literal(&text[last..whole.start()])?;
        let value = vars
            .get(name)
            .ok_or_else(|| StageError::Templating(format!("'{name}' is undefined")))?;
        out.push_str(&text[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    check_literal(&text[last..])?;
    out.push_str(&text[last..]);
    Ok(out)
}

fn check_literal(chunk: &str) -> StageResult<()> {
    if let Some(pos) = chunk.find("{{") {
        let snippet: String = chunk[pos..].chars().take(24).collect();
        return Err(StageError::Templating(format!(
            "unterminated or unsupported expression near `{snippet}`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn substitutes_variables() {
        let out = expand("{{ web_root }}/** r,\n{{log_dir}}/** w,\n", &vars(&[
            ("web_root", "/var/www/html"),
            ("log_dir", "/var/log/nginx"),
        ]))
        .unwrap();
        assert_eq!(out, "/var/www/html/** r,\n/var/log/nginx/** w,\n");
    }

    #[test]
    fn preserves_backslashes_and_trailing_newlines() {
        let out = expand("/srv/a\\ b r,\n\n\n", &BTreeMap::new()).unwrap();
        assert_eq!(out, "/srv/a\\ b r,\n\n\n");
    }

    #[test]
    fn undefined_variable_fails() {
        let err = expand("{{ missing }} r,", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, StageError::Templating(ref m) if m.contains("missing")));
    }

    #[test]
    fn unterminated_placeholder_fails() {
        let err = expand("/etc/{{ name r,", &vars(&[("name", "x")])).unwrap_err();
        assert!(matches!(err, StageError::Templating(_)));
    }
}

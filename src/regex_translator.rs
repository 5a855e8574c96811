//! Translates the source check-file regex dialect (POSIX `[:class:]` macros,
//! newline-sensitive negated classes, the optional MLIR extension) into the
//! `regex` crate's dialect, and builds the pattern/mapper pair for a numeric
//! substitution spec.
//!
//! Grounded in `examples/original_source/filecheck/regex.py`.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::UnknownPosixClass;
use crate::ops::ValueMapper;

/// POSIX class names the translator *recognizes* as character-class syntax.
/// Only the first eight have a replacement; the rest are recognized but
/// always fail to translate, matching `regex.py`'s `POSIX_REGEXP_PATTERN`
/// (which accepts more names than `POSIX_REGEXP_REPLACEMENTS` maps).
fn posix_class_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\[:(alpha|upper|lower|digit|alnum|xdigit|space|blank|print|punct|graph|word|ascii|cntrl):\]",
        )
        .expect("static pattern")
    })
}

fn posix_replacement(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "A-Za-z",
        "upper" => "A-Z",
        "lower" => "a-z",
        "digit" => "0-9",
        "alnum" => "A-Za-z0-9",
        "xdigit" => "A-Fa-f0-9",
        "space" => r"\s",
        "blank" => r" \t",
        _ => return None,
    })
}

/// Rewrites negated character classes (`[^...]`) that don't already exclude
/// `\n` so that they do, to emulate the source engine's newline-sensitive
/// matching (its `.` and `[^...]` never match `\n`, the target engine's
/// `[^...]` does unless told otherwise).
fn negated_class_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|[^\\])\[\^((?:\\n)?)").expect("static pattern"))
}

/// Translate a single regex fragment from the source dialect to the target.
pub fn posix_to_target_regex(expr: &str, mlir_ext: bool) -> Result<String, UnknownPosixClass> {
    let mut out = expr.to_string();
    loop {
        let Some(m) = posix_class_regex().find(&out) else {
            break;
        };
        let matched = m.as_str().to_string();
        let name = &matched[2..matched.len() - 2];
        let Some(repl) = posix_replacement(name) else {
            return Err(UnknownPosixClass(name.to_string()));
        };
        out = out.replacen(&matched, repl, 1);
    }

    out = negated_class_regex()
        .replace_all(&out, |caps: &regex::Captures| {
            if caps.get(2).map(|g| !g.as_str().is_empty()).unwrap_or(false) {
                // already excludes \n
                format!("{}[^{}", &caps[1], &caps[2])
            } else {
                format!("{}[^\\n", &caps[1])
            }
        })
        .into_owned();

    if mlir_ext {
        out = mlir_regex_extensions(&out);
    }

    Ok(out)
}

/// `FILECHECK_FEATURE_ENABLE=MLIR_REGEX_CLS`: maps `\V` to an identifier
/// class used by MLIR's FileCheck-based tests.
pub fn mlir_regex_extensions(expr: &str) -> String {
    expr.replace(
        r"\V",
        r"%([0-9]+|[A-Za-z_.$-][A-Za-z_.$0-9-]*)(#\d+)?",
    )
}

/// Lowers a numeric substitution spec's `(%.N[udxX],)?` prefix into a regex
/// fragment plus the value mapper to use for the captured text. `digits`,
/// when present, is the `.N` form including its leading dot (as captured by
/// the parser), e.g. `".4"` for a 4-digit width.
pub fn pattern_from_num_subst_spec(digits: Option<&str>, encoding: Option<char>) -> (String, ValueMapper) {
    let digits_expr = match digits.and_then(|d| d.strip_prefix('.')).and_then(|d| d.parse::<u32>().ok()) {
        Some(n) => format!("{{{n}}}"),
        None => "+".to_string(),
    };
    let encoding = encoding.unwrap_or('u');
    let class = match encoding {
        'u' => r"\d",
        'd' => r"[+-]?\d",
        'x' => "[a-f0-9]",
        'X' => "[A-F0-9]",
        _ => r"\d",
    };
    let mapper = match encoding {
        'x' | 'X' => ValueMapper::Hex,
        'd' => ValueMapper::SignedInt,
        _ => ValueMapper::UnsignedInt,
    };
    (format!("{class}{digits_expr}"), mapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_posix_classes() {
        let out = posix_to_target_regex("[[:alpha:][:digit:]]", false).unwrap();
        assert_eq!(out, "[A-Za-z0-9]");
    }

    #[test]
    fn rejects_unknown_but_recognized_class() {
        let err = posix_to_target_regex("[:punct:]", false).unwrap_err();
        assert_eq!(err.0, "punct");
    }

    #[test]
    fn negated_class_gains_newline_exclusion() {
        let out = posix_to_target_regex("[^abc]", false).unwrap();
        assert_eq!(out, "[^\\nabc]");
    }

    #[test]
    fn negated_class_already_excluding_newline_is_untouched() {
        let out = posix_to_target_regex(r"[^\nabc]", false).unwrap();
        assert_eq!(out, r"[^\nabc]");
    }

    #[test]
    fn mlir_extension_applies_only_when_enabled() {
        let out = posix_to_target_regex(r"\V", false).unwrap();
        assert_eq!(out, r"\V");
        let out = posix_to_target_regex(r"\V", true).unwrap();
        assert!(out.contains("A-Za-z_"));
    }

    #[test]
    fn numeric_spec_defaults_to_unsigned_decimal() {
        let (pat, mapper) = pattern_from_num_subst_spec(None, None);
        assert_eq!(pat, r"\d+");
        assert_eq!(mapper, ValueMapper::UnsignedInt);
    }

    #[test]
    fn numeric_spec_hex_with_width() {
        let (pat, mapper) = pattern_from_num_subst_spec(Some(".4"), Some('x'));
        assert_eq!(pat, "[a-f0-9]{4}");
        assert_eq!(mapper, ValueMapper::Hex);
    }
}

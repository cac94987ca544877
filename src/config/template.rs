//! `{0}`-style URL template substitution.

use crate::error::ConfigError;
use regex_lite::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(\d+)\}").expect("placeholder pattern is valid")
});

/// Number of arguments a template needs (highest placeholder index + 1).
///
/// An index too large for `usize` counts as `usize::MAX`, which no argument
/// list can satisfy.
pub fn placeholder_count(template: &str) -> usize {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|index| {
            index
                .as_str()
                .parse::<usize>()
                .map_or(usize::MAX, |index| index.saturating_add(1))
        })
        .max()
        .unwrap_or(0)
}

/// Substitute `{N}` placeholders in `template` with `args[N]`.
///
/// One argument list is shared by every template of a tier, so templates may
/// use fewer arguments than supplied. A placeholder without a matching
/// argument is a [`ConfigError::TemplateArity`].
///
/// ```
/// use tierkit::config::format_template;
///
/// let url = format_template("/assets/{0}/deployed/", &["core-ag"]).unwrap();
/// assert_eq!(url, "/assets/core-ag/deployed/");
/// ```
pub fn format_template<S: AsRef<str>>(template: &str, args: &[S]) -> Result<String, ConfigError> {
    let expected = placeholder_count(template);
    if expected > args.len() {
        return Err(ConfigError::TemplateArity {
            template: template.to_string(),
            expected,
            supplied: args.len(),
        });
    }

    let result = PLACEHOLDER.replace_all(template, |caps: &regex_lite::Captures<'_>| {
        caps.get(1)
            .and_then(|m| m.as_str().parse::<usize>().ok())
            .and_then(|index| args.get(index))
            .map(|arg| arg.as_ref().to_string())
            .unwrap_or_default()
    });
    Ok(result.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_placeholder() {
        assert_eq!(
            format_template("/assets/{0}/deployed/", &["themes"]).unwrap(),
            "/assets/themes/deployed/"
        );
    }

    #[test]
    fn test_repeated_and_reordered_placeholders() {
        assert_eq!(
            format_template("{1}/api/{0}/{1}", &["sites", "https://h"]).unwrap(),
            "https://h/api/sites/https://h"
        );
    }

    #[test]
    fn test_plain_template_with_args() {
        assert_eq!(format_template("/api/users/", &["core"]).unwrap(), "/api/users/");
    }

    #[test]
    fn test_missing_argument_is_an_error() {
        let err = format_template("{0}/api/{1}/", &["only-one"]).unwrap_err();
        match err {
            ConfigError::TemplateArity {
                expected, supplied, ..
            } => {
                assert_eq!(expected, 2);
                assert_eq!(supplied, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_placeholder_count() {
        assert_eq!(placeholder_count("/static/"), 0);
        assert_eq!(placeholder_count("{0}{0}"), 1);
        assert_eq!(placeholder_count("{2}"), 3);
        assert_eq!(placeholder_count("{x}"), 0);
    }

    #[test]
    fn test_oversized_index_is_an_arity_error() {
        let template = "/api/{99999999999999999999}/";
        assert_eq!(placeholder_count(template), usize::MAX);
        let err = format_template(template, &["core", "http://h", ""]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TemplateArity { expected: usize::MAX, supplied: 3, .. }
        ));
    }
}

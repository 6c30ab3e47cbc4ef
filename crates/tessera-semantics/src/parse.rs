//! Lenient parser for the textual semantics grammar
//!
//! The grammar is a template name plus an optional comma-separated list of
//! `axis=value` tokens, e.g. `("posix", "atomicity=batch,safety=storage")`.
//! Tokens that cannot be understood leave the configuration unchanged; they
//! never abort parsing.

use crate::axis::{Axis, AxisValue};
use crate::semantics::Semantics;
use crate::template::Template;
use tracing::debug;

/// Build semantics from a template name and optional overrides
#[must_use]
pub fn parse(template: &str, overrides: Option<&str>) -> Semantics {
    let mut builder = Semantics::builder(Template::from_name(template));

    let Some(overrides) = overrides else {
        return builder.build();
    };

    for token in overrides.split(',') {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };

        match Axis::from_name(key).and_then(|axis| AxisValue::from_name(axis, value)) {
            Some(axis_value) => {
                builder.set(axis_value);
            }
            None => debug!("Ignoring semantics token '{token}'"),
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{
        Atomicity, Concurrency, Consistency, Persistency, Safety, Security,
    };

    #[test]
    fn test_template_only() {
        assert_eq!(parse("posix", None), Semantics::new(Template::Posix));
        assert_eq!(
            parse("checkpoint", None),
            Semantics::new(Template::Checkpoint)
        );
        assert_eq!(parse("Posix", None), Semantics::new(Template::Default));
        assert_eq!(parse("", Some("")), Semantics::new(Template::Default));
    }

    #[test]
    fn test_overrides_on_posix() {
        let s = parse("posix", Some("atomicity=batch,persistency=immediate"));
        let posix = Semantics::new(Template::Posix);
        assert_eq!(s.atomicity(), Atomicity::Batch);
        assert_eq!(s.persistency(), Persistency::Immediate);
        assert_eq!(s.concurrency(), posix.concurrency());
        assert_eq!(s.consistency(), posix.consistency());
        assert_eq!(s.safety(), posix.safety());
        assert_eq!(s.security(), posix.security());
    }

    #[test]
    fn test_malformed_token_does_not_abort() {
        let s = parse("posix", Some("bogus=xyz,atomicity=batch"));
        let expected = Semantics::builder(Template::Posix)
            .with(Atomicity::Batch)
            .build();
        assert_eq!(s, expected);
    }

    #[test]
    fn test_ignored_tokens() {
        let s = parse(
            "default",
            Some("safety,security=loose,=none,Safety=storage,consistency=none"),
        );
        let expected = Semantics::builder(Template::Default)
            .with(Consistency::None)
            .build();
        assert_eq!(s, expected);
    }

    #[test]
    fn test_value_is_everything_after_first_equals() {
        // The value "none=x" is not a valid atomicity value.
        let s = parse("posix", Some("atomicity=none=x"));
        assert_eq!(s.atomicity(), Atomicity::Operation);
    }

    #[test]
    fn test_last_token_wins() {
        let s = parse("default", Some("safety=network,safety=storage"));
        assert_eq!(s.safety(), Safety::Storage);
    }

    #[test]
    fn test_all_axes() {
        let s = parse(
            "checkpoint",
            Some(
                "atomicity=operation,concurrency=none,consistency=immediate,\
                 persistency=none,safety=network,security=strict",
            ),
        );
        assert_eq!(s.atomicity(), Atomicity::Operation);
        assert_eq!(s.concurrency(), Concurrency::None);
        assert_eq!(s.consistency(), Consistency::Immediate);
        assert_eq!(s.persistency(), Persistency::None);
        assert_eq!(s.safety(), Safety::Network);
        assert_eq!(s.security(), Security::Strict);
    }

    #[test]
    fn test_display_round_trips() {
        for template in Template::ALL {
            let s = Semantics::new(template);
            assert_eq!(parse("default", Some(&s.to_string())), s);
        }
    }
}

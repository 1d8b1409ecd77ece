//! Rules for matchers over side-effecting actions.
//!
//! Every rule here yields [`Action`] values. Nothing is printed, raised or
//! thrown while generating.

use super::wrong_shape;
use crate::action::Action;
use crate::error::{MatchgenError, Result};
use crate::generator::{BoxedGenerator, Generator};
use crate::matcher::{Matcher, MatcherKind, MessageExpectation};
use crate::primitives::{self, ValueGenerator};
use crate::registry::TranslationRegistry;
use crate::value::Value;

/// Error kind raised when a `raise_error` matcher names none
pub const DEFAULT_ERROR_KIND: &str = "RuntimeError";

pub(crate) fn output(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::Output { stream, expected } = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    let text = match expected {
        Some(expected) => registry.expected_generator(expected)?,
        None => primitives::string(),
    };
    let stream = *stream;
    Ok(text
        .map(move |text| Value::action(Action::Output { stream, text }))
        .boxed())
}

pub(crate) fn raise_error(matcher: &Matcher, _registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::RaiseError { kind, message } = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    let message = match message {
        Some(MessageExpectation::Exact(text)) => primitives::constant(Value::str(text.as_str())),
        Some(MessageExpectation::Pattern(_)) => {
            return Err(MatchgenError::unsupported(
                matcher.to_string(),
                "cannot generate a message from a pattern",
            ));
        }
        None => primitives::simple_printable(),
    };
    let kind = kind.clone().unwrap_or_else(|| DEFAULT_ERROR_KIND.to_string());
    Ok(message
        .map(move |message| {
            Value::action(Action::Raise {
                kind: kind.clone(),
                message: message.to_string(),
            })
        })
        .boxed())
}

pub(crate) fn throw_symbol(matcher: &Matcher, registry: &TranslationRegistry) -> Result<ValueGenerator> {
    let MatcherKind::ThrowSymbol { signal, payload } = matcher.kind() else {
        return Err(wrong_shape(matcher));
    };
    let signal = match signal {
        Some(signal) => primitives::constant(Value::symbol(signal)),
        None => primitives::symbol(),
    };
    let payload = payload
        .as_ref()
        .map(|payload| registry.expected_generator(payload))
        .transpose()?;

    Ok(BoxedGenerator::from_fn(move |rng, config| {
        let signal = signal.generate(rng, config)?;
        let payload = match &payload {
            Some(generator) => Some(generator.generate(rng, config)?),
            None => None,
        };
        Ok(Value::action(Action::Throw {
            signal: signal.to_string(),
            payload,
        }))
    }))
}

#[cfg(test)]
mod tests {
    use super::DEFAULT_ERROR_KIND;
    use crate::action::{Action, Interrupt, OutputStream};
    use crate::matcher::*;
    use crate::registry::TranslationRegistry;
    use crate::rules::sample;
    use crate::value::Value;
    use regex::Regex;

    fn draw(matcher: &Matcher, count: usize) -> Vec<Value> {
        let generator = TranslationRegistry::builtin().generator_for(matcher).unwrap();
        sample(&generator, count, 31)
    }

    fn action(value: &Value) -> &Action {
        value.as_action().unwrap()
    }

    #[test]
    fn test_output_to_stream() {
        let matcher = output_of("hello").to_stderr();
        for value in draw(&matcher, 3) {
            let (effects, outcome) = action(&value).capture();
            assert!(outcome.is_ok());
            assert_eq!(effects.stream(OutputStream::Stderr), "hello");
            assert_eq!(effects.stdout, "");
            assert!(matcher.matches(&value));
        }

        for value in draw(&output(), 10) {
            assert!(matches!(
                action(&value),
                Action::Output {
                    stream: OutputStream::Stdout,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_output_of_matcher() {
        let matcher = output_of(start_with("log: "));
        for value in draw(&matcher, 10) {
            assert!(matcher.matches(&value));
        }
    }

    #[test]
    fn test_raise_error_defaults() {
        for value in draw(&raise_error(), 10) {
            let (_, outcome) = action(&value).capture();
            let Err(Interrupt::Raised { kind, .. }) = outcome else {
                panic!("expected a raise");
            };
            assert_eq!(kind, DEFAULT_ERROR_KIND);
        }
    }

    #[test]
    fn test_raise_error_with_message() {
        let matcher = raise_error().of_kind("ArgumentError").with_message("bad input");
        for value in draw(&matcher, 3) {
            assert_eq!(
                action(&value).capture().1,
                Err(Interrupt::Raised {
                    kind: "ArgumentError".to_string(),
                    message: "bad input".to_string(),
                })
            );
        }

        let error = TranslationRegistry::builtin()
            .generator_for(&raise_error().with_message_matching(Regex::new("bad").unwrap()))
            .unwrap_err();
        assert!(error.is_unsupported());
    }

    #[test]
    fn test_throw_symbol() {
        for value in draw(&throw_symbol(), 10) {
            assert!(throw_symbol().matches(&value));
        }

        let matcher = throw_symbol_named("halt").with_payload(be_between(1, 3));
        for value in draw(&matcher, 10) {
            assert!(matcher.matches(&value));
        }
    }
}

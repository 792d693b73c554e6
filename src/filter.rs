//! Validation of fieldsets.
//!
//! A [`Filter`] validates a whole fieldset at once and records messages per
//! input. The rule language is left to implementations: [`RuleFilter`] is a
//! minimal closure-based one, [`NullFilter`] accepts everything.

use std::{cell::RefCell, fmt};

use indexmap::IndexMap;

use crate::{Fieldset, FilterError, Read};

/// Filter messages, keyed by input name.
///
/// An absent key means the input has no messages.
pub type Messages = IndexMap<String, Vec<String>>;

/// A validation collaborator for a [`Fieldset`].
pub trait Filter: fmt::Debug {
    /// Applies every rule to the current values of `fieldset`.
    ///
    /// Returns whether all rules passed. Implementations may also rewrite
    /// values through [`Fieldset::set_value`].
    ///
    /// # Errors
    ///
    /// Returns an error if the rules themselves cannot be applied, for
    /// example because they refer to an input the fieldset does not have.
    fn values(&self, fieldset: &mut Fieldset) -> Result<bool, FilterError>;

    /// Returns the messages recorded by the last call to [`Filter::values`].
    fn messages(&self) -> Messages;

    /// Returns the messages recorded for a single input.
    fn messages_for(&self, name: &str) -> Vec<String> {
        self.messages().shift_remove(name).unwrap_or_default()
    }
}

/// A filter that accepts every value and records no messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFilter;

impl Filter for NullFilter {
    fn values(&self, _fieldset: &mut Fieldset) -> Result<bool, FilterError> {
        Ok(true)
    }

    fn messages(&self) -> Messages {
        Messages::new()
    }
}

type Check = Box<dyn Fn(Read<'_>, &Fieldset) -> bool>;

struct Rule {
    input: String,
    message: String,
    check: Check,
}

/// A filter made of per-input closures.
///
/// Each rule checks the current value of one input, with the whole fieldset
/// available for cross-input checks, and records its message when the check
/// fails.
///
/// ```
/// use forminput::{Filter, RuleFilter};
///
/// let mut filter = RuleFilter::new();
/// filter.add_rule("email", "Please enter an email address", |value, _| {
///     value
///         .as_value()
///         .and_then(|v| v.as_str())
///         .is_some_and(|s| s.contains('@'))
/// });
///
/// assert!(filter.messages().is_empty());
/// ```
#[derive(Default)]
pub struct RuleFilter {
    rules: Vec<Rule>,
    messages: RefCell<Messages>,
}

impl RuleFilter {
    /// Creates a filter with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for `input`.
    ///
    /// Rules run in the order they were added; an input may have several.
    pub fn add_rule<F>(
        &mut self,
        input: impl Into<String>,
        message: impl Into<String>,
        check: F,
    ) -> &mut Self
    where
        F: Fn(Read<'_>, &Fieldset) -> bool + 'static,
    {
        self.rules.push(Rule {
            input: input.into(),
            message: message.into(),
            check: Box::new(check),
        });
        self
    }
}

impl fmt::Debug for RuleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules: Vec<_> = self
            .rules
            .iter()
            .map(|rule| (&rule.input, &rule.message))
            .collect();
        f.debug_struct("RuleFilter")
            .field("rules", &rules)
            .field("messages", &self.messages)
            .finish()
    }
}

impl Filter for RuleFilter {
    fn values(&self, fieldset: &mut Fieldset) -> Result<bool, FilterError> {
        let mut messages = Messages::new();

        for rule in &self.rules {
            let value = fieldset
                .value(&rule.input)
                .map_err(|_| FilterError::UnknownInput(rule.input.clone()))?;

            if !(rule.check)(value, fieldset) {
                tracing::trace!("Rule failed for '{}': {}", rule.input, rule.message);
                messages
                    .entry(rule.input.clone())
                    .or_default()
                    .push(rule.message.clone());
            }
        }

        let passed = messages.is_empty();
        *self.messages.borrow_mut() = messages;
        Ok(passed)
    }

    fn messages(&self) -> Messages {
        self.messages.borrow().clone()
    }

    fn messages_for(&self, name: &str) -> Vec<String> {
        self.messages.borrow().get(name).cloned().unwrap_or_default()
    }
}

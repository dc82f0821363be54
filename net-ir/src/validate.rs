use crate::types::{BusMessage, Message};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("message with empty name (id {0})")]
    EmptyMessageName(i32),
    #[error("signal '{0}' in message '{1}' starts at bit {2}, outside [0, {3})")]
    StartBitOutOfRange(String, String, i32, i32),
    #[error("duplicate signal name '{0}' in message '{1}'")]
    DuplicateSignalName(String, String),
    #[error("multiplex message '{0}' has alternatives but selector length 0")]
    EmptySelector(String),
}

/// Validate assembled messages for structural consistency.
pub fn validate_messages(messages: &[BusMessage]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for msg in messages {
        match msg {
            BusMessage::Message(m) => validate_message(m, &mut errors),
            BusMessage::Multiplex(m) => {
                if m.name.is_empty() {
                    errors.push(ValidationError::EmptyMessageName(m.id));
                }
                if m.selector_length == 0 && !m.alternatives.is_empty() {
                    errors.push(ValidationError::EmptySelector(m.name.clone()));
                }
                for alt in m.alternatives.values() {
                    validate_message(alt, &mut errors);
                }
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn validate_message(m: &Message, errors: &mut Vec<ValidationError>) {
    if m.name.is_empty() {
        errors.push(ValidationError::EmptyMessageName(m.id));
    }

    let bit_span = m.byte_length * 8;
    let mut names = HashSet::new();
    for sig in &m.signals {
        if sig.start_bit < 0 || sig.start_bit >= bit_span {
            errors.push(ValidationError::StartBitOutOfRange(
                sig.name.clone(),
                m.name.clone(),
                sig.start_bit,
                bit_span,
            ));
        }
        if !names.insert(sig.name.as_str()) {
            errors.push(ValidationError::DuplicateSignalName(
                sig.name.clone(),
                m.name.clone(),
            ));
        }
    }
}

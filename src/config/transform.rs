// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Raw value coercion. Nothing in here fails: input that can't be coerced is replaced by the
//! field default and the substitution is reported through [`Transformed::used_default`].

use crate::util::{split_comma_separated, strip_quotes};

use super::field::{FieldSpec, RawValue, Value};

/// A coerced value and whether the field default had to be substituted for the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transformed<T> {
    pub value: T,
    pub used_default: bool,
}

impl<T> Transformed<T> {
    fn input(value: T) -> Self {
        Transformed {
            value,
            used_default: false,
        }
    }

    fn fallback(value: T) -> Self {
        Transformed {
            value,
            used_default: true,
        }
    }
}

fn clean(value: &str) -> &str {
    strip_quotes(value.trim()).trim()
}

/// Free text. Quotes are removed and surrounding whitespace trimmed.
pub fn text(spec: &FieldSpec, raw: Option<&RawValue>) -> Transformed<Value> {
    match raw {
        Some(RawValue::Text(value)) => Transformed::input(Value::Text(clean(value).to_string())),
        Some(RawValue::List(values)) => Transformed::input(Value::Text(
            values
                .iter()
                .map(|value| clean(value))
                .collect::<Vec<&str>>()
                .join(","),
        )),
        None => Transformed::fallback(spec.default_value()),
    }
}

/// Integers. Anything that doesn't parse becomes the default.
pub fn integer(spec: &FieldSpec, raw: Option<&RawValue>) -> Transformed<Value> {
    let parsed = match raw {
        Some(RawValue::Text(value)) => clean(value).parse::<i64>().ok(),
        Some(RawValue::List(_)) | None => None,
    };

    match parsed {
        Some(value) => Transformed::input(Value::Integer(value)),
        None => Transformed::fallback(spec.default_value()),
    }
}

/// Comma separated lists. An empty result becomes the default list. Fields whose default is
/// empty never report a fallback, since an empty list is a legitimate value for them.
pub fn list(spec: &FieldSpec, raw: Option<&RawValue>) -> Transformed<Value> {
    let items = match raw {
        Some(RawValue::Text(value)) => split_comma_separated(value),
        Some(RawValue::List(values)) => values
            .iter()
            .map(|value| clean(value))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    if !items.is_empty() {
        return Transformed::input(Value::List(items));
    }

    let default = spec.default_value();
    if spec.default.is_empty() {
        Transformed::input(default)
    } else {
        Transformed::fallback(default)
    }
}

/// The variations method is normalized to lowercase text here and checked against the known
/// methods by the validator.
pub fn method(spec: &FieldSpec, raw: Option<&RawValue>) -> Transformed<Value> {
    match raw {
        Some(RawValue::Text(value)) if !clean(value).is_empty() => {
            Transformed::input(Value::Text(clean(value).to_lowercase()))
        }
        _ => Transformed::fallback(spec.default_value()),
    }
}

//! Leaf parameter controls

use crate::{
    error::{PaymentError, PaymentResult},
    money::Currency,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$").unwrap()
});

static TEL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{4,15}$").unwrap());

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Numeric constraints: optional bounds and a step the value must be a multiple of
///
/// Only [`NumberRange::new`] creates one, so `min <= max` and `step > 0`
/// always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberRange {
    min: Option<Decimal>,
    max: Option<Decimal>,
    step: Decimal,
}

impl Default for NumberRange {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            step: Decimal::ONE,
        }
    }
}

impl NumberRange {
    /// Create a range; `step` defaults to one
    pub fn new(
        min: Option<Decimal>,
        max: Option<Decimal>,
        step: Option<Decimal>,
    ) -> PaymentResult<Self> {
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(PaymentError::Construction(format!(
                "min {} is greater than max {}",
                min, max
            )));
        }

        let step = step.unwrap_or(Decimal::ONE);
        if step <= Decimal::ZERO {
            return Err(PaymentError::Construction(format!(
                "step must be positive, got {}",
                step
            )));
        }

        Ok(Self { min, max, step })
    }

    /// Lower bound
    pub fn min(&self) -> Option<Decimal> {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> Option<Decimal> {
        self.max
    }

    /// Quantization step
    pub fn step(&self) -> Decimal {
        self.step
    }

    /// Is the decimal text inside the range and on the step grid
    ///
    /// The grid is anchored at zero: `value / step` truncated toward zero,
    /// multiplied back by `step`, must reproduce `value` exactly.
    pub fn accepts(&self, value: &str) -> bool {
        let Some(number) = parse_decimal(value) else {
            return false;
        };

        if self.min.is_some_and(|min| number < min) || self.max.is_some_and(|max| number > max) {
            return false;
        }

        number
            .checked_div(self.step)
            .map(|quotient| quotient.trunc())
            .and_then(|quotient| quotient.checked_mul(self.step))
            .is_some_and(|snapped| snapped == number)
    }
}

/// Parse decimal text, plain or in scientific notation
pub(crate) fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Regular expression a text value must match in full
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern
    pub fn new(source: impl Into<String>) -> PaymentResult<Self> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
            PaymentError::Construction(format!("invalid pattern {:?}: {}", source, e))
        })?;
        Ok(Self { source, regex })
    }

    /// Pattern text as received
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Does the whole value match
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Length limits in characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthLimits {
    /// Minimum length
    pub min: Option<usize>,
    /// Maximum length
    pub max: Option<usize>,
}

impl LengthLimits {
    /// Create limits, rejecting `min > max`
    pub fn new(min: Option<usize>, max: Option<usize>) -> PaymentResult<Self> {
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(PaymentError::Construction(format!(
                "min length {} is greater than max length {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    fn accepts(&self, value: &str) -> bool {
        let length = value.chars().count();
        self.min.is_none_or(|min| length >= min) && self.max.is_none_or(|max| length <= max)
    }
}

/// What a control accepts
#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    /// Single-line text
    Text {
        /// Full-match pattern
        pattern: Option<Pattern>,
        /// Length limits
        length: LengthLimits,
    },
    /// Multi-line text
    TextArea {
        /// Length limits
        length: LengthLimits,
    },
    /// E-mail address
    Email,
    /// Phone number
    Tel,
    /// Decimal number
    Number(NumberRange),
    /// Money amount
    Amount {
        /// Numeric constraints
        range: NumberRange,
        /// Currency of the amount
        currency: Currency,
    },
    /// Boolean flag, valued `"true"` or `"false"`
    Checkbox,
    /// Calendar date, `YYYY-MM-DD`
    Date {
        /// Earliest date
        min: Option<NaiveDate>,
        /// Latest date
        max: Option<NaiveDate>,
    },
}

impl ControlKind {
    /// Short type tag, as used in form documents
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::TextArea { .. } => "textarea",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Number(_) => "number",
            Self::Amount { .. } => "amount",
            Self::Checkbox => "checkbox",
            Self::Date { .. } => "date",
        }
    }

    /// Kind-specific check of a non-empty value
    fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Text { pattern, length } => {
                length.accepts(value) && pattern.as_ref().is_none_or(|p| p.matches(value))
            }
            Self::TextArea { length } => length.accepts(value),
            Self::Email => EMAIL_REGEX.is_match(value),
            Self::Tel => TEL_REGEX.is_match(value),
            Self::Number(range) | Self::Amount { range, .. } => range.accepts(value),
            Self::Checkbox => value == "true" || value == "false",
            Self::Date { min, max } => NaiveDate::parse_from_str(value, DATE_FORMAT)
                .map(|date| {
                    min.is_none_or(|min| date >= min) && max.is_none_or(|max| date <= max)
                })
                .unwrap_or(false),
        }
    }
}

/// A form field that contributes one `name -> value` pair
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub(crate) name: String,
    pub(crate) value: String,
    pub(crate) label: Option<String>,
    pub(crate) hint: Option<String>,
    pub(crate) alert: Option<String>,
    pub(crate) required: bool,
    pub(crate) readonly: bool,
    pub(crate) kind: ControlKind,
}

impl Control {
    /// Start building a control
    pub fn builder(name: impl Into<String>, kind: ControlKind) -> ControlBuilder {
        ControlBuilder::new(name, kind)
    }

    /// Transmission key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the current value
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Checkbox helper: sets `"true"` or `"false"`
    pub fn set_checked(&mut self, checked: bool) {
        self.value = checked.to_string();
    }

    /// Is a checkbox checked
    pub fn is_checked(&self) -> bool {
        self.value == "true"
    }

    /// Label shown next to the field
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Help text
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Message to show when the value is rejected
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Must the field be filled
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Is the field read-only in the UI
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Constraints
    pub fn kind(&self) -> &ControlKind {
        &self.kind
    }

    /// Is the current value acceptable
    pub fn is_valid(&self) -> bool {
        self.is_valid_value(&self.value)
    }

    /// Would the given value be acceptable
    ///
    /// An empty value is acceptable exactly when the control is optional.
    /// A required checkbox must be checked.
    pub fn is_valid_value(&self, value: &str) -> bool {
        if value.is_empty() {
            return !self.required;
        }
        if self.required && matches!(self.kind, ControlKind::Checkbox) && value != "true" {
            return false;
        }
        self.kind.accepts(value)
    }
}

/// Builder for [`Control`]
#[derive(Debug, Clone)]
pub struct ControlBuilder {
    control: Control,
}

impl ControlBuilder {
    fn new(name: impl Into<String>, kind: ControlKind) -> Self {
        let value = match kind {
            ControlKind::Checkbox => "false".to_string(),
            _ => String::new(),
        };
        Self {
            control: Control {
                name: name.into(),
                value,
                label: None,
                hint: None,
                alert: None,
                required: false,
                readonly: false,
                kind,
            },
        }
    }

    /// Initial value
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.control.value = value.into();
        self
    }

    /// Label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.control.label = Some(label.into());
        self
    }

    /// Help text
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.control.hint = Some(hint.into());
        self
    }

    /// Rejection message
    pub fn alert(mut self, alert: impl Into<String>) -> Self {
        self.control.alert = Some(alert.into());
        self
    }

    /// Mark as required
    pub fn required(mut self, required: bool) -> Self {
        self.control.required = required;
        self
    }

    /// Mark as read-only
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.control.readonly = readonly;
        self
    }

    /// Finish the control
    pub fn build(self) -> PaymentResult<Control> {
        if self.control.name.is_empty() {
            return Err(PaymentError::Construction(format!(
                "{} control without a name",
                self.control.kind.type_name()
            )));
        }
        Ok(self.control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn number(min: i64, max: i64, step: i64) -> Control {
        let range = NumberRange::new(
            Some(Decimal::from(min)),
            Some(Decimal::from(max)),
            Some(Decimal::from(step)),
        )
        .unwrap();
        Control::builder("sum", ControlKind::Number(range))
            .required(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_number_quantization() {
        let control = number(0, 100, 5);
        assert!(!control.is_valid_value("23"));
        assert!(control.is_valid_value("25"));
        assert!(!control.is_valid_value("-5"));
        assert!(!control.is_valid_value("105"));
        assert!(control.is_valid_value("100"));
        assert!(control.is_valid_value("0"));
        assert!(!control.is_valid_value("abc"));
        assert!(!control.is_valid_value(""));
    }

    #[test]
    fn test_fractional_step_is_exact() {
        let range = NumberRange::new(None, None, Some(d("0.01"))).unwrap();
        assert!(range.accepts("10.25"));
        assert!(range.accepts("-3.10"));
        assert!(!range.accepts("10.255"));

        let range = NumberRange::new(None, None, Some(d("0.1"))).unwrap();
        assert!(range.accepts("0.3"));
        assert!(range.accepts("1e1"));
    }

    #[test]
    fn test_default_step_is_one() {
        let range = NumberRange::new(Some(d("1")), None, None).unwrap();
        assert_eq!(range.step(), Decimal::ONE);
        assert!(range.accepts("15"));
        assert!(!range.accepts("1.5"));
        assert!(!range.accepts("0"));
    }

    #[test]
    fn test_invalid_range_fails_at_construction() {
        assert!(matches!(
            NumberRange::new(Some(d("10")), Some(d("1")), None),
            Err(PaymentError::Construction(_))
        ));
        assert!(NumberRange::new(None, None, Some(Decimal::ZERO)).is_err());
        assert!(NumberRange::new(None, None, Some(d("-1"))).is_err());
        assert!(NumberRange::new(Some(d("5")), Some(d("5")), None).is_ok());
    }

    #[test]
    fn test_optional_empty_is_valid() {
        let control = Control::builder("comment", ControlKind::TextArea {
            length: LengthLimits::new(Some(2), Some(5)).unwrap(),
        })
        .build()
        .unwrap();

        assert!(control.is_valid());
        assert!(!control.is_valid_value("a"));
        assert!(control.is_valid_value("abcde"));
        assert!(!control.is_valid_value("abcdef"));
    }

    #[test]
    fn test_text_pattern_matches_whole_value() {
        let control = Control::builder("account", ControlKind::Text {
            pattern: Some(Pattern::new("[0-9]{5}").unwrap()),
            length: LengthLimits::default(),
        })
        .required(true)
        .value("12345")
        .build()
        .unwrap();

        assert!(control.is_valid());
        assert!(!control.is_valid_value("123456"));
        assert!(!control.is_valid_value("x12345"));
        assert!(Pattern::new("(").is_err());
    }

    #[test]
    fn test_email_tel_date() {
        let email = Control::builder("email", ControlKind::Email).build().unwrap();
        assert!(email.is_valid_value("user@example.com"));
        assert!(!email.is_valid_value("user@"));

        let tel = Control::builder("phone", ControlKind::Tel).build().unwrap();
        assert!(tel.is_valid_value("+79001234567"));
        assert!(!tel.is_valid_value("call me"));

        let date = Control::builder("date", ControlKind::Date {
            min: NaiveDate::from_ymd_opt(2024, 1, 1),
            max: None,
        })
        .build()
        .unwrap();
        assert!(date.is_valid_value("2024-02-29"));
        assert!(!date.is_valid_value("2023-12-31"));
        assert!(!date.is_valid_value("29.02.2024"));
    }

    #[test]
    fn test_required_checkbox_must_be_checked() {
        let mut control = Control::builder("agree", ControlKind::Checkbox)
            .required(true)
            .build()
            .unwrap();

        assert_eq!(control.value(), "false");
        assert!(!control.is_valid());
        control.set_checked(true);
        assert!(control.is_checked());
        assert!(control.is_valid());
    }

    #[test]
    fn test_control_needs_name() {
        let err = Control::builder("", ControlKind::Email).build().unwrap_err();
        assert!(matches!(err, PaymentError::Construction(_)));
    }
}

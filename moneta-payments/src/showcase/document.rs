//! Wire form of showcase documents
//!
//! Form items arrive as a heterogeneous array tagged by `"type"`. Each item
//! is decoded into a loose record and then passed through the builders, so
//! a malformed item surfaces as [`PaymentError::Construction`].

use super::{
    AllowedMoneySource, Component, Control, ControlKind, Group, Layout, LengthLimits,
    NumberRange, Pattern, Select, SelectOption, SelectStyle, Showcase, ShowcaseError,
    control::parse_decimal,
};
use crate::{
    error::{PaymentError, PaymentResult},
    money::Currency,
    params::ParameterMap,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub(super) struct ShowcaseDocument {
    #[serde(default)]
    title: String,
    #[serde(default)]
    hidden_fields: ParameterMap,
    #[serde(default)]
    form: Vec<Value>,
    #[serde(default, rename = "money_source")]
    money_sources: Vec<AllowedMoneySource>,
    #[serde(default, rename = "error")]
    errors: Vec<ShowcaseError>,
}

impl TryFrom<ShowcaseDocument> for Showcase {
    type Error = PaymentError;

    fn try_from(document: ShowcaseDocument) -> PaymentResult<Self> {
        Ok(Showcase {
            title: document.title,
            hidden_fields: document.hidden_fields,
            form: group(None, Layout::Vertical, document.form)?,
            money_sources: document.money_sources,
            errors: document.errors,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GroupItem {
    label: Option<String>,
    #[serde(default)]
    layout: Layout,
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct OptionItem {
    label: String,
    #[serde(deserialize_with = "loose_string")]
    value: String,
    group: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SelectItem {
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "loose_string")]
    value: String,
    label: Option<String>,
    hint: Option<String>,
    alert: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    readonly: bool,
    #[serde(default)]
    options: Vec<OptionItem>,
    #[serde(default)]
    style: SelectStyle,
}

#[derive(Debug, Deserialize)]
struct ControlItem {
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "loose_string")]
    value: String,
    label: Option<String>,
    hint: Option<String>,
    alert: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    readonly: bool,
    pattern: Option<String>,
    #[serde(rename = "minlength")]
    min_length: Option<usize>,
    #[serde(rename = "maxlength")]
    max_length: Option<usize>,
    min: Option<Value>,
    max: Option<Value>,
    step: Option<Value>,
    currency: Option<Currency>,
    checked: Option<bool>,
}

fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(scalar_text(&Value::deserialize(deserializer)?).unwrap_or_default())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn decimal_bound(field: &str, value: Option<&Value>) -> PaymentResult<Option<Decimal>> {
    let Some(text) = value.and_then(scalar_text) else {
        return Ok(None);
    };
    parse_decimal(&text)
        .map(Some)
        .ok_or_else(|| PaymentError::Construction(format!("{} is not a number: {:?}", field, text)))
}

fn date_bound(field: &str, value: Option<&Value>) -> PaymentResult<Option<NaiveDate>> {
    let Some(text) = value.and_then(scalar_text) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PaymentError::Construction(format!("{} is not a date: {}", field, e)))
}

fn decode<T: serde::de::DeserializeOwned>(kind: &str, item: Value) -> PaymentResult<T> {
    serde_json::from_value(item)
        .map_err(|e| PaymentError::Construction(format!("malformed {} item: {}", kind, e)))
}

fn group(label: Option<String>, layout: Layout, items: Vec<Value>) -> PaymentResult<Group> {
    let mut builder = Group::builder(layout);
    if let Some(label) = label {
        builder = builder.label(label);
    }
    for item in items {
        if let Some(component) = component(item)? {
            builder = builder.item(component);
        }
    }
    builder.build()
}

fn component(item: Value) -> PaymentResult<Option<Component>> {
    let kind = item
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let component = match kind.as_str() {
        "group" => {
            let item: GroupItem = decode(&kind, item)?;
            Component::Group(group(item.label, item.layout, item.items)?)
        }
        "select" => Component::Select(select(decode(&kind, item)?)?),
        "text" | "textarea" | "email" | "tel" | "number" | "amount" | "checkbox" | "date" => {
            Component::Parameter(control(&kind, decode(&kind, item)?)?)
        }
        other => {
            debug!(item_type = other, "Skipping presentational form item");
            return Ok(None);
        }
    };
    Ok(Some(component))
}

fn select(item: SelectItem) -> PaymentResult<Select> {
    let mut options = Vec::with_capacity(item.options.len());
    for option in item.options {
        let mut parsed = SelectOption::new(option.label, option.value);
        if let Some(items) = option.group {
            parsed = parsed.with_group(group(None, Layout::Vertical, items)?);
        }
        options.push(parsed);
    }

    let mut builder = Select::builder(item.name)
        .value(item.value)
        .required(item.required)
        .readonly(item.readonly)
        .style(item.style)
        .options(options);
    if let Some(label) = item.label {
        builder = builder.label(label);
    }
    if let Some(hint) = item.hint {
        builder = builder.hint(hint);
    }
    if let Some(alert) = item.alert {
        builder = builder.alert(alert);
    }
    builder.build()
}

fn control(kind: &str, item: ControlItem) -> PaymentResult<Control> {
    let length = || LengthLimits::new(item.min_length, item.max_length);
    let range = || {
        NumberRange::new(
            decimal_bound("min", item.min.as_ref())?,
            decimal_bound("max", item.max.as_ref())?,
            decimal_bound("step", item.step.as_ref())?,
        )
    };

    let control_kind = match kind {
        "text" => ControlKind::Text {
            pattern: item.pattern.clone().map(Pattern::new).transpose()?,
            length: length()?,
        },
        "textarea" => ControlKind::TextArea { length: length()? },
        "email" => ControlKind::Email,
        "tel" => ControlKind::Tel,
        "number" => ControlKind::Number(range()?),
        "amount" => ControlKind::Amount {
            range: range()?,
            currency: item.currency.unwrap_or_default(),
        },
        "checkbox" => ControlKind::Checkbox,
        _ => ControlKind::Date {
            min: date_bound("min", item.min.as_ref())?,
            max: date_bound("max", item.max.as_ref())?,
        },
    };

    let value = match (&control_kind, item.checked) {
        (ControlKind::Checkbox, Some(checked)) => checked.to_string(),
        (ControlKind::Checkbox, None) if item.value.is_empty() => "false".to_string(),
        _ => item.value,
    };

    let mut builder = Control::builder(item.name, control_kind)
        .value(value)
        .required(item.required)
        .readonly(item.readonly);
    if let Some(label) = item.label {
        builder = builder.label(label);
    }
    if let Some(hint) = item.hint {
        builder = builder.hint(hint);
    }
    if let Some(alert) = item.alert {
        builder = builder.alert(alert);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "title": "Mobile top-up",
        "hidden_fields": {"scid": "923", "currency": "643"},
        "money_source": ["wallet", "payment-card"],
        "error": [{"name": "sum", "alert": "Too small"}],
        "form": [
            {"type": "tel", "name": "phone", "required": true, "label": "Phone"},
            {"type": "amount", "name": "sum", "required": true, "min": 10, "max": "15000", "step": 0.01, "currency": 643},
            {"type": "select", "name": "operator", "value": "a", "style": "RadioGroup", "options": [
                {"label": "A", "value": "a"},
                {"label": "B", "value": "b", "group": [
                    {"type": "text", "name": "code", "pattern": "[0-9]{3}", "required": true}
                ]}
            ]},
            {"type": "group", "layout": "HBox", "items": [
                {"type": "checkbox", "name": "agree", "checked": false, "required": true},
                {"type": "p", "label": "Read the terms"}
            ]},
            {"type": "submit", "label": "Pay"}
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let showcase = Showcase::from_json(DOCUMENT.as_bytes()).unwrap();

        assert_eq!(showcase.title, "Mobile top-up");
        assert_eq!(showcase.hidden_fields.get("scid"), Some("923"));
        assert_eq!(showcase.money_sources.len(), 2);
        assert_eq!(showcase.errors[0].alert, "Too small");

        let items = showcase.form.items();
        assert_eq!(items.len(), 4);
        match &items[1] {
            Component::Parameter(control) => match control.kind() {
                ControlKind::Amount { range, currency } => {
                    assert_eq!(*currency, Currency::RUB);
                    assert_eq!(range.min(), Some(Decimal::from(10)));
                    assert!(range.accepts("100.50"));
                    assert!(!range.accepts("100.505"));
                }
                other => panic!("unexpected kind {:?}", other),
            },
            other => panic!("unexpected item {:?}", other),
        }
        match &items[3] {
            Component::Group(group) => {
                assert_eq!(group.layout(), Layout::Horizontal);
                assert_eq!(group.items().len(), 1);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_parsed_form_validates_and_flattens() {
        let mut showcase = Showcase::from_json(DOCUMENT.as_bytes()).unwrap();
        assert!(!showcase.is_valid());

        showcase.form.set_value("phone", "79001234567");
        showcase.form.set_value("sum", "100");
        showcase.form.set_value("agree", "true");
        assert!(showcase.is_valid());

        showcase.form.set_value("operator", "b");
        assert!(!showcase.is_valid());
        showcase.form.set_value("code", "123");
        assert!(showcase.is_valid());

        let params = showcase.payment_parameters();
        assert_eq!(params.get("scid"), Some("923"));
        assert_eq!(params.get("operator"), Some("b"));
        assert_eq!(params.get("code"), Some("123"));
    }

    #[test]
    fn test_min_above_max_is_construction_error() {
        let json = r#"{"form": [{"type": "number", "name": "n", "min": 5, "max": 1}]}"#;
        let err = serde_json::from_str::<Showcase>(json).unwrap_err();
        assert!(err.to_string().contains("greater than max"));

        let err = Showcase::from_json(json.as_bytes()).unwrap_err();
        assert!(matches!(err, PaymentError::Construction(_)));

        let err = Showcase::from_json(b"[1, 2]").unwrap_err();
        assert!(matches!(err, PaymentError::Serialization(_)));
    }
}

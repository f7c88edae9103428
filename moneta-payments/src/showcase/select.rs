//! Selection controls with cascading option groups

use super::group::Group;
use crate::{
    error::{PaymentError, PaymentResult},
    params::ParameterMap,
};
use serde::{Deserialize, Serialize};

/// How a selection is presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectStyle {
    /// Radio buttons
    RadioGroup,
    /// Drop-down list
    #[default]
    Spinner,
}

/// One choice of a [`Select`]
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    /// Text shown to the user
    pub label: String,
    /// Value transmitted when chosen
    pub value: String,
    /// Fields that appear while this option is chosen
    pub group: Option<Group>,
}

impl SelectOption {
    /// Option without nested fields
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            group: None,
        }
    }

    /// Attach nested fields
    pub fn with_group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }
}

/// A control whose value is one of a fixed list of options
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub(crate) name: String,
    pub(crate) value: String,
    pub(crate) label: Option<String>,
    pub(crate) hint: Option<String>,
    pub(crate) alert: Option<String>,
    pub(crate) required: bool,
    pub(crate) readonly: bool,
    pub(crate) options: Vec<SelectOption>,
    pub(crate) style: SelectStyle,
}

impl Select {
    /// Start building a selection
    pub fn builder(name: impl Into<String>) -> SelectBuilder {
        SelectBuilder::new(name)
    }

    /// Transmission key
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Label
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Help text
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Rejection message
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Must an option be chosen
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Is the selection read-only in the UI
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Choices in declaration order
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Mutable access to the choices, for filling nested fields
    pub fn options_mut(&mut self) -> &mut [SelectOption] {
        &mut self.options
    }

    /// Presentation style
    pub fn style(&self) -> SelectStyle {
        self.style
    }

    /// Choose an option by value
    pub fn select(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Option matching the current value
    pub fn selected_option(&self) -> Option<&SelectOption> {
        self.options.iter().find(|option| option.value == self.value)
    }

    /// Mutable option matching the current value
    pub fn selected_option_mut(&mut self) -> Option<&mut SelectOption> {
        let value = &self.value;
        self.options.iter_mut().find(|option| &option.value == value)
    }

    /// Is the value acceptable and, when the chosen option has nested
    /// fields, are those valid as well
    ///
    /// An option whose value is empty is selected by an empty value, so its
    /// nested fields are checked just as they are flattened.
    pub fn is_valid(&self) -> bool {
        if self.required && self.value.is_empty() {
            return false;
        }
        match self.selected_option() {
            Some(option) => option.group.as_ref().is_none_or(Group::is_valid),
            None => self.value.is_empty(),
        }
    }

    /// Would the given value be acceptable, ignoring nested fields
    pub fn is_valid_value(&self, value: &str) -> bool {
        if value.is_empty() {
            return !self.required;
        }
        self.options.iter().any(|option| option.value == value)
    }

    /// Emit `name -> value`, then the chosen option's nested fields
    pub fn fill_parameters(&self, params: &mut ParameterMap) {
        params.insert(self.name.clone(), self.value.clone());
        if let Some(group) = self.selected_option().and_then(|option| option.group.as_ref()) {
            group.fill_parameters(params);
        }
    }
}

/// Builder for [`Select`]
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    select: Select,
}

impl SelectBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            select: Select {
                name: name.into(),
                value: String::new(),
                label: None,
                hint: None,
                alert: None,
                required: false,
                readonly: false,
                options: Vec::new(),
                style: SelectStyle::default(),
            },
        }
    }

    /// Initially chosen value
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.select.value = value.into();
        self
    }

    /// Label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.select.label = Some(label.into());
        self
    }

    /// Help text
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.select.hint = Some(hint.into());
        self
    }

    /// Rejection message
    pub fn alert(mut self, alert: impl Into<String>) -> Self {
        self.select.alert = Some(alert.into());
        self
    }

    /// Mark as required
    pub fn required(mut self, required: bool) -> Self {
        self.select.required = required;
        self
    }

    /// Mark as read-only
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.select.readonly = readonly;
        self
    }

    /// Presentation style
    pub fn style(mut self, style: SelectStyle) -> Self {
        self.select.style = style;
        self
    }

    /// Append a choice
    pub fn option(mut self, option: SelectOption) -> Self {
        self.select.options.push(option);
        self
    }

    /// Append several choices
    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.select.options.extend(options);
        self
    }

    /// Finish the selection
    pub fn build(self) -> PaymentResult<Select> {
        let select = self.select;
        if select.name.is_empty() {
            return Err(PaymentError::Construction(
                "select control without a name".to_string(),
            ));
        }

        for (index, option) in select.options.iter().enumerate() {
            if select.options[..index]
                .iter()
                .any(|earlier| earlier.value == option.value)
            {
                return Err(PaymentError::Construction(format!(
                    "select {} has duplicate option value {:?}",
                    select.name, option.value
                )));
            }
        }

        Ok(select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::showcase::{Component, Control, ControlKind, Layout};

    fn card_fields() -> Group {
        Group::builder(Layout::Vertical)
            .item(Component::Parameter(
                Control::builder("card_number", ControlKind::Tel)
                    .required(true)
                    .build()
                    .unwrap(),
            ))
            .build()
            .unwrap()
    }

    fn method_select() -> Select {
        Select::builder("method")
            .required(true)
            .option(SelectOption::new("Wallet", "wallet"))
            .option(SelectOption::new("Card", "card").with_group(card_fields()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_value_must_be_an_option() {
        let mut select = method_select();
        assert!(!select.is_valid());

        select.select("cash");
        assert!(!select.is_valid());
        assert!(select.selected_option().is_none());

        select.select("wallet");
        assert!(select.is_valid());
        assert_eq!(select.selected_option().unwrap().label, "Wallet");
    }

    #[test]
    fn test_nested_group_validated_only_when_selected() {
        let mut select = method_select();
        select.select("card");
        assert!(!select.is_valid());

        if let Some(group) = select
            .selected_option_mut()
            .and_then(|option| option.group.as_mut())
            && let Some(Component::Parameter(control)) = group.items_mut().first_mut()
        {
            control.set_value("4111111111111111");
        }
        assert!(select.is_valid());
    }

    #[test]
    fn test_empty_option_group_is_validated_and_filled() {
        let mut select = Select::builder("method")
            .option(SelectOption::new("Default", "").with_group(card_fields()))
            .option(SelectOption::new("Wallet", "wallet"))
            .build()
            .unwrap();
        assert!(!select.is_valid());

        if let Some(Component::Parameter(control)) = select
            .selected_option_mut()
            .and_then(|option| option.group.as_mut())
            .and_then(|group| group.items_mut().first_mut())
        {
            control.set_value("4111111111111111");
        }
        assert!(select.is_valid());

        let mut params = ParameterMap::new();
        select.fill_parameters(&mut params);
        assert_eq!(params.get("method"), Some(""));
        assert_eq!(params.get("card_number"), Some("4111111111111111"));
    }

    #[test]
    fn test_empty_value_without_matching_option() {
        let mut select = Select::builder("method")
            .option(SelectOption::new("Card", "card").with_group(card_fields()))
            .build()
            .unwrap();
        assert!(select.is_valid());

        let mut params = ParameterMap::new();
        select.fill_parameters(&mut params);
        assert_eq!(params.len(), 1);

        select.select("card");
        assert!(!select.is_valid());
    }

    #[test]
    fn test_fill_includes_selected_group_only() {
        let mut select = method_select();
        select.select("wallet");

        let mut params = ParameterMap::new();
        select.fill_parameters(&mut params);
        assert_eq!(params.get("method"), Some("wallet"));
        assert!(!params.contains_key("card_number"));

        select.select("card");
        let mut params = ParameterMap::new();
        select.fill_parameters(&mut params);
        assert_eq!(params.get("method"), Some("card"));
        assert_eq!(params.get("card_number"), Some(""));
    }

    #[test]
    fn test_duplicate_option_values_rejected() {
        let err = Select::builder("method")
            .option(SelectOption::new("A", "x"))
            .option(SelectOption::new("B", "x"))
            .build()
            .unwrap_err();
        assert!(matches!(err, PaymentError::Construction(_)));
    }
}

//! Ordered containers of components

use super::component::Component;
use crate::{error::PaymentResult, params::ParameterMap};
use serde::{Deserialize, Serialize};

/// Arrangement of a group's children
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// Children stacked top to bottom
    #[default]
    #[serde(rename = "VBox")]
    Vertical,
    /// Children side by side
    #[serde(rename = "HBox")]
    Horizontal,
}

/// An ordered sequence of components
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub(crate) label: Option<String>,
    pub(crate) layout: Layout,
    pub(crate) items: Vec<Component>,
}

impl Group {
    /// Start building a group
    pub fn builder(layout: Layout) -> GroupBuilder {
        GroupBuilder {
            group: Group {
                label: None,
                layout,
                items: Vec::new(),
            },
        }
    }

    /// Caption
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Arrangement
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Children in declaration order
    pub fn items(&self) -> &[Component] {
        &self.items
    }

    /// Mutable children, for entering values
    pub fn items_mut(&mut self) -> &mut [Component] {
        &mut self.items
    }

    /// Valid when every child is
    pub fn is_valid(&self) -> bool {
        self.items.iter().all(Component::is_valid)
    }

    /// Flatten children depth-first into `params`; later entries overwrite earlier ones
    pub fn fill_parameters(&self, params: &mut ParameterMap) {
        for item in &self.items {
            item.fill_parameters(params);
        }
    }

    /// Flatten into a fresh map
    pub fn payment_parameters(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        self.fill_parameters(&mut params);
        params
    }

    /// Find a control or selection by name, searching depth-first
    /// through every option group
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Component> {
        for item in &mut self.items {
            let found = match item {
                Component::Parameter(control) if control.name() == name => true,
                Component::Select(select) if select.name() == name => true,
                _ => false,
            };
            if found {
                return Some(item);
            }
            let nested = match item {
                Component::Group(group) => group.find_mut(name),
                Component::Select(select) => select
                    .options_mut()
                    .iter_mut()
                    .filter_map(|option| option.group.as_mut())
                    .find_map(|group| group.find_mut(name)),
                Component::Parameter(_) => None,
            };
            if nested.is_some() {
                return nested;
            }
        }
        None
    }

    /// Set the value of the named control or selection; returns whether it was found
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.find_mut(name) {
            Some(Component::Parameter(control)) => {
                control.set_value(value);
                true
            }
            Some(Component::Select(select)) => {
                select.select(value);
                true
            }
            _ => false,
        }
    }
}

/// Builder for [`Group`]
#[derive(Debug, Clone)]
pub struct GroupBuilder {
    group: Group,
}

impl GroupBuilder {
    /// Caption
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.group.label = Some(label.into());
        self
    }

    /// Append a child
    pub fn item(mut self, item: impl Into<Component>) -> Self {
        self.group.items.push(item.into());
        self
    }

    /// Append several children
    pub fn items(mut self, items: impl IntoIterator<Item = Component>) -> Self {
        self.group.items.extend(items);
        self
    }

    /// Finish the group
    pub fn build(self) -> PaymentResult<Group> {
        Ok(self.group)
    }
}

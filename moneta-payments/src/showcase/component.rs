//! The closed set of form nodes

use super::{control::Control, group::Group, select::Select};
use crate::params::ParameterMap;

/// A node of a form tree
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// Leaf input
    Parameter(Control),
    /// Choice with optional nested fields per option
    Select(Select),
    /// Container
    Group(Group),
}

impl Component {
    /// Does this node, and every active node below it, hold an acceptable value
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Parameter(control) => control.is_valid(),
            Self::Select(select) => select.is_valid(),
            Self::Group(group) => group.is_valid(),
        }
    }

    /// Must the user fill this node; groups are never required themselves
    pub fn is_required(&self) -> bool {
        match self {
            Self::Parameter(control) => control.is_required(),
            Self::Select(select) => select.is_required(),
            Self::Group(_) => false,
        }
    }

    /// Transmission key of a leaf or selection
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Parameter(control) => Some(control.name()),
            Self::Select(select) => Some(select.name()),
            Self::Group(_) => None,
        }
    }

    /// Emit this node's `name -> value` pairs into `params`
    pub fn fill_parameters(&self, params: &mut ParameterMap) {
        match self {
            Self::Parameter(control) => {
                params.insert(control.name(), control.value());
            }
            Self::Select(select) => select.fill_parameters(params),
            Self::Group(group) => group.fill_parameters(params),
        }
    }
}

impl From<Control> for Component {
    fn from(control: Control) -> Self {
        Self::Parameter(control)
    }
}

impl From<Select> for Component {
    fn from(select: Select) -> Self {
        Self::Select(select)
    }
}

impl From<Group> for Component {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

//! Run configuration

use crate::tree::Validation;

/// Token layout of each node record in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputLayout {
    /// `k c1 .. ck`: the switch starts on the first listed child
    #[default]
    FirstChild,

    /// `k s c1 .. ck`: explicit switch target before the children
    ExplicitSwitch,
}

/// Parameters for a full parse-build-answer run
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// How strictly the tree is checked at construction
    pub validation: Validation,

    /// Node record layout
    pub layout: InputLayout,

    /// Render the initial tree structure alongside the answers
    pub dump_tree: bool,
}

impl RunConfig {
    /// Default layout, no validation beyond what storage requires
    pub fn permissive() -> Self {
        Self {
            validation: Validation::Permissive,
            ..Self::default()
        }
    }

    /// Override the node record layout
    pub fn with_layout(mut self, layout: InputLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Override the validation mode
    pub fn with_validation(mut self, validation: Validation) -> Self {
        self.validation = validation;
        self
    }

    /// Enable or disable the initial tree dump
    pub fn with_tree_dump(mut self, enabled: bool) -> Self {
        self.dump_tree = enabled;
        self
    }
}

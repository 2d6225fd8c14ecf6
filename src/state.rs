//! Snapshots of a munch's contents, enough to rebuild an equal munch of the
//! same variant.

use tracing::debug;

use crate::error::{MunchError, Result};
use crate::container::{Munch, Variant};
use crate::value::{Key, Value};

#[derive(Clone, Debug, PartialEq)]
pub enum State {
    Contents(Vec<(Key, Value)>),
    /// A default munch also carries its default.
    WithDefault {
        default: Value,
        contents: Vec<(Key, Value)>,
    },
}

impl State {
    pub fn contents(&self) -> &[(Key, Value)] {
        match self {
            State::Contents(contents) => contents,
            State::WithDefault { contents, .. } => contents,
        }
    }
    pub fn default(&self) -> Option<&Value> {
        match self {
            State::WithDefault { default, .. } => Some(default),
            State::Contents(_) => None,
        }
    }
}

impl Munch {
    /// Entries are captured shallowly: nested handles are shared with the
    /// captured munch.
    pub fn capture_state(&self) -> State {
        let contents = self.items();
        match self.default_value() {
            Some(default) => State::WithDefault { default, contents },
            None => State::Contents(contents),
        }
    }

    /// Clears this munch and repopulates it from `state`. A default munch
    /// takes a `WithDefault` state, every other variant a `Contents` state.
    pub fn restore_state(&self, state: State) -> Result<()> {
        let is_default = self.variant() == Variant::DefaultMunch;
        let contents = match state {
            State::WithDefault { default, contents } if is_default => {
                self.set_default_value(default)?;
                contents
            }
            State::Contents(contents) if !is_default => contents,
            State::WithDefault { .. } => {
                return Err(MunchError::State(format!(
                    "{} has no default to restore",
                    self.type_name()
                )));
            }
            State::Contents(_) => {
                return Err(MunchError::State(
                    "DefaultMunch state must include its default".to_owned(),
                ));
            }
        };
        debug!(variant = self.type_name(), entries = contents.len(), "restoring state");
        self.clear();
        self.update(contents)
    }
}

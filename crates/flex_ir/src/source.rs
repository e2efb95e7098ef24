//! Source text handle.

use std::rc::Rc;

/// A named piece of source text.
///
/// Shared behind `Rc` so diagnostics and task values can keep the text
/// they were created from alive across REPL submissions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Source {
    pub name: String,
    pub text: String,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Rc<Self> {
        Rc::new(Source {
            name: name.into(),
            text: text.into(),
        })
    }
}

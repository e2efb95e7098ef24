//! Call frames.
//!
//! A frame links a display name, the scope it executes in, and where
//! in the parent it was entered. Frames form a parent chain that the
//! traceback walks when a runtime error is raised.

use std::rc::Rc;

use flex_diagnostic::TraceFrame;
use flex_ir::{Source, Span};

use crate::environment::ScopeRef;

#[derive(Debug)]
pub struct Frame {
    pub name: String,
    pub parent: Option<Rc<Frame>>,
    /// Call site in the parent frame's source. `None` only for the
    /// root frame.
    pub call_site: Option<(Rc<Source>, Span)>,
    pub scope: ScopeRef,
}

impl Frame {
    /// The top-level frame. The REPL creates one of these and reuses
    /// it across submissions.
    pub fn global(name: impl Into<String>) -> Rc<Frame> {
        Rc::new(Frame {
            name: name.into(),
            parent: None,
            call_site: None,
            scope: ScopeRef::root(),
        })
    }

    pub fn child(
        name: impl Into<String>,
        parent: &Rc<Frame>,
        call_site: (Rc<Source>, Span),
        scope: ScopeRef,
    ) -> Rc<Frame> {
        Rc::new(Frame {
            name: name.into(),
            parent: Some(Rc::clone(parent)),
            call_site: Some(call_site),
            scope,
        })
    }

    /// Build traceback entries for an error raised at `span` in
    /// `source` while this frame was innermost. Each frame reports
    /// the line execution had reached in it: the innermost shows the
    /// error itself, enclosing frames show their call sites.
    /// Entries come back oldest-first.
    pub fn traceback(self: &Rc<Frame>, source: &Rc<Source>, span: Span) -> Vec<TraceFrame> {
        let mut entries = Vec::new();
        let mut at = (Rc::clone(source), span);
        let mut frame = Some(Rc::clone(self));

        while let Some(current) = frame {
            entries.push(TraceFrame {
                source: Rc::clone(&at.0),
                span: at.1,
                name: current.name.clone(),
            });
            if let Some(site) = &current.call_site {
                at = (Rc::clone(&site.0), site.1);
            }
            frame = current.parent.clone();
        }

        entries.reverse();
        entries
    }
}

use geo_types::Point;

/// Which store operation the next form submission should trigger. Callers
/// never inspect form contents to make that call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitTarget {
    NewAt(Point),
    Existing(String),
}

/// Tracks whether the form is creating a new workout or editing an existing
/// one. The latest gesture wins: picking a map location while editing starts
/// a create, clicking edit while a create form is open starts an edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditSession {
    #[default]
    Idle,
    Creating {
        location: Point,
    },
    Editing {
        target_id: String,
    },
}

impl EditSession {
    pub fn pick_location(&mut self, location: Point) {
        *self = EditSession::Creating { location };
    }

    pub fn begin_edit(&mut self, target_id: String) {
        *self = EditSession::Editing { target_id };
    }

    /// Successful submit.
    pub fn finish(&mut self) {
        *self = EditSession::Idle;
    }

    pub fn cancel(&mut self) {
        *self = EditSession::Idle;
    }

    /// The authoritative routing decision; `None` while idle.
    pub fn submit_target(&self) -> Option<SubmitTarget> {
        match self {
            EditSession::Idle => None,
            EditSession::Creating { location } => Some(SubmitTarget::NewAt(*location)),
            EditSession::Editing { target_id } => Some(SubmitTarget::Existing(target_id.clone())),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditSession::Editing { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EditSession::Idle)
    }
}

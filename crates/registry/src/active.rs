use uuid::Uuid;

/// Versioned pair of "active" pointers. Only the catalog mutates it, and
/// always under its write lock together with the per-entity flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActiveState {
    pub dataset: Option<Uuid>,
    pub model: Option<Uuid>,
    pub version: u64,
}

impl ActiveState {
    pub(crate) fn with_dataset(self, id: Option<Uuid>) -> Self {
        Self { dataset: id, version: self.version + 1, ..self }
    }

    pub(crate) fn with_model(self, id: Option<Uuid>) -> Self {
        Self { model: id, version: self.version + 1, ..self }
    }
}

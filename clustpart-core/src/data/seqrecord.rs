/// A sequence as handed over by the input collaborator, identity is by `id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    pub id: String,
    pub residues: String,
}

impl SeqRecord {
    pub fn new(
        id: String,
        residues: String,
    ) -> Self {
        Self { id, residues }
    }

    /// Create a new SeqRecord from borrowed parameters, useful for creating tests
    pub fn create(
        id: &str,
        residues: &str,
    ) -> Self {
        Self { id: id.to_string(), residues: residues.to_string() }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

//! # Evidence Records
//!
//! An [`EvidenceRecord`] is the immutable ledger entry pointing at encrypted
//! content. It goes from absent to present exactly once and is never updated
//! or removed.

use serde::{Deserialize, Serialize};

use crate::identity::{ContentId, EvidenceId, SubmitterId};
use crate::temporal::Timestamp;

/// A ledger entry.
///
/// `submitted_at` and `submitter` are stamped by the ledger at commit time.
/// No client-facing API accepts values for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub id: EvidenceId,
    pub content_id: ContentId,
    pub submitted_at: Timestamp,
    pub submitter: SubmitterId,
}

impl EvidenceRecord {
    /// File name suggested for the decrypted document:
    /// `evidence_{id}_{first 8 chars of content id}.decrypted`.
    pub fn suggested_file_name(&self) -> String {
        format!("evidence_{}_{}.decrypted", self.id, self.content_id.short())
    }
}

impl std::fmt::Display for EvidenceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ID: {} | Submitter: {} | {} | {}",
            self.id,
            self.submitter.abbreviated(),
            self.submitted_at,
            self.content_id
        )
    }
}

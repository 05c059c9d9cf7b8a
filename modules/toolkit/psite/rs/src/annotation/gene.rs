#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};
use derive_getters::{Dissolve, Getters};

/// Gene model: transcript ids in insertion order plus the curated principal subset
/// (e.g. APPRIS principal isoforms).
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, PartialEq, Eq, Debug, Dissolve, Getters)]
pub struct Gene {
    id: String,
    chromosome: String,
    transcripts: Vec<String>,
    principal: Vec<String>,
}

impl Gene {
    pub fn new(id: impl Into<String>, chromosome: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            chromosome: chromosome.into(),
            transcripts: Vec::new(),
            principal: Vec::new(),
        }
    }

    pub(super) fn add_transcript(&mut self, id: &str) {
        if !self.transcripts.iter().any(|x| x == id) {
            self.transcripts.push(id.to_string());
        }
    }

    pub(super) fn add_principal(&mut self, id: &str) {
        if !self.principal.iter().any(|x| x == id) {
            self.principal.push(id.to_string());
        }
    }

    /// Mitochondrial genes use a distinct genetic code and are excluded from meta-analysis.
    pub fn is_mitochondrial(&self) -> bool {
        matches!(self.chromosome.as_str(), "chrM" | "chrMT" | "M" | "MT")
    }
}

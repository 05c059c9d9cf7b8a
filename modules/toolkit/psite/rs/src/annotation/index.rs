use ahash::HashMap;
#[cfg(feature = "bitcode")]
use bitcode::{Decode, Encode};
use eyre::{ensure, eyre, Result};

use super::gene::Gene;
use super::transcript::Transcript;

/// Gene/transcript annotation stored as two flat maps. Transcripts refer to their gene by id,
/// genes list their transcripts by id. Insertion is validated so that every reference resolves.
#[cfg_attr(feature = "bitcode", derive(Encode, Decode))]
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Annotation {
    genes: HashMap<String, Gene>,
    transcripts: HashMap<String, Transcript>,
}

impl Annotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_gene(&mut self, gene: Gene) -> Result<&mut Self> {
        ensure!(
            !self.genes.contains_key(gene.id()),
            "Duplicated gene id: {}",
            gene.id()
        );
        self.genes.insert(gene.id().clone(), gene);
        Ok(self)
    }

    pub fn add_transcript(&mut self, transcript: Transcript) -> Result<&mut Self> {
        ensure!(
            !self.transcripts.contains_key(transcript.id()),
            "Duplicated transcript id: {}",
            transcript.id()
        );
        let gene = self.genes.get_mut(transcript.gene()).ok_or_else(|| {
            eyre!(
                "Transcript {} refers to an unknown gene {}",
                transcript.id(),
                transcript.gene()
            )
        })?;

        gene.add_transcript(transcript.id());
        self.transcripts.insert(transcript.id().clone(), transcript);
        Ok(self)
    }

    /// Mark an already added transcript as a principal isoform of its gene.
    pub fn mark_principal(&mut self, transcript: &str) -> Result<&mut Self> {
        let gene = self
            .transcripts
            .get(transcript)
            .ok_or_else(|| eyre!("Unknown principal transcript: {transcript}"))?
            .gene();
        self.genes
            .get_mut(gene)
            .ok_or_else(|| eyre!("Transcript {transcript} refers to an unknown gene {gene}"))?
            .add_principal(transcript);
        Ok(self)
    }

    pub fn gene(&self, id: &str) -> Option<&Gene> {
        self.genes.get(id)
    }

    pub fn transcript(&self, id: &str) -> Option<&Transcript> {
        self.transcripts.get(id)
    }

    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.values()
    }

    pub fn transcripts(&self) -> impl Iterator<Item = &Transcript> {
        self.transcripts.values()
    }

    pub fn contains_transcript(&self, id: &str) -> bool {
        self.transcripts.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    #[cfg(feature = "bitcode")]
    pub fn to_bytes(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    #[cfg(feature = "bitcode")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bitcode::decode(bytes).map_err(|err| eyre!("Failed to decode the annotation: {err}"))
    }
}

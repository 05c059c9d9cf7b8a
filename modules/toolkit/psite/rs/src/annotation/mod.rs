pub use gene::Gene;
pub use index::Annotation;
pub use select::{select_for_gene, select_transcripts};
pub use transcript::Transcript;

mod gene;
mod index;
mod select;
mod transcript;

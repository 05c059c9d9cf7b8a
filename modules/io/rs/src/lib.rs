pub mod bam;
mod traits;

pub use traits::{AlignmentSource, ReadRecord, WriteRecord};

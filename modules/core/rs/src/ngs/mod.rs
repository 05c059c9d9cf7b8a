pub use strandedness::Strandedness;

mod strandedness;

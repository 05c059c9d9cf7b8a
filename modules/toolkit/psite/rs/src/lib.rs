pub use config::{Config, Thresholds};
pub use distance::{Accumulator, DistanceHistogram, Distances, LengthCounter};
pub use estimator::{Estimate, Estimator};
pub use metaplot::{Metaplot, MetaplotPage};
pub use report::Summary;
pub use selection::{PsiteRow, Selection, Verdict};

pub mod annotation;
mod config;
pub mod distance;
mod estimator;
pub mod frames;
mod metaplot;
pub mod report;
mod selection;
pub mod stats;

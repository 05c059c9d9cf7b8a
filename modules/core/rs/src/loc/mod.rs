pub use interval::{Interval, IntervalOp};
pub use strand::Strand;

mod interval;
mod strand;

pub use alignment::Alignment;
pub use builder::ReaderBuilder;
pub use reader::Reader;

mod alignment;
mod builder;
mod reader;

pub mod preprocessing;
pub mod morphology;
pub mod labeling;
pub mod selection;
pub mod extraction;
pub mod moments;
pub mod rect;
pub mod features;

pub use preprocessing::*;
pub use morphology::*;
pub use labeling::*;
pub use selection::*;
pub use extraction::*;
pub use moments::*;
pub use rect::*;
pub use features::*;

//! Pipeline module - loading, preprocessing, selection and the training run

pub mod fitted;
pub mod loader;
pub mod preprocess;
pub mod selection;
pub mod split;
pub mod target;
pub mod training;

pub use fitted::*;
pub use loader::*;
pub use preprocess::*;
pub use selection::*;
pub use split::*;
pub use target::*;
pub use training::*;

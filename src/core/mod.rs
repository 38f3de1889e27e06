pub mod error;

pub use error::PagetapError;

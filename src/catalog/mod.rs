mod arena;
mod loader;

pub use arena::Catalog;
pub use loader::{load_catalog, read_catalog};

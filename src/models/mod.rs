pub mod item;

pub use item::{CanvasItem, DueDate, ItemKind};

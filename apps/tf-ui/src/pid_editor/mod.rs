#[allow(dead_code)]
pub mod commands;
#[allow(dead_code)]
pub mod hit_test;
pub mod model;
pub mod routing;
pub mod symbols;

pub use commands::{
    Clipboard, CommandHistory, SnapshotCommand, copy_selection, delete_selection, paste_clipboard,
};
pub use model::*;
pub use routing::{autoroute, is_orthogonal, normalize_orthogonal};
pub use symbols::*;

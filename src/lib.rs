pub mod config;
pub mod error;
pub mod geometry;
pub mod ui;

pub use config::{UiConfig, load_ui_config, try_load_ui_config};
pub use error::{HandlerError, HandlerResult, UiError};
pub use geometry::{Edges, Point, Rect, Size};
pub use ui::{NodeId, Ui};

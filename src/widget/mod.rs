pub mod alert;
pub mod hud_message;
pub mod page_canvas;

pub use alert::AlertPopup;
pub use hud_message::{HUD_DURATION, HudMessage, HudMode};
pub use page_canvas::PageCanvas;

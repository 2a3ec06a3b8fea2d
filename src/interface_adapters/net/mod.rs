// Network adapter modules split by viewer sockets vs level-editor HTTP routes.

pub mod client;
pub mod level;

pub use client::{spawn_render_serializer, ws_handler};
pub use level::{get_level_handler, place_element_handler, save_level_handler};

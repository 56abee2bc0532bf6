pub mod roles;
pub mod themes;

pub use roles::{classify, is_draw_engine, is_draw_spell};
pub use themes::{classify_themes, theme_keywords};

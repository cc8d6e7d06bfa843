//! Default values for window settings.

pub fn window_title() -> String {
    "gridwin".to_string()
}

pub fn window_width() -> u32 {
    640
}

pub fn window_height() -> u32 {
    480
}

pub fn remember_window_geometry() -> bool {
    true
}

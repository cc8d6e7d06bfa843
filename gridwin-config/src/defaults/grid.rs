//! Default values for grid geometry and the frame loop.

pub fn cell_width() -> u32 {
    12
}

pub fn cell_height() -> u32 {
    24
}

pub fn queue_capacity() -> usize {
    100
}

pub fn frame_interval_ms() -> u64 {
    30
}

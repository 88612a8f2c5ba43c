use crate::math::{Point2d, Shape2d};
#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

#[allow(unused)]
pub fn debug_point(name: &str, point: Point2d) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "point",
            "name": name,
            "pos": [point.x, point.y],
        }))
    })
}

#[allow(unused)]
pub fn debug_shape(name: &str, shape: &Shape2d) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        let points = shape
            .outline()
            .iter()
            .map(|p| [p.x, p.y])
            .collect::<Vec<_>>();
        frame.borrow_mut().push(json!({
            "type": "shape",
            "name": name,
            "points": points,
        }))
    })
}

/// Takes the debugging information recorded on this thread since the last call, as a JSON array.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}

// Console logging and id helpers shared by the components.

pub fn clog(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    gloo::console::log!(msg);
    #[cfg(not(target_arch = "wasm32"))]
    let _ = msg;
}

pub fn cwarn(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    gloo::console::warn!(msg);
    #[cfg(not(target_arch = "wasm32"))]
    let _ = msg;
}

/// `prefix-<ms since epoch>`, with a counter suffix so two ids minted in the
/// same millisecond stay distinct.
pub fn next_id(prefix: &str) -> String {
    use std::cell::Cell;
    thread_local! {
        static SEQ: Cell<u32> = const { Cell::new(0) };
    }
    let seq = SEQ.with(|s| {
        let n = s.get().wrapping_add(1);
        s.set(n);
        n
    });
    format!("{prefix}-{}-{seq}", js_sys::Date::now() as u64)
}

pub fn window_size() -> (f64, f64) {
    let Some(win) = web_sys::window() else {
        return (0.0, 0.0);
    };
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}

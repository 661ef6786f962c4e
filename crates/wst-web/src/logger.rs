//! Console logging and the panic hook.

use log::LevelFilter;

/// Route `log` records to the browser console through `console_log`. If the
/// embedding application already installed a logger, that one is kept and
/// only the level is applied.
pub fn init(level: LevelFilter) {
    let Some(max) = level.to_level() else {
        log::set_max_level(LevelFilter::Off);
        return;
    };
    if console_log::init_with_level(max).is_err() {
        log::set_max_level(level);
        log::debug!("logger already installed, keeping it");
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

pub fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("WST WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

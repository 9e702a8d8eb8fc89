//! Browser console plumbing: the `log` backend and the panic hook.

use log::LevelFilter;

/// Parse a level name from the host (`"warn"`, `"debug"`, ...).
/// Unknown names fall back to `Warn`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Warn)
}

/// Route `log` output to the browser console. Safe to call repeatedly; only
/// the level changes after the first call.
pub fn init(level: LevelFilter) {
    if let Some(max) = level.to_level() {
        // A second init fails; the console logger is already installed then.
        let _ = console_log::init_with_level(max);
    }
    log::set_max_level(level);
}

pub fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("sigpad WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

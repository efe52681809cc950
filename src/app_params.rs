use gloo::console;
use web_sys::UrlSearchParams;

use fnwheel_core::Rgb;

use crate::sync_runtime::{self, OptionValue};

/// One-time URL-parameter bootstrap: `?party[&script=N]` starts a light
/// show, `?fade=rrggbb[&step=N][&delay=N]` behaves like a pre-seeded
/// click. Runs once, after the initial status load.
pub(crate) fn apply() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Ok(search) = window.location().search() else {
        return;
    };
    let Ok(params) = UrlSearchParams::new_with_str(&search) else {
        return;
    };

    if params.has("party") {
        let script = params
            .get("script")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(1);
        sync_runtime::start_script(script);
        return;
    }

    let Some(hex) = params.get("fade") else {
        return;
    };
    for key in ["step", "delay"] {
        if let Some(n) = params.get(key).and_then(|value| value.trim().parse().ok()) {
            sync_runtime::set_option(key, OptionValue::Number(n));
        }
    }
    match Rgb::from_hex(&hex) {
        Ok(color) => sync_runtime::send_fade_command(color),
        Err(err) => console::warn!("bad fade parameter", err.to_string()),
    }
}

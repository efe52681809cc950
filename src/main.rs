mod app_params;
mod fade_runtime;
mod sync_runtime;
mod wheel_view;

use gloo::events::EventListener;

fn main() {
    console_error_panic_hook::set_once();
    wheel_view::init();
    sync_runtime::boot();

    // Navigation teardown: the outstanding poll and any running fade must
    // not outlive the tab.
    if let Some(window) = web_sys::window() {
        EventListener::new(&window, "beforeunload", |_| {
            sync_runtime::shutdown();
        })
        .forget();
    }
}

#![allow(non_snake_case)]

#[cfg(target_arch = "wasm32")]
mod demo;

fn main() {
    // Initialize panic hook for better error messages in browser console
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Info));

        log::info!("Starting modal dialog demo");

        dioxus::launch(demo::App);
    }

    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("modal-demo runs in the browser; build it for wasm32-unknown-unknown (e.g. `dx serve`)");
}

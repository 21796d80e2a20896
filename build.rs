fn main() {
    println!("cargo:rustc-check-cfg=cfg(desktop)");
    println!("cargo:rustc-check-cfg=cfg(mobile)");

    // The Tauri build helper reads env vars exported by the `tauri` crate, which is only
    // compiled with the `app` feature. Core-only builds skip it.
    if std::env::var_os("CARGO_FEATURE_APP").is_some() {
        tauri_build::build()
    }
}

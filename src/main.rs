#[cfg(target_os = "macos")]
fn main() {
    calmtype::logging::init_logging();
    calmtype::macos::run();
}

#[cfg(not(target_os = "macos"))]
fn main() {
    calmtype::logging::init_logging();
    tracing::error!("CalmType needs macOS (AppKit) to run");
    std::process::exit(1);
}

//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `inkstream_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("inkstream_core ping={}", inkstream_core::ping());
    println!("inkstream_core version={}", inkstream_core::core_version());
}

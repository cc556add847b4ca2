//! # Voxel Renderer Demo Entry Point
//!
//! Runs the headless streaming and meshing demo from the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- config.json
//! ```

fn main() -> std::process::ExitCode {
    voxel_renderer::report(voxel_renderer::run())
}

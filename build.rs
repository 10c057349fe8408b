/// Build script for graphic_engine
///
/// # Shader Compilation Strategy:
/// - HLSL shaders are compiled at runtime via D3DCompile (FXC, shader model 5.0)
fn main() {
    // Trigger rebuild if shader files change
    println!("cargo:rerun-if-changed=src/renderer/shaders/color.vs.hlsl");
    println!("cargo:rerun-if-changed=src/renderer/shaders/color.ps.hlsl");
}

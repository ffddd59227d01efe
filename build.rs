// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
// 构建脚本: 静态FFmpeg在Windows上采集摄像头所需的系统库
fn main() {
    #[cfg(all(target_os = "windows", target_env = "msvc"))]
    {
        // DirectShow 摄像头采集 (dshow)
        for lib in ["strmiids", "ole32", "oleaut32", "vfw32", "mfuuid", "mfplat"] {
            println!("cargo:rustc-link-lib=dylib={}", lib);
        }
        // TLS (流地址为 https/rtsps 时)
        println!("cargo:rustc-link-lib=dylib=secur32");
    }
    println!("cargo:rerun-if-changed=build.rs");
}

fn main() {
    let built = chrono::Local::now().format("%b %d %Y %H:%M:%S");
    println!("cargo:rustc-env=DX12_RENDERER_BUILT_AT={built}");
}

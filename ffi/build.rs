use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=build.rs");

    let crate_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => return,
    };
    let header = crate_dir.join("include").join("store_ffi.h");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("STORE_FFI_H")
        .with_cpp_compat(true)
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(header);
        }
        Err(e) => println!("cargo:warning=cbindgen failed to generate {}: {e}", header.display()),
    }
}

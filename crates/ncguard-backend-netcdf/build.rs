use std::env;
use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo::rustc-check-cfg=cfg(netcdf_linked)");
    println!("cargo:rerun-if-env-changed=NETCDF_LIB_DIR");

    // An explicit directory is trusted as-is; otherwise ask nc-config and
    // only link when the shared library is actually there.
    let lib_dir = match env::var("NETCDF_LIB_DIR") {
        Ok(dir) => Some(dir),
        Err(_) => nc_config_libdir().filter(|dir| has_libnetcdf(dir)),
    };

    let Some(lib_dir) = lib_dir else {
        println!(
            "cargo:warning=libnetcdf not found (set NETCDF_LIB_DIR or install nc-config); \
             NetcdfLibrary calls will fail with NC_ENOTBUILT"
        );
        return;
    };

    println!("cargo:rustc-link-search=native={}", lib_dir);
    println!("cargo:rustc-link-lib=dylib=netcdf");
    println!("cargo:rustc-cfg=netcdf_linked");
}

fn nc_config_libdir() -> Option<String> {
    let output = Command::new("nc-config").arg("--libdir").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!dir.is_empty()).then_some(dir)
}

fn has_libnetcdf(dir: &str) -> bool {
    ["libnetcdf.so", "libnetcdf.dylib", "libnetcdf.a"]
        .iter()
        .any(|name| Path::new(dir).join(name).exists())
}

use std::path::PathBuf;

fn main() {
    // Tell Cargo to re-run this build script if schemas/ changes
    println!("cargo:rerun-if-changed=schemas/");

    // The schemas directory is embedded using include_dir! in config::defaults
    let schema_path = PathBuf::from("schemas");
    if !schema_path.exists() {
        std::fs::create_dir_all(&schema_path).expect("Failed to create schemas directory");
    }
}

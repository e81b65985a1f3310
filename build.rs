use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Drop a config template next to the build output for reference
    let out_dir = env::var("OUT_DIR").unwrap_or_else(|_| "./".to_string());
    let template_path = Path::new(&out_dir).join("../../../av1hw.template.toml");

    let template = r#"# av1hw configuration template
# Copy this file to 'av1hw.toml' and adjust the values

# Bytes reserved for the per-frame bitstream buffer when a decode session starts
initial_bitstream_capacity = 0

# Largest accumulated frame accepted before appends fail with out-of-memory
max_bitstream_size = 268435456
"#;

    let _ = fs::write(template_path, template);
    println!("cargo:rerun-if-changed=build.rs");
}

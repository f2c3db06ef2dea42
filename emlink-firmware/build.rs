//! Build script for emlink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates node.toml and generates the `NODE_CONFIG` constant

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Longest name the HM-10 accepts
const MAX_NAME_LEN: usize = 12;

fn main() {
    setup_linker();
    let node = validate_config();
    generate_config(&node);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Settings pulled out of node.toml
struct NodeSettings {
    period_ms: u32,
    active_ms: u32,
    celsius: bool,
    threshold_f: f64,
    module_name: Option<String>,
}

/// Validate node.toml at compile time
fn validate_config() -> NodeSettings {
    println!("cargo:rerun-if-changed=node.toml");

    let config_path = Path::new("node.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: node.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a node.toml configuration file.           ║\n\
            ║  Please create one in the emlink-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read node.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in node.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let settings = validate_node(&config, &mut errors);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid settings in node.toml                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=node.toml validated successfully");
    settings
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn read_ms(node: &toml::Value, key: &str, default: u32, errors: &mut Vec<String>) -> u32 {
    match node.get(key) {
        None => default,
        Some(value) => match value.as_integer().map(u32::try_from) {
            Some(Ok(ms)) => ms,
            _ => {
                errors.push(format!("[node] {} must be an integer 0..=4294967295", key));
                default
            }
        },
    }
}

fn validate_node(config: &toml::Value, errors: &mut Vec<String>) -> NodeSettings {
    let empty = toml::Value::Table(toml::map::Map::new());
    let node = match config.get("node") {
        Some(node) => node,
        None => {
            errors.push("Missing [node] section".to_string());
            &empty
        }
    };

    let period_ms = read_ms(node, "period_ms", 10_000, errors);
    let active_ms = read_ms(node, "active_ms", 100, errors);
    if period_ms == 0 {
        errors.push("[node] period_ms must be greater than 0".to_string());
    }
    if active_ms > period_ms {
        errors.push(format!(
            "[node] active_ms ({}) exceeds period_ms ({})",
            active_ms, period_ms
        ));
    }

    let celsius = match node.get("unit").map(|u| u.as_str()) {
        None | Some(Some("F")) => false,
        Some(Some("C")) => true,
        _ => {
            errors.push("[node] unit must be \"F\" or \"C\"".to_string());
            false
        }
    };

    let threshold_f = match node.get("threshold_f") {
        None => 85.0,
        Some(value) => match value.as_float().or_else(|| value.as_integer().map(|i| i as f64)) {
            Some(t) if t.is_finite() => t,
            _ => {
                errors.push("[node] threshold_f must be a number".to_string());
                85.0
            }
        },
    };

    let module_name = match config.get("module").and_then(|m| m.get("name")) {
        None => None,
        Some(value) => match value.as_str() {
            Some(name)
                if !name.is_empty()
                    && name.len() <= MAX_NAME_LEN
                    && name.bytes().all(|b| b.is_ascii_graphic()) =>
            {
                Some(name.to_string())
            }
            _ => {
                errors.push(format!(
                    "[module] name must be 1-{} printable ASCII characters",
                    MAX_NAME_LEN
                ));
                None
            }
        },
    };

    NodeSettings {
        period_ms,
        active_ms,
        celsius,
        threshold_f,
        module_name,
    }
}

/// Write `node_config.rs` for `main.rs` to include
fn generate_config(node: &NodeSettings) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let unit = if node.celsius {
        "emlink_protocol::TempUnit::Celsius"
    } else {
        "emlink_protocol::TempUnit::Fahrenheit"
    };
    let module_name = match &node.module_name {
        Some(name) => format!("emlink_core::config::ModuleName::new({:?})", name),
        None => "None".to_string(),
    };

    let source = format!(
        "/// Node settings from node.toml\n\
         pub const NODE_CONFIG: emlink_core::config::NodeConfig = emlink_core::config::NodeConfig {{\n    \
             period_ms: {},\n    \
             active_ms: {},\n    \
             unit: {},\n    \
             threshold_f: {:?}f32,\n    \
             module_name: {},\n\
         }};\n",
        node.period_ms, node.active_ms, unit, node.threshold_f, module_name
    );

    let mut f = File::create(out_dir.join("node_config.rs")).unwrap();
    f.write_all(source.as_bytes()).unwrap();
}

use std::env;
use std::fs;
use std::path::Path;

// Claves que lee config.rs con option_env!
const CONFIG_KEYS: &[&str] = &[
    "CAPTURE_RATE_MS",
    "CAPTURE_SCALE",
    "CAPTURE_PNG",
    "CAROUSEL_MODE",
    "CAROUSEL_WIDTH",
    "CAROUSEL_HEIGHT",
    "CARD_FADE_MS",
    "VIBRATE_MS",
    "POLYFILL_PREFIX",
    "LOG_LEVEL",
    "ENABLE_LOGGING",
];

fn main() {
    for key in CONFIG_KEYS {
        println!("cargo:rerun-if-env-changed={}", key);
    }
    println!("cargo:rerun-if-changed=build.rs");

    // Cargar variables desde .env si existe (el entorno tiene prioridad)
    let env_file = Path::new(".env");
    if !env_file.exists() {
        println!("cargo:warning=No .env file found. Using default values (see .env.example).");
        return;
    }
    println!("cargo:rerun-if-changed=.env");

    let Ok(contents) = fs::read_to_string(env_file) else {
        println!("cargo:warning=Unable to read .env");
        return;
    };

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"');

        if !CONFIG_KEYS.contains(&key) {
            println!("cargo:warning=Unknown key in .env: {}", key);
            continue;
        }
        if env::var(key).is_err() {
            println!("cargo:rustc-env={}={}", key, value);
        }
    }
}

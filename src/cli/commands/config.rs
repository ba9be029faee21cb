//! Config command handler

use crate::args::ConfigSubcommand;
use fee_sankey::config::Config;
use logger::info;
use std::io::{self, BufRead, Write};

/// Keys accepted by `config get|set|unset`, grouped as in the config file
const KEYS: &[(&str, &[&str])] = &[
    ("logging", &["level", "file", "verbose"]),
    ("paths", &["output_dir"]),
    (
        "chart",
        &[
            "width",
            "height",
            "node_width",
            "node_padding",
            "align",
            "scheme",
            "iterations",
        ],
    ),
    ("data", &["component_type", "root_name", "missing_amount"]),
];

/// Dispatch config subcommands
pub fn run(subcommand: Option<ConfigSubcommand>, config: &mut Config, defaults: &Config) {
    let result = match subcommand {
        None | Some(ConfigSubcommand::Get { key: None }) => {
            println!("\n=== Configuration ({}) ===\n", Config::get_config_file_path().display());
            print!("{config}");
            Ok(())
        }
        Some(ConfigSubcommand::Get { key: Some(key) }) => match config.get(&key) {
            Some(value) => {
                println!("{value}");
                Ok(())
            }
            None => Err(unknown_key(&key)),
        },
        Some(ConfigSubcommand::Set { key, value }) => {
            set_and_save(config, &key, &value).map(|()| println!("✓ Set {key} = {value}"))
        }
        Some(ConfigSubcommand::Unset { key }) => {
            unset_and_save(config, defaults, &key).map(|()| println!("✓ Reset {key} to default"))
        }
        Some(ConfigSubcommand::Reset) => reset(&mut io::stdin().lock()),
    };

    if let Err(e) = result {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
}

fn unknown_key(key: &str) -> String {
    let known: Vec<&str> = KEYS.iter().flat_map(|(_, keys)| keys.iter().copied()).collect();
    format!("Unknown config key: '{key}' (known keys: {})", known.join(", "))
}

fn set_and_save(config: &mut Config, key: &str, value: &str) -> Result<(), String> {
    config
        .set(key, value)
        .map_err(|e| if e.starts_with("Unknown config key") { unknown_key(key) } else { e })?;
    config
        .save()
        .map_err(|e| format!("Failed to save config: {e}"))?;
    info!("Config updated: {key} = {value}");
    Ok(())
}

fn unset_and_save(config: &mut Config, defaults: &Config, key: &str) -> Result<(), String> {
    config.unset(key, defaults).map_err(|_| unknown_key(key))?;
    config
        .save()
        .map_err(|e| format!("Failed to save config: {e}"))?;
    info!("Config key reset: {key}");
    Ok(())
}

/// Delete the config file after a y/n confirmation read from `input`
fn reset(input: &mut impl BufRead) -> Result<(), String> {
    if !Config::get_config_file_path().exists() {
        println!("✓ Config is already at defaults");
        return Ok(());
    }

    print!("Are you sure you want to reset config to defaults? (y/n): ");
    io::stdout().flush().ok();

    if confirmed(input) {
        Config::reset().map_err(|e| format!("Failed to remove config file: {e}"))?;
        println!("✓ Config reset to defaults");
    } else {
        println!("✗ Reset cancelled");
    }
    Ok(())
}

fn confirmed(input: &mut impl BufRead) -> bool {
    let mut response = String::new();
    if input.read_line(&mut response).is_err() {
        return false;
    }
    matches!(response.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

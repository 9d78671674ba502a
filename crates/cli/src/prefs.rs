// Preference file commands: get, set, list, dump, reset

use std::collections::BTreeMap;
use std::io::Write;

use keepsake_config::properties::to_xml_string;
use keepsake_config::{DataFolder, PreferencesParameter, SharedStoreRegistry, TypedPreferences};

use crate::CliError;

fn open(folder: &DataFolder, file: &str) -> Result<TypedPreferences, CliError> {
    let param = PreferencesParameter::new(file)?;
    Ok(TypedPreferences::open(SharedStoreRegistry::global(), folder, &param))
}

fn stdout_err(e: std::io::Error) -> CliError {
    CliError::io(format!("stdout: {e}"))
}

pub fn cmd_get(folder: &DataFolder, file: &str, key: &str) -> Result<(), CliError> {
    let prefs = open(folder, file)?;
    match prefs.get(key)? {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => Err(CliError::not_found(format!("key not found: {key}"))),
    }
}

pub fn cmd_set(folder: &DataFolder, file: &str, key: &str, value: &str) -> Result<(), CliError> {
    if key.trim().is_empty() {
        return Err(CliError::usage("key must not be blank"));
    }
    let prefs = open(folder, file)?;
    prefs.set(key, value);
    prefs.flush()?;
    Ok(())
}

fn entries(prefs: &TypedPreferences, prefix: Option<&str>) -> Result<BTreeMap<String, String>, CliError> {
    let names = match prefix {
        Some(prefix) => prefs.property_names_starting_with(prefix)?,
        None => prefs.property_names()?,
    };
    let mut out = BTreeMap::new();
    for name in names {
        if let Some(value) = prefs.get(&name)? {
            out.insert(name, value);
        }
    }
    Ok(out)
}

pub fn cmd_list(
    folder: &DataFolder,
    file: &str,
    prefix: Option<&str>,
    json: bool,
) -> Result<(), CliError> {
    let prefs = open(folder, file)?;
    let entries = entries(&prefs, prefix)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &entries)
            .map_err(|e| CliError::other(format!("failed to write JSON: {e}")))?;
        writeln!(out).map_err(stdout_err)?;
    } else {
        for (key, value) in &entries {
            writeln!(out, "{key}={value}").map_err(stdout_err)?;
        }
    }
    Ok(())
}

pub fn cmd_dump(folder: &DataFolder, file: &str) -> Result<(), CliError> {
    let prefs = open(folder, file)?;
    let entries = entries(&prefs, None)?;
    print!("{}", to_xml_string(&entries, None));
    Ok(())
}

pub fn cmd_reset(folder: &DataFolder, file: &str) -> Result<(), CliError> {
    let param = PreferencesParameter::new(file)?;
    let path = folder.preferences_path(param.file_name());
    match std::fs::remove_file(&path) {
        Ok(()) => {
            log::info!("removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("nothing to reset at {}", path.display());
            Ok(())
        }
        Err(e) => Err(CliError::io(format!("{}: {e}", path.display()))),
    }
}

use std::path::PathBuf;

const NOTES_DIR_NAME: &str = "YZC_Note";
const CONFIG_DIR_NAME: &str = "yzc-notes";
const CONFIG_FILE_NAME: &str = "config.json";

/// Returns the platform-specific default notes directory.
///
/// - Linux: `~/.local/share/YZC_Note`
/// - macOS: `~/Library/Application Support/YZC_Note`
/// - Windows: `%APPDATA%\YZC_Note`
///
/// Debug builds get a `-dev` suffix so development never touches real notes.
/// Returns `None` when the data directory cannot be determined.
pub fn get_default_notes_path(debug: bool) -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(with_debug_suffix(NOTES_DIR_NAME, debug)))
}

/// Returns the platform-specific default location of the settings file.
///
/// The file lives under the config directory, outside any notes directory.
pub fn get_default_config_path(debug: bool) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| {
        dir.join(with_debug_suffix(CONFIG_DIR_NAME, debug))
            .join(CONFIG_FILE_NAME)
    })
}

fn with_debug_suffix(name: &str, debug: bool) -> String {
    if debug {
        format!("{}-dev", name)
    } else {
        name.to_string()
    }
}

// Startup check of the reactions folder plus the help banner printed before the camera opens.

use std::path::Path;

use crate::error::InventoryError;
use crate::media::REACTION_KEYS;

/// The folder must exist and hold at least one file. Returns the file names, sorted.
pub fn check_reactions(dir: &Path) -> Result<Vec<String>, InventoryError> {
    if !dir.is_dir() {
        let cwd = std::env::current_dir().unwrap_or_default();
        return Err(InventoryError::Missing { dir: dir.to_path_buf(), cwd });
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|source| InventoryError::Unreadable { dir: dir.to_path_buf(), source })?;

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    if names.is_empty() {
        return Err(InventoryError::Empty { dir: dir.to_path_buf() });
    }
    Ok(names)
}

/// Key help followed by the reactions found on disk.
pub fn banner(dir: &Path, files: &[String]) -> String {
    let keys: String = REACTION_KEYS.iter().map(|c| c.to_ascii_uppercase()).collect();
    let mut out = String::new();
    out.push_str("----------------------------\n");
    out.push_str("Blink - just a little webcam viewer\n\n");
    out.push_str("  Space    toggle window frame\n");
    out.push_str("  F        toggle fullscreen\n");
    out.push_str("  Up/Down  zoom in/out (O reset, I max)\n");
    out.push_str("  V        circle view\n");
    out.push_str("  T        always on top\n");
    out.push_str("  [ / ]    window opacity\n");
    out.push_str(&format!("  {keys}  reactions\n"));
    out.push_str("  Esc      quit\n\n");
    out.push_str(&format!("Found images in folder '{}':\n", dir.display()));
    for name in files {
        out.push_str(&format!("  - {name}\n"));
    }
    out.push_str("----------------------------");
    out
}

/// Tell the user how to fix a failed inventory.
pub fn remedy(err: &InventoryError) -> String {
    match err {
        InventoryError::Missing { dir, cwd } => format!(
            "Please create the folder '{}' (working directory: {}) and add some images to it.",
            dir.display(),
            cwd.display()
        ),
        InventoryError::Empty { .. } => "Please add some images to it.".to_string(),
        InventoryError::Unreadable { .. } => "Check the folder permissions.".to_string(),
    }
}

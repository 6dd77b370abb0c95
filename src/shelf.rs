//! Shelf button registration contract
//!
//! Registration runs inside Maya's own scripting runtime, never in this
//! process. This module pins down the protocol (create the tab if needed,
//! drop every button with the same label, add the new one) against an
//! abstract [`ShelfHost`], and describes the button the deployed tool should
//! register so the paths and icon name line up with what was deployed.
//!
//! The button imports `<toolName>.main` from the per-version
//! `scripts/<toolName>/` copy; Maya puts `<version>/scripts` on `sys.path`.
//! The icon is a bare file name resolved through the manifest's
//! `XBMLANGPATH`, so only the tool's own icon directory is consulted.

use crate::types::ToolIdentity;
use std::fs;
use std::path::Path;

/// Icon shipped with Maya, used when the tool has no PNG of its own
pub const FALLBACK_ICON: &str = "pythonFamily.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfButton {
    pub shelf_tab_name: String,
    pub label: String,
    pub command: String,
    pub icon: String,
}

impl ShelfButton {
    /// The button a deployed tool registers: its label is the tool name and
    /// its command imports and runs the tool's `main` module.
    ///
    /// `icon_dir` is the distribution's own icon directory.
    pub fn for_tool(identity: &ToolIdentity, shelf_tab_name: &str, icon_dir: &Path) -> Self {
        Self {
            shelf_tab_name: sanitize_shelf_name(shelf_tab_name),
            label: identity.tool_name.clone(),
            command: launch_command(&identity.tool_name),
            icon: find_icon(icon_dir),
        }
    }

    /// The MEL call the host-side `add_to_shelf` procedure expects.
    pub fn mel_invocation(&self) -> String {
        format!(
            "add_to_shelf(\"{}\", \"{}\", \"{}\", \"{}\");",
            mel_escape(&self.shelf_tab_name),
            mel_escape(&self.label),
            mel_escape(&self.command),
            mel_escape(&self.icon)
        )
    }
}

// Implemented by the host runtime; the in-memory host below is test-only.
/// UI primitives of the host's shelf system.
#[allow(dead_code)]
pub trait ShelfHost {
    fn shelf_exists(&self, shelf: &str) -> bool;
    fn create_shelf(&mut self, shelf: &str);
    fn button_labels(&self, shelf: &str) -> Vec<String>;
    fn remove_buttons_labelled(&mut self, shelf: &str, label: &str) -> usize;
    fn add_button(&mut self, button: &ShelfButton);
}

#[allow(dead_code)]
pub trait ShelfRegistrar {
    /// Install or replace a button. Repeating the call with the same
    /// arguments leaves exactly one button with that label.
    fn register_button(&mut self, button: &ShelfButton);
}

impl<H: ShelfHost> ShelfRegistrar for H {
    fn register_button(&mut self, button: &ShelfButton) {
        if !self.shelf_exists(&button.shelf_tab_name) {
            self.create_shelf(&button.shelf_tab_name);
        }
        let removed = self.remove_buttons_labelled(&button.shelf_tab_name, &button.label);
        if removed > 0 {
            tracing::debug!(
                "Replaced {} existing '{}' button(s) on shelf '{}'",
                removed,
                button.label,
                button.shelf_tab_name
            );
        }
        self.add_button(button);
    }
}

/// A shelf system kept in memory, in tab creation order.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct InMemoryShelves {
    shelves: Vec<(String, Vec<ShelfButton>)>,
}

#[cfg(test)]
impl InMemoryShelves {
    pub fn buttons(&self, shelf: &str) -> &[ShelfButton] {
        self.shelves
            .iter()
            .find(|(name, _)| name == shelf)
            .map(|(_, buttons)| buttons.as_slice())
            .unwrap_or(&[])
    }

    fn shelf_mut(&mut self, shelf: &str) -> Option<&mut Vec<ShelfButton>> {
        self.shelves
            .iter_mut()
            .find(|(name, _)| name == shelf)
            .map(|(_, buttons)| buttons)
    }
}

#[cfg(test)]
impl ShelfHost for InMemoryShelves {
    fn shelf_exists(&self, shelf: &str) -> bool {
        self.shelves.iter().any(|(name, _)| name == shelf)
    }

    fn create_shelf(&mut self, shelf: &str) {
        self.shelves.push((shelf.to_string(), Vec::new()));
    }

    fn button_labels(&self, shelf: &str) -> Vec<String> {
        self.buttons(shelf).iter().map(|b| b.label.clone()).collect()
    }

    fn remove_buttons_labelled(&mut self, shelf: &str, label: &str) -> usize {
        let Some(buttons) = self.shelf_mut(shelf) else {
            return 0;
        };
        let before = buttons.len();
        buttons.retain(|b| b.label != label);
        before - buttons.len()
    }

    fn add_button(&mut self, button: &ShelfButton) {
        if let Some(buttons) = self.shelf_mut(&button.shelf_tab_name) {
            buttons.push(button.clone());
        }
    }
}

fn launch_command(tool_name: &str) -> String {
    let module = python_quote(&format!("{}.main", tool_name));
    [
        "import importlib".to_string(),
        "try:".to_string(),
        format!("    main = importlib.import_module({})", module),
        "    importlib.reload(main)".to_string(),
        "    main.run()".to_string(),
        "except ImportError:".to_string(),
        "    import maya.cmds as cmds".to_string(),
        "    cmds.warning('Module not found. Please restart Maya to complete installation.')"
            .to_string(),
    ]
    .join("\n")
}

fn python_quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// File name of the first PNG in the tool's icon directory, else Maya's
/// stock icon.
pub fn find_icon(icon_dir: &Path) -> String {
    let Ok(entries) = fs::read_dir(icon_dir) else {
        return FALLBACK_ICON.to_string();
    };

    entries
        .flatten()
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.to_lowercase().ends_with(".png"))
        .min()
        .unwrap_or_else(|| FALLBACK_ICON.to_string())
}

/// Shelf layout names cannot contain path separators, wildcards or spaces.
pub fn sanitize_shelf_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            c => c,
        })
        .collect()
}

fn mel_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

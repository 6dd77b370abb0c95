#[cfg(test)]
mod tests {
    use crate::config;
    use crate::platform;
    use crate::types::{DeployerSettings, ResourceGroup};
    use std::path::Path;

    #[test]
    fn test_parse_flag() {
        assert!(config::parse_flag("on"));
        assert!(!config::parse_flag("off"));
    }

    #[test]
    fn test_host_layout() {
        let layout = platform::get_host_layout();
        assert_eq!(layout.product, "maya");
        assert!(layout.executable_name().is_some());
    }

    #[test]
    fn test_settings_default() {
        let settings = DeployerSettings::default();
        assert_eq!(settings.shelf_tab_name, "Python");
        assert!(settings.pause_on_exit);
        assert!(settings.launch);
        assert!(settings.icon_extensions.contains(&"png".to_string()));
    }

    #[test]
    fn test_settings_partial_json_uses_defaults() {
        let settings: DeployerSettings =
            serde_json::from_str(r#"{ "shelf_tab_name": "Rigging" }"#).unwrap();
        assert_eq!(settings.shelf_tab_name, "Rigging");
        assert!(settings.launch);
        assert_eq!(
            settings.icon_extensions,
            DeployerSettings::default().icon_extensions
        );
    }

    #[test]
    fn test_group_destinations() {
        let version_dir = Path::new("/home/u/maya/2025");
        assert_eq!(
            ResourceGroup::ShelfDefinition.destination(version_dir, "CV_Scaler"),
            version_dir.join("prefs").join("shelves")
        );
        assert_eq!(
            ResourceGroup::ScriptsTree.destination(version_dir, "CV_Scaler"),
            version_dir.join("scripts").join("CV_Scaler")
        );
        assert_eq!(
            ResourceGroup::IconSet.destination(version_dir, "CV_Scaler"),
            version_dir.join("prefs").join("icons")
        );
    }
}

use crate::errors::ScanError;
use crate::model::CameraType;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Built-in camera type reference data, looked up by name before a scan
pub mod registry {
    use super::*;

    /// Global camera type table, built lazily on first lookup
    static CAMERA_TYPES: OnceCell<HashMap<String, Arc<CameraType>>> = OnceCell::new();

    fn builtin_types() -> HashMap<String, Arc<CameraType>> {
        let types = vec![
            CameraType {
                name: "foscam".to_string(),
                default_username: "admin".to_string(),
                default_password: String::new(),
                stream_path: "videostream.cgi".to_string(),
                search_term: "netwave ip camera".to_string(),
                // Foscam firmware always identifies itself in the Server
                // header; anything else claiming 200 here is an impostor
                server_header_marker: Some("netwave".to_string()),
            },
            CameraType {
                name: "axis".to_string(),
                default_username: "root".to_string(),
                default_password: "pass".to_string(),
                stream_path: "axis-cgi/mjpg/video.cgi".to_string(),
                search_term: "axis video server".to_string(),
                server_header_marker: None,
            },
        ];

        types
            .into_iter()
            .map(|t| (t.name.clone(), Arc::new(t)))
            .collect()
    }

    /// Look up a camera type by name (case-insensitive).
    /// Unknown names are a fatal configuration error: the scan must not
    /// start with a partially resolved type.
    pub fn lookup(name: &str) -> Result<Arc<CameraType>, ScanError> {
        let table = CAMERA_TYPES.get_or_init(builtin_types);
        table
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| ScanError::UnknownCameraType(name.to_string()))
    }

    /// Names of all built-in camera types
    pub fn known_names() -> Vec<String> {
        let table = CAMERA_TYPES.get_or_init(builtin_types);
        let mut names: Vec<String> = table.keys().cloned().collect();
        names.sort();
        names
    }
}

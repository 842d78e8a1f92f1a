//! JSON input loading shared by the snapshot, menu and CLI layers.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::errors::LoadError;
use mes_common::{MenuNode, MenuResponse};

/// Read and decode a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a menu tree, accepting either `{ "menus": [...] }` or a bare array.
pub fn read_menus(path: &Path) -> Result<Vec<MenuNode>, LoadError> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum MenuFile {
        Wrapped(MenuResponse),
        Bare(Vec<MenuNode>),
    }

    Ok(match read_json::<MenuFile>(path)? {
        MenuFile::Wrapped(response) => response.menus,
        MenuFile::Bare(menus) => menus,
    })
}

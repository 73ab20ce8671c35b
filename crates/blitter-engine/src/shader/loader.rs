use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{RenderError, Result};

use super::ShaderPair;

const VERTEX_EXT: &str = ".vert.wgsl";
const FRAGMENT_EXT: &str = ".frag.wgsl";

/// Reads shader pairs from a directory and caches them by name pair.
///
/// Files are looked up relative to `root`. Unless extensions are ignored,
/// `.vert.wgsl` / `.frag.wgsl` are appended to names that lack them.
/// Cached entries are never invalidated; edits on disk need a new loader.
#[derive(Debug)]
pub struct ShaderLoader {
    root: PathBuf,
    ignore_extensions: bool,
    cache: Mutex<HashMap<(String, String), Arc<ShaderPair>>>,
}

impl ShaderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_extensions: false,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Takes file names verbatim instead of appending the stage extension.
    pub fn ignore_extensions(mut self, ignore: bool) -> Self {
        self.ignore_extensions = ignore;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads `vertex` and `fragment` (defaults to the vertex name).
    pub fn load_pair(&self, vertex: &str, fragment: Option<&str>) -> Result<Arc<ShaderPair>> {
        let fragment = fragment.unwrap_or(vertex);
        let key = (vertex.to_string(), fragment.to_string());

        if let Some(hit) = self.lock().get(&key) {
            return Ok(Arc::clone(hit));
        }

        let vertex_file = self.file_name(vertex, VERTEX_EXT);
        let fragment_file = self.file_name(fragment, FRAGMENT_EXT);

        let pair = Arc::new(ShaderPair::new(
            vertex,
            read_source(&self.root.join(vertex_file))?,
            read_source(&self.root.join(fragment_file))?,
        ));
        log::debug!("loaded shader pair {vertex}/{fragment} from {}", self.root.display());

        self.lock().insert(key, Arc::clone(&pair));
        Ok(pair)
    }

    /// Loads `<root>/<name>/<name>.vert.wgsl` and its fragment counterpart.
    pub fn load_dir(&self, name: &str) -> Result<Arc<ShaderPair>> {
        let stem = format!("{name}/{name}");
        let mut pair = self.load_pair(&stem, None)?;
        if pair.name != name {
            let renamed = ShaderPair::new(name, pair.vertex.clone(), pair.fragment.clone());
            pair = Arc::new(renamed);
        }
        Ok(pair)
    }

    /// Number of cached pairs.
    pub fn cached_len(&self) -> usize {
        self.lock().len()
    }

    fn file_name(&self, name: &str, ext: &str) -> String {
        if self.ignore_extensions || name.ends_with(ext) {
            name.to_string()
        } else {
            format!("{name}{ext}")
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), Arc<ShaderPair>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => RenderError::ShaderNotFound { path: path.to_path_buf() },
        _ => RenderError::ShaderRead { path: path.to_path_buf(), source },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::BLIT_TEXTURE;

    fn shipped() -> ShaderLoader {
        ShaderLoader::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders"))
    }

    #[test]
    fn shipped_directory_matches_builtin() {
        let pair = shipped().load_dir(BLIT_TEXTURE).unwrap();
        assert_eq!(*pair, ShaderPair::builtin_blit_texture());
    }

    #[test]
    fn repeated_loads_hit_the_cache() {
        let loader = shipped();
        let a = loader.load_dir(BLIT_TEXTURE).unwrap();
        let b = loader.load_dir(BLIT_TEXTURE).unwrap();
        assert_eq!(loader.cached_len(), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn missing_files_report_not_found() {
        let loader = shipped();
        let err = loader.load_pair("does_not_exist", None).unwrap_err();
        match err {
            RenderError::ShaderNotFound { path } => {
                assert!(path.ends_with("does_not_exist.vert.wgsl"), "{}", path.display());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(loader.cached_len(), 0);
    }

    #[test]
    fn explicit_extension_is_not_doubled() {
        let loader = shipped();
        let pair = loader
            .load_pair(
                "blit_texture/blit_texture.vert.wgsl",
                Some("blit_texture/blit_texture.frag.wgsl"),
            )
            .unwrap();
        assert!(pair.vertex.contains("fn vs_main"));
        assert!(pair.fragment.contains("fn fs_main"));
    }
}

use std::path::Path;

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context as _;

use crate::resources::LoadProgress;

#[cfg(not(target_arch = "wasm32"))]
const CHUNK_SIZE: usize = 64 * 1024;

/// Resolves `uri` against the directory of `base`, the way glTF external buffers are addressed.
pub fn resolve_relative(base: &str, uri: &str) -> String {
    if uri.starts_with('/') || uri.contains("://") {
        return uri.to_string();
    }
    match base.rfind('/') {
        Some(idx) => format!("{}/{}", &base[..idx], uri),
        None => uri.to_string(),
    }
}

/// Maps an origin-relative URL onto the asset root. URIs inside glTF files are
/// percent-encoded, file names on disk are not.
#[cfg(not(target_arch = "wasm32"))]
fn local_path(asset_root: &Path, file_name: &str) -> anyhow::Result<std::path::PathBuf> {
    let decoded = percent_encoding::percent_decode_str(file_name.trim_start_matches('/'))
        .decode_utf8()
        .with_context(|| format!("{file_name} is not valid UTF-8 once decoded"))?;
    Ok(asset_root.join(decoded.as_ref()))
}

#[cfg(target_arch = "wasm32")]
fn format_url(asset_root: &Path, file_name: &str) -> anyhow::Result<reqwest::Url> {
    if file_name.contains("://") {
        return Ok(reqwest::Url::parse(file_name)?);
    }
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window available"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page origin is not readable"))?;
    let root = asset_root.to_string_lossy();
    let root = root.trim_matches('/');
    let base = if root.is_empty() {
        format!("{}/", origin)
    } else {
        format!("{}/{}/", origin, root)
    };
    let base = reqwest::Url::parse(&base)?;
    Ok(base.join(file_name.trim_start_matches('/'))?)
}

/// Reads a whole asset, relative to `asset_root`, reporting progress along the way.
pub async fn load_binary(
    asset_root: &Path,
    file_name: &str,
    progress: &mut dyn FnMut(LoadProgress),
) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(asset_root, file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        let total = response.content_length().unwrap_or(0);
        let data = response.bytes().await?.to_vec();
        progress(LoadProgress::new(data.len() as u64, total.max(data.len() as u64)));
        data
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        use tokio::io::AsyncReadExt;

        let path = local_path(asset_root, file_name)?;
        let mut file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let total = file.metadata().await?.len();
        let mut data = Vec::with_capacity(total as usize);
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            progress(LoadProgress::new(data.len() as u64, total));
        }
        data
    };

    Ok(data)
}

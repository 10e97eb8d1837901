//! Batch asset loading.
//!
//! A batch maps names to paths. Every resource is requested concurrently and
//! the batch resolves only when all of them have loaded; the first failure
//! rejects the whole batch and no partial result is returned.

use std::collections::HashMap;
use std::error::Error;
use std::future::Future;

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::error::AssetError;

/// Load every `name -> path` entry of `paths` with `loader`.
///
/// # Errors
///
/// Returns [`AssetError::Load`] for the first resource that fails.
pub async fn load_batch<R, E, L, Fut>(
    paths: &HashMap<String, String>,
    mut loader: L,
) -> Result<HashMap<String, R>, AssetError>
where
    L: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    let loads = paths.iter().map(|(name, path)| {
        debug!(name, path, "loading asset");
        let load = loader(path);
        async move {
            match load.await {
                Ok(resource) => Ok((name.clone(), resource)),
                Err(source) => Err(AssetError::Load {
                    name: name.clone(),
                    path: path.clone(),
                    source: source.into(),
                }),
            }
        }
    });

    let loaded = try_join_all(loads).await?;
    info!(count = loaded.len(), "asset batch loaded");
    Ok(loaded.into_iter().collect())
}

/// Load a batch of files as raw bytes.
///
/// # Errors
///
/// Returns [`AssetError::Load`] if any file cannot be read.
pub async fn load_files(
    paths: &HashMap<String, String>,
) -> Result<HashMap<String, Vec<u8>>, AssetError> {
    load_batch(paths, |path| tokio::fs::read(path.to_owned())).await
}

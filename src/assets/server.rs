use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::Runtime;

use crate::assets::io::AssetReaderVariant;
use crate::assets::loaders::{GltfLoader, LoadedAsset};
use crate::errors::{AssetError, Result};
use crate::viewer::ClipLoader;

fn asset_runtime() -> Result<&'static Runtime> {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    if let Some(rt) = RUNTIME.get() {
        return Ok(rt);
    }
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("asset-loader")
        .enable_all()
        .build()?;
    Ok(RUNTIME.get_or_init(|| rt))
}

/// Runs `load` as its own task so a panic inside a decoder becomes an error
/// instead of a lost completion.
async fn contain_panics<F>(name: &str, load: F) -> Result<LoadedAsset>
where
    F: Future<Output = Result<LoadedAsset>> + Send + 'static,
{
    match tokio::spawn(load).await {
        Ok(result) => result,
        Err(err) => {
            log::error!("Loader for '{name}' aborted: {err}");
            Err(AssetError::InvalidData(format!("loader for '{name}' aborted: {err}")).into())
        }
    }
}

/// A finished load, successful or not.
#[derive(Debug)]
pub struct LoadEvent {
    /// The animation name the load was requested under.
    pub name: String,
    pub result: Result<LoadedAsset>,
}

/// Runs glTF loads in the background and hands results back to the frame
/// thread.
///
/// Loads cannot be cancelled and are never retried.
pub struct AssetServer {
    reader: AssetReaderVariant,
    tx: flume::Sender<LoadEvent>,
    rx: flume::Receiver<LoadEvent>,
    in_flight: usize,
}

impl AssetServer {
    /// `source` is a directory path or a base URL.
    pub fn new(source: &str) -> Result<Self> {
        Ok(Self::with_reader(AssetReaderVariant::from_source(source)?))
    }

    #[must_use]
    pub fn with_reader(reader: AssetReaderVariant) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            reader,
            tx,
            rx,
            in_flight: 0,
        }
    }

    #[must_use]
    pub fn reader(&self) -> &AssetReaderVariant {
        &self.reader
    }

    /// Starts loading `uri`; the result arrives as a [`LoadEvent`] named `name`.
    pub fn load(&mut self, name: &str, uri: &str) {
        let runtime = match asset_runtime() {
            Ok(rt) => rt,
            Err(err) => {
                self.send_now(name, Err(err));
                return;
            }
        };

        let reader = self.reader.clone();
        let tx = self.tx.clone();
        let name = name.to_string();
        let uri = uri.to_string();
        self.in_flight += 1;

        runtime.spawn(async move {
            let load_name = name.clone();
            let load = async move { GltfLoader::load(&reader, &uri, &load_name).await };
            let result = contain_panics(&name, load).await;
            // The receiver is gone once the server is dropped
            let _ = tx.send(LoadEvent { name, result });
        });
    }

    /// Blocks until `uri` is loaded. For tools and tests.
    pub fn load_blocking(&self, uri: &str, name: &str) -> Result<LoadedAsset> {
        let reader = self.reader.clone();
        let (uri, load_name) = (uri.to_string(), name.to_string());
        let load = async move { GltfLoader::load(&reader, &uri, &load_name).await };
        asset_runtime()?.block_on(contain_panics(name, load))
    }

    fn send_now(&self, name: &str, result: Result<LoadedAsset>) {
        let _ = self.tx.send(LoadEvent {
            name: name.to_string(),
            result,
        });
    }

    /// Returns every completion received so far without blocking.
    pub fn drain(&mut self) -> Vec<LoadEvent> {
        let events: Vec<LoadEvent> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(events.len());
        events
    }

    /// Waits up to `timeout` for the next completion.
    pub fn recv_timeout(&mut self, timeout: std::time::Duration) -> Option<LoadEvent> {
        let event = self.rx.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(event)
    }

    /// Loads started and not yet drained.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl ClipLoader for AssetServer {
    fn request(&mut self, name: &str, uri: &str) {
        self.load(name, uri);
    }

    fn drain(&mut self) -> Vec<LoadEvent> {
        AssetServer::drain(self)
    }
}

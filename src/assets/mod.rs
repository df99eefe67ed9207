//! Asset reading and glTF decoding.

pub mod io;
pub mod loaders;
pub mod server;

pub use io::{AssetReader, AssetReaderVariant, FileAssetReader};
#[cfg(feature = "http")]
pub use io::HttpAssetReader;
pub use loaders::{GltfLoader, LoadedAsset};
pub use server::{AssetServer, LoadEvent};

//! This library decodes **FBX** documents, in either their binary or their text encoding, into a
//! [`threed_scene::Scene`].
//!
//! # Pipeline
//!
//! Decoding runs in four stages, each owned by one module:
//!
//! | Stage          | Module                | Output                                       |
//! |----------------|-----------------------|----------------------------------------------|
//! | Scan           | [`read`]              | a flat list of [`token::Token`]s             |
//! | Parse          | [`scope`]             | a tree of [`scope::Scope`]s and elements     |
//! | Instantiate    | [`build`]             | one scene object per `Objects` element       |
//! | Link           | [`build`]             | the scene with every connection applied      |
//!
//! Both scanners produce the same token kinds, so the same parser serves either encoding. Array
//! payloads of binary documents are decoded by [`read::property`], inflating them with
//! [`compression`] when needed.
//!
//! ## Binary Documents
//!
//! | Offset (bytes) | Field          | Description                                             |
//! |----------------|----------------|---------------------------------------------------------|
//! | 0x0000         | Magic          | 18 bytes: `Kaydara FBX Binary`                          |
//! | 0x0012         | Reserved       | 5 bytes: `0x20 0x20 0x00 0x1a 0x00`                     |
//! | 0x0017         | Version        | 4 bytes: format version, e.g. `7400` for 7.4            |
//! | 0x001B         | Scopes         | nested records, see [`read::binary`]                    |
//!
//! - **Offsets**: scope headers use 32 bit offsets before version 7500 and 64 bit offsets after.
//! - **Sentinel**: a scope with children closes them with a run of 13 or 25 zero bytes.
//! - **Endianness**: little endian for all multi-byte values.
//!
//! ## Text Documents
//!
//! ```text
//! ; FBX 7.4.0 project file
//! FBXHeaderExtension:  {
//!     FBXVersion: 7400
//! }
//! Objects:  {
//!     Model: 2000, "Model::Cube", "Mesh" {
//!     }
//! }
//! ```
//!
//! Elements are a `key:` followed by comma separated values and an optional `{ ... }` block.
//! Comments run from `;` to the end of the line.
//!
//! ## Objects and Connections
//!
//! Objects never point at each other directly. Every object carries a document local id and the
//! `Connections` block lists `C: "OO", child, parent` edges between ids, where parent `0` is the
//! scene root. Edges naming unknown ids are skipped with a log message instead of failing the
//! load.
//!
//! ```no_run
//! # fn main() -> threed_fbx::error::Result<()> {
//! let data = std::fs::read("cube.fbx")?;
//! let scene = threed_fbx::load(&data, &threed_fbx::FbxLoadOptions::default())?;
//! println!("{} nodes", scene.node_count());
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod compression;
pub mod error;
pub mod options;
pub mod read;
pub mod scope;
pub mod token;
pub mod value;

#[cfg(test)]
mod testing;

use std::io::Read;

use threed_scene::Scene;
use tracing::{debug, instrument};

pub use build::{LinkStats, SceneBuilder};
pub use error::{Error, Result};
pub use options::FbxLoadOptions;
pub use read::Encoding;
pub use scope::{Element, Scope};
pub use value::PropertyValue;

/// A parsed document, not yet resolved into a scene
#[derive(Debug, Clone, PartialEq)]
pub struct FbxDocument {
    encoding: Encoding,
    version: Option<u32>,
    root: Scope,
}

impl FbxDocument {
    /// Detect the encoding of `buffer`, then scan and parse it
    #[instrument(skip_all, fields(length = buffer.len()))]
    pub fn parse(buffer: &[u8]) -> Result<Self> {
        let encoding = Encoding::detect(buffer).ok_or(Error::UnknownFormat)?;
        let root = scope::parse(encoding.scan(buffer)?)?;

        let version = match encoding {
            Encoding::Binary => Some(read::binary::read_header(buffer)?.version),
            Encoding::Text => root
                .first("FBXHeaderExtension")
                .and_then(|header| header.value("FBXVersion"))
                .and_then(PropertyValue::as_i64)
                .and_then(|v| u32::try_from(v).ok()),
        };

        debug!(?encoding, ?version, elements = root.len(), "parsed document");
        Ok(Self {
            encoding,
            version,
            root,
        })
    }

    /// Read all of `reader` and parse it
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Self::parse(&buffer)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Format version, `None` for text documents without a header
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// The top level scope
    pub fn root(&self) -> &Scope {
        &self.root
    }

    /// Resolve the document into a scene
    pub fn to_scene(&self, options: &FbxLoadOptions) -> Scene {
        build::build(&self.root, options)
    }

    /// Resolve the document into a scene, also reporting how its connections were applied
    pub fn to_scene_with_stats(&self, options: &FbxLoadOptions) -> (Scene, LinkStats) {
        SceneBuilder::new(options).build(&self.root)
    }
}

/// Decode `buffer` into a scene
pub fn load(buffer: &[u8], options: &FbxLoadOptions) -> Result<Scene> {
    Ok(FbxDocument::parse(buffer)?.to_scene(options))
}

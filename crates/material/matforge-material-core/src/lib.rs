//! matforge-material-core: material graphs over schema-described nodes.
//!
//! - [`material::Material`] owns nodes, connections, annotations and the
//!   animation bindings of one graph. Nodes are addressed by [`NodeId`].
//! - [`library::Library`] is an ordered collection of materials.
//! - [`persistence`] encodes a library into the chunked binary format and back.
//! - [`recent::RecentLibraries`] tracks recently opened library files.

pub mod config;
pub mod context;
pub mod error;
pub mod ids;
pub mod library;
pub mod material;
pub mod node;
pub mod ordered;
pub mod persistence;
pub mod recent;

pub use config::GraphConfig;
pub use context::SchemaContext;
pub use error::{GraphError, PersistenceError};
pub use ids::{Identified, MaterialId, NodeId};
pub use library::Library;
pub use material::{IndexedBinding, Material};
pub use node::{Connection, IndexedConnection, InputSampler, MaterialNode, MultiplexInput, Rug};
pub use ordered::{AsyncId, Ordered};
pub use persistence::{decode_library, encode_library};
pub use recent::{RecentError, RecentLibraries, RecentLibrary, LIBRARY_EXTENSION};

//! Conversion engine for block documents
//!
//!     This crate converts a block tree (the editor's canonical document model) to and from HTML
//!     and Markdown, maps it to and from the rich-document tree the editing surface works on, and
//!     turns live selections into clipboard payloads.
//!
//!     TLDR: For format authors:
//!         - Blocks are the hub. Every format converts to and from `Vec<Block>`, never to another format.
//!         - HTML does the real work: Markdown export goes through external HTML, Markdown import goes
//!           through comrak's HTML. A block type only has to know HTML.
//!         - New block types are schema entries: register a `BlockSpec` with its props, content kind
//!           and HTML template. No format code changes.
//!
//! Architecture
//!
//!     The block tree lives in ./model. The schema (./schema) decides which types, props and styles
//!     exist and holds the per-type HTML templates. The HTML layer (./formats/html) renders and
//!     parses through those templates; the Markdown layer (./formats/markdown) sits on top of it.
//!
//!     The editing surface nests every block as container / content / group. That convention is
//!     confined to ./doc (tree, positions, mapper); ./clipboard uses it to cut a selection out of
//!     the live tree and hand blocks, inline content or table content to the exporters.
//!
//!     This is a pure lib, that is, it powers blockdoc-cli but is shell agnostic: no code here
//!     prints, reads env vars or touches files. Conversions are synchronous and keep no state
//!     between calls; the only shared resource is the initialize-once Markdown runtime (./deps.rs)
//!     that exporters receive at construction.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── deps.rs                 # Initialize-once Markdown runtime
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── model                   # Blocks, inline content, ids
//!     ├── schema                  # Block types, props, styles, HTML templates
//!     ├── doc                     # Rich-document tree and mapper
//!     ├── clipboard               # Selection export pipeline
//!     ├── formats
//!     │   ├── <format>
//!     │   │   ├── parser.rs       # Parser implementation
//!     │   │   ├── serializer.rs   # Serializer implementation
//!     │   │   └── mod.rs
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     └── <format>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Lossiness
//!
//!     Internal HTML round-trips exactly, ids included. External HTML keeps types, props and styles
//!     but not ids. Markdown keeps structure and the styles it can spell; colors, underline and most
//!     props are dropped.

pub mod clipboard;
pub mod deps;
pub mod doc;
pub mod error;
pub mod format;
pub mod formats;
pub mod model;
pub mod registry;
pub mod schema;

pub use clipboard::{ClipboardExporter, ClipboardPayload, ExportGranularity, Selection};
pub use deps::FormattingDeps;
pub use error::ConversionError;
pub use format::Format;
pub use formats::FormatSettings;
pub use model::{Block, BlockContent, InlineContent, Styles};
pub use registry::FormatRegistry;
pub use schema::Schema;

#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::multiple_crate_versions)]

//! Path translation and filesystem inspection primitives for disk hygiene.
//! Layout: `translator.rs` (client-view to real path rewriting), `probe.rs`
//! (inode mapping, outer-link detection, orphan relocation, pruning,
//! empty-directory removal), `error.rs` (error types).

pub mod error;
pub mod probe;
pub mod translator;

pub use error::{FsOpsError, FsOpsResult};
pub use probe::{
    build_inode_map, classify, has_outer_links, move_to_orphan, prune_older_than,
    remove_empty_dirs, PathKind,
};
pub use translator::PathTranslator;

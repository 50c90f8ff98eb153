//! # lattice-vector
//!
//! Nearest-neighbour search over fixed-dimension embeddings.
//!
//! [`FlatVectorIndex`] keeps every vector in memory and scores exhaustively
//! by cosine distance, in parallel once the index is large. Two persistence
//! formats sit on top of it, selected by `vector.backend`:
//!
//! - `flat`: a compact binary snapshot ([`snapshot`]).
//! - `sqlite`: a SQLite database file ([`SqliteVectorIndex`]).
//!
//! Both write to a temporary sibling and rename into place, so a crash
//! mid-write leaves the previous file intact.

pub mod atomic_write;
pub mod factory;
pub mod flat;
pub mod similarity;
pub mod snapshot;
pub mod sqlite;

pub use factory::{create_index, open_index};
pub use flat::FlatVectorIndex;
pub use sqlite::SqliteVectorIndex;

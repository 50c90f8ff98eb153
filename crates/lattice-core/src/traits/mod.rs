mod cache_backend;
mod embedding;
mod entity_extractor;
mod graph_store;
mod vector_index;

pub use cache_backend::ICacheBackend;
pub use embedding::IEmbeddingProvider;
pub use entity_extractor::IEntityExtractor;
pub use graph_store::IGraphStore;
pub use vector_index::IVectorIndex;

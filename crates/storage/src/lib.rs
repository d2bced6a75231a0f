#![forbid(unsafe_code)]

pub mod cache;
pub mod demo;
pub mod http;
pub mod memory;
pub mod repository;

pub use cache::{
    CacheEvent, CacheKey, KeyPrefix, Mutation, PageSequence, RemoteDataCache, ResourceKind,
};
pub use http::{HttpApi, HttpApiConfig};
pub use memory::InMemoryApi;
pub use repository::{ApiError, Backend, QuizApi, QuizQuery};

pub mod config;
pub mod corpus;
pub mod index_storage;
pub mod lsa;
pub mod search;
pub mod search_client;
pub mod stopwords;
pub mod svd;
pub mod tfidf;

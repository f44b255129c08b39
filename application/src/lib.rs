pub mod search_service;

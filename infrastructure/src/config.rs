use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::lsa::LsaParams;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub corpus_dir: PathBuf,
    pub db_path: String,
    pub bind_addr: String,
    pub search_endpoint: String,
    /// `None` keeps every term; set `MAX_FEATURES=0` for that.
    pub max_features: Option<usize>,
    pub n_components: usize,
    pub top_k: usize,
    pub svd_seed: u64,
}

impl Config {
    /// Read `.env` (if any) and the process environment.
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_features = parse_or(&lookup, "MAX_FEATURES", 10_000usize)?;
        let n_components = parse_or(&lookup, "N_COMPONENTS", 100)?;
        if n_components == 0 {
            bail!("invalid value for N_COMPONENTS: must be at least 1");
        }
        Ok(Self {
            corpus_dir: string_or(&lookup, "CORPUS_DIR", "data/20news").into(),
            db_path: string_or(&lookup, "INDEX_DB_PATH", "lsa_index.db"),
            bind_addr: string_or(&lookup, "BIND_ADDR", "127.0.0.1:5000"),
            search_endpoint: string_or(&lookup, "SEARCH_ENDPOINT", "http://127.0.0.1:5000"),
            max_features: (max_features > 0).then_some(max_features),
            n_components,
            top_k: parse_or(&lookup, "TOP_K", 5)?,
            svd_seed: parse_or(&lookup, "SVD_SEED", 42)?,
        })
    }

    pub fn lsa_params(&self) -> LsaParams {
        LsaParams {
            max_features: self.max_features,
            n_components: self.n_components,
            seed: self.svd_seed,
        }
    }
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_reference_setup() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.max_features, Some(10_000));
        assert_eq!(config.n_components, 100);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.bind_addr, "127.0.0.1:5000");
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("CORPUS_DIR", "/srv/news"),
            ("TOP_K", "10"),
            ("MAX_FEATURES", "0"),
        ]))
        .unwrap();
        assert_eq!(config.corpus_dir, PathBuf::from("/srv/news"));
        assert_eq!(config.top_k, 10);
        assert_eq!(config.max_features, None);
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = Config::from_lookup(lookup_from(&[("N_COMPONENTS", "many")])).unwrap_err();
        assert!(err.to_string().contains("N_COMPONENTS"), "{err}");
    }

    #[test]
    fn zero_components_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("N_COMPONENTS", "0")])).unwrap_err();
        assert!(err.to_string().contains("N_COMPONENTS"), "{err}");
    }
}

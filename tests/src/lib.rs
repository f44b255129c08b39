//! Fixtures shared by the integration tests.

use infrastructure::config::Config;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Two topics, three posts each, laid out like a newsgroup dump.
pub const POSTS: &[(&str, &str)] = &[
    (
        "sci.space/1",
        "The shuttle launch put the satellite into orbit around the earth.",
    ),
    (
        "sci.space/2",
        "NASA plans another orbit mission; the rocket launch is next week.",
    ),
    (
        "sci.space/3",
        "Astronauts on the space station watched the rocket and the satellite.",
    ),
    (
        "rec.sport.hockey/1",
        "The goalie blocked the puck and the hockey team won the game.",
    ),
    (
        "rec.sport.hockey/2",
        "Hockey playoffs: the team scored in overtime to win the game.",
    ),
    (
        "rec.sport.hockey/3",
        "Our team lost the hockey game after the goalie was injured.",
    ),
];

/// A temporary corpus directory plus an index path beside it.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        for (path, text) in POSTS {
            let file = dir.path().join("corpus").join(path);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(file, text)?;
        }
        Ok(Self { dir })
    }

    pub fn corpus_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("corpus")
    }

    pub fn db_path(&self) -> std::path::PathBuf {
        self.dir.path().join("index").join("lsa.db")
    }

    /// Config pointing at this fixture, small enough for the toy corpus.
    pub fn config(&self, top_k: usize) -> anyhow::Result<Config> {
        let corpus = self.corpus_dir();
        let db = self.db_path();
        Config::from_lookup(|key: &str| match key {
            "CORPUS_DIR" => Some(path_str(&corpus)),
            "INDEX_DB_PATH" => Some(path_str(&db)),
            "N_COMPONENTS" => Some("2".to_string()),
            "TOP_K" => Some(top_k.to_string()),
            _ => None,
        })
    }
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

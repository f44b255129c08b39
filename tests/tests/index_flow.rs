use application::search_service::{IndexSource, SearchService};
use infrastructure::index_storage::IndexStorage;
use tests::{Fixture, POSTS};

#[test]
fn config_to_ranked_results() {
    let fixture = Fixture::new().unwrap();
    let config = fixture.config(3).unwrap();

    let mut service = SearchService::new(&config).unwrap();
    assert_eq!(service.corpus().len(), POSTS.len());
    assert_eq!(service.build_index(false).unwrap(), IndexSource::Fitted);

    // paths sort hockey before space
    let response = service.search("hockey goalie").unwrap();
    assert_eq!(response.len(), 3);
    let mut indices = response.indices().to_vec();
    indices.sort();
    assert_eq!(indices, vec![0, 1, 2]);
    for hit in response.hits() {
        assert!(hit.document.contains("hockey") || hit.document.contains("goalie"));
    }
    let similarities = response.similarities();
    assert!(similarities.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn stored_index_is_reused_until_the_corpus_changes() {
    let fixture = Fixture::new().unwrap();
    let config = fixture.config(5).unwrap();

    SearchService::new(&config)
        .unwrap()
        .build_index(false)
        .unwrap();
    let mut again = SearchService::new(&config).unwrap();
    assert_eq!(again.build_index(false).unwrap(), IndexSource::Stored);

    std::fs::write(
        fixture.corpus_dir().join("sci.space").join("4"),
        "The probe left orbit and the rocket stage fell back to earth.",
    )
    .unwrap();
    let mut changed = SearchService::new(&config).unwrap();
    assert_eq!(changed.corpus().len(), POSTS.len() + 1);
    assert_eq!(changed.build_index(false).unwrap(), IndexSource::Fitted);

    let storage = IndexStorage::new(fixture.db_path()).unwrap();
    assert_eq!(storage.fingerprints().unwrap().len(), 1);
}

#[test]
fn empty_query_ranks_by_index() {
    let fixture = Fixture::new().unwrap();
    let mut service = SearchService::new(&fixture.config(2).unwrap()).unwrap();
    service.build_index(false).unwrap();

    let response = service.search("").unwrap();
    assert_eq!(response.indices(), &[0, 1]);
    assert_eq!(response.similarities(), &[0.0, 0.0]);
}

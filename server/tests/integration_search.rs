use core::persist::Paths;
use core::types::Posting;
use server::SearchContext;
use tempfile::tempdir;

fn write(path: &std::path::Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

/// Builds a tiny two-document corpus end-to-end (doc_info, stopwords, pagerank scores,
/// a single-term index.bin + offset.txt) and checks the evaluator ranks correctly.
#[test]
fn search_returns_ranked_results_blended_with_pagerank() {
    let dir = tempdir().unwrap();
    let paths = Paths {
        doc_info: dir.path().join("doc_info.jsonl"),
        stopwords: dir.path().join("stopwords.txt"),
        pagerank_scores: dir.path().join("pagerank_scores.csv"),
        offset_txt: dir.path().join("offset.txt"),
        index_bin: dir.path().join("index.bin"),
        ..Default::default()
    };

    write(
        &paths.doc_info,
        "{\"id\":0,\"title\":\"Rust Systems Programming\",\"len\":40}\n\
         {\"id\":1,\"title\":\"Learning Rust\",\"len\":10}\n",
    );
    write(&paths.stopwords, "is a the\n");
    // doc 1 has a much stronger PageRank prior despite a thinner match.
    write(&paths.pagerank_scores, "0,1e-6\n1,1e-3\n");

    let mut index_out = std::fs::File::create(&paths.index_bin).unwrap();
    core::persist::write_total_docs(&mut index_out, 2).unwrap();
    let postings = vec![
        Posting { doc_id: 0, tf_score: 0.05 },
        Posting { doc_id: 1, tf_score: 0.1 },
    ];
    core::persist::write_posting_list(&mut index_out, &postings).unwrap();
    write(&paths.offset_txt, "rust 4\n");

    let mut ctx = SearchContext::load(&paths).unwrap();
    let hits = ctx.search("rust", 10).unwrap();

    assert_eq!(hits.len(), 2);
    assert!(hits.iter().any(|h| h.doc_id == 0));
    assert!(hits.iter().any(|h| h.doc_id == 1));
    assert!(hits[0].score >= hits[1].score);
}

#[test]
fn stopwords_are_neutral_to_the_result_set() {
    let dir = tempdir().unwrap();
    let paths = Paths {
        doc_info: dir.path().join("doc_info.jsonl"),
        stopwords: dir.path().join("stopwords.txt"),
        pagerank_scores: dir.path().join("pagerank_scores.csv"),
        offset_txt: dir.path().join("offset.txt"),
        index_bin: dir.path().join("index.bin"),
        ..Default::default()
    };

    write(&paths.doc_info, "{\"id\":0,\"title\":\"Example\",\"len\":20}\n");
    write(&paths.stopwords, "the a of\n");
    write(&paths.pagerank_scores, "0,1e-5\n");

    let mut index_out = std::fs::File::create(&paths.index_bin).unwrap();
    core::persist::write_total_docs(&mut index_out, 1).unwrap();
    let postings = vec![Posting { doc_id: 0, tf_score: 0.1 }];
    core::persist::write_posting_list(&mut index_out, &postings).unwrap();
    write(&paths.offset_txt, "exampl 4\n");

    let mut ctx = SearchContext::load(&paths).unwrap();
    let with_stopwords = ctx.search("the example of", 10).unwrap();
    let without_stopwords = ctx.search("example", 10).unwrap();

    assert_eq!(with_stopwords, without_stopwords);
}

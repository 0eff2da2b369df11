// Unit tests for the word, topic and phrase clusterers.
//
// Exercises the ranking and size invariants of each clusterer plus the
// sentiment/average-rating bookkeeping shared through ClusterView.

use chrono::{TimeZone, Utc};
use reviewscope::analysis::cluster::ClusterView;
use reviewscope::analysis::phrases::{
    extract_phrase_clusters, MAX_PHRASE_CLUSTERS, MIN_PHRASE_OCCURRENCES,
};
use reviewscope::analysis::topics::extract_topic_clusters;
use reviewscope::analysis::words::{extract_word_clusters, tokenize, MAX_WORD_CLUSTERS};
use reviewscope::reviews::Review;

fn review(id: usize, rating: u8, text: &str) -> Review {
    Review {
        id: id.to_string(),
        author: format!("user{id}"),
        rating,
        text: text.to_string(),
        date: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap(),
        version: Some("2.0".to_string()),
    }
}

fn assert_cluster_invariants<C: ClusterView>(clusters: &[C]) {
    for pair in clusters.windows(2) {
        assert!(
            pair[0].count() >= pair[1].count(),
            "{} ({}) ranked before {} ({})",
            pair[0].label(),
            pair[0].count(),
            pair[1].label(),
            pair[1].count()
        );
    }
    for c in clusters {
        assert_eq!(c.sentiment().total(), c.count(), "sentiment sum for {}", c.label());
        assert!(
            (1.0..=5.0).contains(&c.avg_rating()),
            "avg rating {} for {}",
            c.avg_rating(),
            c.label()
        );
    }
}

// ============================================================
// Words
// ============================================================

#[test]
fn word_clusters_capped_and_ranked() {
    // 80 distinct long tokens, each repeated a different number of times
    let mut reviews = Vec::new();
    let mut id = 0;
    for w in 0..80 {
        for _ in 0..(1 + w % 4) {
            id += 1;
            reviews.push(review(id, 3, &format!("palavra{w:03}")));
        }
    }

    let clusters = extract_word_clusters(&reviews);
    assert_eq!(clusters.len(), MAX_WORD_CLUSTERS);
    assert_cluster_invariants(&clusters);
}

#[test]
fn word_clusters_skip_stopwords_and_short_tokens() {
    let reviews = vec![
        review(1, 5, "A bateria dura para o dia todo"),
        review(2, 4, "The app is fine, bateria ok"),
    ];
    let clusters = extract_word_clusters(&reviews);
    let words: Vec<&str> = clusters.iter().map(|c| c.word.as_str()).collect();
    assert!(words.contains(&"bateria"));
    assert!(!words.contains(&"app"));
    assert!(!words.contains(&"para"));
    assert!(!words.contains(&"the"));
    let bateria = clusters.iter().find(|c| c.word == "bateria").unwrap();
    assert_eq!(bateria.count, 2);
    assert!((bateria.avg_rating - 4.5).abs() < 1e-9);
}

#[test]
fn english_review_vocabulary_is_counted() {
    let reviews = vec![
        review(1, 5, "Great app, the best one I have used"),
        review(2, 4, "Good and great, one small problem"),
        review(3, 2, "Problem after problem, not good"),
    ];
    let clusters = extract_word_clusters(&reviews);
    let count = |w: &str| clusters.iter().find(|c| c.word == w).map(|c| c.count);
    assert_eq!(count("great"), Some(2));
    assert_eq!(count("good"), Some(2));
    assert_eq!(count("best"), Some(1));
    assert_eq!(count("problem"), Some(3));
}

#[test]
fn tokenize_keeps_accents_and_drops_punctuation() {
    let tokens = tokenize("Atualização horrível!!! Não funciona, péssimo.");
    assert!(tokens.contains(&"atualização".to_string()));
    assert!(tokens.contains(&"horrível".to_string()));
    assert!(tokens.contains(&"péssimo".to_string()));
    assert!(tokens.iter().all(|t| t.chars().count() > 3));
}

// ============================================================
// Topics
// ============================================================

#[test]
fn review_can_belong_to_several_topics() {
    let reviews = vec![review(1, 1, "App muito lento e travando o tempo todo")];
    let clusters = extract_topic_clusters(&reviews);
    let names: Vec<&str> = clusters.iter().map(|c| c.topic.as_str()).collect();
    assert!(names.contains(&"Performance"), "got {names:?}");
    assert!(names.contains(&"Bugs"), "got {names:?}");
}

#[test]
fn topics_without_matches_are_omitted() {
    let reviews = vec![
        review(1, 2, "Muito caro, a assinatura subiu"),
        review(2, 1, "Assinatura cara demais"),
    ];
    let clusters = extract_topic_clusters(&reviews);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].topic, "Preço");
    assert_eq!(clusters[0].count, 2);
    assert!(!clusters[0].keywords.is_empty());
    assert_cluster_invariants(&clusters);
}

#[test]
fn topic_matching_is_case_insensitive() {
    let reviews = vec![review(1, 5, "INTERFACE linda, DESIGN moderno")];
    let clusters = extract_topic_clusters(&reviews);
    assert!(clusters.iter().any(|c| c.topic == "Interface"));
}

// ============================================================
// Phrases
// ============================================================

#[test]
fn phrases_need_two_occurrences() {
    let reviews = vec![
        review(1, 1, "O aplicativo fecha sozinho. Uma frase única aqui"),
        review(2, 2, "o aplicativo fecha sozinho! Outra coisa diferente"),
        review(3, 5, "Adorei tudo neste app"),
    ];
    let clusters = extract_phrase_clusters(&reviews);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].phrase, "O aplicativo fecha sozinho");
    assert_eq!(clusters[0].count, 2);
    assert!((clusters[0].avg_rating - 1.5).abs() < 1e-9);
    assert!(clusters.iter().all(|c| c.count >= MIN_PHRASE_OCCURRENCES));
}

#[test]
fn phrases_capped_and_ranked() {
    let mut reviews = Vec::new();
    let mut id = 0;
    for p in 0..45 {
        for _ in 0..(2 + p % 3) {
            id += 1;
            reviews.push(review(id, 4, &format!("Esta é a frase repetida {p}.")));
        }
    }
    let clusters = extract_phrase_clusters(&reviews);
    assert_eq!(clusters.len(), MAX_PHRASE_CLUSTERS);
    assert!(clusters.iter().all(|c| c.count >= MIN_PHRASE_OCCURRENCES));
    assert_cluster_invariants(&clusters);
}

#[test]
fn short_and_long_sentences_are_ignored() {
    let long = "a".repeat(120);
    let reviews = vec![
        review(1, 3, &format!("Curto. {long}")),
        review(2, 3, &format!("Curto. {long}")),
    ];
    assert!(extract_phrase_clusters(&reviews).is_empty());
}

#[test]
fn empty_input_gives_empty_clusters() {
    assert!(extract_word_clusters(&[]).is_empty());
    assert!(extract_topic_clusters(&[]).is_empty());
    assert!(extract_phrase_clusters(&[]).is_empty());
}

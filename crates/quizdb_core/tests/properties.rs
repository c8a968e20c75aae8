//! Property tests for the codec, the identifier registry and the store.

use proptest::prelude::*;
use quizdb_core::codec::{decode_document, encode_document};
use quizdb_core::store::search;
use quizdb_core::{AnswerOption, DecodeMode, Document, DocumentStore, IdRegistry, Question};
use std::collections::HashSet;

// Letters a-h never spell the "null" sentinel.
fn word() -> impl Strategy<Value = String> {
    "[a-h]{1,8}"
}

fn question() -> impl Strategy<Value = Question> {
    (
        word(),
        proptest::option::of(word()),
        prop::collection::btree_set(word(), 1..5),
        any::<u8>(),
    )
        .prop_map(|(text, explanation, option_texts, correct_mask)| {
            let options = option_texts.into_iter().enumerate().map(|(i, text)| {
                let correct = i == 0 || correct_mask & (1 << i) != 0;
                AnswerOption::new(text, correct)
            });
            Question::new(text, options).with_explanation(explanation)
        })
}

fn document() -> impl Strategy<Value = Document> {
    (
        word(),
        word(),
        0i64..4_000_000_000_000,
        proptest::option::of(word()),
        prop::collection::btree_map(word(), word(), 0..4),
        prop::collection::vec(question(), 1..6),
    )
        .prop_map(|(name, id, created, theme, tags, questions)| {
            let mut document = Document::new("owner", name, id, created)
                .with_theme(theme)
                .with_questions(questions);
            for (tag, glyph) in tags {
                document.add_tag(tag, glyph);
            }
            document
        })
}

proptest! {
    #[test]
    fn decode_inverts_encode(doc in document(), pretty in any::<bool>()) {
        let text = encode_document(&doc, pretty).unwrap();
        let decoded = decode_document(&text, DecodeMode::Strict)
            .unwrap()
            .into_document(&IdRegistry::default(), 0)
            .unwrap();
        prop_assert_eq!(decoded, doc);
    }

    #[test]
    fn options_are_correct_first(q in question()) {
        let first_incorrect = q
            .options()
            .iter()
            .position(|o| !o.is_correct())
            .unwrap_or(q.options().len());
        prop_assert!(q.options()[first_incorrect..].iter().all(|o| !o.is_correct()));
    }

    #[test]
    fn store_stays_sorted(ids in prop::collection::vec("[a-z]{1,4}", 0..40)) {
        let mut store = DocumentStore::new();
        for id in &ids {
            let q = Question::new("Q", vec![AnswerOption::new("a", true)]);
            store.add(Document::new("u1", format!("name-{id}"), id.clone(), 0).with_questions([q]));
        }
        let stored: Vec<&str> = store.iter().map(Document::id).collect();
        let mut expected: Vec<&str> = ids.iter().map(String::as_str).collect();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(stored, expected);
        for id in &ids {
            prop_assert!(search::decode(store.search_id(id)).is_ok());
        }
    }
}

#[test]
fn ten_thousand_unique_ids() {
    let ids = IdRegistry::default();
    let mut seen = HashSet::new();
    for i in 0..10_000i64 {
        let id = ids.generate(&format!("seed-{}", i % 37), i / 3).unwrap();
        assert_eq!(id.len(), 7);
        assert!(id.starts_with(|c: char| c.is_ascii_lowercase()));
        assert!(seen.insert(id));
    }
    assert_eq!(ids.len(), 10_000);
}

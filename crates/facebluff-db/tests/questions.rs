mod common;

use std::collections::HashSet;

use facebluff_db::models::NewQuestion;
use facebluff_db::questions::RANDOM_SAMPLE_SIZE;

use common::TestDb;

fn question(text: &str) -> NewQuestion {
    NewQuestion {
        is_default: true,
        text: text.to_string(),
        op1: Some("yes".to_string()),
        op2: Some("no".to_string()),
        op3: Some("maybe".to_string()),
        other: None,
    }
}

#[tokio::test]
async fn inserted_question_keeps_its_options() {
    let t = TestDb::new();
    let questions = t.questions();

    let id = questions.insert_question(&question("Coffee or tea?")).await.unwrap();
    let row = questions.get_question(id).await.unwrap().unwrap();

    assert_eq!(row.id, id);
    assert!(row.is_default);
    assert_eq!(row.text, "Coffee or tea?");
    assert_eq!(row.op1.as_deref(), Some("yes"));
    assert_eq!(row.op3.as_deref(), Some("maybe"));
    assert_eq!(row.other, None);

    assert!(questions.get_question(id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn quick_question_uses_the_same_table() {
    let t = TestDb::new();
    let questions = t.questions();

    let id = questions.create_new_question("Favourite colour?").await.unwrap();
    let row = questions.get_question(id).await.unwrap().unwrap();
    assert!(!row.is_default);
    assert_eq!(row.text, "Favourite colour?");
    assert_eq!((row.op1, row.op2, row.op3), (None, None, None));

    let sample = questions.random_questions().await.unwrap();
    assert_eq!(sample.len(), 1);
    assert_eq!(sample[0].question, "Favourite colour?");
}

#[tokio::test]
async fn random_sample_is_bounded_by_table_size() {
    let t = TestDb::new();
    let questions = t.questions();

    assert!(questions.random_questions().await.unwrap().is_empty());

    for i in 0..3 {
        questions.insert_question(&question(&format!("q{}", i))).await.unwrap();
    }
    assert_eq!(questions.random_questions().await.unwrap().len(), 3);

    for i in 3..10 {
        questions.insert_question(&question(&format!("q{}", i))).await.unwrap();
    }
    for _ in 0..5 {
        let sample = questions.random_questions().await.unwrap();
        assert_eq!(sample.len(), RANDOM_SAMPLE_SIZE as usize);

        let distinct: HashSet<_> = sample.iter().map(|p| p.question.as_str()).collect();
        assert_eq!(distinct.len(), sample.len());
    }
}

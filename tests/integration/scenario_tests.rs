//! Ingress, worker and queue working together over in-memory streams

use std::time::Duration;

use booklend::{
    models::CopyStatus,
    server::{worker, Ingress},
};

use crate::{book, state};

#[tokio::test]
async fn test_second_loan_finds_no_copy() {
    let (state, sink) = state(vec![book("Intro to OS", 100, &[CopyStatus::Available])]);
    let input: &[u8] = b"P,Intro to OS,100,1\0P,Intro to OS,100,1\0Q,quit,0,1\0";

    let stats = Ingress::new(state.clone(), false).run(input).await.unwrap();
    assert_eq!(stats.loans, 1);

    let replies = sink.replies();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].0, 1);
    assert!(replies[0].1.starts_with("Loan granted: ISBN 100, copy 1, due "));
    assert_eq!(replies[1], (1, "Error: no copy available for ISBN 100".to_string()));

    let catalog = state.library.snapshot().await;
    assert_eq!(catalog.books()[0].copies[0].status, CopyStatus::Loaned);
    assert!(state.library.is_shutting_down().await);
}

#[tokio::test]
async fn test_malformed_requests_get_no_reply() {
    let (state, sink) = state(vec![book("Intro to OS", 100, &[CopyStatus::Available])]);
    let input: &[u8] =
        b"garbage\0P,Intro to OS,100\0X,Intro to OS,100,3\0P,Intro to OS,100,3\0Q,quit,0,3\0";

    let stats = Ingress::new(state.clone(), true).run(input).await.unwrap();
    assert_eq!(stats.dropped, 3);
    assert_eq!(stats.loans, 1);

    let replies = sink.replies();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].0, 3);
    assert!(replies[0].1.starts_with("Loan granted"));
}

#[tokio::test]
async fn test_unknown_book_is_reported() {
    let (state, sink) = state(vec![book("Intro to OS", 100, &[CopyStatus::Available])]);
    let input: &[u8] = b"P,Intro to Networks,100,8\0Q,quit,0,8\0";

    Ingress::new(state, false).run(input).await.unwrap();
    assert_eq!(
        sink.replies(),
        vec![(8, "Error: ISBN 100 not found or wrong name".to_string())]
    );
}

#[tokio::test]
async fn test_queued_returns_survive_quit() {
    let (state, sink) = state(vec![
        book("Intro to OS", 100, &[CopyStatus::Loaned]),
        book("Compilers", 200, &[CopyStatus::Loaned]),
    ]);
    let input: &[u8] = b"D,Intro to OS,100,5\0D,Compilers,200,6\0Q,quit,0,5\0";

    let stats = Ingress::new(state.clone(), false).run(input).await.unwrap();
    assert_eq!(stats.queued, 2);
    assert!(sink.replies().is_empty());

    let settled = tokio::time::timeout(Duration::from_secs(1), worker::run(state.clone()))
        .await
        .expect("worker should drain and exit");
    assert_eq!(settled, 2);

    // Newest first
    let replies = sink.replies();
    assert_eq!(replies[0], (6, "Return accepted: ISBN 200, copy 1".to_string()));
    assert_eq!(replies[1], (5, "Return accepted: ISBN 100, copy 1".to_string()));

    let catalog = state.library.snapshot().await;
    assert!(catalog
        .books()
        .iter()
        .all(|b| b.copies[0].status == CopyStatus::Available));
}

#[tokio::test]
async fn test_end_of_input_shuts_down() {
    let (state, _sink) = state(vec![book("Intro to OS", 100, &[CopyStatus::Loaned])]);
    let input: &[u8] = b"R,Intro to OS,100,2\0";

    Ingress::new(state.clone(), false).run(input).await.unwrap();
    assert!(state.library.is_shutting_down().await);
    assert_eq!(worker::run(state).await, 1);
}

#[tokio::test]
async fn test_more_requests_than_queue_slots() {
    let (state, sink) = state(vec![book("Intro to OS", 100, &[CopyStatus::Loaned; 10])]);

    let mut input = Vec::new();
    for requester in 0..12 {
        input.extend_from_slice(format!("D,Intro to OS,100,{}\0", requester).as_bytes());
    }
    input.extend_from_slice(b"Q,quit,0,0\0");

    let worker = tokio::spawn(worker::run(state.clone()));
    let stats = Ingress::new(state.clone(), false)
        .run(input.as_slice())
        .await
        .unwrap();
    assert_eq!(stats.queued, 12);

    let settled = tokio::time::timeout(Duration::from_secs(2), worker)
        .await
        .expect("worker should finish")
        .unwrap();
    assert_eq!(settled, 12);

    let replies = sink.replies();
    assert_eq!(replies.len(), 12);
    let accepted = replies.iter().filter(|(_, t)| t.starts_with("Return accepted")).count();
    let refused = replies
        .iter()
        .filter(|(_, t)| t == "Error: no loaned copy for ISBN 100")
        .count();
    assert_eq!((accepted, refused), (10, 2));

    let catalog = state.library.snapshot().await;
    assert!(catalog.books()[0].copies.iter().all(|c| c.is_available()));
}

#[tokio::test]
async fn test_renew_changes_only_the_date() {
    let (state, sink) = state(vec![book(
        "Intro to OS",
        100,
        &[CopyStatus::Available, CopyStatus::Loaned],
    )]);
    let input: &[u8] = b"R,Intro to OS,100,4\0Q,quit,0,4\0";

    Ingress::new(state.clone(), false).run(input).await.unwrap();
    worker::run(state.clone()).await;

    assert_eq!(
        sink.replies(),
        vec![(4, "Renewal accepted: ISBN 100, copy 2, due 17-06-2025".to_string())]
    );
    let catalog = state.library.snapshot().await;
    let copies = &catalog.books()[0].copies;
    assert_eq!(copies[0].status, CopyStatus::Available);
    assert_eq!(copies[1].status, CopyStatus::Loaned);
}

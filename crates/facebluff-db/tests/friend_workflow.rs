mod common;

use facebluff_db::UserRepository;
use facebluff_db::models::{FriendEdgeRow, FriendStatus};

use common::{TestDb, new_user, profile};

async fn seed(users: &UserRepository) {
    users.create_user(&new_user("a@x.com", "pw1", "Ana")).await.unwrap();
    users.create_user(&new_user("b@x.com", "pw2", "Bea")).await.unwrap();
    users.create_user(&new_user("c@x.com", "pw3", "Carla")).await.unwrap();
}

fn edge(name: &str, email: &str) -> FriendEdgeRow {
    FriendEdgeRow {
        name: name.to_string(),
        email: email.to_string(),
    }
}

#[tokio::test]
async fn request_then_accept_scenario() {
    let t = TestDb::new();
    let users = t.users();
    seed(&users).await;

    assert!(users.send_friend_request("a@x.com", "b@x.com").await.unwrap());
    assert_eq!(
        users.get_pending_requests("b@x.com").await.unwrap(),
        vec![edge("Ana", "a@x.com")]
    );
    assert!(users.get_pending_requests("a@x.com").await.unwrap().is_empty());
    assert!(users.get_friends("a@x.com").await.unwrap().is_empty());

    assert!(users.resolve_friend_request("a@x.com", "b@x.com", true).await.unwrap());

    assert_eq!(users.get_friends("a@x.com").await.unwrap(), vec![edge("Bea", "b@x.com")]);
    assert_eq!(users.get_friends("b@x.com").await.unwrap(), vec![edge("Ana", "a@x.com")]);
    assert!(users.get_pending_requests("b@x.com").await.unwrap().is_empty());

    let relation = users.friend_relation("b@x.com", "a@x.com").await.unwrap().unwrap();
    assert_eq!(relation.requester, "a@x.com");
    assert_eq!(relation.recipient, "b@x.com");
    assert_eq!(relation.status, FriendStatus::Confirmed);
}

#[tokio::test]
async fn reject_returns_pair_to_absent() {
    let t = TestDb::new();
    let users = t.users();
    seed(&users).await;

    assert!(users.send_friend_request("a@x.com", "b@x.com").await.unwrap());
    assert!(users.resolve_friend_request("a@x.com", "b@x.com", false).await.unwrap());

    for email in ["a@x.com", "b@x.com"] {
        assert!(users.get_friends(email).await.unwrap().is_empty());
        assert!(users.get_pending_requests(email).await.unwrap().is_empty());
    }
    assert!(users.friend_relation("a@x.com", "b@x.com").await.unwrap().is_none());

    // Either side may ask again.
    assert!(users.send_friend_request("b@x.com", "a@x.com").await.unwrap());
    assert_eq!(
        users.get_pending_requests("a@x.com").await.unwrap(),
        vec![edge("Bea", "b@x.com")]
    );
}

#[tokio::test]
async fn duplicate_reverse_and_self_requests_are_not_created() {
    let t = TestDb::new();
    let users = t.users();
    seed(&users).await;

    assert!(users.send_friend_request("a@x.com", "b@x.com").await.unwrap());
    assert!(!users.send_friend_request("a@x.com", "b@x.com").await.unwrap());
    assert!(!users.send_friend_request("b@x.com", "a@x.com").await.unwrap());
    assert!(!users.send_friend_request("c@x.com", "c@x.com").await.unwrap());

    assert_eq!(users.get_pending_requests("b@x.com").await.unwrap().len(), 1);
    assert!(users.get_pending_requests("a@x.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn request_to_unknown_user_is_a_constraint_error() {
    let t = TestDb::new();
    let users = t.users();
    seed(&users).await;

    let err = users
        .send_friend_request("a@x.com", "ghost@x.com")
        .await
        .unwrap_err();
    assert!(err.is_constraint());
}

#[tokio::test]
async fn resolving_needs_a_pending_request() {
    let t = TestDb::new();
    let users = t.users();
    seed(&users).await;

    // Absent pair.
    assert!(!users.resolve_friend_request("a@x.com", "b@x.com", true).await.unwrap());

    // Wrong direction: only the recipient side resolves.
    users.send_friend_request("a@x.com", "b@x.com").await.unwrap();
    assert!(!users.resolve_friend_request("b@x.com", "a@x.com", true).await.unwrap());

    // Confirmed is terminal; rejecting it does not unfriend.
    assert!(users.resolve_friend_request("a@x.com", "b@x.com", true).await.unwrap());
    assert!(!users.resolve_friend_request("a@x.com", "b@x.com", false).await.unwrap());
    assert_eq!(users.get_friends("b@x.com").await.unwrap().len(), 1);
}

#[tokio::test]
async fn friends_combine_both_directions() {
    let t = TestDb::new();
    let users = t.users();
    seed(&users).await;

    // Ana asked Bea; Carla asked Ana.
    users.send_friend_request("a@x.com", "b@x.com").await.unwrap();
    users.send_friend_request("c@x.com", "a@x.com").await.unwrap();
    users.resolve_friend_request("a@x.com", "b@x.com", true).await.unwrap();
    users.resolve_friend_request("c@x.com", "a@x.com", true).await.unwrap();

    // Incoming (Carla) first, then outgoing (Bea).
    assert_eq!(
        users.get_friends("a@x.com").await.unwrap(),
        vec![edge("Carla", "c@x.com"), edge("Bea", "b@x.com")]
    );
    assert_eq!(users.get_friends("c@x.com").await.unwrap(), vec![edge("Ana", "a@x.com")]);
}

#[tokio::test]
async fn search_excludes_self_and_related_users() {
    let t = TestDb::new();
    let users = t.users();
    seed(&users).await;
    users.create_user(&new_user("d@x.com", "pw4", "Daniela")).await.unwrap();

    // Every seeded name contains an "a".
    let all = users.search_users("A", "a@x.com").await.unwrap();
    assert_eq!(
        all,
        vec![edge("Bea", "b@x.com"), edge("Carla", "c@x.com"), edge("Daniela", "d@x.com")]
    );

    // Pending outgoing, and confirmed incoming, both hide the other side.
    users.send_friend_request("a@x.com", "b@x.com").await.unwrap();
    users.send_friend_request("c@x.com", "a@x.com").await.unwrap();
    users.resolve_friend_request("c@x.com", "a@x.com", true).await.unwrap();

    assert_eq!(
        users.search_users("a", "a@x.com").await.unwrap(),
        vec![edge("Daniela", "d@x.com")]
    );
    // Case-insensitive substring.
    assert_eq!(
        users.search_users("ANIEL", "b@x.com").await.unwrap(),
        vec![edge("Daniela", "d@x.com")]
    );
}

#[tokio::test]
async fn search_pattern_is_literal() {
    let t = TestDb::new();
    let users = t.users();
    seed(&users).await;
    users.create_user(&new_user("p@x.com", "pw", "100% Pepa")).await.unwrap();

    assert_eq!(
        users.search_users("0%", "a@x.com").await.unwrap(),
        vec![edge("100% Pepa", "p@x.com")]
    );
    assert!(users.search_users("_", "a@x.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn email_change_carries_relations() {
    let t = TestDb::new();
    let users = t.users();
    seed(&users).await;

    users.send_friend_request("a@x.com", "b@x.com").await.unwrap();
    users.resolve_friend_request("a@x.com", "b@x.com", true).await.unwrap();

    assert!(users
        .update_user("a@x.com", &profile("ana@y.com", "pw1", "Ana"))
        .await
        .unwrap());

    assert_eq!(users.get_friends("b@x.com").await.unwrap(), vec![edge("Ana", "ana@y.com")]);
    assert_eq!(users.get_friends("ana@y.com").await.unwrap(), vec![edge("Bea", "b@x.com")]);
}

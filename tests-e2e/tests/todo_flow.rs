use reqwest::StatusCode;
use serde_json::{Value, json};
use tododb_e2e::TestServer;

#[tokio::test]
async fn test_buy_milk_end_to_end() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.signed_in_client().await?;

    // Create
    let response = client
        .post(server.url("/api/todos"))
        .json(&json!({ "text": "buy milk" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let todo: Value = response.json().await?;
    assert_eq!(todo["text"], "buy milk");
    assert_eq!(todo["done"], false);
    let id = todo["id"].as_i64().expect("id should be a number");

    // List
    let list: Vec<Value> = client.get(server.url("/api/todos")).send().await?.json().await?;
    assert!(list.iter().any(|t| t["id"] == id));

    // Toggle
    let response = client
        .patch(server.url(&format!("/api/todos/{id}")))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let toggled: Value = response.json().await?;
    assert_eq!(toggled["done"], true);

    // Delete
    let response = client
        .delete(server.url(&format!("/api/todos/{id}")))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let list: Vec<Value> = client.get(server.url("/api/todos")).send().await?.json().await?;
    assert!(list.iter().all(|t| t["id"] != id));

    Ok(())
}

#[tokio::test]
async fn test_sessions_are_isolated() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (alice, _) = server.signed_in_client().await?;
    let (bob, _) = server.signed_in_client().await?;

    let todo: Value = alice
        .post(server.url("/api/todos"))
        .json(&json!({ "text": "alice only" }))
        .send()
        .await?
        .json()
        .await?;
    let id = todo["id"].as_i64().expect("id should be a number");

    let bobs: Vec<Value> = bob.get(server.url("/api/todos")).send().await?.json().await?;
    assert!(bobs.is_empty());

    let response = bob
        .delete(server.url(&format!("/api/todos/{id}")))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_logout_ends_the_session() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (client, username) = server.signed_in_client().await?;

    let me: Value = client.get(server.url("/api/auth/me")).send().await?.json().await?;
    assert_eq!(me["username"], username.as_str());

    let response = client.post(server.url("/api/auth/logout")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get(server.url("/api/todos")).send().await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Logging back in restores access.
    let response = client
        .post(server.url("/api/login"))
        .json(&json!({ "username": username, "password": "password" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let response = client.get(server.url("/api/todos")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_rpc_matches_rest() -> anyhow::Result<()> {
    let server = TestServer::start().await?;
    let (client, _) = server.signed_in_client().await?;

    let created: Value = client
        .post(server.url("/rpc/createTodo"))
        .json(&json!({ "text": "same store" }))
        .send()
        .await?
        .json()
        .await?;

    let rest: Vec<Value> = client.get(server.url("/api/todos")).send().await?.json().await?;
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0]["id"], created["id"]);
    assert_eq!(rest[0]["text"], "same store");

    Ok(())
}

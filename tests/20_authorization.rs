mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn anonymous_user_routes_are_401() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for res in [
        client.get(server.url("/users")).send().await?,
        client.get(server.url("/users/u1")).send().await?,
        client.delete(server.url("/users/u1")).send().await?,
        client.get(server.url("/auth/whoami")).send().await?,
    ] {
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", res.url());
    }
    Ok(())
}

#[tokio::test]
async fn malformed_token_is_treated_as_anonymous() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(server.url("/users"))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn anonymous_company_writes_are_401() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/companies"))
        .json(&serde_json::json!({ "handle": "new", "name": "New", "description": "d" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn company_search_rejects_inverted_bounds() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/companies?minEmployees=10&maxEmployees=1")).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], true);
    Ok(())
}

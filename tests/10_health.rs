mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn_server(true).await?;

    let res = server
        .client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    Ok(())
}

#[tokio::test]
async fn root_describes_the_resource() -> Result<()> {
    let server = common::spawn_server(true).await?;

    let body = server
        .client
        .get(format!("{}/", server.base_url))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;

    assert_eq!(body["resource"], common::RESOURCE);
    assert_eq!(body["endpoints"]["update"], "PUT /notas/:id");
    Ok(())
}

#[tokio::test]
async fn unknown_resource_is_404() -> Result<()> {
    let server = common::spawn_server(true).await?;

    let res = server
        .client
        .get(format!("{}/historias", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

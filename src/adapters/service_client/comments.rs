//! Comments service client.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use crate::domain::foundation::{DomainError, PostId};
use crate::ports::CommentCounter;

use super::ServiceClient;

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: i64,
}

pub struct CommentsClient {
    client: ServiceClient,
}

impl CommentsClient {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommentCounter for CommentsClient {
    async fn count_for(&self, post_id: PostId) -> Result<i64, DomainError> {
        let path = format!("/posts/{}/count", post_id);
        let response = self
            .client
            .send(self.client.request(Method::GET, &path))
            .await?;
        let body: CountResponse = response
            .json()
            .await
            .map_err(|e| DomainError::external(self.client.service(), e))?;
        Ok(body.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reads_count() {
        let server = MockServer::start().await;
        let post = PostId::new();
        Mock::given(method("GET"))
            .and(path(format!("/posts/{}/count", post)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 12})))
            .mount(&server)
            .await;

        let client = CommentsClient::new(
            ServiceClient::new("comments", server.uri(), Uuid::new_v4(), Duration::from_secs(5))
                .unwrap(),
        );
        assert_eq!(client.count_for(post).await.unwrap(), 12);
    }
}

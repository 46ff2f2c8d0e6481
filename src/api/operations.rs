/// The three GraphQL operations the avatar picker depends on
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::graphql::{Document, GraphQlClient};
use crate::error::ApiError;
use crate::state::data::{AvatarOption, Profile};

pub const GET_AVATARS: Document = Document {
    name: "GetAvatars",
    query: "query GetAvatars { getAvatars { id name url } }",
};

pub const UPDATE_PROFILE_IMAGE: Document = Document {
    name: "UpdateProfileImage",
    query: "mutation UpdateProfileImage($imageURL: String!) { \
            updateProfileImage(imageURL: $imageURL) { __typename } }",
};

pub const ME: Document = Document {
    name: "Me",
    query: "query Me { me { id name profileImage } }",
};

/// Server accepted a write. The payload is not inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack;

#[derive(Deserialize)]
struct GetAvatarsData {
    #[serde(rename = "getAvatars")]
    get_avatars: Vec<AvatarOption>,
}

#[derive(Deserialize)]
struct UpdateProfileImageData {
    #[serde(rename = "updateProfileImage")]
    _update_profile_image: Option<Value>,
}

#[derive(Deserialize)]
struct MeData {
    me: Option<Profile>,
}

/// Remote store owning avatars and the current profile
#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn get_avatars(&self) -> Result<Vec<AvatarOption>, ApiError>;

    /// Write the new profile image. Callers invalidate `me` on `Ack`.
    async fn update_profile_image(&self, image_url: &str) -> Result<Ack, ApiError>;

    async fn me(&self) -> Result<Profile, ApiError>;
}

#[async_trait]
impl ProfileBackend for GraphQlClient {
    async fn get_avatars(&self) -> Result<Vec<AvatarOption>, ApiError> {
        let data: GetAvatarsData = self.execute(&GET_AVATARS, json!({})).await?;
        Ok(data.get_avatars)
    }

    async fn update_profile_image(&self, image_url: &str) -> Result<Ack, ApiError> {
        let _: UpdateProfileImageData = self
            .execute(&UPDATE_PROFILE_IMAGE, json!({ "imageURL": image_url }))
            .await?;
        Ok(Ack)
    }

    async fn me(&self) -> Result<Profile, ApiError> {
        let data: MeData = self.execute(&ME, json!({})).await?;
        data.me.ok_or(ApiError::MissingData("me"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> GraphQlClient {
        GraphQlClient::new(format!("{}/graphql", server.uri()), None)
    }

    #[tokio::test]
    async fn test_get_avatars_returns_list_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "operationName": "GetAvatars" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "getAvatars": [
                    { "id": "2", "name": "B", "url": "/b.png" },
                    { "id": "1", "name": "A", "url": "/a.png" }
                ]}
            })))
            .mount(&server)
            .await;

        let avatars = backend(&server).get_avatars().await.unwrap();
        let ids: Vec<&str> = avatars.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_update_sends_image_url_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "operationName": "UpdateProfileImage",
                "variables": { "imageURL": "/a.png" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "updateProfileImage": { "__typename": "User" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ack = backend(&server).update_profile_image("/a.png").await;
        assert_eq!(ack, Ok(Ack));
    }

    #[tokio::test]
    async fn test_rejected_update_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{ "message": "Invalid image" }]
            })))
            .mount(&server)
            .await;

        let result = backend(&server).update_profile_image("/nope.png").await;
        assert_eq!(result, Err(ApiError::GraphQl(vec!["Invalid image".into()])));
    }

    #[tokio::test]
    async fn test_me_null_is_missing_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "operationName": "Me" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "me": null }
            })))
            .mount(&server)
            .await;

        let result = backend(&server).me().await;
        assert_eq!(result, Err(ApiError::MissingData("me")));
    }
}

use async_trait::async_trait;
use hackboard_client::{
    api::{CommentPayload, CommentRecord, Error, HackathonId, NewComment},
    Backend,
};

/// The real backend, reached over HTTP
pub struct HttpBackend {
    client: reqwest::Client,
    host: String,
}

impl HttpBackend {
    pub fn new(host: String) -> HttpBackend {
        HttpBackend {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
        }
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    tracing::error!(?err, "failed talking to the backend");
    Error::Unknown(err.to_string())
}

/// Turns non-success responses into the error the server described, if it did
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.bytes().await.map_err(transport_error)?;
    Err(Error::parse(&body)
        .unwrap_or_else(|e| Error::Unknown(format!("server answered {status}: {e:#}"))))
}

// The backend takes comment submissions as form fields
pub fn form_fields(c: &NewComment) -> Vec<(&'static str, String)> {
    let mut res = vec![
        ("hackathonId", c.hackathon_id.0.to_string()),
        ("userId", c.user_id.0.to_string()),
        ("content", c.content.clone()),
    ];
    if let Some(parent) = c.parent_id {
        res.push(("parentId", parent.0.to_string()));
    }
    res
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_comments(&self, hackathon: HackathonId) -> Result<Vec<CommentRecord>, Error> {
        let resp = self
            .client
            .get(format!("{}/comments/{}", self.host, hackathon.0))
            .send()
            .await
            .map_err(transport_error)?;
        // Replies may come nested inside their parent or flat alongside it
        let payloads: Vec<CommentPayload> = check_status(resp)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        Ok(CommentPayload::flatten(payloads))
    }

    async fn post_comment(&self, comment: NewComment) -> Result<CommentRecord, Error> {
        let resp = self
            .client
            .post(format!("{}/comments", self.host))
            .form(&form_fields(&comment))
            .send()
            .await
            .map_err(transport_error)?;
        check_status(resp)
            .await?
            .json()
            .await
            .map_err(transport_error)
    }
}

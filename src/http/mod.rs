pub mod response;

use reqwest::{
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
    Client, RequestBuilder, StatusCode,
};
use std::ops::Deref;
use thiserror::Error;

const USER_AGENT_VALUE: &str = "gitea-release-resource";

#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        HttpClient {
            client: Client::new(),
        }
    }
}

impl Deref for HttpClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

pub trait Headers {
    fn default_headers(self, token: Option<&str>) -> RequestBuilder;
    fn auth_headers(self, token: Option<&str>) -> RequestBuilder;
}

impl Headers for RequestBuilder {
    fn default_headers(self, token: Option<&str>) -> RequestBuilder {
        self.header(ACCEPT, "application/json").auth_headers(token)
    }

    fn auth_headers(self, token: Option<&str>) -> RequestBuilder {
        let builder = self.header(USER_AGENT, USER_AGENT_VALUE);

        match token {
            Some(token) => builder.header(AUTHORIZATION, format!("token {}", token)),
            None => builder,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed with HTTP status {status}: {message}")]
    GenericResponseError { status: u16, message: String },
    #[error("invalid request url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Failed to send request")]
    SendRequestError {
        #[source]
        cause: reqwest::Error,
    },
    #[error("Failed to read response body")]
    ReadResponseError {
        #[source]
        cause: reqwest::Error,
    },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::GenericResponseError { status, .. } if *status == StatusCode::NOT_FOUND.as_u16()
        )
    }
}

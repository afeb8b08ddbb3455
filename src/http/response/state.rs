use crate::http::Error;

use reqwest::header::LINK;
use serde::de::DeserializeOwned;

pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
}

pub enum Response<T> {
    Success(Inner<T>),
    Error(ErrorResponse),
}

pub struct Inner<T> {
    pub payload: T,
    pub link: Option<String>,
}

impl<T> Response<T> {
    pub fn collect(self) -> Result<T, Error> {
        self.collect_with_link().map(|(payload, _)| payload)
    }

    /// Returns the payload together with the raw `Link` header, if the server sent one.
    pub fn collect_with_link(self) -> Result<(T, Option<String>), Error> {
        match self {
            Response::Success(response) => Ok((response.payload, response.link)),
            Response::Error(response) => Err(Error::GenericResponseError {
                status: response.status,
                message: response.message,
            }),
        }
    }
}

pub trait AsyncFrom<T>: Sized {
    async fn async_from(value: T) -> Self;
}

impl<T> AsyncFrom<reqwest::Response> for Response<T>
where
    T: DeserializeOwned,
{
    async fn async_from(value: reqwest::Response) -> Self {
        let status = value.status().as_u16();
        let link = value
            .headers()
            .get(LINK)
            .and_then(|link| link.to_str().ok())
            .map(|link| link.to_owned());

        let text = match value.text().await {
            Ok(text) => text,
            Err(err) => {
                return Response::Error(ErrorResponse {
                    status,
                    message: format!("Failed to read response text: {}", err),
                });
            }
        };

        if !(200..300).contains(&status) {
            return Response::Error(ErrorResponse {
                status,
                message: text,
            });
        }

        // empty bodies (e.g. 204 on delete) deserialize as JSON null
        let text = if text.trim().is_empty() {
            "null"
        } else {
            text.as_str()
        };

        match serde_json::from_str::<T>(text) {
            Ok(payload) => Response::Success(Inner { payload, link }),
            Err(err) => Response::Error(ErrorResponse {
                status,
                message: format!("Failed to parse json: {}", err),
            }),
        }
    }
}

pub trait ResponseHandler {
    async fn handle<T>(self) -> Result<Response<T>, Error>
    where
        T: DeserializeOwned;
}

impl ResponseHandler for Result<reqwest::Response, reqwest::Error> {
    async fn handle<T>(self) -> Result<Response<T>, Error>
    where
        T: DeserializeOwned,
    {
        let response = self.map_err(|cause| Error::SendRequestError { cause })?;

        Ok(Response::async_from(response).await)
    }
}

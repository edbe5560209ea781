use agrimarket_application::{AuthApi, LoginRequest, LoginResponse};
use agrimarket_domain::{ApiFailure, ErrorBody};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

const LOGIN_PATH: &str = "api/auth/login";

/// HTTP implementation of the backend authentication endpoints.
pub struct HttpAuthApi {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpAuthApi {
    /// Creates an adapter for the API rooted at `base_url`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiFailure> {
        self.base_url.join(path).map_err(|error| {
            ApiFailure::setup(format!(
                "invalid endpoint '{path}' for base url '{}': {error}",
                self.base_url
            ))
        })
    }
}

/// Maps a transport error to the failure shape the classifier expects.
fn transport_failure(error: &reqwest::Error) -> ApiFailure {
    if error.is_builder() {
        ApiFailure::setup(error.to_string())
    } else {
        ApiFailure::no_response(error.to_string())
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiFailure> {
        let url = self.endpoint(LOGIN_PATH)?;
        let response = self
            .http_client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|error| transport_failure(&error))?;

        let status = response.status();
        if status.is_success() {
            return response.json::<LoginResponse>().await.map_err(|error| {
                ApiFailure::setup(format!("unreadable login response: {error}"))
            });
        }

        let body = response
            .bytes()
            .await
            .map(|bytes| ErrorBody::from_json_lenient(&bytes))
            .unwrap_or_default();
        debug!(status = status.as_u16(), "login rejected by backend");

        Err(ApiFailure::Response {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use agrimarket_domain::UserRole;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    async fn serve_once(status_line: &'static str, body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|_| panic!("test"));
        let address = listener.local_addr().unwrap_or_else(|_| panic!("test"));

        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            read_request(&mut socket).await;
            let reply = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        Url::parse(&format!("http://{address}/")).unwrap_or_else(|_| panic!("test"))
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut received = Vec::new();
        let mut chunk = [0_u8; 1024];
        loop {
            let Ok(read) = socket.read(&mut chunk).await else {
                return;
            };
            if read == 0 {
                return;
            }
            received.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&received);
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if received.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }

    fn request() -> LoginRequest {
        LoginRequest {
            email: "lea@ferme.fr".to_owned(),
            password: "secret".to_owned(),
        }
    }

    #[tokio::test]
    async fn success_decodes_login_response() {
        let base_url = serve_once(
            "200 OK",
            r#"{"token":"jwt","user":{"id":"u1","email":"lea@ferme.fr","name":"Léa","role":"producer"}}"#,
        )
        .await;
        let api = HttpAuthApi::new(reqwest::Client::new(), base_url);

        let response = api.login(&request()).await.unwrap_or_else(|_| panic!("test"));
        assert_eq!(response.token, "jwt");
        assert_eq!(response.user.role, UserRole::Producer);
    }

    #[tokio::test]
    async fn error_status_keeps_body() {
        let base_url = serve_once("409 Conflict", r#"{"message":"Email already used"}"#).await;
        let api = HttpAuthApi::new(reqwest::Client::new(), base_url);

        let failure = api.login(&request()).await.err();
        assert_eq!(
            failure,
            Some(ApiFailure::status_with_message(409, "Email already used"))
        );
    }

    #[tokio::test]
    async fn non_json_error_body_degrades_to_empty() {
        let base_url = serve_once("500 Internal Server Error", "<h1>boom</h1>").await;
        let api = HttpAuthApi::new(reqwest::Client::new(), base_url);

        assert_eq!(api.login(&request()).await.err(), Some(ApiFailure::status(500)));
    }

    #[tokio::test]
    async fn refused_connection_is_no_response() {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|_| panic!("test"));
        let address = listener.local_addr().unwrap_or_else(|_| panic!("test"));
        drop(listener);

        let base_url = Url::parse(&format!("http://{address}/")).unwrap_or_else(|_| panic!("test"));
        let api = HttpAuthApi::new(reqwest::Client::new(), base_url);

        assert!(matches!(
            api.login(&request()).await,
            Err(ApiFailure::NoResponse { .. })
        ));
    }

    #[tokio::test]
    async fn unusable_base_url_is_setup_failure() {
        let base_url = Url::parse("mailto:ops@agrimarket.fr").unwrap_or_else(|_| panic!("test"));
        let api = HttpAuthApi::new(reqwest::Client::new(), base_url);

        assert!(matches!(
            api.login(&request()).await,
            Err(ApiFailure::Setup { .. })
        ));
    }
}

use super::super::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Framing(_) | Self::Protocol(_) | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidArgs(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Template(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), error = %self, "request failed");
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_maps_errors_to_statuses() {
        assert_eq!(Error::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Framing("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(Error::Protocol("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            Error::from("boom").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

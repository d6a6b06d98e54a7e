use ligue1_ledger::LedgerError;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub(crate) fn transport(error: reqwest::Error) -> LedgerError {
    LedgerError::Transport(error.to_string())
}

/// Decode a gateway response, turning `{ "error": ... }` bodies back into
/// the ledger error they came from.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, LedgerError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(transport);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    Err(error_from_status(status, message))
}

fn error_from_status(status: StatusCode, message: String) -> LedgerError {
    let invalid_club = LedgerError::InvalidClub.to_string();
    let not_voted = LedgerError::NotVoted.to_string();

    match status {
        StatusCode::CONFLICT => LedgerError::AlreadyVoted,
        StatusCode::BAD_REQUEST if message == invalid_club => LedgerError::InvalidClub,
        StatusCode::BAD_REQUEST => LedgerError::InvalidAddress(message),
        StatusCode::NOT_FOUND if message == not_voted => LedgerError::NotVoted,
        s if s.is_server_error() => LedgerError::Unavailable(message),
        _ => LedgerError::Rejected(message),
    }
}

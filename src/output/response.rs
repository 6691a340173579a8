//! CLI response formatting and output.
//!
//! Provides JSON envelope, printing, and exit code mapping.

use prefixer::error::Hint;
use prefixer::{Error, ErrorCode, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
            }),
        }
    }
}

pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationInvalidArgument => 2,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError
        | ErrorCode::InternalUnexpected => 1,
    }
}

/// Render a command result as the JSON envelope.
fn render_envelope(result: Result<serde_json::Value>) -> Result<String> {
    match result {
        Ok(data) => CliResponse::success(data).to_json(),
        Err(err) => CliResponse::<()>::from_error(&err).to_json(),
    }
}

pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    use std::io::{self, Write};

    let payload = render_envelope(result)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_exit_with_two() {
        let err = Error::validation_invalid_argument("source_dir", "missing", None);
        let (result, code) = map_cmd_result_to_json::<()>(Err(err));
        assert!(result.is_err());
        assert_eq!(code, 2);
    }

    #[test]
    fn io_errors_exit_with_one() {
        let err = Error::internal_io("denied", None);
        let (_, code) = map_cmd_result_to_json::<()>(Err(err));
        assert_eq!(code, 1);
    }

    #[test]
    fn success_keeps_command_exit_code() {
        let (result, code) = map_cmd_result_to_json(Ok((serde_json::json!({"ok": true}), 1)));
        assert_eq!(result.unwrap()["ok"], true);
        assert_eq!(code, 1);
    }

    #[test]
    fn rendered_envelope_wraps_data_or_error() {
        let ok = render_envelope(Ok(serde_json::json!({"command": "prefix.scan"}))).unwrap();
        let ok: serde_json::Value = serde_json::from_str(&ok).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"]["command"], "prefix.scan");
        assert!(ok.get("error").is_none());

        let failed = render_envelope(Err(Error::internal_io("denied", None))).unwrap();
        let failed: serde_json::Value = serde_json::from_str(&failed).unwrap();
        assert_eq!(failed["success"], false);
        assert_eq!(failed["error"]["code"], "internal.io_error");
    }

    #[test]
    fn error_envelope_carries_code_and_hints() {
        let err = Error::config_invalid_value("prefix", None, "bad").with_hint("fix it");
        let response = CliResponse::<()>::from_error(&err);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "config.invalid_value");
        assert_eq!(json["error"]["hints"][0]["message"], "fix it");
        assert!(json.get("data").is_none());
    }
}

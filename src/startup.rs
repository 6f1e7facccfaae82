//! Command-line entry: turns arguments into a session call.
//!
//! ```text
//! tuum-session schema
//! tuum-session status
//! tuum-session logout
//! tuum-session <METHOD> <PATH> [JSON-BODY]
//! ```
//!
//! When `TUUM_EMAIL` and `TUUM_PASSWORD` are set and the store holds no
//! access token, the session logs in first.

use std::error::Error;

use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::{RequestOptions, Session};
use crate::config::ConfigV1;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Schema,
    Status,
    Logout,
    Request {
        method: Method,
        path: String,
        body: Option<Value>,
    },
}

pub fn parse_args(args: &[String]) -> Result<Command, String> {
    match args {
        [cmd] if cmd == "schema" => Ok(Command::Schema),
        [cmd] if cmd == "status" => Ok(Command::Status),
        [cmd] if cmd == "logout" => Ok(Command::Logout),
        [method, path] => Ok(Command::Request {
            method: parse_method(method)?,
            path: path.clone(),
            body: None,
        }),
        [method, path, body] => {
            let body = serde_json::from_str(body)
                .map_err(|e| format!("Body is not valid JSON: {}", e))?;
            Ok(Command::Request {
                method: parse_method(method)?,
                path: path.clone(),
                body: Some(body),
            })
        }
        _ => Err("usage: tuum-session (schema | status | logout | <METHOD> <PATH> [JSON-BODY])".into()),
    }
}

fn parse_method(raw: &str) -> Result<Method, String> {
    Method::from_bytes(raw.to_uppercase().as_bytes())
        .map_err(|_| format!("Unknown HTTP method '{}'", raw))
}

/// Runs `command`. Everything except `schema` builds a session from config
/// first and logs in if asked to.
pub async fn run(config: ConfigV1, command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Schema => crate::config::print_schema()?,
        Command::Status => match connect(config).await?.user_info().await {
            Some(profile) => println!(
                "logged in as {} (id {})",
                profile.display_name().unwrap_or("unknown"),
                profile.id
            ),
            None => println!("not logged in"),
        },
        Command::Logout => {
            if !connect(config).await?.logout().await? {
                warn!("Server did not confirm logout");
            }
        }
        Command::Request { method, path, body } => {
            let mut options = RequestOptions::get().method(method);
            if let Some(body) = body {
                options = options.json(body);
            }
            let response = connect(config).await?.request(&path, options).await?;
            println!("{}", response.status());
            println!("{}", response.text());
        }
    }

    Ok(())
}

async fn connect(config: ConfigV1) -> Result<Session, Box<dyn Error>> {
    let session = Session::new(config)?;

    if !session.is_logged_in().await {
        if let (Ok(email), Ok(password)) = (std::env::var("TUUM_EMAIL"), std::env::var("TUUM_PASSWORD")) {
            info!("No stored session, logging in as '{}'", email);
            session.login(&email, &password).await?;
        }
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::extract_config;
    use figment::providers::{Format, Yaml};
    use figment::Figment;
    use serde_json::json;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_request_with_body() {
        let command = parse_args(&args(&["post", "/orders", r#"{"qty": 1}"#])).unwrap();
        assert_eq!(
            command,
            Command::Request {
                method: Method::POST,
                path: "/orders".to_string(),
                body: Some(json!({"qty": 1})),
            }
        );
    }

    #[test]
    fn parses_keywords() {
        assert_eq!(parse_args(&args(&["schema"])).unwrap(), Command::Schema);
        assert_eq!(parse_args(&args(&["status"])).unwrap(), Command::Status);
        assert_eq!(parse_args(&args(&["logout"])).unwrap(), Command::Logout);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["GET", "/x", "{not json"])).is_err());
    }

    #[tokio::test]
    async fn schema_runs_without_building_a_session() {
        // A user agent with a line break makes the HTTP client refuse to build.
        let config = extract_config(&Figment::new().merge(Yaml::string(
            r#"
version: "1.0.0"
logging:
  level: "warn"
  format: "console"
transport:
  user_agent: "broken\nagent"
"#,
        )))
        .unwrap();

        assert!(run(config.clone(), Command::Status).await.is_err());
        assert!(run(config, Command::Schema).await.is_ok());
    }
}

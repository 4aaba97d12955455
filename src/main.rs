//! `sigcookie` - inspect and issue signed cookies from the command line.
//!
//! Copyright (C) 2026 sigcookie contributors
//! SPDX-License-Identifier: AGPL-3.0-only
//!
//! Loads configuration, sets up logging, then either verifies a cookie
//! from a raw `Cookie` header or prints the `Set-Cookie` header for a value.
//!
//! ```text
//! sigcookie read <name> <cookie-header>
//! sigcookie write <name> <value> [lifetime]
//! ```

use serde_json::Value;
use sigcookie::{Config, CookieRegistry, HttpExchange};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: sigcookie read <name> <cookie-header>\n       sigcookie write <name> <value> [lifetime]";

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stderr());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(non_blocking);

    if log_format.eq_ignore_ascii_case("pretty") {
        subscriber.init();
    } else {
        subscriber.json().init();
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        cookies = config.cookies.len(),
        cipher_providers = config.cipher_keys.len(),
        log_format = %config.log_format,
        "Configuration loaded"
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let host = std::env::var("COOKIE_HOST").unwrap_or_default();
    let mut registry = CookieRegistry::from_config(config);

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["read", name, header] => {
            let mut exchange = HttpExchange::new(host);
            exchange.parse_cookie_header(header);

            match registry.instance(&mut exchange, name, None) {
                Ok(cookie) => {
                    println!("loaded: {}", cookie.loaded());
                    println!("value: {}", cookie.value_or(Value::Null));
                }
                Err(e) => {
                    error!(cookie = %name, error = %e, "Failed to read cookie");
                    return ExitCode::FAILURE;
                }
            }
            for line in exchange.set_cookie_headers() {
                println!("Set-Cookie: {line}");
            }
        }
        ["write", name, value, rest @ ..] if rest.len() <= 1 => {
            let lifetime = match rest.first().map(|s| s.parse::<i64>()) {
                None => None,
                Some(Ok(secs)) => Some(secs),
                Some(Err(_)) => {
                    eprintln!("{USAGE}");
                    return ExitCode::FAILURE;
                }
            };
            let value: Value =
                serde_json::from_str(value).unwrap_or_else(|_| Value::String((*value).to_string()));

            let mut exchange = HttpExchange::new(host);
            let written = match registry.instance(&mut exchange, name, None) {
                Ok(cookie) => cookie.set(&mut exchange, value, lifetime),
                Err(e) => {
                    error!(cookie = %name, error = %e, "Failed to open cookie");
                    return ExitCode::FAILURE;
                }
            };
            if !written {
                return ExitCode::FAILURE;
            }
            for line in exchange.set_cookie_headers() {
                println!("Set-Cookie: {line}");
            }
        }
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

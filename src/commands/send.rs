//! `send` and `preview` commands
//!
//! Both read one event mapping (JSON or YAML) from a file or stdin.
//! In YAML, quote identifiers such as `phone: '+8801711111111'`: unquoted they
//! parse as integers and lose leading `+` or `0`, which changes their hash.

use colored::*;
use eyre::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use fbcapi::credentials::mask_secret;
use fbcapi::{Config, EventInput, EventSubmitter};

pub fn send(file: Option<PathBuf>, source_url: Option<String>, config: &Config) -> Result<()> {
    let submitter = EventSubmitter::from_config(config).context("Invalid Conversions API configuration")?;
    let event = load_event(file.as_deref(), source_url)?;

    match submitter.submit(&event) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            let kind = e.kind();
            Err(e).context(format!("Failed to send event {} ({})", event.event_id, kind))
        }
    }
}

pub fn preview(file: Option<PathBuf>, source_url: Option<String>, config: &Config) -> Result<()> {
    let submitter = EventSubmitter::from_config(config).context("Invalid Conversions API configuration")?;
    let event = load_event(file.as_deref(), source_url)?;

    let mut body = submitter.preview(&event);
    body.access_token = mask_secret(&body.access_token);

    eprintln!("{} POST {}", "→".blue(), submitter.endpoint().cyan());
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn load_event(file: Option<&Path>, source_url: Option<String>) -> Result<EventInput> {
    let content = match file {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).context(format!("Failed to read event file {}", path.display()))?
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("Failed to read event from stdin")?;
            buf
        }
    };

    let event = parse_event(&content)?;
    Ok(match source_url {
        Some(url) => event.with_source_url(url),
        None => event,
    })
}

/// A document starting with `{` is read as JSON, anything else as YAML
fn parse_event(content: &str) -> Result<EventInput> {
    let data: Value = if content.trim_start().starts_with('{') {
        serde_json::from_str(content).context("Event is not valid JSON")?
    } else {
        serde_yaml::from_str(content).context("Event is not valid YAML")?
    };
    Ok(EventInput::from_value(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_json() {
        let content = r#"{"event_name":"Purchase","event_time":1700000000,"event_id":"e1","phone":"017","userID":"u1",
            "fbp":"fb.1.2.3","value":10,"content_ids":["a"],"content_type":"product","order_id":"o1"}"#;
        let event = parse_event(content).unwrap();
        assert_eq!(event.event_id, "e1");
    }

    #[test]
    fn test_parse_event_json_keeps_phone_text() {
        let content = r#"{"event_name":"Purchase","event_time":1,"event_id":"e1","phone":"+8801711111111","userID":"007",
            "fbp":"x","value":1,"content_ids":[],"content_type":"product","order_id":"o1"}"#;
        let event = parse_event(content).unwrap();
        assert_eq!(event.phone, "+8801711111111");
        assert_eq!(event.user_id, "007");
    }

    #[test]
    fn test_parse_event_yaml_quoted_phone_matches_json() {
        let yaml = "event_name: Purchase\nevent_time: 1\nevent_id: e1\nphone: '+8801711111111'\nuserID: '007'\n\
                    fbp: x\nvalue: 1\ncontent_ids: []\ncontent_type: product\norder_id: o1\n";
        let event = parse_event(yaml).unwrap();
        assert_eq!(event.phone, "+8801711111111");
        assert_eq!(
            fbcapi::hash_identifier(&event.phone),
            fbcapi::hash_identifier("+8801711111111")
        );
    }

    #[test]
    fn test_parse_event_invalid_json_reported() {
        let err = parse_event("{\"event_name\": ").unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_parse_event_yaml() {
        let content = "event_name: Purchase\nevent_time: 1700000000\nevent_id: e2\nphone: '017'\nuserID: 5\n\
                       fbp: fb.1.2.3\nvalue: 10.5\ncontent_ids: [a, b]\ncontent_type: product\norder_id: 77\ncurrency: USD\n";
        let event = parse_event(content).unwrap();
        assert_eq!(event.user_id, "5");
        assert_eq!(event.order_id, "77");
        assert_eq!(event.currency_or_default(), "USD");
    }

    #[test]
    fn test_parse_event_missing_field() {
        let err = parse_event("event_name: Purchase\n").unwrap_err();
        assert!(err.to_string().contains("InvalidInputError"));
    }

    #[test]
    fn test_load_event_from_file_with_source_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.yaml");
        fs::write(
            &path,
            "event_name: ViewContent\nevent_time: 1\nevent_id: e3\nphone: '1'\nuserID: '2'\nfbp: x\nvalue: 0\n\
             content_ids: []\ncontent_type: product\norder_id: '0'\n",
        )
        .unwrap();

        let event = load_event(Some(&path), Some("https://shop.example.com/p/1".to_string())).unwrap();
        assert_eq!(event.event_source_url.as_deref(), Some("https://shop.example.com/p/1"));
    }
}

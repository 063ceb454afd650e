use std::fs;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tubectl::config::Config;
use tubectl::session::Session;
use tubeline::BeanstalkClient;

#[test]
fn test_config_file_loading() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config_content = r#"
host = "beanstalk.internal"
port = 11400
tube = "reports"
priority = 50
ttr = 300
"#;
    fs::write(&config_path, config_content).unwrap();

    let config = Config::load_from_file(&config_path).unwrap();
    assert_eq!(config.address(), "beanstalk.internal:11400");
    assert_eq!(config.get_log_level(), "warn");

    let settings = config.initial_settings();
    assert_eq!(settings.tube(), "reports");
    assert_eq!(settings.priority(), 50);
    assert_eq!(settings.delay(), 0);
    assert_eq!(settings.ttr(), 300);
}

#[test]
fn test_invalid_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "port = \"not a number\"").unwrap();

    assert!(Config::load_from_file(&config_path).is_err());
}

#[test]
fn test_config_file_path_location() {
    let path = Config::config_file_path().unwrap();
    assert!(path.ends_with("tubeline/config.toml"));
}

#[tokio::test]
async fn test_session_against_fake_broker() {
    let (client, server) = tokio::io::duplex(4096);

    let broker = tokio::spawn(async move {
        let (read, mut write) = tokio::io::split(server);
        let mut lines = BufReader::new(read).lines();
        let mut requests = Vec::new();

        while let Some(line) = lines.next_line().await.unwrap() {
            requests.push(line.clone());
            let reply = if let Some(tube) = line.strip_prefix("use ") {
                format!("USING {}\r\n", tube)
            } else if line.starts_with("put ") {
                lines.next_line().await.unwrap();
                "INSERTED 5\r\n".to_string()
            } else if line == "quit" {
                break;
            } else {
                "UNKNOWN_COMMAND\r\n".to_string()
            };
            write.write_all(reply.as_bytes()).await.unwrap();
        }
        requests
    });

    let config = Config {
        tube: Some("reports".to_string()),
        ..Config::default()
    };
    let mut session = Session::new(&config, BeanstalkClient::new(client));

    let input: &[u8] = b"put -d weekly\r\nset priority=-1\r\n";
    let mut output = Vec::new();
    session.run(input, &mut output).await.unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Tube: reports"));
    assert!(text.contains("INSERTED 5"));
    assert!(text.contains("bad option value -1 for key priority"));
    assert!(text.ends_with("connection closed\n"));
    assert_eq!(session.settings().priority(), 1);

    let requests = broker.await.unwrap();
    assert_eq!(requests, vec!["use reports", "put 1 0 60 6", "quit"]);
}

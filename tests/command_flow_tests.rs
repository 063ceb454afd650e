//! End-to-end tests of the command parser against both queue backends.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tubeline::{
    BeanstalkClient, CommandError, CommandParser, ErrorKind, MemoryQueue, QueueError,
    QueueOperations, Settings,
};

#[tokio::test]
async fn test_operator_session_against_memory_queue() {
    let mut queue = MemoryQueue::new();
    let mut settings = Settings::default();

    let script = [
        ("set tube=emails priority=10", Ok(None)),
        ("put -d first job", Ok(Some("INSERTED 1"))),
        ("set delay=abc", Err(ErrorKind::BadOptionValue)),
        ("set DELAY=30 TTR=5", Ok(None)),
        ("put -d second", Ok(Some("INSERTED 2"))),
        ("list", Ok(Some("Tubes:\ndefault\nemails"))),
        ("", Err(ErrorKind::EmptyCommand)),
    ];

    for (line, expected) in script {
        let outcome = CommandParser::new(&mut queue)
            .parse(line, &mut settings)
            .await;
        match expected {
            Ok(text) => assert_eq!(outcome.unwrap().as_deref(), text, "line {:?}", line),
            Err(kind) => assert_eq!(outcome.unwrap_err().kind(), kind, "line {:?}", line),
        }
    }

    let jobs = queue.jobs();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].tube, "emails");
    assert_eq!((jobs[0].priority, jobs[0].delay, jobs[0].ttr), (10, 0, 60));
    assert_eq!((jobs[1].priority, jobs[1].delay, jobs[1].ttr), (10, 30, 5));
}

#[tokio::test]
async fn test_parser_drives_beanstalk_wire_protocol() {
    let (client, server) = tokio::io::duplex(4096);

    let broker = tokio::spawn(async move {
        let (read, mut write) = tokio::io::split(server);
        let mut lines = BufReader::new(read).lines();
        let mut seen = Vec::new();

        while let Some(line) = lines.next_line().await.unwrap() {
            seen.push(line.clone());
            let reply = if let Some(tube) = line.strip_prefix("use ") {
                format!("USING {}\r\n", tube)
            } else if line.starts_with("put ") {
                seen.push(lines.next_line().await.unwrap().unwrap_or_default());
                "INSERTED 100\r\n".to_string()
            } else if line == "list-tubes" {
                let body = "---\n- default\n- jobs\n";
                format!("OK {}\r\n{}\r\n", body.len(), body)
            } else if line == "quit" {
                break;
            } else {
                "UNKNOWN_COMMAND\r\n".to_string()
            };
            write.write_all(reply.as_bytes()).await.unwrap();
        }
        seen
    });

    let mut queue = BeanstalkClient::new(client);
    let mut settings = Settings::default();
    {
        let mut parser = CommandParser::new(&mut queue);
        parser
            .parse("set tube=jobs priority=2 ttr=30", &mut settings)
            .await
            .unwrap();
        let reply = parser.parse("put -d hello world", &mut settings).await.unwrap();
        assert_eq!(reply.as_deref(), Some("INSERTED 100"));

        let listing = parser.parse("list", &mut settings).await.unwrap().unwrap();
        assert!(listing.contains("default"));
        assert!(listing.contains("jobs"));
    }
    queue.close().await.unwrap();
    drop(queue);

    let seen = broker.await.unwrap();
    assert_eq!(
        seen,
        vec![
            "use jobs",
            "put 2 0 30 11",
            "hello world",
            "list-tubes",
            "quit",
        ]
    );
}

#[tokio::test]
async fn test_broker_failure_is_reported_verbatim() {
    let mut queue = MemoryQueue::with_tubes(["default"]);
    queue.fail_with("OUT_OF_MEMORY");
    let mut settings = Settings::default();

    let err = CommandParser::new(&mut queue)
        .parse("put -d x", &mut settings)
        .await
        .unwrap_err();

    match err {
        CommandError::Queue(QueueError::Rejected { command, reply }) => {
            assert_eq!(command, "put");
            assert_eq!(reply, "OUT_OF_MEMORY");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

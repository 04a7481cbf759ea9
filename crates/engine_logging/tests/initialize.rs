use std::fs;

use engine_logging::{engine_info, initialize, LogOptions};
use tempfile::TempDir;

#[test]
fn file_sink_receives_records() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("sweeper.log");

    initialize(&LogOptions {
        verbose: true,
        log_file: Some(path.clone()),
    });
    engine_info!("swept {} channels", 3);
    log::logger().flush();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("swept 3 channels"));
}

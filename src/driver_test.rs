// Unit tests for WebDriver process management

use super::*;

#[test]
fn test_driver_commands() {
    assert_eq!(BrowserType::Firefox.driver_command(), "geckodriver");
    assert_eq!(BrowserType::Chrome.driver_command(), "chromedriver");
}

#[test]
fn test_port_arguments() {
    assert_eq!(BrowserType::Firefox.port_arg(4444), vec!["--port", "4444"]);
    assert_eq!(BrowserType::Chrome.port_arg(9515), vec!["--port=9515"]);
}

#[test]
fn test_free_port_is_bindable() {
    let port = free_port(BrowserType::Chrome).unwrap();
    assert!(port > 0);
    assert!(std::net::TcpListener::bind(("127.0.0.1", port)).is_ok());
}

#[test]
fn test_free_port_skips_busy_preferred_port() {
    let preferred = BrowserType::Firefox.preferred_ports();
    // Hold the first preferred port if nothing else does
    let _held = std::net::TcpListener::bind(("127.0.0.1", preferred[0]));
    let port = free_port(BrowserType::Firefox).unwrap();
    assert_ne!(port, preferred[0]);
}

#[tokio::test]
async fn test_unreachable_driver() {
    assert!(!is_driver_running("http://127.0.0.1:1").await);
    assert!(!is_driver_ready("http://127.0.0.1:1").await);
}

#[test]
fn test_stop_all_without_processes() {
    let manager = DriverManager::new();
    manager.stop_all();
    assert!(manager.processes().is_empty());
}

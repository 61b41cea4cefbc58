// Tests for the adb shell bridge: output parsing and error classification

use super::error::AdbError;
use super::shell::AdbShell;
use super::types::Device;

#[test]
fn test_parse_devices_single() {
    let output = "List of devices attached\nemulator-5554\tdevice\n\n";
    let devices = AdbShell::parse_devices(output);
    assert_eq!(
        devices,
        vec![Device {
            serial: "emulator-5554".to_string()
        }]
    );
}

#[test]
fn test_parse_devices_skips_unauthorized_and_offline() {
    let output = "List of devices attached\n\
                  R58M123ABC\tunauthorized\n\
                  192.168.1.20:5555\tdevice\n\
                  emulator-5556\toffline\n";
    let devices = AdbShell::parse_devices(output);
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].serial, "192.168.1.20:5555");
}

#[test]
fn test_parse_devices_handles_crlf() {
    let output = "List of devices attached\r\nABC123\tdevice\r\n\r\n";
    let devices = AdbShell::parse_devices(output);
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].serial, "ABC123");
}

#[test]
fn test_parse_devices_empty() {
    assert!(AdbShell::parse_devices("List of devices attached\n\n").is_empty());
    assert!(AdbShell::parse_devices("").is_empty());
}

#[test]
fn test_spawn_not_found_maps_to_adb_not_found() {
    let err = AdbError::from_spawn(
        "adb devices",
        std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
    );
    assert!(matches!(err, AdbError::AdbNotFound));
    assert!(!err.is_transport());
}

#[test]
fn test_spawn_other_error_is_transport() {
    let err = AdbError::from_spawn(
        "adb devices",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    assert!(matches!(err, AdbError::CommandFailed { .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_connect_with_explicit_serial_skips_discovery() {
    let shell = AdbShell::connect(Some("device-42"), 3, std::time::Duration::from_millis(1))
        .await
        .unwrap();
    assert_eq!(shell.device.serial, "device-42");
}

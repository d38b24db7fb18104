// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn port_defaults_and_parses() {
    std::env::remove_var("CATNIP_PORT");
    assert_eq!(port(), 8080);

    std::env::set_var("CATNIP_PORT", "6369");
    assert_eq!(port(), 6369);

    std::env::set_var("CATNIP_PORT", "not-a-port");
    assert_eq!(port(), 8080);
    std::env::remove_var("CATNIP_PORT");
}

#[test]
#[serial]
fn state_dir_precedence() {
    std::env::remove_var("CATNIP_STATE_DIR");
    std::env::remove_var("GIT_STATE_DIR");

    std::env::set_var("GIT_STATE_DIR", "/var/git-state");
    assert_eq!(state_dir(), PathBuf::from("/var/git-state"));

    std::env::set_var("CATNIP_STATE_DIR", "/var/catnip");
    assert_eq!(state_dir(), PathBuf::from("/var/catnip"));

    std::env::remove_var("CATNIP_STATE_DIR");
    std::env::remove_var("GIT_STATE_DIR");
}

#[test]
#[serial]
fn dev_mode_flag_values() {
    std::env::remove_var("CATNIP_DEV");
    assert!(!dev_mode());
    std::env::set_var("CATNIP_DEV", "1");
    assert!(dev_mode());
    std::env::set_var("CATNIP_DEV", "false");
    assert!(!dev_mode());
    std::env::remove_var("CATNIP_DEV");
}

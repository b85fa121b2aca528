// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

struct EnvGuard {
    saved: Vec<(&'static str, Option<std::ffi::OsString>)>,
}

impl EnvGuard {
    fn new(keys: &[&'static str]) -> Self {
        let saved = keys.iter().map(|k| (*k, std::env::var_os(k))).collect();
        for key in keys {
            std::env::remove_var(key);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial(env)]
fn explicit_state_dir_wins() {
    let _guard = EnvGuard::new(&["DW_STATE_DIR", "XDG_STATE_HOME"]);
    std::env::set_var("DW_STATE_DIR", "/srv/dw");
    std::env::set_var("XDG_STATE_HOME", "/xdg");

    assert_eq!(state_dir().unwrap(), PathBuf::from("/srv/dw"));
}

#[test]
#[serial(env)]
fn xdg_state_home_is_namespaced() {
    let _guard = EnvGuard::new(&["DW_STATE_DIR", "XDG_STATE_HOME"]);
    std::env::set_var("XDG_STATE_HOME", "/xdg");

    assert_eq!(state_dir().unwrap(), PathBuf::from("/xdg/dw"));
}

#[test]
#[serial(env)]
fn home_fallback() {
    let _guard = EnvGuard::new(&["DW_STATE_DIR", "XDG_STATE_HOME", "HOME"]);
    std::env::set_var("HOME", "/home/op");

    assert_eq!(
        state_dir().unwrap(),
        PathBuf::from("/home/op/.local/state/dw")
    );
}

#[test]
#[serial(env)]
fn empty_listen_override_is_ignored() {
    let _guard = EnvGuard::new(&["DW_LISTEN"]);
    assert_eq!(listen_override(), None);
    std::env::set_var("DW_LISTEN", "");
    assert_eq!(listen_override(), None);
    std::env::set_var("DW_LISTEN", "0.0.0.0:9000");
    assert_eq!(listen_override().as_deref(), Some("0.0.0.0:9000"));
}

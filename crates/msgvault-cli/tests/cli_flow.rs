use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tempfile::TempDir;

const TOKEN_SECRET: &str = "cli-test-token-secret-0123456789abcdef";
const RESET_BASE_URL: &str = "https://vault.example.com/reset";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_msgvault"))
}

/// An isolated home: database, config and outbox under one temp dir.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let config = format!(
            "[mail]\nfrom = \"vault@example.com\"\noutbox_path = \"{}\"\nreset_base_url = \"{}\"\n",
            dir.path().join("outbox.jsonl").to_string_lossy(),
            RESET_BASE_URL
        );
        std::fs::write(dir.path().join("config.toml"), config).expect("write config");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("MSGVAULT_DB", self.path("vault.db"))
            .env("MSGVAULT_CONFIG", self.path("config.toml"))
            .env("MSGVAULT_MASTER_KEY", STANDARD.encode([7u8; 32]))
            .env("MSGVAULT_TOKEN_SECRET", TOKEN_SECRET)
            .env("XDG_CONFIG_HOME", self.path("xdg-config"))
            .env("XDG_DATA_HOME", self.path("xdg-data"))
            .env_remove("MSGVAULT_TOKEN")
            .env_remove("MSGVAULT_PASSWORD")
            .env_remove("MSGVAULT_PASSPHRASE")
            .env_remove("MSGVAULT_LOG")
            .stdin(Stdio::null());
        cmd
    }

    fn register(&self, username: &str, email: &str, password: &str) {
        let out = self
            .cmd()
            .args(["register", "--no-input", "--username", username, "--email", email])
            .env("MSGVAULT_PASSWORD", password)
            .output()
            .expect("run register");
        assert_success(&out, "register");
    }

    fn login(&self, email: &str, password: &str) -> String {
        let out = self
            .cmd()
            .args(["login", "--no-input", "--email", email])
            .env("MSGVAULT_PASSWORD", password)
            .output()
            .expect("run login");
        assert_success(&out, "login");
        stdout(&out).trim().to_string()
    }

    fn account(&self, name: &str) -> String {
        let email = format!("{}@example.com", name);
        self.register(name, &email, "correct-password");
        self.login(&email, "correct-password")
    }

    fn create(&self, token: &str, title: &str, content: &str, extra: &[&str]) -> Output {
        self.cmd()
            .args(["create", "--no-input", "--quiet", title, "--content", content])
            .args(extra)
            .env("MSGVAULT_TOKEN", token)
            .output()
            .expect("run create")
    }

    fn create_ok(&self, token: &str, title: &str, content: &str, extra: &[&str]) -> String {
        let out = self.create(token, title, content, extra);
        assert_success(&out, "create");
        stdout(&out).trim().to_string()
    }

    fn unlock(&self, token: &str, id: &str) -> Output {
        self.cmd()
            .args(["unlock", "--no-input", "--json", id])
            .env("MSGVAULT_TOKEN", token)
            .output()
            .expect("run unlock")
    }

    fn unlock_with_passphrase(&self, token: &str, id: &str, passphrase: &str) -> Output {
        self.cmd()
            .args(["unlock", "--no-input", "--json", id])
            .env("MSGVAULT_TOKEN", token)
            .env("MSGVAULT_PASSPHRASE", passphrase)
            .output()
            .expect("run unlock")
    }
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{} failed: stdout={}, stderr={}",
        what,
        stdout(out),
        stderr(out)
    );
}

fn json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("stdout should be JSON")
}

fn read_outbox(path: &Path) -> Vec<serde_json::Value> {
    std::fs::read_to_string(path)
        .expect("outbox should exist")
        .lines()
        .map(|line| serde_json::from_str(line).expect("outbox line should be JSON"))
        .collect()
}

#[test]
fn test_register_login_create_list_unlock() {
    let sandbox = Sandbox::new();
    sandbox.register("alice", "alice@example.com", "correct-password");

    let login = sandbox
        .cmd()
        .args(["login", "--no-input", "--json", "--email", "alice@example.com"])
        .env("MSGVAULT_PASSWORD", "correct-password")
        .output()
        .expect("run login");
    assert_success(&login, "login");
    let login = json(&login);
    assert_eq!(login["user"]["name"], "Alice");
    assert_eq!(login["user"]["email"], "alice@example.com");
    let token = login["access"].as_str().expect("access token").to_string();

    let id = sandbox.create_ok(&token, "note", "hello", &[]);

    let list = sandbox
        .cmd()
        .args(["list", "--json"])
        .env("MSGVAULT_TOKEN", &token)
        .output()
        .expect("run list");
    assert_success(&list, "list");
    let list = json(&list);
    let entries = list.as_array().expect("list should be an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], id.as_str());
    assert_eq!(entries[0]["title"], "note");
    assert!(entries[0].get("content").is_none());

    for _ in 0..2 {
        let unlock = sandbox.unlock(&token, &id);
        assert_success(&unlock, "unlock");
        let unlocked = json(&unlock);
        assert_eq!(unlocked["title"], "note");
        assert_eq!(unlocked["content"], "hello");
    }
}

#[test]
fn test_content_from_stdin() {
    let sandbox = Sandbox::new();
    let token = sandbox.account("alice");

    let mut child = sandbox
        .cmd()
        .args(["create", "--no-input", "--quiet", "piped"])
        .env("MSGVAULT_TOKEN", &token)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn create");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"line one\nline two\n")
        .expect("write stdin");
    let out = child.wait_with_output().expect("wait create");
    assert_success(&out, "create");
    let id = stdout(&out).trim().to_string();

    let unlock = sandbox.unlock(&token, &id);
    assert_success(&unlock, "unlock");
    assert_eq!(json(&unlock)["content"], "line one\nline two");
}

#[test]
fn test_self_destruct_unlocks_once() {
    let sandbox = Sandbox::new();
    let token = sandbox.account("alice");
    let id = sandbox.create_ok(&token, "burn", "after reading", &["--self-destruct"]);

    let first = sandbox.unlock(&token, &id);
    assert_success(&first, "first unlock");
    assert_eq!(json(&first)["content"], "after reading");

    let second = sandbox.unlock(&token, &id);
    assert_eq!(second.status.code(), Some(3));
    assert!(stderr(&second).contains("Message has been destroyed"));
}

#[test]
fn test_passphrase_protected_entry() {
    let sandbox = Sandbox::new();
    let token = sandbox.account("alice");

    let out = sandbox
        .cmd()
        .args(["create", "--no-input", "--quiet", "secret", "--content", "payload", "--protect"])
        .env("MSGVAULT_TOKEN", &token)
        .env("MSGVAULT_PASSPHRASE", "correct")
        .output()
        .expect("run create");
    assert_success(&out, "create");
    let id = stdout(&out).trim().to_string();

    let missing = sandbox.unlock(&token, &id);
    assert_eq!(missing.status.code(), Some(4));

    let wrong = sandbox.unlock_with_passphrase(&token, &id, "wrong");
    assert_eq!(wrong.status.code(), Some(4));
    assert!(stderr(&wrong).contains("Decryption failed - invalid credentials"));

    let right = sandbox.unlock_with_passphrase(&token, &id, "correct");
    assert_success(&right, "unlock");
    assert_eq!(json(&right)["content"], "payload");
}

#[test]
fn test_time_locked_entry() {
    let sandbox = Sandbox::new();
    let token = sandbox.account("alice");
    let id = sandbox.create_ok(&token, "later", "patience", &["--unlock-in", "1h"]);

    let out = sandbox.unlock(&token, &id);
    assert_eq!(out.status.code(), Some(5));
    assert!(stderr(&out).contains("Available after"));
}

#[test]
fn test_unlock_time_in_the_past_is_invalid_input() {
    let sandbox = Sandbox::new();
    let token = sandbox.account("alice");

    let out = sandbox.create(&token, "late", "too late", &["--unlock-after", "2000-01-01"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("Unlock time must be in the future."));
}

#[test]
fn test_unlock_in_out_of_range_is_invalid_input() {
    let sandbox = Sandbox::new();
    let token = sandbox.account("alice");

    // Past the end of the representable calendar.
    let out = sandbox.create(&token, "never", "too far", &["--unlock-in", "100000000d"]);
    assert_eq!(out.status.code(), Some(2), "stderr={}", stderr(&out));
    assert!(stderr(&out).contains("Unlock time out of range"));

    // Representable, but later than the year 9999.
    let out = sandbox.create(&token, "never", "too far", &["--unlock-in", "3000000d"]);
    assert_eq!(out.status.code(), Some(2), "stderr={}", stderr(&out));
    assert!(stderr(&out).contains("9999"));

    let list = sandbox
        .cmd()
        .args(["list", "--json"])
        .env("MSGVAULT_TOKEN", &token)
        .output()
        .expect("run list");
    assert_success(&list, "list");
    assert_eq!(json(&list), serde_json::json!([]));
}

#[test]
fn test_blank_title_is_invalid_input() {
    let sandbox = Sandbox::new();
    let token = sandbox.account("alice");

    let out = sandbox.create(&token, "   ", "content", &[]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_other_users_entry_is_not_found() {
    let sandbox = Sandbox::new();
    let alice = sandbox.account("alice");
    let bob = sandbox.account("bob");
    let id = sandbox.create_ok(&alice, "mine", "alice only", &[]);

    let out = sandbox.unlock(&bob, &id);
    assert_eq!(out.status.code(), Some(3));
    assert!(!stdout(&out).contains("alice only"));
}

#[test]
fn test_commands_require_a_session() {
    let sandbox = Sandbox::new();

    let out = sandbox.cmd().args(["list"]).output().expect("run list");
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("Not logged in"));

    let out = sandbox
        .cmd()
        .args(["list"])
        .env("MSGVAULT_TOKEN", "not.a.token")
        .output()
        .expect("run list");
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn test_wrong_password_login() {
    let sandbox = Sandbox::new();
    sandbox.register("alice", "alice@example.com", "correct-password");

    let out = sandbox
        .cmd()
        .args(["login", "--no-input", "--email", "alice@example.com"])
        .env("MSGVAULT_PASSWORD", "wrong-password")
        .output()
        .expect("run login");
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("Invalid login credentials"));
}

#[test]
fn test_duplicate_registration() {
    let sandbox = Sandbox::new();
    sandbox.register("alice", "alice@example.com", "correct-password");

    let out = sandbox
        .cmd()
        .args(["register", "--no-input", "--username", "alice2", "--email", "alice@example.com"])
        .env("MSGVAULT_PASSWORD", "correct-password")
        .output()
        .expect("run register");
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("user with this email already exists."));
}

#[test]
fn test_password_reset_through_outbox() {
    let sandbox = Sandbox::new();
    sandbox.register("alice", "alice@example.com", "old-password");

    let out = sandbox
        .cmd()
        .args(["reset-password", "--email", "alice@example.com"])
        .output()
        .expect("run reset-password");
    assert_success(&out, "reset-password");

    let mail = read_outbox(&sandbox.path("outbox.jsonl"));
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0]["to"], "alice@example.com");
    assert_eq!(mail[0]["from"], "vault@example.com");
    assert_eq!(mail[0]["subject"], "Password Reset Request");

    let body = mail[0]["body"].as_str().expect("body");
    let link = body
        .lines()
        .find(|line| line.starts_with(RESET_BASE_URL))
        .expect("body should contain the reset link");
    let mut parts = link[RESET_BASE_URL.len() + 1..].splitn(2, '/');
    let uid = parts.next().expect("uid");
    let reset_token = parts.next().expect("token");

    let out = sandbox
        .cmd()
        .args(["confirm-reset", "--no-input", uid, reset_token])
        .env("MSGVAULT_PASSWORD", "new-password")
        .output()
        .expect("run confirm-reset");
    assert_success(&out, "confirm-reset");

    sandbox.login("alice@example.com", "new-password");
}

#[test]
fn test_reset_for_unknown_email() {
    let sandbox = Sandbox::new();
    let out = sandbox
        .cmd()
        .args(["reset-password", "--email", "nobody@example.com"])
        .output()
        .expect("run reset-password");
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("User with this email does not exist."));
}

#[test]
fn test_missing_master_key() {
    let sandbox = Sandbox::new();
    let token = sandbox.account("alice");

    let out = sandbox
        .cmd()
        .args(["create", "--no-input", "note", "--content", "hello"])
        .env("MSGVAULT_TOKEN", &token)
        .env_remove("MSGVAULT_MASTER_KEY")
        .output()
        .expect("run create");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("MSGVAULT_MASTER_KEY"));
}

#[test]
fn test_list_works_without_master_key() {
    let sandbox = Sandbox::new();
    let token = sandbox.account("alice");
    let id = sandbox.create_ok(&token, "note", "hello", &[]);

    let out = sandbox
        .cmd()
        .args(["list", "--json"])
        .env("MSGVAULT_TOKEN", &token)
        .env_remove("MSGVAULT_MASTER_KEY")
        .output()
        .expect("run list");
    assert_success(&out, "list without master key");
    let listed = json(&out);
    assert_eq!(listed[0]["id"], id.as_str());
    assert_eq!(listed[0]["title"], "note");
}

#[test]
fn test_missing_explicit_config() {
    let sandbox = Sandbox::new();
    let out = sandbox
        .cmd()
        .args(["reset-password", "--email", "alice@example.com"])
        .env("MSGVAULT_CONFIG", sandbox.path("nope.toml"))
        .output()
        .expect("run reset-password");
    assert_eq!(out.status.code(), Some(3));
}

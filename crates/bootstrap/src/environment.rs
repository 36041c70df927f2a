//! Process environment for shell sessions.

use platform::ProcessIdentity;
use settings::constants::bootstrap;

use crate::Layout;

/// Synthetic Android-style user name (`u0_a<uid mod 100000>`).
pub fn user_name(uid: u32) -> String {
    format!("u0_a{}", uid % 100_000)
}

/// Build the ordered `KEY=value` list handed to every spawned shell.
///
/// Pure: the same layout and identity always give the same list.
pub fn build_environment(layout: &Layout, identity: ProcessIdentity) -> Vec<String> {
    let home = layout.home().display().to_string();
    let prefix = layout.prefix().display().to_string();
    let user = user_name(identity.uid);
    let cert = format!("{}/etc/tls/cert.pem", prefix);

    vec![
        format!("HOME={}", home),
        format!("PREFIX={}", prefix),
        format!("PATH={}/bin", prefix),
        format!("LD_LIBRARY_PATH={}/lib", prefix),
        format!("TMPDIR={}/tmp", prefix),
        format!("PWD={}", home),
        "TERM=xterm-256color".to_string(),
        "COLORTERM=truecolor".to_string(),
        "LANG=en_US.UTF-8".to_string(),
        format!("SHELL={}/bin/bash", prefix),
        format!("USER={}", user),
        format!("LOGNAME={}", user),
        format!("TERMUX_VERSION={}", bootstrap::TERMUX_VERSION),
        "TERMUX_APK_RELEASE=GITHUB".to_string(),
        "TERMUX_IS_DEBUGGABLE_BUILD=0".to_string(),
        format!("TERMUX__PREFIX={}", prefix),
        format!("TERMUX__HOME={}", home),
        format!("TERMUX_APP_PID={}", identity.pid),
        format!("SSL_CERT_FILE={}", cert),
        format!("NODE_EXTRA_CA_CERTS={}", cert),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn identity() -> ProcessIdentity {
        ProcessIdentity {
            uid: 10_123,
            pid: 4242,
        }
    }

    fn keys(env: &[String]) -> Vec<&str> {
        env.iter()
            .map(|entry| entry.split_once('=').map(|(k, _)| k).unwrap_or(entry))
            .collect()
    }

    #[test]
    fn order_is_fixed() {
        let env = build_environment(&Layout::new("/f"), identity());
        assert_eq!(
            keys(&env),
            vec![
                "HOME",
                "PREFIX",
                "PATH",
                "LD_LIBRARY_PATH",
                "TMPDIR",
                "PWD",
                "TERM",
                "COLORTERM",
                "LANG",
                "SHELL",
                "USER",
                "LOGNAME",
                "TERMUX_VERSION",
                "TERMUX_APK_RELEASE",
                "TERMUX_IS_DEBUGGABLE_BUILD",
                "TERMUX__PREFIX",
                "TERMUX__HOME",
                "TERMUX_APP_PID",
                "SSL_CERT_FILE",
                "NODE_EXTRA_CA_CERTS",
            ]
        );
    }

    #[test]
    fn values_derive_from_layout_and_identity() {
        let env = build_environment(&Layout::new("/f"), identity());
        assert!(env.contains(&"HOME=/f/home".to_string()));
        assert!(env.contains(&"PATH=/f/usr/bin".to_string()));
        assert!(env.contains(&"SHELL=/f/usr/bin/bash".to_string()));
        assert!(env.contains(&"TERMUX_APP_PID=4242".to_string()));
        assert!(env.contains(&"USER=u0_a10123".to_string()));
        assert!(env.contains(&"NODE_EXTRA_CA_CERTS=/f/usr/etc/tls/cert.pem".to_string()));
    }

    #[test]
    fn is_deterministic() {
        let layout = Layout::new("/f");
        assert_eq!(
            build_environment(&layout, identity()),
            build_environment(&layout, identity())
        );
    }

    #[test_case(0, "u0_a0" ; "root")]
    #[test_case(10_123, "u0_a10123" ; "app uid")]
    #[test_case(1_010_123, "u0_a10123" ; "secondary user wraps")]
    #[test_case(99_999, "u0_a99999" ; "upper bound")]
    fn user_name_uses_uid_mod_100000(uid: u32, expected: &str) {
        assert_eq!(user_name(uid), expected);
    }
}
